use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};

/// 东八区偏移秒数
pub const BJ_OFFSET_SECONDS: i32 = 8 * 3600;

/// 返回东八区 `FixedOffset` 对象
#[inline]
pub fn bj_offset() -> FixedOffset {
    FixedOffset::east_opt(BJ_OFFSET_SECONDS).expect("Valid offset")
}

/// 当前北京时间 `DateTime<FixedOffset>`
#[inline]
pub fn now_bj() -> DateTime<FixedOffset> {
    Local::now().with_timezone(&bj_offset())
}

/// 将毫秒时间戳转换为北京时间
/// 超出chrono可表示范围的时间戳回退到纪元零点
pub fn ms_to_bj(ts_ms: i64) -> DateTime<FixedOffset> {
    Utc.timestamp_millis_opt(ts_ms)
        .single()
        .unwrap_or_else(|| Utc.timestamp_millis_opt(0).single().expect("epoch"))
        .with_timezone(&bj_offset())
}

/// 报告中使用的时间格式，例如 "2024/05/01 13:05:59"
pub fn format_report_time(ts_ms: i64) -> String {
    ms_to_bj(ts_ms).format("%Y/%m/%d %H:%M:%S").to_string()
}

/// 总测试时长标签，例如 "12.3 S"
pub fn duration_seconds_label(duration_ms: i64) -> String {
    format!("{:.1} S", duration_ms as f64 / 1000.0)
}

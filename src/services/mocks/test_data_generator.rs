use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::json;

use crate::models::{
    Attachment, LogLevel, LogRecord, Measurement, MeasurementOutcome, PhaseOutcome, PhaseRecord,
    TestOutcome, TestRecord,
};

/// 1x1像素PNG图像，用于演示与测试中的图像附件
const SAMPLE_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";

/// 示例CSV数据表，字段与行数对齐原框架的示例驱动
const SAMPLE_CSV: &str = "month,year,sale\n1,2012,55\n4,2014,40\n7,2013,84\n10,2014,31\n";

/// 固定的示例测试开始时间（毫秒时间戳）
const SAMPLE_START_MS: i64 = 1_700_000_000_000;

/// 测试数据生成器
pub struct TestDataGenerator;

impl TestDataGenerator {
    /// 生成一条完成的示例测试记录
    ///
    /// 测量项覆盖：区间内通过、区间外失败、仅下限、仅上限、无限值、字符串值；
    /// 附件覆盖：CSV数据表与PNG图像；并附带若干框架日志。
    pub fn generate_test_record() -> TestRecord {
        Self::generate_test_record_with_dut("DUT001")
    }

    /// 以指定DUT标识生成示例测试记录
    pub fn generate_test_record_with_dut(dut_id: impl Into<String>) -> TestRecord {
        let mut record = TestRecord::new(
            dut_id,
            "Station_1",
            SAMPLE_START_MS,
            SAMPLE_START_MS + 12_345,
            TestOutcome::Fail,
        );
        record
            .metadata
            .insert("test_name".to_string(), json!("Factory_Example_Report"));
        record
            .metadata
            .insert("test_version".to_string(), json!("1.2.3"));
        record
            .metadata
            .insert("batch_number".to_string(), json!("B20240501"));
        record
            .metadata
            .insert("model_name".to_string(), json!("TP-100"));

        record.phases.push(Self::numeric_phase());
        record.phases.push(Self::attachment_phase());

        record.log_records.push(LogRecord {
            level: LogLevel::Info,
            logger_name: "framework.test".to_string(),
            source: "numeric_phase.rs".to_string(),
            lineno: 21,
            timestamp_millis: SAMPLE_START_MS + 1_000,
            message: "Hello World!".to_string(),
        });
        record.log_records.push(LogRecord {
            level: LogLevel::Warning,
            logger_name: "framework.test".to_string(),
            source: "numeric_phase.rs".to_string(),
            lineno: 23,
            timestamp_millis: SAMPLE_START_MS + 2_500,
            message: "测量值 test_fail 超出上限".to_string(),
        });

        record
    }

    /// 数值测量阶段，包含一个超限失败的测量项
    fn numeric_phase() -> PhaseRecord {
        let mut phase = PhaseRecord::new(
            "numeric_phase",
            PhaseOutcome::Fail,
            SAMPLE_START_MS,
            SAMPLE_START_MS + 5_000,
        );

        phase.measurements.push(
            Measurement::new("test_pass", Some(json!(11)), MeasurementOutcome::Pass)
                .with_validators(vec!["10.0 <= x <= 20.0".to_string()]),
        );
        phase.measurements.push(
            Measurement::new("test_fail", Some(json!(22)), MeasurementOutcome::Fail)
                .with_validators(vec!["10.0 <= x <= 20.0".to_string()]),
        );
        phase.measurements.push(
            Measurement::new("test_low_lim_only", Some(json!(12)), MeasurementOutcome::Pass)
                .with_validators(vec!["10.0 <= x".to_string()]),
        );
        phase.measurements.push(
            Measurement::new("test_high_lim_only", Some(json!(9)), MeasurementOutcome::Pass)
                .with_validators(vec!["x <= 10.0".to_string()]),
        );
        phase.measurements.push(
            Measurement::new("test_no_lim", Some(json!(10)), MeasurementOutcome::Pass)
                .with_units("mA"),
        );
        phase.measurements.push(Measurement::new(
            "test_string",
            Some(json!("hello world")),
            MeasurementOutcome::Pass,
        ));

        phase
    }

    /// 附件阶段：CSV数据表与PNG图像
    fn attachment_phase() -> PhaseRecord {
        let mut phase = PhaseRecord::new(
            "attach_data",
            PhaseOutcome::Pass,
            SAMPLE_START_MS + 5_000,
            SAMPLE_START_MS + 6_000,
        );
        phase.attachments.push(Attachment::new(
            "example_data.csv",
            SAMPLE_CSV.as_bytes().to_vec(),
            Some("text/csv".to_string()),
        ));
        phase.attachments.push(Attachment::new(
            "example_image.png",
            Self::sample_png(),
            Some("image/png".to_string()),
        ));
        phase
    }

    /// 示例PNG图像字节
    pub fn sample_png() -> Vec<u8> {
        STANDARD
            .decode(SAMPLE_PNG_BASE64)
            .expect("内置PNG数据应合法")
    }

    /// 生成随机的被测设备序列号，例如 "SN00123456"
    pub fn random_serial_number() -> String {
        format!("SN{:08}", rand::random::<u32>() % 100_000_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 测试生成记录的结构完整性
    #[test]
    fn test_generated_record_shape() {
        let record = TestDataGenerator::generate_test_record();

        assert_eq!(record.dut_id, "DUT001");
        assert_eq!(record.outcome, TestOutcome::Fail);
        assert_eq!(record.phases.len(), 2);
        assert_eq!(record.phases[0].measurements.len(), 6);
        assert_eq!(record.phases[1].attachments.len(), 2);
        assert_eq!(record.log_records.len(), 2);
        assert!(record.duration_millis() > 0);
    }

    /// 测试内置PNG数据可解码且带PNG签名
    #[test]
    fn test_sample_png_signature() {
        let png = TestDataGenerator::sample_png();
        assert_eq!(&png[..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    /// 测试随机序列号格式
    #[test]
    fn test_random_serial_number_format() {
        let sn = TestDataGenerator::random_serial_number();
        assert_eq!(sn.len(), 10);
        assert!(sn.starts_with("SN"));
        assert!(sn[2..].chars().all(|c| c.is_ascii_digit()));
    }
}

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::enums::{LogLevel, MeasurementOutcome, PhaseOutcome, ReportType, TestOutcome};

/// 生成默认UUID字符串的辅助函数
pub fn default_id() -> String {
    Uuid::new_v4().to_string()
}

/// 附件字节的serde承载格式：序列化记录中以Base64字符串传递
mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

/// 完整测试记录结构体
/// 由外部测试执行框架在一次测试结束后交给输出回调的单一数据结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRecord {
    /// 被测设备标识
    pub dut_id: String,
    /// 工站标识
    pub station_id: String,
    /// 测试开始时间（毫秒时间戳）
    pub start_time_millis: i64,
    /// 测试结束时间（毫秒时间戳）
    pub end_time_millis: i64,
    /// 整体测试结果
    pub outcome: TestOutcome,
    /// 自由格式元数据（约定键：test_name、test_version、batch_number、
    /// model_name、component_number、station_name、config_file、config_file_digest）
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
    /// 按执行顺序排列的测试阶段
    #[serde(default)]
    pub phases: Vec<PhaseRecord>,
    /// 测试过程中框架收集的日志记录
    #[serde(default)]
    pub log_records: Vec<LogRecord>,
}

impl TestRecord {
    /// 创建新的测试记录
    pub fn new(
        dut_id: impl Into<String>,
        station_id: impl Into<String>,
        start_time_millis: i64,
        end_time_millis: i64,
        outcome: TestOutcome,
    ) -> Self {
        Self {
            dut_id: dut_id.into(),
            station_id: station_id.into(),
            start_time_millis,
            end_time_millis,
            outcome,
            metadata: HashMap::new(),
            phases: Vec::new(),
            log_records: Vec::new(),
        }
    }

    /// 总测试时长（毫秒）
    pub fn duration_millis(&self) -> i64 {
        self.end_time_millis - self.start_time_millis
    }

    /// 以字符串形式取元数据值；非字符串的JSON值按紧凑形式渲染
    pub fn metadata_str(&self, key: &str) -> Option<String> {
        self.metadata.get(key).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// DUT标识是否命中跳过哨兵（命中时输出回调不产生文件）
    pub fn is_skip_sentinel(&self, skip_dut_ids: &[String]) -> bool {
        skip_dut_ids.iter().any(|s| s == &self.dut_id)
    }

    /// 按记录顺序遍历全部测量项（跨阶段拍平）
    pub fn all_measurements(&self) -> impl Iterator<Item = (&PhaseRecord, &Measurement)> {
        self.phases
            .iter()
            .flat_map(|phase| phase.measurements.iter().map(move |m| (phase, m)))
    }

    /// 按记录顺序遍历全部附件
    pub fn all_attachments(&self) -> impl Iterator<Item = (&PhaseRecord, &Attachment)> {
        self.phases
            .iter()
            .flat_map(|phase| phase.attachments.iter().map(move |a| (phase, a)))
    }
}

/// 测试阶段记录结构体
/// 一个阶段包含按声明顺序排列的测量项与附件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseRecord {
    /// 阶段名称
    pub name: String,
    /// 阶段结果
    pub outcome: PhaseOutcome,
    /// 阶段开始时间（毫秒时间戳）
    pub start_time_millis: i64,
    /// 阶段结束时间（毫秒时间戳）
    pub end_time_millis: i64,
    /// 阶段内测量项，顺序即框架声明顺序
    #[serde(default)]
    pub measurements: Vec<Measurement>,
    /// 阶段内附件，顺序即附加顺序
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl PhaseRecord {
    /// 创建新的阶段记录
    pub fn new(
        name: impl Into<String>,
        outcome: PhaseOutcome,
        start_time_millis: i64,
        end_time_millis: i64,
    ) -> Self {
        Self {
            name: name.into(),
            outcome,
            start_time_millis,
            end_time_millis,
            measurements: Vec::new(),
            attachments: Vec::new(),
        }
    }

    /// 阶段时长（毫秒）
    pub fn duration_millis(&self) -> i64 {
        self.end_time_millis - self.start_time_millis
    }
}

/// 测量项结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    /// 测量项名称
    pub name: String,
    /// 测量值（数值、字符串或布尔；未设置时为None）
    #[serde(default)]
    pub measured_value: Option<Value>,
    /// 自由格式验证器描述字符串，如 "10.0 <= x <= 20.0"
    #[serde(default)]
    pub validators: Vec<String>,
    /// 测量项结果
    pub outcome: MeasurementOutcome,
    /// 工程单位（如有）
    #[serde(default)]
    pub units: Option<String>,
}

impl Measurement {
    /// 创建新的测量项
    pub fn new(
        name: impl Into<String>,
        measured_value: Option<Value>,
        outcome: MeasurementOutcome,
    ) -> Self {
        Self {
            name: name.into(),
            measured_value,
            validators: Vec::new(),
            outcome,
            units: None,
        }
    }

    /// 设置验证器描述
    pub fn with_validators(mut self, validators: Vec<String>) -> Self {
        self.validators = validators;
        self
    }

    /// 设置工程单位
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// 将测量值渲染为报告中的文本形式；未设置时为 "N/A"
    pub fn render_value(&self) -> String {
        match &self.measured_value {
            None | Some(Value::Null) => "N/A".to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// 测量值的数值形式（如可用）
    pub fn numeric_value(&self) -> Option<f64> {
        self.measured_value.as_ref().and_then(|v| v.as_f64())
    }
}

/// 附件结构体
/// 字节内容在序列化记录中以Base64字符串承载
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    /// 附件名称（含扩展名，决定在报告中的展开方式）
    pub name: String,
    /// 附件字节内容
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    /// MIME类型（如有）
    #[serde(default)]
    pub mimetype: Option<String>,
}

impl Attachment {
    /// 创建新的附件
    pub fn new(name: impl Into<String>, data: Vec<u8>, mimetype: Option<String>) -> Self {
        Self {
            name: name.into(),
            data,
            mimetype,
        }
    }

    /// 是否为CSV数据表附件（依据名称后缀判定）
    pub fn is_csv(&self) -> bool {
        self.name.ends_with(".csv")
    }

    /// 是否为PNG图像附件（依据名称后缀判定）
    pub fn is_png(&self) -> bool {
        self.name.ends_with(".png")
    }
}

/// 日志记录结构体
/// 框架在测试期间收集的单条日志
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// 日志级别
    pub level: LogLevel,
    /// 记录器名称
    pub logger_name: String,
    /// 来源文件
    pub source: String,
    /// 来源行号
    pub lineno: u32,
    /// 记录时间（毫秒时间戳）
    pub timestamp_millis: i64,
    /// 日志内容
    pub message: String,
}

/// 报告产物结构体
/// 输出回调成功写出文件后返回的描述信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportArtifact {
    /// 产物唯一标识
    pub report_id: String,
    /// 报告类型
    pub report_type: ReportType,
    /// 报告文件路径
    pub file_path: PathBuf,
    /// 报告文件大小（字节）
    pub file_size: u64,
    /// 生成时间
    pub generated_at: DateTime<Utc>,
}

impl ReportArtifact {
    /// 依据已写出的文件构造报告产物描述
    pub fn for_file(report_type: ReportType, file_path: PathBuf, file_size: u64) -> Self {
        Self {
            report_id: default_id(),
            report_type,
            file_path,
            file_size,
            generated_at: Utc::now(),
        }
    }
}

/// 报告文件名模式模块
pub mod filename;
/// 验证器限值推导模块
pub mod limits;
/// 主机信息模块
pub mod system_info;
/// 文本报告输出回调模块
pub mod text_report;
/// Excel报告输出回调模块
pub mod excel_report;

pub use excel_report::ExcelReportWriter;
pub use filename::FilenamePattern;
pub use limits::{limits_from_validators, Limits};
pub use text_report::TextReportWriter;

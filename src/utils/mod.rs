/// 统一错误处理模块
pub mod error;
/// 报告输出配置模块
pub mod config;
/// 时间处理工具模块
pub mod time_utils;

// 重新导出常用类型，方便其他模块使用
pub use config::{ConfigManager, ReportConfig};
pub use error::{AppError, AppResult};

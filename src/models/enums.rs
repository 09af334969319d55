//! # 模型枚举类型模块
//!
//! 定义测试记录与报告产物使用的枚举类型：
//! - **测试结果枚举**: 整体结果、阶段结果、测量项结果
//! - **日志级别枚举**: 框架日志记录的级别
//! - **报告类型枚举**: 输出回调产出的报告格式
//!
//! 所有枚举都支持JSON序列化（线上格式为 SCREAMING_SNAKE_CASE，
//! 与框架序列化后的记录保持一致），并提供字符串双向转换能力。

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// 整体测试结果枚举
/// 表示一条完整测试记录的最终结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestOutcome {
    /// 全部测量项通过
    Pass,
    /// 存在未通过的测量项
    Fail,
    /// 执行过程发生异常
    Error,
    /// 执行超时
    Timeout,
    /// 人工中止
    Aborted,
}

impl Default for TestOutcome {
    fn default() -> Self {
        TestOutcome::Error
    }
}

impl Display for TestOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TestOutcome::Pass => "PASS",
            TestOutcome::Fail => "FAIL",
            TestOutcome::Error => "ERROR",
            TestOutcome::Timeout => "TIMEOUT",
            TestOutcome::Aborted => "ABORTED",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for TestOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PASS" => Ok(TestOutcome::Pass),
            "FAIL" => Ok(TestOutcome::Fail),
            "ERROR" => Ok(TestOutcome::Error),
            "TIMEOUT" => Ok(TestOutcome::Timeout),
            "ABORTED" => Ok(TestOutcome::Aborted),
            _ => Err(format!("未知的测试结果: {}", s)),
        }
    }
}

/// 测试阶段结果枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhaseOutcome {
    /// 阶段通过
    Pass,
    /// 阶段失败
    Fail,
    /// 阶段被跳过
    Skip,
    /// 阶段执行出错
    Error,
}

impl Default for PhaseOutcome {
    fn default() -> Self {
        PhaseOutcome::Pass
    }
}

impl Display for PhaseOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PhaseOutcome::Pass => "PASS",
            PhaseOutcome::Fail => "FAIL",
            PhaseOutcome::Skip => "SKIP",
            PhaseOutcome::Error => "ERROR",
        };
        write!(f, "{}", s)
    }
}

/// 测量项结果枚举
/// PASS/FAIL 文本同时驱动Excel报告中的条件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeasurementOutcome {
    /// 测量值满足全部验证器
    Pass,
    /// 测量值未满足验证器
    Fail,
    /// 测量值未被设置
    Unset,
    /// 多维测量仅部分被设置
    PartiallySet,
}

impl Default for MeasurementOutcome {
    fn default() -> Self {
        MeasurementOutcome::Unset
    }
}

impl Display for MeasurementOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MeasurementOutcome::Pass => "PASS",
            MeasurementOutcome::Fail => "FAIL",
            MeasurementOutcome::Unset => "UNSET",
            MeasurementOutcome::PartiallySet => "PARTIALLY_SET",
        };
        write!(f, "{}", s)
    }
}

/// 日志级别枚举
/// 与框架日志记录中的级别字段对应
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        };
        write!(f, "{}", s)
    }
}

/// 报告类型枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportType {
    /// 固定格式中文文本报告
    Text,
    /// 多工作表Excel工作簿
    Excel,
}

impl Display for ReportType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ReportType::Text => "Text",
            ReportType::Excel => "Excel",
        };
        write!(f, "{}", s)
    }
}

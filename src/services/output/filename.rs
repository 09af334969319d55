//! 报告文件名模式
//!
//! 输出回调在构造时接收一个文件名模式，每条记录渲染出具体路径。
//! 支持的占位符：`{dut_id}`、`{station_id}`、`{start_time_millis}`、
//! `{end_time_millis}`、`{outcome}`、`{metadata[键名]}`。

use std::path::PathBuf;

use crate::models::TestRecord;
use crate::utils::error::{AppError, AppResult};

/// 元数据键缺失时的占位文本
const UNKNOWN_FIELD: &str = "unknown";

/// 报告文件名模式
#[derive(Debug, Clone)]
pub struct FilenamePattern {
    pattern: String,
}

impl FilenamePattern {
    /// 创建文件名模式，校验扩展名
    ///
    /// # 参数
    /// * `pattern` - 文件名模式字符串
    /// * `required_ext` - 必需的扩展名（含点，例如 ".txt"）
    pub fn new(pattern: impl Into<String>, required_ext: &str) -> AppResult<Self> {
        let pattern = pattern.into();
        if !pattern.ends_with(required_ext) {
            return Err(AppError::validation_error(format!(
                "无效的文件名模式 {:?}: 必须以 {} 结尾",
                pattern, required_ext
            )));
        }
        Ok(Self { pattern })
    }

    /// 模式原文
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// 按测试记录渲染出具体文件路径
    pub fn render(&self, record: &TestRecord) -> AppResult<PathBuf> {
        let mut rendered = String::with_capacity(self.pattern.len());
        let mut chars = self.pattern.chars();

        while let Some(c) = chars.next() {
            if c != '{' {
                rendered.push(c);
                continue;
            }

            // 收集到匹配的 '}' 为止
            let mut token = String::new();
            let mut closed = false;
            for inner in chars.by_ref() {
                if inner == '}' {
                    closed = true;
                    break;
                }
                token.push(inner);
            }
            if !closed {
                return Err(AppError::validation_error(format!(
                    "文件名模式中存在未闭合的占位符: {:?}",
                    self.pattern
                )));
            }

            rendered.push_str(&self.expand_token(&token, record)?);
        }

        Ok(PathBuf::from(rendered))
    }

    /// 展开单个占位符token
    fn expand_token(&self, token: &str, record: &TestRecord) -> AppResult<String> {
        if let Some(key) = token
            .strip_prefix("metadata[")
            .and_then(|rest| rest.strip_suffix(']'))
        {
            return Ok(record
                .metadata_str(key)
                .unwrap_or_else(|| UNKNOWN_FIELD.to_string()));
        }

        match token {
            "dut_id" => Ok(record.dut_id.clone()),
            "station_id" => Ok(record.station_id.clone()),
            "start_time_millis" => Ok(record.start_time_millis.to_string()),
            "end_time_millis" => Ok(record.end_time_millis.to_string()),
            "outcome" => Ok(record.outcome.to_string()),
            other => Err(AppError::validation_error(format!(
                "文件名模式中存在未知占位符: {{{}}}",
                other
            ))),
        }
    }
}

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// 提供给 serde 的默认文本报告文件名模式
fn default_text_pattern() -> String {
    "{dut_id}_{metadata[test_name]}_{start_time_millis}.txt".to_string()
}

/// 提供给 serde 的默认Excel报告文件名模式
fn default_excel_pattern() -> String {
    "{dut_id}_{metadata[test_name]}_{start_time_millis}.xlsx".to_string()
}

/// 提供给 serde 的默认跳过DUT标识列表
fn default_skip_dut_ids() -> Vec<String> {
    vec![
        "exit".to_string(),
        "quit".to_string(),
        "EXIT".to_string(),
        "QUIT".to_string(),
    ]
}

fn default_true() -> bool {
    true
}

/// 报告输出配置结构
/// 包含两种报告输出回调运行所需的全部配置信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// 报告输出目录
    pub output_dir: PathBuf,
    /// 文本报告文件名模式（必须以 .txt 结尾）
    #[serde(default = "default_text_pattern")]
    pub text_filename_pattern: String,
    /// Excel报告文件名模式（必须以 .xlsx 结尾）
    #[serde(default = "default_excel_pattern")]
    pub excel_filename_pattern: String,
    /// Excel报告是否将附件展开为额外工作表
    #[serde(default = "default_true")]
    pub inline_attachments: bool,
    /// 文本报告是否将附件落盘为旁路文件
    #[serde(default)]
    pub dump_attachments: bool,
    /// 跳过写报告的DUT标识（如 "exit"、"quit"）
    #[serde(default = "default_skip_dut_ids")]
    pub skip_dut_ids: Vec<String>,
    /// 机架号及穴位号标签覆盖值，未设置时取 主机名_MAC地址
    #[serde(default)]
    pub station_label: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("reports"),
            text_filename_pattern: default_text_pattern(),
            excel_filename_pattern: default_excel_pattern(),
            inline_attachments: true,
            dump_attachments: false,
            skip_dut_ids: default_skip_dut_ids(),
            station_label: None,
        }
    }
}

/// 配置管理器
/// 负责配置文件的加载、保存与默认值生成
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// 创建配置管理器
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// 加载配置；文件不存在时写出默认配置并返回之
    pub fn load_or_create(&self) -> AppResult<ReportConfig> {
        if self.config_path.exists() {
            self.load()
        } else {
            let config = ReportConfig::default();
            self.save(&config)?;
            log::info!("配置文件不存在，已生成默认配置: {:?}", self.config_path);
            Ok(config)
        }
    }

    /// 从JSON文件加载配置
    pub fn load(&self) -> AppResult<ReportConfig> {
        let content = std::fs::read_to_string(&self.config_path).map_err(|e| {
            AppError::configuration_error(format!(
                "读取配置文件失败 {:?}: {}",
                self.config_path, e
            ))
        })?;
        let config: ReportConfig = serde_json::from_str(&content).map_err(|e| {
            AppError::configuration_error(format!("解析配置文件失败: {}", e))
        })?;
        Ok(config)
    }

    /// 保存配置到JSON文件
    pub fn save(&self, config: &ReportConfig) -> AppResult<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::io_error("创建配置目录失败".to_string(), e.to_string())
                })?;
            }
        }
        let json = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.config_path, json)?;
        Ok(())
    }

    /// 配置文件路径
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

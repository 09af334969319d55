//! 固定格式中文文本报告输出回调
//!
//! 将一条完成的测试记录逐段写成人读的文本报告：
//! 主机与程序信息、工厂字段、起止时间、逐阶段的测量明细与附件清单、
//! 被测设备标识与整体结果。DUT标识命中跳过哨兵时不产生文件。

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::models::{
    Measurement, PhaseRecord, ReportArtifact, ReportType, TestRecord,
};
use crate::services::output::filename::FilenamePattern;
use crate::services::output::limits::limits_from_validators;
use crate::services::output::system_info;
use crate::services::traits::{default_skip_dut_ids, IReportWriter};
use crate::utils::config::ReportConfig;
use crate::utils::error::{AppError, AppResult};
use crate::utils::time_utils::{duration_seconds_label, format_report_time};

/// 大分隔线（35个等号）
const LONG_BREAK: &str = "===================================";
/// 段落分隔线（31个等号）
const SECTION_BREAK: &str = "===============================";
/// 阶段分隔线（15个等号）
const PHASE_BREAK: &str = "===============";

/// 元数据缺失时程序名称/版本的占位文本
const UNKNOWN_FIELD: &str = "unknown";
/// 配置文件字段未提供时的占位文本
const NOT_IMPLEMENTED: &str = "Not Implemented";

/// 文本报告输出回调
pub struct TextReportWriter {
    pattern: FilenamePattern,
    skip_dut_ids: Vec<String>,
    dump_attachments: bool,
    station_label: Option<String>,
}

impl TextReportWriter {
    /// 创建文本报告输出回调；模式必须以 ".txt" 结尾
    ///
    /// 模式示例：`"{dut_id}_{metadata[test_name]}_{start_time_millis}.txt"`
    pub fn new(filename_pattern: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            pattern: FilenamePattern::new(filename_pattern, ".txt")?,
            skip_dut_ids: default_skip_dut_ids(),
            dump_attachments: false,
            station_label: None,
        })
    }

    /// 按报告配置创建，文件名模式拼接在输出目录之下
    pub fn from_config(config: &ReportConfig) -> AppResult<Self> {
        let pattern = config
            .output_dir
            .join(&config.text_filename_pattern)
            .to_string_lossy()
            .to_string();
        let mut writer = Self::new(pattern)?;
        writer.skip_dut_ids = config.skip_dut_ids.clone();
        writer.dump_attachments = config.dump_attachments;
        writer.station_label = config.station_label.clone();
        Ok(writer)
    }

    /// 覆盖跳过哨兵列表
    pub fn with_skip_dut_ids(mut self, skip_dut_ids: Vec<String>) -> Self {
        self.skip_dut_ids = skip_dut_ids;
        self
    }

    /// 开启附件落盘（在报告旁生成附件目录）
    pub fn with_dump_attachments(mut self, dump: bool) -> Self {
        self.dump_attachments = dump;
        self
    }

    /// 覆盖机架号及穴位号标签
    pub fn with_station_label(mut self, label: impl Into<String>) -> Self {
        self.station_label = Some(label.into());
        self
    }

    fn station_label_text(&self) -> String {
        self.station_label
            .clone()
            .unwrap_or_else(|| system_info::station_label().to_string())
    }

    /// 单条测量项的报告行
    fn measurement_line(measurement: &Measurement) -> String {
        let mut line = format!("  {}: {}", measurement.name, measurement.render_value());
        if let Some(units) = &measurement.units {
            line.push_str(&format!(" {}", units));
        }

        let limits = limits_from_validators(&measurement.validators);
        if !limits.is_empty() {
            let low = limits
                .low
                .map(|v| v.to_string())
                .unwrap_or_else(|| "无".to_string());
            let high = limits
                .high
                .map(|v| v.to_string())
                .unwrap_or_else(|| "无".to_string());
            line.push_str(&format!(" [下限: {} 上限: {}]", low, high));
        }

        line.push_str(&format!(" - {}", measurement.outcome));
        line
    }

    /// 写出单个测试阶段
    fn write_phase<W: Write>(&self, report: &mut W, phase: &PhaseRecord) -> AppResult<()> {
        writeln!(
            report,
            "测试阶段：{}（{}，{}）",
            phase.name,
            phase.outcome,
            duration_seconds_label(phase.duration_millis())
        )?;

        for measurement in &phase.measurements {
            writeln!(report, "{}", Self::measurement_line(measurement))?;
        }

        for attachment in &phase.attachments {
            writeln!(
                report,
                "  附件：{} ({} 字节)",
                attachment.name,
                attachment.data.len()
            )?;
        }

        writeln!(report, "{}", PHASE_BREAK)?;
        Ok(())
    }

    /// 写出完整报告内容
    fn write_report_content<W: Write>(&self, record: &TestRecord, report: &mut W) -> AppResult<()> {
        writeln!(report, "{}", SECTION_BREAK)?;

        // 主机与程序信息
        writeln!(report, "操作系统版本：{}", system_info::os_version())?;
        writeln!(report, "用户名称：{}", system_info::login_user())?;
        writeln!(
            report,
            "程序名称：{}",
            record
                .metadata_str("test_name")
                .unwrap_or_else(|| UNKNOWN_FIELD.to_string())
        )?;
        writeln!(
            report,
            "程序版本：{}",
            record
                .metadata_str("test_version")
                .unwrap_or_else(|| UNKNOWN_FIELD.to_string())
        )?;
        writeln!(
            report,
            "配置文件: {}",
            record
                .metadata_str("config_file")
                .unwrap_or_else(|| NOT_IMPLEMENTED.to_string())
        )?;
        writeln!(
            report,
            "配置文件校验: {}",
            record
                .metadata_str("config_file_digest")
                .unwrap_or_else(|| NOT_IMPLEMENTED.to_string())
        )?;

        writeln!(report, "{}", SECTION_BREAK)?;

        // 工厂产线字段，未设置时留空
        writeln!(
            report,
            "程序设置的批次号：{}",
            record.metadata_str("batch_number").unwrap_or_default()
        )?;
        writeln!(
            report,
            "程序设置的机型名：{}",
            record.metadata_str("model_name").unwrap_or_default()
        )?;
        writeln!(
            report,
            "程序设置的组件号：{}",
            record.metadata_str("component_number").unwrap_or_default()
        )?;
        writeln!(
            report,
            "程序设置的工站名：{}",
            record.metadata_str("station_name").unwrap_or_default()
        )?;
        writeln!(report, "机架号及穴位号：{}", self.station_label_text())?;

        writeln!(report, "{}", LONG_BREAK)?;

        // 起止时间与总时长
        let start_time = format_report_time(record.start_time_millis);
        writeln!(report, "开始测试时间: {}", start_time)?;
        writeln!(
            report,
            "结束测试时间: {}",
            format_report_time(record.end_time_millis)
        )?;
        writeln!(
            report,
            "总的测试时间: {}",
            duration_seconds_label(record.duration_millis())
        )?;

        writeln!(report, "{}", LONG_BREAK)?;
        writeln!(report)?;
        writeln!(report, "{}", LONG_BREAK)?;

        writeln!(report, "{}", start_time)?;
        writeln!(report)?;
        writeln!(report, "Test Start !")?;
        writeln!(report, "{}", PHASE_BREAK)?;

        for phase in &record.phases {
            self.write_phase(report, phase)?;
        }

        writeln!(report, "{}", record.dut_id)?;
        writeln!(report, "测试结果：{}", record.outcome)?;

        Ok(())
    }

    /// 将附件落盘为报告旁的附加产物
    fn dump_attachments_to(&self, record: &TestRecord, report_path: &Path) -> AppResult<()> {
        if !record.phases.iter().any(|p| !p.attachments.is_empty()) {
            return Ok(());
        }

        let stem = report_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .ok_or_else(|| {
                AppError::report_generation_error("报告路径缺少文件名，无法生成附件目录")
            })?;
        let dir = report_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(format!("{}_attachments", stem));
        std::fs::create_dir_all(&dir)
            .map_err(|e| AppError::io_error("创建附件目录失败".to_string(), e.to_string()))?;

        let mut used_names: HashSet<String> = HashSet::new();
        for (_, attachment) in record.all_attachments() {
            let mut name = attachment.name.clone();
            let mut counter = 2;
            while !used_names.insert(name.clone()) {
                name = format!("{}_{}", counter, attachment.name);
                counter += 1;
            }
            std::fs::write(dir.join(&name), &attachment.data)?;
        }

        log::info!("📎 [REPORT] 附件已落盘到 {}", dir.display());
        Ok(())
    }
}

impl IReportWriter for TextReportWriter {
    fn report_type(&self) -> ReportType {
        ReportType::Text
    }

    fn write_report(&self, record: &TestRecord) -> AppResult<Option<ReportArtifact>> {
        if record.is_skip_sentinel(&self.skip_dut_ids) {
            log::debug!("DUT标识 {:?} 命中跳过哨兵，不生成文本报告", record.dut_id);
            return Ok(None);
        }

        let file_path: PathBuf = self.pattern.render(record)?;
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::io_error("创建报告目录失败".to_string(), e.to_string())
                })?;
            }
        }

        let file = std::fs::File::create(&file_path)?;
        let mut report = std::io::BufWriter::new(file);
        self.write_report_content(record, &mut report)?;
        report.flush()?;

        if self.dump_attachments {
            self.dump_attachments_to(record, &file_path)?;
        }

        let file_size = std::fs::metadata(&file_path)?.len();
        log::info!("📄 [REPORT] 文本报告已保存到 {}", file_path.display());
        Ok(Some(ReportArtifact::for_file(
            ReportType::Text,
            file_path,
            file_size,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mocks::test_data_generator::TestDataGenerator;
    use tempfile::tempdir;

    /// 测试分隔线宽度与原始报告格式一致
    #[test]
    fn test_break_widths() {
        assert_eq!(LONG_BREAK.len(), 35);
        assert_eq!(SECTION_BREAK.len(), 31);
        assert_eq!(PHASE_BREAK.len(), 15);
    }

    /// 测试哨兵DUT不产生文件
    #[test]
    fn test_skip_sentinel_writes_nothing() {
        let dir = tempdir().unwrap();
        let pattern = dir.path().join("{dut_id}.txt");
        let writer = TextReportWriter::new(pattern.to_string_lossy()).unwrap();

        let mut record = TestDataGenerator::generate_test_record();
        record.dut_id = "exit".to_string();

        let artifact = writer.write_report(&record).unwrap();
        assert!(artifact.is_none());
        assert!(!dir.path().join("exit.txt").exists());
    }

    /// 测试完整报告的内容与字段顺序
    #[test]
    fn test_full_report_content() {
        let dir = tempdir().unwrap();
        let pattern = dir.path().join("{dut_id}_{metadata[test_name]}.txt");
        let writer = TextReportWriter::new(pattern.to_string_lossy())
            .unwrap()
            .with_station_label("RACK01_AA-BB-CC-DD-EE-FF");

        let record = TestDataGenerator::generate_test_record();
        let artifact = writer.write_report(&record).unwrap().unwrap();
        assert!(artifact.file_size > 0);

        let content = std::fs::read_to_string(&artifact.file_path).unwrap();

        // 头部字段
        assert!(content.contains("操作系统版本："));
        assert!(content.contains("用户名称："));
        assert!(content.contains("程序名称：Factory_Example_Report"));
        assert!(content.contains("程序版本：1.2.3"));
        assert!(content.contains("机架号及穴位号：RACK01_AA-BB-CC-DD-EE-FF"));

        // 时间与分隔线
        assert!(content.contains("开始测试时间: "));
        assert!(content.contains("总的测试时间: "));
        assert!(content.contains(LONG_BREAK));
        assert!(content.contains("Test Start !"));

        // 测量明细（含限值与结果）
        assert!(content.contains("test_pass: 11 [下限: 10 上限: 20] - PASS"));
        assert!(content.contains("test_fail: 22 [下限: 10 上限: 20] - FAIL"));
        assert!(content.contains("test_low_lim_only: 12 [下限: 10 上限: 无] - PASS"));
        assert!(content.contains("test_string: hello world - PASS"));

        // 附件清单与尾部
        assert!(content.contains("附件：example_data.csv"));
        assert!(content.ends_with("测试结果：FAIL\n"));

        // 字段顺序：头部在时间之前，时间在阶段之前
        let pos_os = content.find("操作系统版本").unwrap();
        let pos_start = content.find("开始测试时间").unwrap();
        let pos_phase = content.find("测试阶段").unwrap();
        assert!(pos_os < pos_start && pos_start < pos_phase);
    }

    /// 测试附件落盘开关
    #[test]
    fn test_dump_attachments() {
        let dir = tempdir().unwrap();
        let pattern = dir.path().join("{dut_id}.txt");
        let writer = TextReportWriter::new(pattern.to_string_lossy())
            .unwrap()
            .with_dump_attachments(true);

        let record = TestDataGenerator::generate_test_record();
        writer.write_report(&record).unwrap().unwrap();

        let attachments_dir = dir.path().join(format!("{}_attachments", record.dut_id));
        assert!(attachments_dir.join("example_data.csv").exists());
        assert!(attachments_dir.join("example_image.png").exists());
    }

    /// 测试非txt模式被拒绝
    #[test]
    fn test_rejects_wrong_extension() {
        assert!(TextReportWriter::new("report.xlsx").is_err());
    }
}

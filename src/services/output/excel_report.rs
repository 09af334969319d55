//! 多工作表Excel报告输出回调
//!
//! "Test Record" 工作表承载记录头信息与测量明细表并带PASS/FAIL条件格式；
//! CSV附件展开为独立数据表、PNG附件展开为图像表；"Test Logs" 工作表
//! 承载框架日志。单个附件损坏只记日志跳过，不影响整本工作簿。

use std::collections::HashSet;
use std::path::PathBuf;

use rust_xlsxwriter::{
    Color, ConditionalFormatCell, ConditionalFormatCellRule, Format, FormatAlign, Image, Workbook,
    Worksheet,
};
use serde_json::Value;

use crate::models::{Attachment, ReportArtifact, ReportType, TestRecord};
use crate::services::output::filename::FilenamePattern;
use crate::services::output::limits::limits_from_validators;
use crate::services::traits::{default_skip_dut_ids, IReportWriter};
use crate::utils::config::ReportConfig;
use crate::utils::error::{AppError, AppResult};
use crate::utils::time_utils::format_report_time;

/// 记录工作表名称
const TEST_RECORD_SHEET: &str = "Test Record";
/// 日志工作表名称
const TEST_LOGS_SHEET: &str = "Test Logs";

/// 测量明细表起始行（记录头占0~1行，空一行）
const MEASUREMENT_TABLE_ROW: u32 = 3;

/// 条件格式覆盖范围，对应 A1:Z1000
const COND_LAST_ROW: u32 = 999;
const COND_LAST_COL: u16 = 25;

/// Excel工作表名的最大长度
const MAX_SHEET_NAME_LEN: usize = 31;

/// 记录工作表列宽
const RECORD_COLUMN_WIDTHS: [f64; 7] = [30.0, 20.0, 20.0, 20.0, 20.0, 20.0, 20.0];
/// 日志工作表列宽
const LOG_COLUMN_WIDTHS: [f64; 7] = [10.0, 30.0, 30.0, 10.0, 20.0, 20.0, 100.0];
/// 日志工作表表头字段
const LOG_FIELDS: [&str; 7] = [
    "level",
    "logger_name",
    "source",
    "lineno",
    "timestamp_millis",
    "millis_since_test_start",
    "message",
];

/// 将附件名清洗为合法的Excel工作表名
fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            other => other,
        })
        .take(MAX_SHEET_NAME_LEN)
        .collect();
    if cleaned.is_empty() {
        "attachment".to_string()
    } else {
        cleaned
    }
}

/// Excel报告输出回调
pub struct ExcelReportWriter {
    pattern: FilenamePattern,
    inline_attachments: bool,
    skip_dut_ids: Vec<String>,
}

impl ExcelReportWriter {
    /// 创建Excel报告输出回调；模式必须以 ".xlsx" 结尾
    ///
    /// 模式示例：`"{dut_id}_{metadata[test_name]}_{start_time_millis}.xlsx"`
    pub fn new(filename_pattern: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            pattern: FilenamePattern::new(filename_pattern, ".xlsx")?,
            inline_attachments: true,
            skip_dut_ids: default_skip_dut_ids(),
        })
    }

    /// 按报告配置创建，文件名模式拼接在输出目录之下
    pub fn from_config(config: &ReportConfig) -> AppResult<Self> {
        let pattern = config
            .output_dir
            .join(&config.excel_filename_pattern)
            .to_string_lossy()
            .to_string();
        let mut writer = Self::new(pattern)?;
        writer.inline_attachments = config.inline_attachments;
        writer.skip_dut_ids = config.skip_dut_ids.clone();
        Ok(writer)
    }

    /// 是否将附件展开为额外工作表
    pub fn with_inline_attachments(mut self, inline: bool) -> Self {
        self.inline_attachments = inline;
        self
    }

    /// 覆盖跳过哨兵列表
    pub fn with_skip_dut_ids(mut self, skip_dut_ids: Vec<String>) -> Self {
        self.skip_dut_ids = skip_dut_ids;
        self
    }

    /// 写出记录工作表：头信息 + 测量明细表 + 条件格式
    fn write_record_sheet(&self, record: &TestRecord, sheet: &mut Worksheet) -> AppResult<()> {
        let cell_fmt = Format::new().set_align(FormatAlign::Left);

        let test_name = record
            .metadata_str("test_name")
            .unwrap_or_else(|| "Unset".to_string());
        let test_version = record
            .metadata_str("test_version")
            .unwrap_or_else(|| "Unset".to_string());

        // 记录头：第0行标签、第1行取值
        let header_labels = [
            "Test Name",
            "Test Station",
            "Software Version",
            "DUT ID",
            "Start Time",
            "Start Time (ms)",
            "Test Result",
        ];
        for (col, label) in header_labels.iter().enumerate() {
            sheet.write_string(0, col as u16, *label)?;
        }
        sheet.write_string(1, 0, &test_name)?;
        sheet.write_string(1, 1, &record.station_id)?;
        sheet.write_string(1, 2, &test_version)?;
        sheet.write_string(1, 3, &record.dut_id)?;
        sheet.write_string(1, 4, format_report_time(record.start_time_millis))?;
        sheet.write_number(1, 5, record.start_time_millis as f64)?;
        sheet.write_string(1, 6, record.outcome.to_string())?;

        // 测量明细表
        let table_headers = ["Measurement", "Value", "Low Limit", "High Limit", "Pass/Fail"];
        for (col, header) in table_headers.iter().enumerate() {
            sheet.write_string(MEASUREMENT_TABLE_ROW, col as u16, *header)?;
        }

        let mut row = MEASUREMENT_TABLE_ROW + 1;
        for (_, measurement) in record.all_measurements() {
            sheet.write_string(row, 0, &measurement.name)?;

            match &measurement.measured_value {
                Some(Value::Number(n)) => {
                    if let Some(v) = n.as_f64() {
                        sheet.write_number(row, 1, v)?;
                    }
                }
                Some(Value::String(s)) => {
                    sheet.write_string(row, 1, s)?;
                }
                Some(Value::Bool(b)) => {
                    sheet.write_string(row, 1, b.to_string())?;
                }
                _ => {}
            }

            let limits = limits_from_validators(&measurement.validators);
            if let Some(low) = limits.low {
                sheet.write_number(row, 2, low)?;
            }
            if let Some(high) = limits.high {
                sheet.write_number(row, 3, high)?;
            }

            sheet.write_string(row, 4, measurement.outcome.to_string())?;
            row += 1;
        }

        // PASS/FAIL条件格式，范围对应 A1:Z1000
        // 浅绿底深绿字 / 浅红底深红字
        let pass_format = Format::new()
            .set_background_color(Color::RGB(0xC6EFCE))
            .set_font_color(Color::RGB(0x006100));
        let fail_format = Format::new()
            .set_background_color(Color::RGB(0xFFC7CE))
            .set_font_color(Color::RGB(0x9C0006));

        let pass_cond = ConditionalFormatCell::new()
            .set_rule(ConditionalFormatCellRule::EqualTo("PASS".to_string()))
            .set_format(&pass_format);
        sheet.add_conditional_format(0, 0, COND_LAST_ROW, COND_LAST_COL, &pass_cond)?;

        let fail_cond = ConditionalFormatCell::new()
            .set_rule(ConditionalFormatCellRule::EqualTo("FAIL".to_string()))
            .set_format(&fail_format);
        sheet.add_conditional_format(0, 0, COND_LAST_ROW, COND_LAST_COL, &fail_cond)?;

        for (col, width) in RECORD_COLUMN_WIDTHS.iter().enumerate() {
            sheet.set_column_width(col as u16, *width)?;
            sheet.set_column_format(col as u16, &cell_fmt)?;
        }

        Ok(())
    }

    /// 解析CSV附件的全部行；任何一行损坏都放弃整个附件
    fn parse_csv_rows(attachment: &Attachment) -> AppResult<Vec<csv::StringRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(attachment.data.as_slice());
        let mut rows = Vec::new();
        for result in reader.records() {
            rows.push(result?);
        }
        Ok(rows)
    }

    /// 将CSV行转写为数据工作表
    fn write_csv_sheet(&self, rows: &[csv::StringRecord], sheet: &mut Worksheet) -> AppResult<()> {
        let cell_fmt = Format::new().set_align(FormatAlign::Left);

        for (row_idx, row) in rows.iter().enumerate() {
            for (col_idx, field) in row.iter().enumerate() {
                // 数值单元格按数字写入，其余按文本
                if let Ok(number) = field.trim().parse::<f64>() {
                    sheet.write_number(row_idx as u32, col_idx as u16, number)?;
                } else {
                    sheet.write_string(row_idx as u32, col_idx as u16, field)?;
                }
            }
        }

        for col in 0..=10u16 {
            sheet.set_column_width(col, 15)?;
            sheet.set_column_format(col, &cell_fmt)?;
        }
        Ok(())
    }

    /// 将附件展开为额外工作表；单个附件失败只记日志
    fn write_attachment_sheets(&self, record: &TestRecord, workbook: &mut Workbook) {
        let mut used_names: HashSet<String> = HashSet::new();
        used_names.insert(TEST_RECORD_SHEET.to_string());
        used_names.insert(TEST_LOGS_SHEET.to_string());

        for (phase, attachment) in record.all_attachments() {
            let base_name = if attachment.is_csv() {
                attachment
                    .name
                    .strip_suffix(".csv")
                    .unwrap_or(&attachment.name)
            } else if attachment.is_png() {
                attachment.name.as_str()
            } else {
                // 其他类型的附件不展开
                continue;
            };

            let mut sheet_name = sanitize_sheet_name(base_name);
            let mut counter = 2;
            while !used_names.insert(sheet_name.clone()) {
                let truncated = sanitize_sheet_name(base_name)
                    .chars()
                    .take(MAX_SHEET_NAME_LEN - 3)
                    .collect::<String>();
                sheet_name = format!("{}_{}", truncated, counter);
                counter += 1;
            }

            let outcome = if attachment.is_csv() {
                self.add_csv_sheet(workbook, &sheet_name, attachment)
            } else {
                self.add_image_sheet(workbook, &sheet_name, attachment)
            };

            if let Err(e) = outcome {
                log::warn!(
                    "阶段 {:?} 的附件 {:?} 展开失败，已跳过: {}",
                    phase.name,
                    attachment.name,
                    e
                );
            }
        }
    }

    fn add_csv_sheet(
        &self,
        workbook: &mut Workbook,
        sheet_name: &str,
        attachment: &Attachment,
    ) -> AppResult<()> {
        // 先完整解析，确保损坏的附件不会留下残缺工作表
        let rows = Self::parse_csv_rows(attachment)?;
        let sheet = workbook.add_worksheet().set_name(sheet_name)?;
        self.write_csv_sheet(&rows, sheet)
    }

    fn add_image_sheet(
        &self,
        workbook: &mut Workbook,
        sheet_name: &str,
        attachment: &Attachment,
    ) -> AppResult<()> {
        // 先解码图像，确保损坏的附件不会留下空工作表
        let image = Image::new_from_buffer(&attachment.data)?;
        let sheet = workbook.add_worksheet().set_name(sheet_name)?;
        sheet.insert_image(0, 0, &image)?;
        Ok(())
    }

    /// 写出日志工作表
    fn write_logs_sheet(&self, record: &TestRecord, sheet: &mut Worksheet) -> AppResult<()> {
        let cell_fmt = Format::new().set_align(FormatAlign::Left);

        for (col, field) in LOG_FIELDS.iter().enumerate() {
            sheet.write_string(0, col as u16, *field)?;
        }

        for (idx, log_record) in record.log_records.iter().enumerate() {
            let row = (idx + 1) as u32;
            sheet.write_string(row, 0, log_record.level.to_string())?;
            sheet.write_string(row, 1, &log_record.logger_name)?;
            sheet.write_string(row, 2, &log_record.source)?;
            sheet.write_number(row, 3, log_record.lineno as f64)?;
            sheet.write_number(row, 4, log_record.timestamp_millis as f64)?;
            sheet.write_number(
                row,
                5,
                (log_record.timestamp_millis - record.start_time_millis) as f64,
            )?;
            sheet.write_string(row, 6, &log_record.message)?;
        }

        for (col, width) in LOG_COLUMN_WIDTHS.iter().enumerate() {
            sheet.set_column_width(col as u16, *width)?;
            sheet.set_column_format(col as u16, &cell_fmt)?;
        }
        Ok(())
    }

    /// 构建整本工作簿
    fn write_sheets(&self, record: &TestRecord, workbook: &mut Workbook) -> AppResult<()> {
        {
            let record_sheet = workbook.add_worksheet().set_name(TEST_RECORD_SHEET)?;
            self.write_record_sheet(record, record_sheet)?;
        }

        if self.inline_attachments {
            self.write_attachment_sheets(record, workbook);
        }

        let logs_sheet = workbook.add_worksheet().set_name(TEST_LOGS_SHEET)?;
        self.write_logs_sheet(record, logs_sheet)?;
        Ok(())
    }
}

impl IReportWriter for ExcelReportWriter {
    fn report_type(&self) -> ReportType {
        ReportType::Excel
    }

    fn write_report(&self, record: &TestRecord) -> AppResult<Option<ReportArtifact>> {
        if record.is_skip_sentinel(&self.skip_dut_ids) {
            log::debug!("DUT标识 {:?} 命中跳过哨兵，不生成Excel报告", record.dut_id);
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

        let mut workbook = Workbook::new();
        self.write_sheets(record, &mut workbook)?;
        workbook
            .save(&file_path)
            .map_err(|e| AppError::excel_error(format!("保存Excel文件失败: {}", e)))?;

        let file_size = std::fs::metadata(&file_path)?.len();
        log::info!("📤 [REPORT] Excel报告已保存到 {}", file_path.display());
        Ok(Some(ReportArtifact::for_file(
            ReportType::Excel,
            file_path,
            file_size,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Attachment;
    use crate::services::mocks::test_data_generator::TestDataGenerator;
    use calamine::{open_workbook, Reader, Xlsx};
    use tempfile::tempdir;

    /// 测试工作表名清洗
    #[test]
    fn test_sanitize_sheet_name() {
        assert_eq!(sanitize_sheet_name("example_data"), "example_data");
        assert_eq!(sanitize_sheet_name("a/b:c*d"), "a_b_c_d");
        assert_eq!(sanitize_sheet_name(""), "attachment");

        let long = "x".repeat(40);
        assert_eq!(sanitize_sheet_name(&long).len(), 31);
    }

    /// 测试哨兵DUT不产生文件
    #[test]
    fn test_skip_sentinel_writes_nothing() {
        let dir = tempdir().unwrap();
        let pattern = dir.path().join("{dut_id}.xlsx");
        let writer = ExcelReportWriter::new(pattern.to_string_lossy()).unwrap();

        let mut record = TestDataGenerator::generate_test_record();
        record.dut_id = "QUIT".to_string();

        let artifact = writer.write_report(&record).unwrap();
        assert!(artifact.is_none());
        assert!(!dir.path().join("QUIT.xlsx").exists());
    }

    /// 测试完整工作簿的结构与内容回读
    #[test]
    fn test_full_workbook_roundtrip() {
        let dir = tempdir().unwrap();
        let pattern = dir.path().join("{dut_id}_{metadata[test_name]}.xlsx");
        let writer = ExcelReportWriter::new(pattern.to_string_lossy()).unwrap();

        let record = TestDataGenerator::generate_test_record();
        let artifact = writer.write_report(&record).unwrap().unwrap();
        assert!(artifact.file_size > 0);

        let mut workbook: Xlsx<_> = open_workbook(&artifact.file_path).unwrap();
        let sheet_names = workbook.sheet_names().to_owned();
        assert!(sheet_names.contains(&"Test Record".to_string()));
        assert!(sheet_names.contains(&"Test Logs".to_string()));
        assert!(sheet_names.contains(&"example_data".to_string()));
        assert!(sheet_names.contains(&"example_image.png".to_string()));

        // 记录工作表：头信息与测量明细
        let range = workbook
            .worksheet_range("Test Record")
            .expect("存在记录工作表")
            .unwrap();
        assert_eq!(
            range.get_value((0, 0)).and_then(|v| v.get_string()),
            Some("Test Name")
        );
        assert_eq!(
            range.get_value((1, 0)).and_then(|v| v.get_string()),
            Some("Factory_Example_Report")
        );
        assert_eq!(
            range.get_value((1, 3)).and_then(|v| v.get_string()),
            Some("DUT001")
        );
        assert_eq!(
            range.get_value((1, 6)).and_then(|v| v.get_string()),
            Some("FAIL")
        );

        assert_eq!(
            range.get_value((3, 0)).and_then(|v| v.get_string()),
            Some("Measurement")
        );
        assert_eq!(
            range.get_value((4, 0)).and_then(|v| v.get_string()),
            Some("test_pass")
        );
        assert_eq!(range.get_value((4, 1)).and_then(|v| v.get_float()), Some(11.0));
        assert_eq!(range.get_value((4, 2)).and_then(|v| v.get_float()), Some(10.0));
        assert_eq!(range.get_value((4, 3)).and_then(|v| v.get_float()), Some(20.0));
        assert_eq!(
            range.get_value((4, 4)).and_then(|v| v.get_string()),
            Some("PASS")
        );
        assert_eq!(
            range.get_value((5, 4)).and_then(|v| v.get_string()),
            Some("FAIL")
        );

        // CSV附件工作表：首行为CSV表头，数据行为数值
        let csv_range = workbook
            .worksheet_range("example_data")
            .expect("存在CSV附件工作表")
            .unwrap();
        assert_eq!(
            csv_range.get_value((0, 0)).and_then(|v| v.get_string()),
            Some("month")
        );
        assert_eq!(
            csv_range.get_value((1, 0)).and_then(|v| v.get_float()),
            Some(1.0)
        );

        // 日志工作表：表头与派生的相对时间列
        let logs_range = workbook
            .worksheet_range("Test Logs")
            .expect("存在日志工作表")
            .unwrap();
        assert_eq!(
            logs_range.get_value((0, 5)).and_then(|v| v.get_string()),
            Some("millis_since_test_start")
        );
        let absolute = logs_range
            .get_value((1, 4))
            .and_then(|v| v.get_float())
            .unwrap();
        let relative = logs_range
            .get_value((1, 5))
            .and_then(|v| v.get_float())
            .unwrap();
        assert_eq!(
            relative,
            absolute - record.start_time_millis as f64
        );
    }

    /// 测试损坏的PNG附件被跳过且不影响工作簿
    #[test]
    fn test_broken_image_attachment_skipped() {
        let dir = tempdir().unwrap();
        let pattern = dir.path().join("{dut_id}.xlsx");
        let writer = ExcelReportWriter::new(pattern.to_string_lossy()).unwrap();

        let mut record = TestDataGenerator::generate_test_record();
        record.phases[0].attachments.push(Attachment::new(
            "broken.png",
            vec![0x00, 0x01, 0x02],
            Some("image/png".to_string()),
        ));

        let artifact = writer.write_report(&record).unwrap().unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&artifact.file_path).unwrap();
        let sheet_names = workbook.sheet_names().to_owned();
        assert!(sheet_names.contains(&"Test Record".to_string()));
        assert!(!sheet_names.contains(&"broken.png".to_string()));
    }

    /// 测试关闭附件展开后不生成附件工作表
    #[test]
    fn test_inline_attachments_disabled() {
        let dir = tempdir().unwrap();
        let pattern = dir.path().join("{dut_id}.xlsx");
        let writer = ExcelReportWriter::new(pattern.to_string_lossy())
            .unwrap()
            .with_inline_attachments(false);

        let record = TestDataGenerator::generate_test_record();
        let artifact = writer.write_report(&record).unwrap().unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&artifact.file_path).unwrap();
        let sheet_names = workbook.sheet_names().to_owned();
        assert_eq!(sheet_names, vec!["Test Record", "Test Logs"]);
    }

    /// 测试非xlsx模式被拒绝
    #[test]
    fn test_rejects_wrong_extension() {
        assert!(ExcelReportWriter::new("report.txt").is_err());
    }
}

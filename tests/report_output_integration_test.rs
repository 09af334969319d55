//! 报告输出回调集成测试
//!
//! 独立的集成测试：用示例记录驱动两种输出回调，
//! 验证生成的文本报告内容与Excel工作簿结构。

use calamine::{open_workbook, Reader, Xlsx};
use tempfile::tempdir;

use fat_report::services::mocks::TestDataGenerator;
use fat_report::{
    run_report_writers, ExcelReportWriter, IReportWriter, ReportType, TextReportWriter,
};

#[test]
fn test_both_writers_produce_reports() {
    let dir = tempdir().unwrap();
    let text_pattern = dir
        .path()
        .join("{dut_id}_{metadata[test_name]}_{start_time_millis}.txt");
    let excel_pattern = dir
        .path()
        .join("{dut_id}_{metadata[test_name]}_{start_time_millis}.xlsx");

    let text_writer = TextReportWriter::new(text_pattern.to_string_lossy()).unwrap();
    let excel_writer = ExcelReportWriter::new(excel_pattern.to_string_lossy()).unwrap();

    let record = TestDataGenerator::generate_test_record();
    let writers: [&dyn IReportWriter; 2] = [&text_writer, &excel_writer];
    let artifacts = run_report_writers(&writers, &record);

    assert_eq!(artifacts.len(), 2, "两种回调都应产出报告");
    assert_eq!(artifacts[0].report_type, ReportType::Text);
    assert_eq!(artifacts[1].report_type, ReportType::Excel);

    // 输出文件存在且非空
    for artifact in &artifacts {
        assert!(artifact.file_path.exists(), "报告文件应存在");
        assert!(artifact.file_size > 0, "报告文件应非空");
    }

    // 文件名由记录字段渲染而来
    let text_name = artifacts[0].file_path.file_name().unwrap().to_string_lossy();
    assert_eq!(
        text_name,
        format!(
            "{}_Factory_Example_Report_{}.txt",
            record.dut_id, record.start_time_millis
        )
    );

    // 文本报告内容抽查
    let content = std::fs::read_to_string(&artifacts[0].file_path).unwrap();
    assert!(content.contains("操作系统版本："));
    assert!(content.contains("Test Start !"));
    assert!(content.contains("test_fail: 22 [下限: 10 上限: 20] - FAIL"));
    assert!(content.contains(&record.dut_id));

    // Excel工作簿结构抽查
    let mut workbook: Xlsx<_> = open_workbook(&artifacts[1].file_path).unwrap();
    let sheet_names = workbook.sheet_names().to_owned();
    assert_eq!(
        sheet_names,
        vec![
            "Test Record".to_string(),
            "example_data".to_string(),
            "example_image.png".to_string(),
            "Test Logs".to_string(),
        ]
    );

    let range = workbook
        .worksheet_range("Test Record")
        .expect("存在记录工作表")
        .unwrap();
    assert_eq!(
        range.get_value((1, 6)).and_then(|v| v.get_string()),
        Some("FAIL")
    );
    // 测量明细表含全部6个测量项
    assert_eq!(
        range.get_value((9, 0)).and_then(|v| v.get_string()),
        Some("test_string")
    );
}

#[test]
fn test_sentinel_record_skipped_by_both_writers() {
    let dir = tempdir().unwrap();
    let text_writer =
        TextReportWriter::new(dir.path().join("{dut_id}.txt").to_string_lossy()).unwrap();
    let excel_writer =
        ExcelReportWriter::new(dir.path().join("{dut_id}.xlsx").to_string_lossy()).unwrap();

    let record = TestDataGenerator::generate_test_record_with_dut("exit");
    let writers: [&dyn IReportWriter; 2] = [&text_writer, &excel_writer];
    let artifacts = run_report_writers(&writers, &record);

    assert!(artifacts.is_empty(), "哨兵DUT不应产出任何报告");
    assert_eq!(
        std::fs::read_dir(dir.path()).unwrap().count(),
        0,
        "输出目录应保持为空"
    );
}

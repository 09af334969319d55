use fat_report::services::mocks::TestDataGenerator;
use fat_report::{run_report_writers, ExcelReportWriter, IReportWriter, TextReportWriter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志
    env_logger::init();

    println!("🔥 生成示例测试报告 - 验证文本与Excel两种输出回调");

    // 构造一条带随机序列号的示例测试记录
    let dut_id = TestDataGenerator::random_serial_number();
    let record = TestDataGenerator::generate_test_record_with_dut(dut_id.clone());
    println!("📋 示例记录: DUT={} 结果={}", dut_id, record.outcome);
    println!(
        "    阶段数={} 测量项数={} 日志条数={}",
        record.phases.len(),
        record.all_measurements().count(),
        record.log_records.len()
    );

    // 两种输出回调，文件名模式与原框架示例保持一致
    let text_writer =
        TextReportWriter::new("reports/{dut_id}_{metadata[test_name]}_{start_time_millis}.txt")?
            .with_dump_attachments(true);
    let excel_writer =
        ExcelReportWriter::new("reports/{dut_id}_{metadata[test_name]}_{start_time_millis}.xlsx")?;

    let writers: [&dyn IReportWriter; 2] = [&text_writer, &excel_writer];
    let artifacts = run_report_writers(&writers, &record);

    if artifacts.is_empty() {
        eprintln!("❌ 未生成任何报告");
        return Ok(());
    }

    println!("✅ 成功生成 {} 份报告:", artifacts.len());
    for artifact in &artifacts {
        println!(
            "    [{}] {} ({} 字节)",
            artifact.report_type,
            artifact.file_path.display(),
            artifact.file_size
        );
    }

    Ok(())
}

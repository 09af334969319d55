/// FAT_REPORT 工厂测试报告输出库
///
/// 为硬件测试执行框架提供输出回调：接收一条完成的测试记录，
/// 渲染为固定格式的中文文本报告或带条件格式与附件展开的多
/// 工作表Excel工作簿。
pub mod models;
pub mod utils;
pub mod services;

// 重新导出常用类型，方便使用
pub use models::*;
pub use services::output::{ExcelReportWriter, FilenamePattern, TextReportWriter};
pub use services::traits::{default_skip_dut_ids, IReportWriter, DEFAULT_SKIP_DUT_IDS};
pub use utils::{AppError, AppResult, ConfigManager, ReportConfig};

/// 依次执行一组输出回调，单个回调失败不影响其余回调
///
/// 返回成功写出的报告产物列表；失败的回调记录错误日志后跳过。
pub fn run_report_writers(
    writers: &[&dyn IReportWriter],
    record: &TestRecord,
) -> Vec<ReportArtifact> {
    let mut artifacts = Vec::new();
    for writer in writers {
        match writer.write_report(record) {
            Ok(Some(artifact)) => artifacts.push(artifact),
            Ok(None) => {
                log::debug!("{} 报告回调跳过记录 {:?}", writer.report_type(), record.dut_id);
            }
            Err(e) => {
                log::error!("{} 报告回调执行失败: {}", writer.report_type(), e);
            }
        }
    }
    artifacts
}

use crate::models::{ReportArtifact, ReportType, TestRecord};
use crate::utils::error::AppResult;

/// 默认跳过写报告的DUT标识
/// 框架在操作员输入这些标识退出测试循环时仍会生成一条记录
pub const DEFAULT_SKIP_DUT_IDS: [&str; 4] = ["exit", "quit", "EXIT", "QUIT"];

/// 返回默认跳过列表的拥有形式
pub fn default_skip_dut_ids() -> Vec<String> {
    DEFAULT_SKIP_DUT_IDS.iter().map(|s| s.to_string()).collect()
}

/// 报告输出回调接口
///
/// 每个实现接收一条完成的测试记录并产出一个报告文件。
/// 记录的DUT标识命中跳过哨兵时返回 `Ok(None)`，不产生文件。
pub trait IReportWriter: Send + Sync {
    /// 本回调产出的报告类型
    fn report_type(&self) -> ReportType;

    /// 将测试记录渲染为报告文件
    ///
    /// # 返回
    /// * `Ok(Some(artifact))` - 报告已写出，返回产物描述
    /// * `Ok(None)` - 记录被跳过（DUT标识为哨兵值）
    fn write_report(&self, record: &TestRecord) -> AppResult<Option<ReportArtifact>>;
}

/// 测试数据生成器模块
pub mod test_data_generator;

pub use test_data_generator::TestDataGenerator;

// ==========================================
// 产线驾驶舱 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供对账引擎所需的只读数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod production_repo;
pub mod production_source;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use production_repo::SqliteProductionRepository;
pub use production_source::ProductionDataSource;

//! Aggregator 领域层基础库（aggregator-domain）
//!
//! 提供命令处理管道所依赖的领域侧抽象：
//! - 领域事件（`domain_event`）：事件载荷接口与运行时精确类型（`EventType`）
//! - 聚合（`aggregate`）、聚合根（`aggregate_root`）与聚合标识（`entity`）
//! - 工作单元（`unit_of_work`）：收集一次命令执行产生的原始事件
//! - 持久化（`persist`）：事件存储与聚合仓储协议及其内存参考实现
//!
//! 本 crate 不绑定具体存储与序列化格式，仅定义接口与最小必要的错误类型，
//! 以便在不同基础设施上进行适配实现。
//!
pub mod aggregate;
pub mod aggregate_root;
pub mod domain_event;
pub mod entity;
pub mod error;
pub mod persist;
pub mod unit_of_work;

//! 聚合（Aggregate）抽象
//!
//! 约束一个聚合的核心行为：
//! - `execute` 将命令转换为事件并记录到工作单元（不改变状态）；
//! - `apply` 将事件投影到状态（改变状态）。
//!
use crate::domain_event::Event;
use crate::entity::AggregateId;
use crate::unit_of_work::UnitOfWork;
use std::error::Error;

/// 聚合根接口
pub trait Aggregate: Default + Send + Sync + 'static {
    const TYPE: &'static str;

    /// 聚合标识类型
    type Id: AggregateId;
    /// 该聚合支持的命令类型
    type Command: Send + Sync + 'static;
    /// 命令执行环节的错误类型
    type Error: Error + Send + Sync + 'static;

    /// 执行命令，将产生的事件按顺序记录到 `uow`
    fn execute(&self, command: &Self::Command, uow: &mut UnitOfWork) -> Result<(), Self::Error>;

    /// 应用事件，更新聚合状态
    fn apply(&mut self, event: &dyn Event);
}

//! 聚合根（AggregateRoot）
//!
//! 将聚合状态与其标识、已持久化版本绑定在一起，是仓储加载与保存的单位。
//!
use crate::aggregate::Aggregate;
use crate::domain_event::Event;
use crate::unit_of_work::UnitOfWork;

/// 已加载的聚合：标识 + 已持久化版本 + 状态
#[derive(Debug)]
pub struct AggregateRoot<A>
where
    A: Aggregate,
{
    id: A::Id,
    version: usize,
    state: A,
}

impl<A> AggregateRoot<A>
where
    A: Aggregate,
{
    /// 创建一个尚未持久化过的新聚合（版本为 0）
    pub fn new(id: A::Id) -> Self {
        Self {
            id,
            version: 0,
            state: A::default(),
        }
    }

    pub fn id(&self) -> &A::Id {
        &self.id
    }

    /// 已持久化的版本，保存时作为期望版本用于乐观并发控制
    pub fn version(&self) -> usize {
        self.version
    }

    pub fn state(&self) -> &A {
        &self.state
    }

    pub fn is_new(&self) -> bool {
        self.version == 0
    }

    /// 重放一条已持久化的事件（仓储重建时使用）
    pub fn replay(&mut self, event: &dyn Event, version: usize) {
        self.state.apply(event);
        self.version = version;
    }

    /// 执行命令：
    /// 1. 由聚合将命令转换为事件并记录到 `uow`；
    /// 2. 将本次新记录的事件依次应用到内存状态。
    ///
    /// 版本号不变，直到事件被持久化后重新加载。
    pub fn execute(&mut self, command: &A::Command, uow: &mut UnitOfWork) -> Result<(), A::Error> {
        let start = uow.len();
        self.state.execute(command, uow)?;

        for event in &uow.events()[start..] {
            self.state.apply(event.as_ref());
        }

        Ok(())
    }
}

//! 工作单元（UnitOfWork）
//!
//! 收集一次命令执行期间聚合产生的原始事件，按产生顺序交还给调用方。
//!
use crate::domain_event::{Event, EventRef};
use std::sync::Arc;

/// 原始事件收集器：按 `record` 的调用顺序保存事件
#[derive(Debug, Default)]
pub struct UnitOfWork {
    events: Vec<EventRef>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一条新产生的事件
    pub fn record<E: Event>(&mut self, event: E) {
        self.events.push(Arc::new(event));
    }

    pub fn events(&self) -> &[EventRef] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// 交出已收集的事件（保持产生顺序）
    pub fn into_events(self) -> Vec<EventRef> {
        self.events
    }
}

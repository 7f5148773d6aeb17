use crate::aggregate::Aggregate;
use crate::domain_event::EventRef;
use chrono::{DateTime, Utc};
use std::fmt;

/// 事件流标识：聚合类型 + 聚合标识
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StreamId {
    aggregate_type: &'static str,
    aggregate_id: String,
}

impl StreamId {
    pub fn new(aggregate_type: &'static str, aggregate_id: impl Into<String>) -> Self {
        Self {
            aggregate_type,
            aggregate_id: aggregate_id.into(),
        }
    }

    pub fn of<A: Aggregate>(id: &A::Id) -> Self {
        Self::new(A::TYPE, id.to_string())
    }

    pub fn aggregate_type(&self) -> &'static str {
        self.aggregate_type
    }

    pub fn aggregate_id(&self) -> &str {
        &self.aggregate_id
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.aggregate_type, self.aggregate_id)
    }
}

/// 已持久化的事件：事件本体 + 流内版本 + 写入时间
#[derive(Clone, Debug)]
pub struct StoredEvent {
    version: usize,
    recorded_at: DateTime<Utc>,
    event: EventRef,
}

impl StoredEvent {
    pub fn new(version: usize, recorded_at: DateTime<Utc>, event: EventRef) -> Self {
        Self {
            version,
            recorded_at,
            event,
        }
    }

    /// 事件在流内的版本（从 1 开始）
    pub fn version(&self) -> usize {
        self.version
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn event(&self) -> &EventRef {
        &self.event
    }
}

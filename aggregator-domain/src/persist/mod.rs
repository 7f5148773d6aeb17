//! 持久化（persist）
//!
//! 定义事件存储与聚合仓储协议，以及便于测试与本地开发的参考实现：
//! - 事件流读写与乐观并发控制（`EventStore`）；
//! - 按标识加载/保存聚合（`AggregateRepository`）；
//! - 内存事件存储（`InMemoryEventStore`）与基于事件溯源的仓储（`EventSourcedRepository`）。
//!
//! 具体存储后端（如 Postgres）由上层提供实现并注入。
//!
mod aggregate_repository;
mod event_store;
mod inmemory_event_store;
mod stored_event;

pub use aggregate_repository::{AggregateRepository, EventSourcedRepository};
pub use event_store::EventStore;
pub use inmemory_event_store::InMemoryEventStore;
pub use stored_event::{StoredEvent, StreamId};

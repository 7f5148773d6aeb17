//! 聚合仓储
//!
//! 基于事件溯源的通用聚合仓储：加载时重放事件流，保存时以聚合的已持久化版本
//! 作为期望版本追加事件，并发冲突由事件存储判定。
//!
use super::event_store::EventStore;
use super::stored_event::StreamId;
use crate::aggregate::Aggregate;
use crate::aggregate_root::AggregateRoot;
use crate::domain_event::EventRef;
use crate::error::{DomainError, DomainResult as Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::trace;

#[async_trait]
pub trait AggregateRepository<A>: Send + Sync
where
    A: Aggregate,
{
    /// 按标识加载聚合；不存在时返回一个新的（版本为 0 的）聚合
    async fn load(&self, aggregate_id: &A::Id, token: &CancellationToken)
    -> Result<AggregateRoot<A>>;

    /// 持久化该聚合新产生的事件（按给定顺序）
    async fn save(
        &self,
        aggregate: &AggregateRoot<A>,
        events: &[EventRef],
        token: &CancellationToken,
    ) -> Result<()>;
}

#[async_trait]
impl<A, T> AggregateRepository<A> for Arc<T>
where
    A: Aggregate,
    T: AggregateRepository<A> + ?Sized,
{
    async fn load(
        &self,
        aggregate_id: &A::Id,
        token: &CancellationToken,
    ) -> Result<AggregateRoot<A>> {
        (**self).load(aggregate_id, token).await
    }

    async fn save(
        &self,
        aggregate: &AggregateRoot<A>,
        events: &[EventRef],
        token: &CancellationToken,
    ) -> Result<()> {
        (**self).save(aggregate, events, token).await
    }
}

/// 基于事件存储的通用聚合仓储实现
pub struct EventSourcedRepository<S> {
    event_store: Arc<S>,
}

impl<S> EventSourcedRepository<S>
where
    S: EventStore,
{
    pub fn new(event_store: Arc<S>) -> Self {
        Self { event_store }
    }

    pub fn event_store(&self) -> &Arc<S> {
        &self.event_store
    }
}

#[async_trait]
impl<A, S> AggregateRepository<A> for EventSourcedRepository<S>
where
    A: Aggregate,
    S: EventStore,
{
    async fn load(
        &self,
        aggregate_id: &A::Id,
        token: &CancellationToken,
    ) -> Result<AggregateRoot<A>> {
        let stream = StreamId::of::<A>(aggregate_id);
        let stored = self.event_store.read_stream(&stream, token).await?;

        let mut aggregate = AggregateRoot::new(aggregate_id.clone());
        for (expected, e) in (1..).zip(&stored) {
            if e.version() != expected {
                return Err(DomainError::event_store(format!(
                    "stream {stream} is not contiguous: expected version {expected}, found {}",
                    e.version()
                )));
            }
            aggregate.replay(e.event().as_ref(), e.version());
        }

        trace!(stream = %stream, version = aggregate.version(), "aggregate loaded");
        Ok(aggregate)
    }

    async fn save(
        &self,
        aggregate: &AggregateRoot<A>,
        events: &[EventRef],
        token: &CancellationToken,
    ) -> Result<()> {
        let stream = StreamId::of::<A>(aggregate.id());
        self.event_store
            .append(&stream, aggregate.version(), events, token)
            .await?;
        Ok(())
    }
}

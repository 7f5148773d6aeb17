//! 内存版事件存储（InMemoryEventStore）
//!
//! 基于 `tokio::sync::RwLock` 的轻量实现，满足 `EventStore` 协议：
//! - 追加时校验期望版本，冲突则整体拒绝；
//! - 同一流的追加互斥，不同流之间互不影响语义；
//! - 典型用途：测试环境、示例与本地开发。
//!
use super::event_store::EventStore;
use super::stored_event::{StoredEvent, StreamId};
use crate::domain_event::EventRef;
use crate::error::{DomainError, DomainResult as Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

#[derive(Default)]
pub struct InMemoryEventStore {
    streams: RwLock<HashMap<StreamId, Vec<StoredEvent>>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前流版本（流不存在时为 0）
    pub async fn stream_version(&self, stream: &StreamId) -> usize {
        self.streams
            .read()
            .await
            .get(stream)
            .map(Vec::len)
            .unwrap_or_default()
    }

    /// 所有流内事件总数
    pub async fn event_count(&self) -> usize {
        self.streams.read().await.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    #[instrument(skip(self, token), fields(stream = %stream))]
    async fn read_stream(
        &self,
        stream: &StreamId,
        token: &CancellationToken,
    ) -> Result<Vec<StoredEvent>> {
        if token.is_cancelled() {
            return Err(DomainError::Cancelled);
        }

        let streams = self.streams.read().await;
        Ok(streams.get(stream).cloned().unwrap_or_default())
    }

    #[instrument(skip(self, events, token), fields(stream = %stream, count = events.len()))]
    async fn append(
        &self,
        stream: &StreamId,
        expected_version: usize,
        events: &[EventRef],
        token: &CancellationToken,
    ) -> Result<usize> {
        if token.is_cancelled() {
            return Err(DomainError::Cancelled);
        }

        let mut streams = self.streams.write().await;
        let current = streams.get(stream).map(Vec::len).unwrap_or_default();
        if current != expected_version {
            return Err(DomainError::VersionConflict {
                stream: stream.to_string(),
                expected: expected_version,
                actual: current,
            });
        }
        if events.is_empty() {
            return Ok(current);
        }

        let recorded_at = Utc::now();
        let entries = streams.entry(stream.clone()).or_default();
        entries.extend(
            events
                .iter()
                .enumerate()
                .map(|(i, e)| StoredEvent::new(current + i + 1, recorded_at, e.clone())),
        );

        debug!(version = entries.len(), "events appended");
        Ok(entries.len())
    }
}

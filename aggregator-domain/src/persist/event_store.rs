//! 事件存储（EventStore）协议
//!
use super::stored_event::{StoredEvent, StreamId};
use crate::domain_event::EventRef;
use crate::error::DomainResult as Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// 事件存储：按流读取事件，并以期望版本追加事件
#[async_trait]
pub trait EventStore: Send + Sync {
    /// 读取整条事件流（按版本升序），流不存在时返回空列表
    async fn read_stream(
        &self,
        stream: &StreamId,
        token: &CancellationToken,
    ) -> Result<Vec<StoredEvent>>;

    /// 追加事件，返回追加后的流版本
    ///
    /// 当前流版本与 `expected_version` 不一致时返回 `DomainError::VersionConflict`，
    /// 且不写入任何事件。
    async fn append(
        &self,
        stream: &StreamId,
        expected_version: usize,
        events: &[EventRef],
        token: &CancellationToken,
    ) -> Result<usize>;
}

#[async_trait]
impl<T> EventStore for Arc<T>
where
    T: EventStore + ?Sized,
{
    async fn read_stream(
        &self,
        stream: &StreamId,
        token: &CancellationToken,
    ) -> Result<Vec<StoredEvent>> {
        (**self).read_stream(stream, token).await
    }

    async fn append(
        &self,
        stream: &StreamId,
        expected_version: usize,
        events: &[EventRef],
        token: &CancellationToken,
    ) -> Result<usize> {
        (**self).append(stream, expected_version, events, token).await
    }
}

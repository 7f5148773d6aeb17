//! 事件处理器（EventHandler）
//!
//! `EventHandler<E>` 面向应用：一个实现只处理一种具体事件类型，同一类型可以为多个
//! 事件类型分别实现。`DynEventHandler` 是分发器使用的类型擦除形态，
//! 由 `TypedEventHandler` 在注册时包装生成。
//!
use crate::error::{AppError, AppResult};
use aggregator_domain::domain_event::{Event, EventType};
use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// 事件处理器：处理某一具体类型的事件
#[async_trait]
pub trait EventHandler<E>: Send + Sync
where
    E: Event,
{
    /// 处理器名称（用于日志与错误信息）
    fn handler_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// 处理事件；取消是协作式的，如何响应 `token` 由处理器自行决定
    async fn handle(&self, event: &E, token: &CancellationToken) -> anyhow::Result<()>;
}

/// 类型擦除后的事件处理器
#[async_trait]
pub trait DynEventHandler: Send + Sync {
    fn handler_name(&self) -> &'static str;

    /// 能处理的精确事件类型
    fn event_type(&self) -> EventType;

    async fn handle_dyn(&self, event: &dyn Event, token: &CancellationToken) -> AppResult<()>;
}

/// 将 `EventHandler<E>` 包装为 `DynEventHandler`，调用时向下转型为 `E`
pub struct TypedEventHandler<E, H: ?Sized> {
    inner: Arc<H>,
    _marker: PhantomData<fn(E)>,
}

impl<E, H> TypedEventHandler<E, H>
where
    E: Event,
    H: EventHandler<E> + ?Sized,
{
    pub fn new(inner: Arc<H>) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<E, H> DynEventHandler for TypedEventHandler<E, H>
where
    E: Event,
    H: EventHandler<E> + ?Sized,
{
    fn handler_name(&self) -> &'static str {
        EventHandler::<E>::handler_name(&*self.inner)
    }

    fn event_type(&self) -> EventType {
        EventType::of::<E>()
    }

    async fn handle_dyn(&self, event: &dyn Event, token: &CancellationToken) -> AppResult<()> {
        let Some(typed) = event.downcast_ref::<E>() else {
            return Err(AppError::TypeMismatch {
                expected: std::any::type_name::<E>(),
                found: event.event_type().name(),
            });
        };

        EventHandler::<E>::handle(&*self.inner, typed, token)
            .await
            .map_err(|source| AppError::HandlerInvocation {
                handler: EventHandler::<E>::handler_name(&*self.inner),
                event_type: std::any::type_name::<E>(),
                source,
            })
    }
}

//! 事件分发器（EventDispatcher）
//!
//! 对一批已持久化的事件，按每条事件的精确运行时类型解析并调用处理器：
//! 1. 空批次直接返回，不创建作用域；
//! 2. 否则为整次调用创建且仅创建一个作用域；
//! 3. 每个出现过的事件类型只从作用域解析一次（不做父类型回退）；
//! 4. 按批次顺序对每条事件调用其类型的全部处理器，每个（处理器, 事件）组合恰好一次；
//! 5. 无论成功或失败，作用域都在返回前释放；处理器错误原样向上传播。
//!
use crate::error::{AppError, AppResult};
use crate::event_handler::DynEventHandler;
use crate::service_scope::{ServiceScope, ServiceScopeFactory};
use aggregator_domain::domain_event::{EventRef, EventType};
use async_trait::async_trait;
use futures_util::{TryStreamExt, stream};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace, warn};

/// 事件分发器：命令处理器在事件持久化之后调用
#[async_trait]
pub trait EventDispatcher: Send + Sync {
    async fn dispatch(&self, events: &[EventRef], token: &CancellationToken) -> AppResult<()>;
}

#[async_trait]
impl<T> EventDispatcher for Arc<T>
where
    T: EventDispatcher + ?Sized,
{
    async fn dispatch(&self, events: &[EventRef], token: &CancellationToken) -> AppResult<()> {
        (**self).dispatch(events, token).await
    }
}

/// 分发器配置
#[derive(Clone, Copy, Debug)]
pub struct EventDispatcherConfig {
    /// 同时处理中的事件数上限；单条事件的多个处理器始终依次执行。
    /// 为 1 时严格按批次顺序逐条处理。
    pub handler_concurrency: usize,
}

impl Default for EventDispatcherConfig {
    fn default() -> Self {
        Self {
            handler_concurrency: 1,
        }
    }
}

type ResolvedHandlers = HashMap<EventType, Vec<Arc<dyn DynEventHandler>>>;

/// 基于解析作用域的事件分发器
pub struct ScopedEventDispatcher {
    scope_factory: Arc<dyn ServiceScopeFactory>,
    config: EventDispatcherConfig,
}

impl ScopedEventDispatcher {
    pub fn new(scope_factory: Arc<dyn ServiceScopeFactory>) -> Self {
        Self {
            scope_factory,
            config: EventDispatcherConfig::default(),
        }
    }

    /// 校验依赖后创建；缺少作用域工厂时立即失败
    pub fn try_new(scope_factory: Option<Arc<dyn ServiceScopeFactory>>) -> AppResult<Self> {
        scope_factory
            .map(Self::new)
            .ok_or(AppError::MissingDependency {
                parameter: "scope_factory",
            })
    }

    pub fn with_config(mut self, config: EventDispatcherConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EventDispatcherConfig {
        &self.config
    }

    fn resolve_handlers(scope: &dyn ServiceScope, events: &[EventRef]) -> AppResult<ResolvedHandlers> {
        let mut resolved = ResolvedHandlers::new();

        for event in events {
            if let Entry::Vacant(slot) = resolved.entry(event.event_type()) {
                let event_type = *slot.key();
                let handlers = scope.event_handlers(event_type)?;
                debug!(event_type = %event_type, handlers = handlers.len(), "event handlers resolved");
                slot.insert(handlers);
            }
        }

        Ok(resolved)
    }

    async fn invoke_handlers(
        &self,
        resolved: &ResolvedHandlers,
        events: &[EventRef],
        token: &CancellationToken,
    ) -> AppResult<()> {
        let limit = self.config.handler_concurrency.max(1);

        stream::iter(events.iter().map(Ok::<_, AppError>))
            .try_for_each_concurrent(limit, |event| async move {
                let event_type = event.event_type();
                let Some(handlers) = resolved.get(&event_type) else {
                    return Ok(());
                };

                for handler in handlers {
                    trace!(event_type = %event_type, handler = handler.handler_name(), "invoking event handler");
                    handler.handle_dyn(event.as_ref(), token).await?;
                }
                Ok(())
            })
            .await
    }
}

#[async_trait]
impl EventDispatcher for ScopedEventDispatcher {
    #[instrument(name = "event.dispatch", skip_all, fields(count = events.len()))]
    async fn dispatch(&self, events: &[EventRef], token: &CancellationToken) -> AppResult<()> {
        if events.is_empty() {
            trace!("empty batch, nothing to dispatch");
            return Ok(());
        }

        let scope = self.scope_factory.create_scope();

        let result = match Self::resolve_handlers(scope.as_ref(), events) {
            Ok(resolved) => self.invoke_handlers(&resolved, events, token).await,
            Err(e) => Err(e),
        };

        // 作用域在结果返回之前释放
        drop(scope);

        if let Err(e) = &result {
            warn!(error = %e, "event dispatch failed");
        }
        result
    }
}

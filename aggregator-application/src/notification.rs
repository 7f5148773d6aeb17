//! 命令处理扩展点（NotificationHandlers）
//!
//! `CommandProcessor` 在固定位置调用的两个可选回调：
//! - `prepare_context`：上下文创建后、聚合被触及前调用一次，用于写入关联ID、执行者等；
//! - `enrich_event`：工作单元交出事件后、持久化与分发前，对每条事件按产生顺序调用一次，
//!   返回值替换原事件（例如附加元数据后的副本）。
//!
//! 回调在构造时注入，之后不可变；未注册时分别退化为空操作与恒等变换。
//!
use crate::context::HandlingContext;
use aggregator_domain::domain_event::EventRef;
use std::fmt;
use std::sync::Arc;

type PrepareContextFn<C> = Arc<dyn Fn(&C, &mut HandlingContext) -> anyhow::Result<()> + Send + Sync>;

type EnrichEventFn<C> =
    Arc<dyn Fn(EventRef, &C, &HandlingContext) -> anyhow::Result<EventRef> + Send + Sync>;

pub struct NotificationHandlers<C> {
    prepare_context: Option<PrepareContextFn<C>>,
    enrich_event: Option<EnrichEventFn<C>>,
}

impl<C> NotificationHandlers<C> {
    /// 未注册任何回调
    pub fn new() -> Self {
        Self {
            prepare_context: None,
            enrich_event: None,
        }
    }

    pub fn with_prepare_context<F>(mut self, f: F) -> Self
    where
        F: Fn(&C, &mut HandlingContext) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.prepare_context = Some(Arc::new(f));
        self
    }

    pub fn with_enrich_event<F>(mut self, f: F) -> Self
    where
        F: Fn(EventRef, &C, &HandlingContext) -> anyhow::Result<EventRef> + Send + Sync + 'static,
    {
        self.enrich_event = Some(Arc::new(f));
        self
    }

    pub fn has_prepare_context(&self) -> bool {
        self.prepare_context.is_some()
    }

    pub fn has_enrich_event(&self) -> bool {
        self.enrich_event.is_some()
    }

    /// 上下文创建后立即调用；未注册时不做任何事
    pub fn on_prepare_context(
        &self,
        command: &C,
        context: &mut HandlingContext,
    ) -> anyhow::Result<()> {
        match &self.prepare_context {
            Some(f) => f(command, context),
            None => Ok(()),
        }
    }

    /// 持久化与分发前对单条事件调用；未注册时原样返回
    pub fn on_enrich_event(
        &self,
        event: EventRef,
        command: &C,
        context: &HandlingContext,
    ) -> anyhow::Result<EventRef> {
        match &self.enrich_event {
            Some(f) => f(event, command, context),
            None => Ok(event),
        }
    }
}

impl<C> Default for NotificationHandlers<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for NotificationHandlers<C> {
    fn clone(&self) -> Self {
        Self {
            prepare_context: self.prepare_context.clone(),
            enrich_event: self.enrich_event.clone(),
        }
    }
}

impl<C> fmt::Debug for NotificationHandlers<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationHandlers")
            .field("prepare_context", &self.has_prepare_context())
            .field("enrich_event", &self.has_enrich_event())
            .finish()
    }
}

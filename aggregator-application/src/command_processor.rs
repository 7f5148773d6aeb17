//! 命令处理器（CommandProcessor）
//!
//! 编排一次“命令 → 事件”的完整流程，步骤严格按以下顺序执行：
//! 1. 创建新的 `HandlingContext`；
//! 2. 调用 `prepare_context` 扩展点；
//! 3. 由命令解析聚合标识，并通过仓储加载聚合；
//! 4. 对聚合执行命令，由工作单元收集原始事件；
//! 5. 按产生顺序逐条调用 `enrich_event` 扩展点；
//! 6. 通过仓储持久化全部事件（完成后才进入下一步）；
//! 7. 将事件交给 `EventDispatcher` 分发。
//!
//! 任一步骤失败即中止后续步骤，本层不做补偿回滚。每一步开始前检查取消令牌，
//! 并将令牌传入仓储与分发器。
//!
use crate::command::Command;
use crate::context::HandlingContext;
use crate::error::{AppError, AppResult, Hook};
use crate::event_dispatcher::EventDispatcher;
use crate::notification::NotificationHandlers;
use aggregator_domain::aggregate::Aggregate;
use aggregator_domain::domain_event::EventRef;
use aggregator_domain::persist::AggregateRepository;
use aggregator_domain::unit_of_work::UnitOfWork;
use bon::Builder;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace, warn};

/// 面向应用层的命令处理器
///
/// - `A`：目标聚合类型，其命令类型需实现 `Command` 且标识类型与聚合一致
#[derive(Builder)]
pub struct CommandProcessor<A>
where
    A: Aggregate,
{
    repository: Arc<dyn AggregateRepository<A>>,
    event_dispatcher: Arc<dyn EventDispatcher>,
    #[builder(default)]
    notification_handlers: NotificationHandlers<A::Command>,
}

impl<A> CommandProcessor<A>
where
    A: Aggregate,
    A::Command: Command<Id = A::Id>,
{
    pub fn notification_handlers(&self) -> &NotificationHandlers<A::Command> {
        &self.notification_handlers
    }

    /// 处理一条命令，返回已持久化并分发的事件（按产生顺序）
    #[instrument(
        name = "command.process",
        skip_all,
        fields(
            command = <A::Command as Command>::NAME,
            aggregate_type = A::TYPE,
            aggregate_id = %command.aggregate_id()
        )
    )]
    pub async fn process(
        &self,
        command: A::Command,
        token: &CancellationToken,
    ) -> AppResult<Vec<EventRef>> {
        ensure_active(token)?;
        let mut context = HandlingContext::new();

        self.notification_handlers
            .on_prepare_context(&command, &mut context)
            .map_err(|source| hook_failed(Hook::PrepareContext, source))?;
        trace!(context = ?context, "context prepared");

        ensure_active(token)?;
        let mut aggregate = self.repository.load(command.aggregate_id(), token).await?;
        trace!(version = aggregate.version(), "aggregate loaded");

        ensure_active(token)?;
        let mut uow = UnitOfWork::new();
        aggregate
            .execute(&command, &mut uow)
            .map_err(|e| AppError::CommandRejected {
                command: <A::Command as Command>::NAME,
                source: Box::new(e),
            })?;
        let raw = uow.into_events();
        debug!(count = raw.len(), "command executed");

        ensure_active(token)?;
        // 全部事件完成增强之后才允许持久化
        let mut events = Vec::with_capacity(raw.len());
        for event in raw {
            let enriched = self
                .notification_handlers
                .on_enrich_event(event, &command, &context)
                .map_err(|source| hook_failed(Hook::EnrichEvent, source))?;
            events.push(enriched);
        }

        ensure_active(token)?;
        self.repository.save(&aggregate, &events, token).await?;
        debug!(count = events.len(), "events persisted");

        ensure_active(token)?;
        self.event_dispatcher.dispatch(&events, token).await?;

        Ok(events)
    }
}

fn ensure_active(token: &CancellationToken) -> AppResult<()> {
    if token.is_cancelled() {
        return Err(AppError::Cancelled);
    }
    Ok(())
}

fn hook_failed(hook: Hook, source: anyhow::Error) -> AppError {
    warn!(%hook, error = %source, "notification hook failed");
    AppError::HookInvocation { hook, source }
}

//! 解析作用域（ServiceScope）协议
//!
//! 分发器每次调用创建一个作用域，从中按“精确事件类型”解析处理器集合；
//! 作用域在 drop 时释放，且只释放一次。容器本身的实现不属于本 crate 的职责，
//! `InMemoryServiceProvider` 仅作为参考实现。
//!
use crate::error::AppResult;
use crate::event_handler::DynEventHandler;
use aggregator_domain::domain_event::EventType;
use std::sync::Arc;

/// 解析作用域：生命周期覆盖一次分发调用
pub trait ServiceScope: Send + Sync {
    /// 解析为 `event_type` 注册的全部处理器；未注册时返回空集合
    fn event_handlers(&self, event_type: EventType) -> AppResult<Vec<Arc<dyn DynEventHandler>>>;
}

/// 作用域工厂
pub trait ServiceScopeFactory: Send + Sync {
    fn create_scope(&self) -> Box<dyn ServiceScope>;
}

impl<T> ServiceScopeFactory for Arc<T>
where
    T: ServiceScopeFactory + ?Sized,
{
    fn create_scope(&self) -> Box<dyn ServiceScope> {
        (**self).create_scope()
    }
}

use crate::error::AppResult;
use crate::event_handler::{DynEventHandler, EventHandler, TypedEventHandler};
use crate::service_scope::{ServiceScope, ServiceScopeFactory};
use aggregator_domain::domain_event::{Event, EventType};
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

type HandlerFactory = Arc<dyn Fn() -> Arc<dyn DynEventHandler> + Send + Sync>;

#[derive(Clone)]
enum Registration {
    /// 所有作用域共享同一实例
    Shared(Arc<dyn DynEventHandler>),
    /// 每个作用域各自创建一次
    Scoped(HandlerFactory),
}

/// 基于内存的处理器容器
/// - 通过 `EventType`（TypeId）注册不同事件对应的处理器
/// - 作为 `ServiceScopeFactory` 为每次分发创建独立作用域
#[derive(Clone, Default)]
pub struct InMemoryServiceProvider {
    registrations: Arc<DashMap<EventType, Vec<Registration>>>,
    next_scope_id: Arc<AtomicU64>,
}

impl InMemoryServiceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册共享实例的事件处理器
    pub fn register_handler<E, H>(&self, handler: Arc<H>)
    where
        E: Event,
        H: EventHandler<E> + 'static,
    {
        let erased: Arc<dyn DynEventHandler> = Arc::new(TypedEventHandler::<E, H>::new(handler));
        self.registrations
            .entry(EventType::of::<E>())
            .or_default()
            .push(Registration::Shared(erased));
    }

    /// 注册作用域内单例的事件处理器：每个作用域首次解析时调用 `factory` 创建
    pub fn register_scoped_handler<E, H, F>(&self, factory: F)
    where
        E: Event,
        H: EventHandler<E> + 'static,
        F: Fn() -> H + Send + Sync + 'static,
    {
        let factory: HandlerFactory = Arc::new(move || {
            Arc::new(TypedEventHandler::<E, H>::new(Arc::new(factory()))) as Arc<dyn DynEventHandler>
        });
        self.registrations
            .entry(EventType::of::<E>())
            .or_default()
            .push(Registration::Scoped(factory));
    }

    /// 某事件类型已注册的处理器数量
    pub fn handler_count(&self, event_type: EventType) -> usize {
        self.registrations
            .get(&event_type)
            .map(|r| r.len())
            .unwrap_or_default()
    }
}

impl ServiceScopeFactory for InMemoryServiceProvider {
    fn create_scope(&self) -> Box<dyn ServiceScope> {
        let id = self.next_scope_id.fetch_add(1, Ordering::Relaxed);
        trace!(scope = id, "service scope created");
        Box::new(InMemoryServiceScope {
            id,
            registrations: self.registrations.clone(),
            instances: DashMap::new(),
        })
    }
}

struct InMemoryServiceScope {
    id: u64,
    registrations: Arc<DashMap<EventType, Vec<Registration>>>,
    instances: DashMap<EventType, Vec<Arc<dyn DynEventHandler>>>,
}

impl InMemoryServiceScope {
    fn instantiate(&self, event_type: EventType) -> Vec<Arc<dyn DynEventHandler>> {
        let registrations = self
            .registrations
            .get(&event_type)
            .map(|r| r.value().clone())
            .unwrap_or_default();

        registrations
            .into_iter()
            .map(|r| match r {
                Registration::Shared(h) => h,
                Registration::Scoped(factory) => factory(),
            })
            .collect()
    }
}

impl ServiceScope for InMemoryServiceScope {
    fn event_handlers(&self, event_type: EventType) -> AppResult<Vec<Arc<dyn DynEventHandler>>> {
        if let Some(cached) = self.instances.get(&event_type) {
            return Ok(cached.value().clone());
        }

        // 同一作用域内并发解析时，工厂只在持有该槽位写锁的线程中调用一次
        let handlers = self
            .instances
            .entry(event_type)
            .or_insert_with(|| self.instantiate(event_type))
            .value()
            .clone();
        Ok(handlers)
    }
}

impl Drop for InMemoryServiceScope {
    fn drop(&mut self) {
        trace!(scope = self.id, "service scope released");
    }
}

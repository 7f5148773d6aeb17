use super::event_type::EventType;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 以 `Arc` 共享的事件引用，管道各阶段之间传递的统一形态
pub type EventRef = Arc<dyn Event>;

/// 将具体类型擦除为 `&dyn Any`，对所有 `'static` 的 Sized 类型自动实现
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;

    fn type_name(&self) -> &'static str;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// 领域事件载荷需要满足的能力边界
///
/// 事件的“运行时类型”即实现该 trait 的具体类型，分发时严格按该类型匹配处理器，
/// 不做父类型或变体回退。
///
/// ```rust
/// use aggregator_domain::domain_event::{Event, EventRef, EventType};
/// use std::sync::Arc;
///
/// #[derive(Debug)]
/// struct Deposited {
///     amount: u64,
/// }
///
/// impl Event for Deposited {}
///
/// let event: EventRef = Arc::new(Deposited { amount: 10 });
/// assert_eq!(event.event_type(), EventType::of::<Deposited>());
/// assert_eq!(event.downcast_ref::<Deposited>().map(|e| e.amount), Some(10));
/// ```
pub trait Event: AsAny + fmt::Debug + Send + Sync {}

impl dyn Event {
    /// 事件的精确运行时类型
    pub fn event_type(&self) -> EventType {
        EventType::from_parts(Any::type_id(self.as_any()), self.type_name())
    }

    pub fn is<E: Event>(&self) -> bool {
        self.as_any().is::<E>()
    }

    pub fn downcast_ref<E: Event>(&self) -> Option<&E> {
        self.as_any().downcast_ref::<E>()
    }
}

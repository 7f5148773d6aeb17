use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

/// 上下文键：名称 + 值类型
///
/// 槽位由“名称 + 值类型”共同确定：同名不同类型的键互不覆盖，
/// 以错误的类型读取会得到 `None`。
pub struct ContextKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ContextKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: 'static> ContextKey<T> {
    fn slot(&self) -> Slot {
        (self.name, TypeId::of::<T>())
    }
}

impl<T> Clone for ContextKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ContextKey<T> {}

impl<T> fmt::Debug for ContextKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContextKey").field(&self.name).finish()
    }
}

/// 命令处理上下文（Handling Context）
///
/// 承载一次命令处理调用所需的横切信息，例如关联追踪 `correlation_id`、
/// 因果链 `causation_id`、执行者 `actor_id` 等。
///
/// - 每次 `CommandProcessor::process` 调用新建一个实例，调用结束即释放；
/// - 以引用形式贯穿管道各步骤，并传入 `prepare_context` / `enrich_event` 扩展点；
/// - 不在并发调用之间共享。
///
/// 典型用法：
/// ```rust
/// use aggregator_application::context::{ContextKey, HandlingContext};
///
/// const TENANT: ContextKey<u32> = ContextKey::new("tenant");
///
/// let mut ctx = HandlingContext::new();
/// ctx.set(HandlingContext::CORRELATION_ID, "cor-123".to_string());
/// ctx.set(TENANT, 7);
///
/// assert_eq!(ctx.correlation_id(), Some("cor-123"));
/// assert_eq!(ctx.get(TENANT), Some(&7));
/// ```
type Slot = (&'static str, TypeId);

#[derive(Default)]
pub struct HandlingContext {
    values: HashMap<Slot, Box<dyn Any + Send + Sync>>,
}

impl HandlingContext {
    /// 关联ID
    pub const CORRELATION_ID: ContextKey<String> = ContextKey::new("correlation_id");
    /// 因果ID
    pub const CAUSATION_ID: ContextKey<String> = ContextKey::new("causation_id");
    /// 触发命令的主体ID
    pub const ACTOR_ID: ContextKey<String> = ContextKey::new("actor_id");

    pub fn new() -> Self {
        Self::default()
    }

    /// 写入值，返回同键同类型的旧值
    pub fn set<T>(&mut self, key: ContextKey<T>, value: T) -> Option<T>
    where
        T: Any + Send + Sync,
    {
        self.values
            .insert(key.slot(), Box::new(value))
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    pub fn get<T>(&self, key: ContextKey<T>) -> Option<&T>
    where
        T: Any + Send + Sync,
    {
        self.values.get(&key.slot())?.downcast_ref::<T>()
    }

    pub fn get_mut<T>(&mut self, key: ContextKey<T>) -> Option<&mut T>
    where
        T: Any + Send + Sync,
    {
        self.values.get_mut(&key.slot())?.downcast_mut::<T>()
    }

    pub fn contains<T>(&self, key: ContextKey<T>) -> bool
    where
        T: Any + Send + Sync,
    {
        self.get(key).is_some()
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.get(Self::CORRELATION_ID).map(String::as_str)
    }

    pub fn causation_id(&self) -> Option<&str> {
        self.get(Self::CAUSATION_ID).map(String::as_str)
    }

    pub fn actor_id(&self) -> Option<&str> {
        self.get(Self::ACTOR_ID).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.values.keys().map(|(name, _)| *name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for HandlingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("HandlingContext")
            .field("keys", &keys)
            .finish()
    }
}

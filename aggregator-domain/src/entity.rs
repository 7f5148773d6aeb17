//! 聚合标识（AggregateId）
//!
//! 管道内用于路由与按标识查找聚合的类型约束。只要求可比较、可哈希、可显示，
//! 这是编译期的结构约束，而不是运行时检查。
//!
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// 聚合标识类型需要满足的能力边界
pub trait AggregateId: Eq + Hash + Clone + Display + Debug + Send + Sync + 'static {}

impl<T> AggregateId for T where T: Eq + Hash + Clone + Display + Debug + Send + Sync + 'static {}

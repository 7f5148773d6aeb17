//! 领域事件（Domain Event）
//!
//! 定义事件载荷需要实现的最小接口（`Event`），以及在运行时按“精确类型”
//! 识别事件所需的 `EventType`。事件在管道中以 `EventRef`（`Arc<dyn Event>`）
//! 的形式流转，入库后不可变。

mod domain_event_trait;
mod event_type;

pub use domain_event_trait::{AsAny, Event, EventRef};
pub use event_type::EventType;

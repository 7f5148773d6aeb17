pub mod command;
pub mod command_processor;
pub mod context;
pub mod error;
pub mod event_dispatcher;
pub mod event_handler;
pub mod inmemory_service_provider;
pub mod notification;
pub mod service_scope;

pub use command::Command;
pub use command_processor::CommandProcessor;
pub use context::{ContextKey, HandlingContext};
pub use error::{AppError, AppResult, Hook};
pub use event_dispatcher::{EventDispatcher, EventDispatcherConfig, ScopedEventDispatcher};
pub use event_handler::{DynEventHandler, EventHandler, TypedEventHandler};
pub use inmemory_service_provider::InMemoryServiceProvider;
pub use notification::NotificationHandlers;
pub use service_scope::{ServiceScope, ServiceScopeFactory};

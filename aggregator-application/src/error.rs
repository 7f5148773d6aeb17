use aggregator_domain::error::DomainError;
use std::error::Error as StdError;
use std::fmt;

/// 管道中可被挂载的扩展点
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hook {
    PrepareContext,
    EnrichEvent,
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hook::PrepareContext => f.write_str("prepare_context"),
            Hook::EnrichEvent => f.write_str("enrich_event"),
        }
    }
}

#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("domain: {0}")]
    Domain(#[from] DomainError),

    #[error("missing dependency: {parameter}")]
    MissingDependency { parameter: &'static str },

    #[error("hook failed: hook={hook}, reason={source}")]
    HookInvocation {
        hook: Hook,
        #[source]
        source: anyhow::Error,
    },

    #[error("command rejected: command={command}, reason={source}")]
    CommandRejected {
        command: &'static str,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("event handler failed: handler={handler}, event={event_type}, reason={source}")]
    HandlerInvocation {
        handler: &'static str,
        event_type: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("handler resolution failed: event={event_type}, reason={reason}")]
    Resolution {
        event_type: &'static str,
        reason: String,
    },

    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("operation cancelled")]
    Cancelled,
}

pub type AppResult<T> = Result<T, AppError>;

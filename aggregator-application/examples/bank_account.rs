use aggregator_application::{
    Command, CommandProcessor, EventDispatcherConfig, EventHandler, HandlingContext,
    InMemoryServiceProvider, NotificationHandlers, ScopedEventDispatcher,
};
use aggregator_domain::aggregate::Aggregate;
use aggregator_domain::domain_event::{Event, EventRef};
use aggregator_domain::error::DomainError;
use aggregator_domain::persist::{EventSourcedRepository, InMemoryEventStore};
use aggregator_domain::unit_of_work::UnitOfWork;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct BankAccount {
    balance: i64,
}

#[derive(Debug)]
enum BankCommand {
    Deposit { account: String, amount: i64 },
    Withdraw { account: String, amount: i64 },
}

impl Command for BankCommand {
    const NAME: &'static str = "BankCommand";
    type Id = String;

    fn aggregate_id(&self) -> &String {
        match self {
            Self::Deposit { account, .. } | Self::Withdraw { account, .. } => account,
        }
    }
}

#[derive(Debug)]
struct Deposited {
    amount: i64,
    correlation_id: Option<String>,
}
impl Event for Deposited {}

#[derive(Debug)]
struct Withdrawn {
    amount: i64,
}
impl Event for Withdrawn {}

impl Aggregate for BankAccount {
    const TYPE: &'static str = "bank_account";
    type Id = String;
    type Command = BankCommand;
    type Error = DomainError;

    fn execute(&self, command: &BankCommand, uow: &mut UnitOfWork) -> Result<(), DomainError> {
        match command {
            BankCommand::Deposit { amount, .. } => uow.record(Deposited {
                amount: *amount,
                correlation_id: None,
            }),
            BankCommand::Withdraw { amount, .. } if *amount > self.balance => {
                return Err(DomainError::invalid_state("insufficient funds"));
            }
            BankCommand::Withdraw { amount, .. } => uow.record(Withdrawn { amount: *amount }),
        }
        Ok(())
    }

    fn apply(&mut self, event: &dyn Event) {
        if let Some(e) = event.downcast_ref::<Deposited>() {
            self.balance += e.amount;
        } else if let Some(e) = event.downcast_ref::<Withdrawn>() {
            self.balance -= e.amount;
        }
    }
}

struct AuditLog;

#[async_trait]
impl EventHandler<Deposited> for AuditLog {
    async fn handle(&self, event: &Deposited, _token: &CancellationToken) -> anyhow::Result<()> {
        println!(
            "audit: deposited {} (correlation_id={:?})",
            event.amount, event.correlation_id
        );
        Ok(())
    }
}

#[async_trait]
impl EventHandler<Withdrawn> for AuditLog {
    async fn handle(&self, event: &Withdrawn, _token: &CancellationToken) -> anyhow::Result<()> {
        println!("audit: withdrawn {}", event.amount);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let provider = InMemoryServiceProvider::new();
    let audit = Arc::new(AuditLog);
    provider.register_handler::<Deposited, _>(audit.clone());
    provider.register_handler::<Withdrawn, _>(audit);

    let dispatcher = ScopedEventDispatcher::new(Arc::new(provider)).with_config(
        EventDispatcherConfig {
            handler_concurrency: 4,
        },
    );

    let hooks = NotificationHandlers::new()
        .with_prepare_context(|_cmd: &BankCommand, ctx| {
            ctx.set(HandlingContext::CORRELATION_ID, "cor-1".to_string());
            Ok(())
        })
        .with_enrich_event(|event: EventRef, _cmd: &BankCommand, ctx| {
            match event.downcast_ref::<Deposited>() {
                Some(e) => Ok(Arc::new(Deposited {
                    amount: e.amount,
                    correlation_id: ctx.correlation_id().map(str::to_string),
                }) as EventRef),
                None => Ok(event),
            }
        });

    let store = Arc::new(InMemoryEventStore::new());
    let processor = CommandProcessor::<BankAccount>::builder()
        .repository(Arc::new(EventSourcedRepository::new(store.clone())))
        .event_dispatcher(Arc::new(dispatcher))
        .notification_handlers(hooks)
        .build();

    let token = CancellationToken::new();
    processor
        .process(
            BankCommand::Deposit {
                account: "acc-1".into(),
                amount: 100,
            },
            &token,
        )
        .await?;
    processor
        .process(
            BankCommand::Withdraw {
                account: "acc-1".into(),
                amount: 30,
            },
            &token,
        )
        .await?;

    if let Err(e) = processor
        .process(
            BankCommand::Withdraw {
                account: "acc-1".into(),
                amount: 500,
            },
            &token,
        )
        .await
    {
        println!("rejected: {e}");
    }

    println!("stored events: {}", store.event_count().await);
    Ok(())
}

use aggregator_application::{
    AppError, AppResult, DynEventHandler, EventDispatcher, EventHandler, InMemoryServiceProvider,
    ScopedEventDispatcher, ServiceScope, ServiceScopeFactory,
};
use aggregator_domain::domain_event::{Event, EventRef, EventType};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

#[derive(Debug, PartialEq)]
struct OrderPlaced {
    order_no: u32,
}
impl Event for OrderPlaced {}

#[derive(Debug, PartialEq)]
struct OrderShipped {
    order_no: u32,
}
impl Event for OrderShipped {}

#[derive(Debug)]
struct OrderArchived;
impl Event for OrderArchived {}

/// 统计作用域创建、解析与释放次数的工厂
#[derive(Default)]
struct Probe {
    created: AtomicUsize,
    dropped: AtomicUsize,
    resolved: Mutex<HashMap<&'static str, usize>>,
}

struct ProbingFactory {
    inner: InMemoryServiceProvider,
    probe: Arc<Probe>,
}

impl ServiceScopeFactory for ProbingFactory {
    fn create_scope(&self) -> Box<dyn ServiceScope> {
        self.probe.created.fetch_add(1, Ordering::SeqCst);
        Box::new(ProbingScope {
            inner: self.inner.create_scope(),
            probe: self.probe.clone(),
        })
    }
}

struct ProbingScope {
    inner: Box<dyn ServiceScope>,
    probe: Arc<Probe>,
}

impl ServiceScope for ProbingScope {
    fn event_handlers(&self, event_type: EventType) -> AppResult<Vec<Arc<dyn DynEventHandler>>> {
        *self
            .probe
            .resolved
            .lock()
            .unwrap()
            .entry(event_type.name())
            .or_default() += 1;
        self.inner.event_handlers(event_type)
    }
}

impl Drop for ProbingScope {
    fn drop(&mut self) {
        self.probe.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

/// 记录收到的订单号
#[derive(Default)]
struct Journal {
    placed: Mutex<Vec<u32>>,
    shipped: Mutex<Vec<u32>>,
}

#[async_trait]
impl EventHandler<OrderPlaced> for Journal {
    async fn handle(&self, event: &OrderPlaced, _token: &CancellationToken) -> anyhow::Result<()> {
        self.placed.lock().unwrap().push(event.order_no);
        Ok(())
    }
}

#[async_trait]
impl EventHandler<OrderShipped> for Journal {
    async fn handle(&self, event: &OrderShipped, _token: &CancellationToken) -> anyhow::Result<()> {
        if event.order_no == 0 {
            anyhow::bail!("carrier rejected order 0");
        }
        self.shipped.lock().unwrap().push(event.order_no);
        Ok(())
    }
}

struct Fixture {
    dispatcher: ScopedEventDispatcher,
    probe: Arc<Probe>,
    journal: Arc<Journal>,
}

fn fixture() -> Fixture {
    let journal = Arc::new(Journal::default());
    let provider = InMemoryServiceProvider::new();
    provider.register_handler::<OrderPlaced, _>(journal.clone());
    provider.register_handler::<OrderShipped, _>(journal.clone());

    let probe = Arc::new(Probe::default());
    let factory = Arc::new(ProbingFactory {
        inner: provider,
        probe: probe.clone(),
    });

    Fixture {
        dispatcher: ScopedEventDispatcher::new(factory),
        probe,
        journal,
    }
}

fn resolved(probe: &Probe) -> HashMap<&'static str, usize> {
    probe.resolved.lock().unwrap().clone()
}

#[tokio::test]
async fn empty_batch_creates_no_scope() {
    let f = fixture();

    f.dispatcher
        .dispatch(&[], &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(f.probe.created.load(Ordering::SeqCst), 0);
    assert_eq!(f.probe.dropped.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn single_event_resolves_only_its_own_type() {
    let f = fixture();
    let events: Vec<EventRef> = vec![Arc::new(OrderShipped { order_no: 42 })];

    f.dispatcher
        .dispatch(&events, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(f.probe.created.load(Ordering::SeqCst), 1);
    assert_eq!(f.probe.dropped.load(Ordering::SeqCst), 1);
    let resolved = resolved(&f.probe);
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[EventType::of::<OrderShipped>().name()], 1);
    assert_eq!(*f.journal.shipped.lock().unwrap(), vec![42]);
    assert!(f.journal.placed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn mixed_batch_resolves_each_type_once() {
    let f = fixture();
    let events: Vec<EventRef> = vec![
        Arc::new(OrderShipped { order_no: 7 }),
        Arc::new(OrderPlaced { order_no: 8 }),
    ];

    f.dispatcher
        .dispatch(&events, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(f.probe.created.load(Ordering::SeqCst), 1);
    assert_eq!(f.probe.dropped.load(Ordering::SeqCst), 1);
    let resolved = resolved(&f.probe);
    assert_eq!(resolved.len(), 2);
    assert_eq!(resolved[EventType::of::<OrderShipped>().name()], 1);
    assert_eq!(resolved[EventType::of::<OrderPlaced>().name()], 1);
    assert_eq!(*f.journal.shipped.lock().unwrap(), vec![7]);
    assert_eq!(*f.journal.placed.lock().unwrap(), vec![8]);
}

#[tokio::test]
async fn repeated_type_is_resolved_once_and_invoked_per_event() {
    let f = fixture();
    let events: Vec<EventRef> = vec![
        Arc::new(OrderPlaced { order_no: 1 }),
        Arc::new(OrderPlaced { order_no: 2 }),
        Arc::new(OrderPlaced { order_no: 3 }),
    ];

    f.dispatcher
        .dispatch(&events, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(resolved(&f.probe)[EventType::of::<OrderPlaced>().name()], 1);
    assert_eq!(*f.journal.placed.lock().unwrap(), vec![1, 2, 3]);
}

#[tokio::test]
async fn type_without_handlers_is_a_no_op() {
    let f = fixture();
    let events: Vec<EventRef> = vec![Arc::new(OrderArchived)];

    f.dispatcher
        .dispatch(&events, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(f.probe.created.load(Ordering::SeqCst), 1);
    assert_eq!(f.probe.dropped.load(Ordering::SeqCst), 1);
    assert!(f.journal.placed.lock().unwrap().is_empty());
    assert!(f.journal.shipped.lock().unwrap().is_empty());
}

#[tokio::test]
async fn handler_failure_propagates_and_still_releases_the_scope() {
    let f = fixture();
    let events: Vec<EventRef> = vec![
        Arc::new(OrderShipped { order_no: 0 }),
        Arc::new(OrderPlaced { order_no: 5 }),
    ];

    let err = f
        .dispatcher
        .dispatch(&events, &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        AppError::HandlerInvocation {
            event_type, source, ..
        } => {
            assert!(event_type.ends_with("OrderShipped"));
            assert_eq!(source.to_string(), "carrier rejected order 0");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(f.probe.created.load(Ordering::SeqCst), 1);
    assert_eq!(f.probe.dropped.load(Ordering::SeqCst), 1);
    // 默认顺序执行，失败后不再调用后续处理器
    assert!(f.journal.placed.lock().unwrap().is_empty());
}

/// 解析时报错的作用域
struct BrokenFactory {
    dropped: Arc<AtomicUsize>,
}

struct BrokenScope {
    dropped: Arc<AtomicUsize>,
}

impl ServiceScopeFactory for BrokenFactory {
    fn create_scope(&self) -> Box<dyn ServiceScope> {
        Box::new(BrokenScope {
            dropped: self.dropped.clone(),
        })
    }
}

impl ServiceScope for BrokenScope {
    fn event_handlers(&self, event_type: EventType) -> AppResult<Vec<Arc<dyn DynEventHandler>>> {
        Err(AppError::Resolution {
            event_type: event_type.name(),
            reason: "container disposed".into(),
        })
    }
}

impl Drop for BrokenScope {
    fn drop(&mut self) {
        self.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn resolution_failure_propagates_and_releases_the_scope() {
    let dropped = Arc::new(AtomicUsize::new(0));
    let dispatcher = ScopedEventDispatcher::new(Arc::new(BrokenFactory {
        dropped: dropped.clone(),
    }));
    let events: Vec<EventRef> = vec![Arc::new(OrderPlaced { order_no: 1 })];

    let err = dispatcher
        .dispatch(&events, &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        AppError::Resolution { reason, .. } => assert_eq!(reason, "container disposed"),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(dropped.load(Ordering::SeqCst), 1);
}

/// 保存处理器收到的取消令牌
#[derive(Default)]
struct TokenWitness {
    received: Mutex<Vec<CancellationToken>>,
}

#[async_trait]
impl EventHandler<OrderPlaced> for TokenWitness {
    async fn handle(&self, _event: &OrderPlaced, token: &CancellationToken) -> anyhow::Result<()> {
        self.received.lock().unwrap().push(token.clone());
        Ok(())
    }
}

#[tokio::test]
async fn handlers_receive_the_callers_token() {
    let witness = Arc::new(TokenWitness::default());
    let provider = InMemoryServiceProvider::new();
    provider.register_handler::<OrderPlaced, _>(witness.clone());
    let dispatcher = ScopedEventDispatcher::new(Arc::new(provider));

    let token = CancellationToken::new();
    let events: Vec<EventRef> = vec![
        Arc::new(OrderPlaced { order_no: 1 }),
        Arc::new(OrderPlaced { order_no: 2 }),
    ];
    dispatcher.dispatch(&events, &token).await.unwrap();

    let received = witness.received.lock().unwrap().clone();
    assert_eq!(received.len(), 2);
    assert!(received.iter().all(|t| !t.is_cancelled()));

    token.cancel();
    assert!(received.iter().all(CancellationToken::is_cancelled));
}

#[test]
fn dispatcher_requires_a_scope_factory() {
    match ScopedEventDispatcher::try_new(None) {
        Err(AppError::MissingDependency { parameter }) => assert_eq!(parameter, "scope_factory"),
        Err(other) => panic!("unexpected {other:?}"),
        Ok(_) => panic!("dispatcher built without a scope factory"),
    }
}

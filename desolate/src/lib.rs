//! A small actor toolkit: isolated units of state that process typed
//! messages one at a time, handles for addressing them without breaking
//! isolation, and a sentinel-terminated stream primitive whose producing
//! side is itself an actor.

mod actor;
mod addr;
mod conduit;
mod context;
mod mailbox;
mod message;
mod nozzle;
pub mod prelude;
mod runtime;
pub mod scheduler;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;
    use tokio_util::sync::CancellationToken;
    use tracing_subscriber::EnvFilter;

    use assert_matches::assert_matches;

    /// Initialize tracing for tests
    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env()
                    .add_directive("desolate=debug".parse().unwrap()),
            )
            .with_test_writer()
            .try_init();
    }

    #[derive(Debug)]
    enum CounterMessage {
        Increment,
        Deafen(u32),
        Stop,
    }

    struct Counter {
        count: usize,
        observed: Arc<AtomicUsize>,
    }

    impl Counter {
        fn new(observed: Arc<AtomicUsize>) -> Self {
            Self { count: 0, observed }
        }
    }

    #[async_trait]
    impl Actor for Counter {
        type Message = CounterMessage;

        const NAME: &'static str = "counter";

        async fn on_message(&mut self, _ctx: &mut Context<Self>, msg: CounterMessage) -> Signal {
            match msg {
                CounterMessage::Increment => {
                    self.count += 1;
                    self.observed.store(self.count, Ordering::SeqCst);
                    Signal::Running
                }
                CounterMessage::Deafen(count) => Signal::Ignoring { count },
                CounterMessage::Stop => Signal::Stopped,
            }
        }
    }

    #[tokio::test]
    async fn test_ask_completion_orders_caller() {
        init_tracing();
        let observed = Arc::new(AtomicUsize::new(0));
        let addr = spawn(Counter::new(observed.clone()));

        addr.task(CounterMessage::Increment).await.unwrap();
        // task resolves only after the handler applied the message.
        assert_eq!(observed.load(Ordering::SeqCst), 1);

        addr.task(CounterMessage::Increment).await.unwrap();
        assert_eq!(observed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_tell_preserves_single_sender_order() {
        init_tracing();

        struct Ledger {
            last: i64,
            violations: Arc<AtomicUsize>,
            seen: Arc<Mutex<Vec<i64>>>,
        }

        #[async_trait]
        impl Actor for Ledger {
            type Message = i64;

            const NAME: &'static str = "ledger";

            async fn on_message(&mut self, _ctx: &mut Context<Self>, msg: i64) -> Signal {
                if msg < self.last {
                    self.violations.fetch_add(1, Ordering::SeqCst);
                }
                self.last = msg;
                self.seen.lock().unwrap().push(msg);
                Signal::Running
            }
        }

        let violations = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let addr = spawn(Ledger {
            last: -1,
            violations: violations.clone(),
            seen: seen.clone(),
        });

        for i in 0..=3 {
            addr.tell(i);
        }
        addr.task(4).await.unwrap();

        assert_eq!(violations.load(Ordering::SeqCst), 0);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_handler_never_overlaps_itself() {
        init_tracing();

        struct Busy {
            in_flight: Arc<AtomicUsize>,
            overlaps: Arc<AtomicUsize>,
        }

        #[async_trait]
        impl Actor for Busy {
            type Message = ();

            const NAME: &'static str = "busy";

            async fn on_message(&mut self, _ctx: &mut Context<Self>, _msg: ()) -> Signal {
                if self.in_flight.fetch_add(1, Ordering::SeqCst) != 0 {
                    self.overlaps.fetch_add(1, Ordering::SeqCst);
                }
                // Open a race window mid-handler.
                scheduler::requeue().await;
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                Signal::Running
            }
        }

        let overlaps = Arc::new(AtomicUsize::new(0));
        let addr = spawn(Busy {
            in_flight: Arc::new(AtomicUsize::new(0)),
            overlaps: overlaps.clone(),
        });

        let mut callers = Vec::new();
        for _ in 0..16 {
            let addr = addr.clone();
            callers.push(tokio::spawn(async move { addr.task(()).await }));
        }
        for caller in callers {
            caller.await.unwrap().unwrap();
        }

        assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stopped_is_final() {
        init_tracing();
        let observed = Arc::new(AtomicUsize::new(0));
        let addr = spawn(Counter::new(observed.clone()));

        addr.task(CounterMessage::Increment).await.unwrap();
        addr.task(CounterMessage::Increment).await.unwrap();
        addr.task(CounterMessage::Stop).await.unwrap();

        for _ in 0..5 {
            addr.tell(CounterMessage::Increment);
        }
        assert_matches!(
            addr.task(CounterMessage::Increment).await,
            Err(SendError::MailboxClosed) | Err(SendError::AckDropped)
        );
        assert_eq!(observed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_ignoring_discards_exact_count() {
        init_tracing();
        let observed = Arc::new(AtomicUsize::new(0));
        let addr = spawn(Counter::new(observed.clone()));

        addr.task(CounterMessage::Deafen(3)).await.unwrap();
        for _ in 0..3 {
            addr.task(CounterMessage::Increment).await.unwrap();
        }
        assert_eq!(observed.load(Ordering::SeqCst), 0);

        // The deafness window has expired; the next message is handled.
        addr.task(CounterMessage::Increment).await.unwrap();
        assert_eq!(observed.load(Ordering::SeqCst), 1);
    }

    #[derive(Debug, Clone, PartialEq)]
    enum PipeOutcome {
        Value(u64),
        Cancelled,
        Panicked,
    }

    #[derive(Debug)]
    enum PipeMessage {
        KickOk,
        KickCancelled,
        KickPanicked,
        Piped(PipeOutcome),
    }

    struct Piper {
        outcome: Arc<Mutex<Option<PipeOutcome>>>,
        done: Arc<Notify>,
    }

    impl Piper {
        fn map(res: Result<u64, tokio::task::JoinError>) -> PipeMessage {
            PipeMessage::Piped(match res {
                Ok(value) => PipeOutcome::Value(value),
                Err(e) if e.is_cancelled() => PipeOutcome::Cancelled,
                Err(_) => PipeOutcome::Panicked,
            })
        }
    }

    #[async_trait]
    impl Actor for Piper {
        type Message = PipeMessage;

        const NAME: &'static str = "piper";

        async fn on_message(&mut self, ctx: &mut Context<Self>, msg: PipeMessage) -> Signal {
            match msg {
                PipeMessage::KickOk => {
                    let work = tokio::spawn(async { 21 * 2 });
                    ctx.pipe_to_self(work, Self::map);
                }
                PipeMessage::KickCancelled => {
                    let work = tokio::spawn(async {
                        tokio::time::sleep(Duration::from_secs(3600)).await;
                        0
                    });
                    work.abort();
                    ctx.pipe_to_self(work, Self::map);
                }
                PipeMessage::KickPanicked => {
                    let work = tokio::spawn(async { panic!("worker blew up") });
                    ctx.pipe_to_self(work, Self::map);
                }
                PipeMessage::Piped(outcome) => {
                    *self.outcome.lock().unwrap() = Some(outcome);
                    self.done.notify_one();
                }
            }
            Signal::Running
        }
    }

    async fn pipe_roundtrip(kick: PipeMessage) -> PipeOutcome {
        let outcome = Arc::new(Mutex::new(None));
        let done = Arc::new(Notify::new());
        let addr = spawn(Piper {
            outcome: outcome.clone(),
            done: done.clone(),
        });
        addr.task(kick).await.unwrap();
        done.notified().await;
        let outcome = outcome.lock().unwrap().take().unwrap();
        outcome
    }

    #[tokio::test]
    async fn test_pipe_to_self_delivers_success_as_message() {
        init_tracing();
        assert_eq!(
            pipe_roundtrip(PipeMessage::KickOk).await,
            PipeOutcome::Value(42)
        );
    }

    #[tokio::test]
    async fn test_pipe_to_self_delivers_cancellation_as_value() {
        init_tracing();
        assert_eq!(
            pipe_roundtrip(PipeMessage::KickCancelled).await,
            PipeOutcome::Cancelled
        );
    }

    #[tokio::test]
    async fn test_pipe_to_self_delivers_panic_as_value() {
        init_tracing();
        assert_eq!(
            pipe_roundtrip(PipeMessage::KickPanicked).await,
            PipeOutcome::Panicked
        );
    }

    #[tokio::test]
    async fn test_recipient_transforms_before_delivery() {
        init_tracing();
        let observed = Arc::new(AtomicUsize::new(0));
        let addr = spawn(Counter::new(observed.clone()));

        let recipient: Recipient<u32> = addr.recipient(|bump| {
            debug_assert!(bump > 0);
            CounterMessage::Increment
        });
        let cloned = recipient.clone();

        recipient.task(1).await.unwrap();
        cloned.task(2).await.unwrap();
        assert_eq!(observed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_actor_scoped_spawn_cancelled_on_stop() {
        init_tracing();

        #[derive(Debug)]
        enum GuardMessage {
            Watch,
            Stop,
        }

        struct Guard {
            token: Arc<Mutex<Option<CancellationToken>>>,
        }

        #[async_trait]
        impl Actor for Guard {
            type Message = GuardMessage;

            const NAME: &'static str = "guard";

            async fn on_message(&mut self, ctx: &mut Context<Self>, msg: GuardMessage) -> Signal {
                match msg {
                    GuardMessage::Watch => {
                        let token = ctx.spawn(std::future::pending());
                        *self.token.lock().unwrap() = Some(token);
                        Signal::Running
                    }
                    GuardMessage::Stop => Signal::Stopped,
                }
            }
        }

        let slot = Arc::new(Mutex::new(None));
        let addr = spawn(Guard {
            token: slot.clone(),
        });

        addr.task(GuardMessage::Watch).await.unwrap();
        let token = slot.lock().unwrap().clone().unwrap();
        assert!(!token.is_cancelled());

        addr.task(GuardMessage::Stop).await.unwrap();
        token.cancelled().await;
    }

    #[test]
    fn test_conduit_bridges_async_value() {
        init_tracing();
        let res = conduit(Duration::from_secs(1), async {
            let observed = Arc::new(AtomicUsize::new(0));
            let addr = spawn(Counter::new(observed.clone()));
            addr.task(CounterMessage::Increment).await.unwrap();
            observed.load(Ordering::SeqCst)
        });
        assert_matches!(res, Ok(1));
    }

    #[test]
    fn test_conduit_times_out() {
        init_tracing();
        let res = conduit(Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(10)).await;
        });
        assert_matches!(res, Err(ConduitError::Timeout));
    }
}

//! Single-consumer, sentinel-terminated stream backed by an actor.
//!
//! A [`Nozzle`] is not a bespoke reactive-stream type: its production side is
//! an ordinary actor ([`Current`]) whose state is "registered consumer plus
//! backlog" and whose messages are the element/sentinel alphabet. Every
//! ordering and isolation guarantee of the stream is inherited directly from
//! the actor runtime.

use std::collections::VecDeque;
use std::future::Future;

use futures::Stream;
use futures::channel::mpsc as stream_mpsc;

use crate::actor::{Actor, Signal, async_trait};
use crate::addr::Addr;
use crate::context::Context;
use crate::runtime::spawn;
use crate::scheduler;

#[cfg(test)]
#[path = "nozzle.test.rs"]
mod tests;

/// Callbacks registered by the single consumer of a [`Nozzle`].
pub struct Consumer<T> {
    on_item: Box<dyn FnMut(T) + Send>,
    on_close: Option<Box<dyn FnOnce() + Send>>,
}

impl<T> Consumer<T> {
    pub fn new(
        on_item: impl FnMut(T) + Send + 'static,
        on_close: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            on_item: Box::new(on_item),
            on_close: Some(Box::new(on_close)),
        }
    }
}

/// The message alphabet accepted by a [`Current`] actor.
pub enum Flow<T> {
    /// One element of the stream.
    Element(T),
    /// End of stream. At most one is effective; the rest are no-ops.
    Sentinel,
    /// Register the consumer. Only the first registration takes effect.
    Attach(Consumer<T>),
}

/// The actor engine behind a [`Nozzle`].
///
/// Elements received before a consumer attaches are queued; once a consumer
/// is registered the backlog drains to it in order and later elements are
/// forwarded immediately. The sentinel closes the stream: the consumer's
/// close callback runs exactly once, and the actor stops as soon as that
/// callback has actually been delivered. A sentinel that arrives before any
/// consumer leaves the actor running so a late attach still observes the
/// close.
pub struct Current<T> {
    consumer: Option<Consumer<T>>,
    backlog: VecDeque<T>,
    closed: bool,
}

impl<T> Current<T> {
    fn new() -> Self {
        Self {
            consumer: None,
            backlog: VecDeque::new(),
            closed: false,
        }
    }
}

#[async_trait]
impl<T> Actor for Current<T>
where
    T: Send + 'static,
{
    type Message = Flow<T>;

    const NAME: &'static str = "nozzle::current";

    async fn on_message(&mut self, _ctx: &mut Context<Self>, msg: Flow<T>) -> Signal {
        match msg {
            Flow::Element(element) => {
                if self.closed {
                    tracing::trace!("element dropped, stream closed");
                    return Signal::Running;
                }
                match self.consumer.as_mut() {
                    Some(consumer) => (consumer.on_item)(element),
                    None => self.backlog.push_back(element),
                }
                Signal::Running
            }
            Flow::Sentinel => {
                if self.closed {
                    return Signal::Running;
                }
                self.closed = true;
                match self.consumer.as_mut() {
                    Some(consumer) => {
                        if let Some(close) = consumer.on_close.take() {
                            close();
                        }
                        Signal::Stopped
                    }
                    // Keep running so a late consumer still observes the
                    // close notification.
                    None => Signal::Running,
                }
            }
            Flow::Attach(mut consumer) => {
                if self.consumer.is_some() {
                    tracing::warn!("consumer already attached, registration dropped");
                    return Signal::Running;
                }
                while let Some(element) = self.backlog.pop_front() {
                    (consumer.on_item)(element);
                }
                let signal = if self.closed {
                    if let Some(close) = consumer.on_close.take() {
                        close();
                    }
                    Signal::Stopped
                } else {
                    Signal::Running
                };
                self.consumer = Some(consumer);
                signal
            }
        }
    }
}

/// Emission capability handed to a [`Nozzle`] builder.
///
/// `emit` and `close` go through the backing actor's `task` path, so the
/// builder cannot outrun the stream's serialized delivery order.
pub struct Emitter<T: Send + 'static> {
    current: Addr<Current<T>>,
}

impl<T: Send + 'static> Emitter<T> {
    /// Emit one element.
    pub async fn emit(&self, element: T) {
        let _ = self.current.task(Flow::Element(element)).await;
    }

    /// Close the stream. Effective at most once; later calls are no-ops.
    pub async fn close(&self) {
        let _ = self.current.task(Flow::Sentinel).await;
    }
}

impl<T: Send + 'static> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            current: self.current.clone(),
        }
    }
}

/// A single-consumer element pipeline terminated by a sentinel.
pub struct Nozzle<T: Send + 'static> {
    current: Addr<Current<T>>,
}

impl<T: Send + 'static> Nozzle<T> {
    fn from_current(current: Addr<Current<T>>) -> Self {
        Self { current }
    }

    /// Register the consumer callbacks.
    ///
    /// `on_item` runs once per element in send order; `on_close` runs exactly
    /// once when the stream terminates, and never before the last element.
    /// Only the first registration on a nozzle takes effect.
    pub fn attach(
        &self,
        on_item: impl FnMut(T) + Send + 'static,
        on_close: impl FnOnce() + Send + 'static,
    ) {
        self.current
            .tell(Flow::Attach(Consumer::new(on_item, on_close)));
    }

    /// Consume the nozzle through the `futures` [`Stream`] interface.
    pub fn into_stream(self) -> impl Stream<Item = T> {
        let (tx, rx) = stream_mpsc::unbounded();
        let close_tx = tx.clone();
        self.attach(
            move |element| {
                let _ = tx.unbounded_send(element);
            },
            move || close_tx.close_channel(),
        );
        rx
    }

    /// A nozzle with no elements that immediately finishes.
    pub fn empty() -> Self {
        let current = spawn(Current::new());
        current.tell(Flow::Sentinel);
        Nozzle::from_current(current)
    }

    /// A nozzle with a single element that then finishes.
    pub fn single(element: T) -> Self {
        let current = spawn(Current::new());
        let driver = current.clone();
        scheduler::next_loop(async move {
            let _ = driver.task(Flow::Element(element)).await;
            let _ = driver.task(Flow::Sentinel).await;
        });
        Nozzle::from_current(current)
    }

    /// A nozzle over a finite sequence of elements that then finishes.
    pub fn of<I>(elements: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        let current = spawn(Current::new());
        let driver = current.clone();
        let elements = elements.into_iter();
        scheduler::next_loop(async move {
            for element in elements {
                if driver.task(Flow::Element(element)).await.is_err() {
                    return;
                }
            }
            let _ = driver.task(Flow::Sentinel).await;
        });
        Nozzle::from_current(current)
    }

    /// Build a nozzle from a producer procedure.
    ///
    /// The procedure runs asynchronously after construction returns and may
    /// call [`Emitter::emit`] any number of times followed by at most one
    /// effective [`Emitter::close`]. If the procedure resolves to an error
    /// the stream is closed on its behalf, so a failed producer never leaves
    /// the consumer waiting forever.
    pub fn new<F, Fut, E>(builder: F) -> Self
    where
        F: FnOnce(Emitter<T>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: std::fmt::Display + Send + 'static,
    {
        let current = spawn(Current::new());
        let emitter = Emitter {
            current: current.clone(),
        };
        let fallback = emitter.clone();
        scheduler::next_loop(async move {
            if let Err(reason) = builder(emitter).await {
                tracing::warn!(%reason, "nozzle builder failed, closing the stream");
                fallback.close().await;
            }
        });
        Nozzle::from_current(current)
    }

    /// A nozzle plus the raw address of its backing actor, for callers that
    /// drive emission manually instead of through a builder procedure.
    pub fn desolate() -> (Self, Addr<Current<T>>) {
        let current = spawn(Current::new());
        (Nozzle::from_current(current.clone()), current)
    }
}

impl<T: Send + 'static> std::fmt::Debug for Nozzle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Nozzle")
            .field("element", &std::any::type_name::<T>())
            .finish()
    }
}

use tokio::sync::mpsc;

/// Receiving half of an actor mailbox. FIFO in arrival order.
pub(crate) struct Mailbox<T> {
    rx: mpsc::UnboundedReceiver<T>,
}

impl<T> Mailbox<T> {
    pub fn new(rx: mpsc::UnboundedReceiver<T>) -> Self {
        Self { rx }
    }

    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }
}

/// Sending half of an actor mailbox.
///
/// The channel is unbounded so `send` never suspends: a sequence of sends
/// from one task enqueues in call order, which is what gives the handle
/// layer its per-sender ordering guarantee.
pub(crate) struct MailboxSender<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T> MailboxSender<T> {
    pub fn new(tx: mpsc::UnboundedSender<T>) -> Self {
        Self { tx }
    }

    pub fn send(&self, msg: T) -> Result<(), mpsc::error::SendError<T>> {
        self.tx.send(msg)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl<T> Clone for MailboxSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

pub(crate) fn unbounded<T>() -> (MailboxSender<T>, Mailbox<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (MailboxSender::new(tx), Mailbox::new(rx))
}

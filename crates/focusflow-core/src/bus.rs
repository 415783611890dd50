//! Ordered publish/subscribe registry.
//!
//! Delivery is synchronous: `publish` invokes every subscriber in
//! attachment order before returning. Subscribers that need to do slow
//! work (disk, audio) should hand the event off, e.g. through a
//! [`ChannelSubscriber`].

use tokio::sync::mpsc;

use crate::events::Event;

/// Something that reacts to published events.
pub trait Subscriber: Send {
    fn on_event(&mut self, event: &Event);
}

impl<F> Subscriber for F
where
    F: FnMut(&Event) + Send,
{
    fn on_event(&mut self, event: &Event) {
        self(event)
    }
}

/// Handle returned by [`EventBus::subscribe`], used to detach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscribers: Vec<(SubscriberId, Box<dyn Subscriber>)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<S>(&mut self, subscriber: S) -> SubscriberId
    where
        S: Subscriber + 'static,
    {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Detach a subscriber. Returns `false` if the id was not attached.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn publish(&mut self, event: Event) {
        tracing::trace!(event = event.name(), subscribers = self.subscribers.len(), "publish");
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber.on_event(&event);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

/// Forwards events into an unbounded channel so the receiving side can
/// process them on its own task.
pub struct ChannelSubscriber {
    tx: mpsc::UnboundedSender<Event>,
}

impl ChannelSubscriber {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Subscriber for ChannelSubscriber {
    fn on_event(&mut self, event: &Event) {
        if self.tx.send(event.clone()).is_err() {
            tracing::trace!(event = event.name(), "receiver dropped, event discarded");
        }
    }
}

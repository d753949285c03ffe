//! In-process publish/subscribe with named topics.
//!
//! Subscribers receive an unbounded stream. Consecutive identical values are published once,
//! and a subscriber that joins late first receives the cached latest value.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

struct TopicState<T> {
    latest: Option<T>,
    subscribers: Vec<mpsc::UnboundedSender<T>>,
    closed: bool,
}

pub struct Topic<T> {
    state: Mutex<TopicState<T>>,
}

impl<T: Clone + PartialEq> Topic<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TopicState { latest: None, subscribers: Vec::new(), closed: false }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TopicState<T>> {
        // State stays consistent across a panicking subscriber, keep serving it
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Send `value` to every subscriber. Returns `false` when it equals the latest value or the
    /// topic is closed, in which case nothing is sent.
    pub fn publish(&self, value: T) -> bool {
        Self::send(&mut self.lock(), value)
    }

    /// Like [`Topic::publish`], but only when `condition` holds. The condition is evaluated
    /// while the topic is locked, so no other publish can slip in between.
    pub fn publish_if(&self, value: T, condition: impl FnOnce() -> bool) -> bool {
        let mut state = self.lock();
        condition() && Self::send(&mut state, value)
    }

    /// Publish `value` as the final one and close the topic, only when `condition` holds.
    /// Returns whether the topic was closed.
    pub fn finish_if(&self, value: T, condition: impl FnOnce() -> bool) -> bool {
        let mut state = self.lock();
        if !condition() {
            return false;
        }
        Self::send(&mut state, value);
        state.closed = true;
        state.subscribers.clear();
        true
    }

    fn send(state: &mut TopicState<T>, value: T) -> bool {
        if state.closed || state.latest.as_ref() == Some(&value) {
            return false;
        }
        state.subscribers.retain(|tx| tx.send(value.clone()).is_ok());
        state.latest = Some(value);
        true
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.lock();
        if let Some(latest) = &state.latest {
            // Receiver is alive, this cannot fail
            let _ = tx.send(latest.clone());
        }
        if !state.closed {
            state.subscribers.push(tx);
        }
        rx
    }

    pub fn latest(&self) -> Option<T> {
        self.lock().latest.clone()
    }

    /// End every subscription after the values already sent. Later publishes are ignored.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        state.subscribers.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn subscriber_count(&self) -> usize {
        let mut state = self.lock();
        state.subscribers.retain(|tx| !tx.is_closed());
        state.subscribers.len()
    }
}

impl<T: Clone + PartialEq> Default for Topic<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Topics keyed by name, created on first use.
pub struct Dispatcher<T> {
    topics: Mutex<HashMap<String, Arc<Topic<T>>>>,
}

impl<T: Clone + PartialEq> Dispatcher<T> {
    pub fn new() -> Self {
        Self { topics: Mutex::new(HashMap::new()) }
    }

    pub fn topic(&self, name: &str) -> Arc<Topic<T>> {
        let mut topics = self.topics.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(topics.entry(name.to_string()).or_default())
    }

    pub fn publish(&self, name: &str, value: T) -> bool {
        self.topic(name).publish(value)
    }

    pub fn subscribe(&self, name: &str) -> mpsc::UnboundedReceiver<T> {
        self.topic(name).subscribe()
    }

    pub fn topic_names(&self) -> Vec<String> {
        let topics = self.topics.lock().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = topics.keys().cloned().collect();
        names.sort();
        names
    }
}

impl<T: Clone + PartialEq> Default for Dispatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_subscribe_roundtrip() {
        let topic = Topic::new();
        let mut rx = topic.subscribe();
        assert!(topic.publish(1));
        assert_eq!(rx.recv().await, Some(1));
    }

    #[tokio::test]
    async fn test_consecutive_duplicates_are_suppressed() {
        let topic = Topic::new();
        let mut rx = topic.subscribe();
        assert!(topic.publish("a"));
        assert!(!topic.publish("a"));
        assert!(topic.publish("b"));
        assert!(topic.publish("a"));

        assert_eq!(rx.recv().await, Some("a"));
        assert_eq!(rx.recv().await, Some("b"));
        assert_eq!(rx.recv().await, Some("a"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_publish_if_checks_condition() {
        let topic = Topic::new();
        let mut rx = topic.subscribe();
        assert!(!topic.publish_if(1, || false));
        assert!(topic.publish_if(2, || true));
        assert_eq!(rx.recv().await, Some(2));
        assert_eq!(topic.latest(), Some(2));
    }

    #[tokio::test]
    async fn test_finish_if_closes_only_when_condition_holds() {
        let topic = Topic::new();
        let mut rx = topic.subscribe();
        assert!(!topic.finish_if(1, || false));
        assert!(!topic.is_closed());

        assert!(topic.finish_if(2, || true));
        assert!(topic.is_closed());
        assert_eq!(rx.recv().await, Some(2));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_late_subscriber_gets_latest() {
        let topic = Topic::new();
        topic.publish(1);
        topic.publish(2);
        let mut rx = topic.subscribe();
        assert_eq!(rx.recv().await, Some(2));
        assert_eq!(topic.latest(), Some(2));
    }

    #[tokio::test]
    async fn test_close_ends_subscriptions() {
        let topic = Topic::new();
        let mut rx = topic.subscribe();
        topic.publish(1);
        topic.close();
        assert!(!topic.publish(2));

        assert_eq!(rx.recv().await, Some(1));
        assert_eq!(rx.recv().await, None);

        // Late subscribers still see the final value
        let mut late = topic.subscribe();
        assert_eq!(late.recv().await, Some(1));
        assert_eq!(late.recv().await, None);
    }

    #[test]
    fn test_dropped_receivers_are_pruned() {
        let topic: Topic<u8> = Topic::new();
        let rx = topic.subscribe();
        let _kept = topic.subscribe();
        assert_eq!(topic.subscriber_count(), 2);
        drop(rx);
        assert_eq!(topic.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn test_dispatcher_topics_are_independent() {
        let dispatcher = Dispatcher::new();
        let mut a = dispatcher.subscribe("a");
        let mut b = dispatcher.subscribe("b");
        dispatcher.publish("a", 1);
        dispatcher.publish("b", 2);

        assert_eq!(a.recv().await, Some(1));
        assert_eq!(b.recv().await, Some(2));
        assert!(a.try_recv().is_err());
        assert_eq!(dispatcher.topic_names(), vec!["a", "b"]);
        assert!(Arc::ptr_eq(&dispatcher.topic("a"), &dispatcher.topic("a")));
    }
}

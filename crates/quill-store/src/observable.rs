//! # Observable State
//!
//! Watch-channel wrappers for snapshot-style subscriptions. A subscriber
//! sees the value at subscription time, then every replacement.

use std::collections::HashMap;
use std::hash::Hash;

use parking_lot::RwLock;
use tokio::sync::watch;

/// A single observable value.
#[derive(Debug)]
pub struct ObservableCell<T> {
    sender: watch::Sender<T>,
}

impl<T: Clone> ObservableCell<T> {
    #[must_use]
    pub fn new(initial: T) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    /// Replace the value and notify subscribers.
    pub fn publish(&self, value: T) {
        // send fails only with zero receivers; the value must still be
        // stored for the next subscriber.
        self.sender.send_replace(value);
    }

    /// Subscribe; the receiver starts at the current value.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }

    /// The current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.sender.borrow().clone()
    }
}

/// A keyed family of observable values, created lazily per key.
#[derive(Debug, Default)]
pub struct ObservableMap<K, V> {
    inner: RwLock<HashMap<K, watch::Sender<V>>>,
}

impl<K, V> ObservableMap<K, V>
where
    K: Eq + Hash + Copy,
    V: Clone + Default,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Replace the value under `key` and notify its subscribers.
    pub fn publish(&self, key: K, value: V) {
        let mut inner = self.inner.write();
        match inner.get(&key) {
            Some(sender) => {
                sender.send_replace(value);
            }
            None => {
                let (sender, _) = watch::channel(value);
                inner.insert(key, sender);
            }
        }
    }

    /// Subscribe under `key`, creating the slot at its default value when
    /// nothing was published yet.
    #[must_use]
    pub fn subscribe(&self, key: K) -> watch::Receiver<V> {
        let mut inner = self.inner.write();
        inner
            .entry(key)
            .or_insert_with(|| watch::channel(V::default()).0)
            .subscribe()
    }

    /// Drop the slot under `key`; existing receivers observe closure.
    pub fn remove(&self, key: K) {
        self.inner.write().remove(&key);
    }
}

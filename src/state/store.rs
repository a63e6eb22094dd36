//! Reactive containers

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

/// A holder of a current value that notifies subscribers on change.
///
/// Cloning a `Store` yields another handle to the same container. Reads are
/// public; writes are reserved to the form engine, so callers can only change
/// state through field and form triggers.
pub struct Store<T> {
    tx: Arc<watch::Sender<T>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Store").field(&*self.tx.borrow()).finish()
    }
}

impl<T: Clone + Send + Sync + 'static> Store<T> {
    pub(crate) fn new(value: T) -> Self {
        // Receivers are handed out on demand; writes never need one alive.
        let (tx, _rx) = watch::channel(value);
        Self { tx: Arc::new(tx) }
    }

    /// Current value (cloned).
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Read the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.tx.borrow())
    }

    /// Receiver that wakes on every update after this call.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    /// Replace the value and notify, even if it compares equal.
    pub(crate) fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    /// Modify in place and notify.
    pub(crate) fn update(&self, f: impl FnOnce(&mut T)) {
        self.tx.send_modify(f);
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Store<T> {
    /// Replace the value, notifying only when it differs. Returns whether it did.
    pub(crate) fn set_neq(&self, value: T) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_with() {
        let store = Store::new(vec![1, 2, 3]);
        assert_eq!(store.get(), vec![1, 2, 3]);
        assert_eq!(store.with(|v| v.len()), 3);
    }

    #[test]
    fn test_clones_share_the_container() {
        let store = Store::new(1);
        let other = store.clone();
        store.set(5);
        assert_eq!(other.get(), 5);
    }

    #[test]
    fn test_update_in_place() {
        let store = Store::new(String::from("ab"));
        store.update(|s| s.push('c'));
        assert_eq!(store.get(), "abc");
    }

    #[test]
    fn test_set_neq_skips_equal_values() {
        let store = Store::new(1);
        let mut rx = store.subscribe();
        assert!(!store.set_neq(1));
        assert!(!rx.has_changed().unwrap());
        assert!(store.set_neq(2));
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 2);
    }

    #[tokio::test]
    async fn test_subscribers_wake_on_set() {
        let store = Store::new(0u32);
        let mut rx = store.subscribe();
        store.set(7);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 7);
    }

    #[test]
    fn test_debug_shows_value() {
        let store = Store::new(42);
        assert_eq!(format!("{:?}", store), "Store(42)");
    }
}

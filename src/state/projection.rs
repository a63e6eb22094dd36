//! Read-only views derived from a single store

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

use super::store::Store;

/// A pure function of one [`Store`], recomputed on every read.
///
/// Because the projection reads its source directly it can never lag behind
/// the container it is derived from.
pub struct Projection<Src, T> {
    source: Store<Src>,
    map: Arc<dyn Fn(&Src) -> T + Send + Sync>,
}

impl<Src, T> Clone for Projection<Src, T> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            map: Arc::clone(&self.map),
        }
    }
}

impl<Src, T> fmt::Debug for Projection<Src, T>
where
    Src: Clone + Send + Sync + 'static,
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Projection").field(&self.get()).finish()
    }
}

impl<Src, T> Projection<Src, T>
where
    Src: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(source: &Store<Src>, map: impl Fn(&Src) -> T + Send + Sync + 'static) -> Self {
        Self {
            source: source.clone(),
            map: Arc::new(map),
        }
    }

    pub fn get(&self) -> T {
        self.source.with(|src| (self.map)(src))
    }

    /// Derive a further projection over the same source.
    pub fn map<U>(&self, f: impl Fn(T) -> U + Send + Sync + 'static) -> Projection<Src, U>
    where
        T: 'static,
    {
        let inner = Arc::clone(&self.map);
        Projection {
            source: self.source.clone(),
            map: Arc::new(move |src: &Src| f(inner(src))),
        }
    }

    /// Follow changes of the projected value.
    pub fn subscribe(&self) -> Subscription<Src, T>
    where
        T: PartialEq,
    {
        let rx = self.source.subscribe();
        let last = (self.map)(&*rx.borrow());
        Subscription {
            rx,
            map: Arc::clone(&self.map),
            last,
        }
    }
}

/// Async stream of distinct projected values.
pub struct Subscription<Src, T> {
    rx: watch::Receiver<Src>,
    map: Arc<dyn Fn(&Src) -> T + Send + Sync>,
    last: T,
}

impl<Src, T> Subscription<Src, T>
where
    T: Clone + PartialEq,
{
    /// Last value yielded (or the value at subscription time).
    pub fn current(&self) -> &T {
        &self.last
    }

    /// Wait until the projected value differs from the last one seen.
    ///
    /// Source updates that leave the projection unchanged are skipped.
    /// Returns `None` only once every handle to the source store is dropped:
    /// the form and every projection or store clone taken from it.
    pub async fn changed(&mut self) -> Option<T> {
        loop {
            self.rx.changed().await.ok()?;
            let next = {
                let src = self.rx.borrow_and_update();
                (self.map)(&*src)
            };
            if next != self.last {
                self.last = next.clone();
                return Some(next);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_tracks_source() {
        let store = Store::new((1, 'a'));
        let first = Projection::new(&store, |pair: &(i32, char)| pair.0);
        assert_eq!(first.get(), 1);
        store.set((2, 'a'));
        assert_eq!(first.get(), 2);
    }

    #[test]
    fn test_map_composes() {
        let store = Store::new(3);
        let doubled = Projection::new(&store, |n: &i32| n * 2);
        let label = doubled.map(|n| format!("#{n}"));
        store.set(4);
        assert_eq!(label.get(), "#8");
    }

    #[tokio::test]
    async fn test_subscription_skips_unchanged_projection() {
        let store = Store::new((0, 0));
        let left = Projection::new(&store, |pair: &(i32, i32)| pair.0);
        let mut sub = left.subscribe();
        assert_eq!(*sub.current(), 0);

        store.set((0, 9));
        store.set((5, 9));
        assert_eq!(sub.changed().await, Some(5));
        assert_eq!(*sub.current(), 5);
    }

    #[tokio::test]
    async fn test_subscription_ends_with_source() {
        let store = Store::new(1);
        let projection = Projection::new(&store, |n: &i32| *n);
        let mut sub = projection.subscribe();
        drop(projection);
        drop(store);
        assert_eq!(sub.changed().await, None);
    }
}

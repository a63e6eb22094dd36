//! Error values and the errors container payload

use std::borrow::Cow;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use indexmap::IndexMap;

/// "No error" test for error values.
///
/// An error entry counts as absent when its value is false-ish: `None`, an
/// empty string, numeric zero (or NaN), `false`, or `()`. Validators may
/// therefore report a cleared field either by omitting the key or by
/// writing a false-ish value for it.
pub trait Falsy {
    fn is_falsy(&self) -> bool;
}

impl Falsy for () {
    fn is_falsy(&self) -> bool {
        true
    }
}

impl Falsy for bool {
    fn is_falsy(&self) -> bool {
        !*self
    }
}

impl Falsy for str {
    fn is_falsy(&self) -> bool {
        self.is_empty()
    }
}

impl Falsy for String {
    fn is_falsy(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Falsy + ?Sized> Falsy for &T {
    fn is_falsy(&self) -> bool {
        (**self).is_falsy()
    }
}

impl<T: Falsy + ?Sized> Falsy for Box<T> {
    fn is_falsy(&self) -> bool {
        (**self).is_falsy()
    }
}

impl<T: Falsy + ?Sized> Falsy for Arc<T> {
    fn is_falsy(&self) -> bool {
        (**self).is_falsy()
    }
}

impl Falsy for Cow<'_, str> {
    fn is_falsy(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Falsy> Falsy for Option<T> {
    fn is_falsy(&self) -> bool {
        self.as_ref().map_or(true, Falsy::is_falsy)
    }
}

macro_rules! impl_falsy_for_int {
    ($($ty:ty),*) => {
        $(
            impl Falsy for $ty {
                fn is_falsy(&self) -> bool {
                    *self == 0
                }
            }
        )*
    };
}

impl_falsy_for_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl Falsy for f32 {
    fn is_falsy(&self) -> bool {
        *self == 0.0 || self.is_nan()
    }
}

impl Falsy for f64 {
    fn is_falsy(&self) -> bool {
        *self == 0.0 || self.is_nan()
    }
}

/// Bound for error values stored in a form.
pub trait ErrorValue: Falsy + Clone + fmt::Debug + PartialEq + Send + Sync + 'static {}

impl<T> ErrorValue for T where T: Falsy + Clone + fmt::Debug + PartialEq + Send + Sync + 'static {}

/// Errors for a subset of the form keys, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorMap<K: Hash + Eq, E> {
    entries: IndexMap<K, E>,
}

impl<K: Hash + Eq, E> Default for ErrorMap<K, E> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<K: Hash + Eq, E> ErrorMap<K, E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: K, error: E) -> Self {
        self.entries.insert(key, error);
        self
    }

    pub fn insert(&mut self, key: K, error: E) -> Option<E> {
        self.entries.insert(key, error)
    }

    pub fn get(&self, key: &K) -> Option<&E> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &E)> {
        self.entries.iter()
    }
}

impl<K: Hash + Eq, E: Falsy> ErrorMap<K, E> {
    /// True iff every entry is false-ish. An empty map is valid.
    pub fn is_valid(&self) -> bool {
        self.entries.values().all(Falsy::is_falsy)
    }

    /// Entries whose value is an actual error.
    pub fn active(&self) -> impl Iterator<Item = (&K, &E)> {
        self.entries.iter().filter(|(_, error)| !error.is_falsy())
    }
}

impl<K: Hash + Eq, E> FromIterator<(K, E)> for ErrorMap<K, E> {
    fn from_iter<I: IntoIterator<Item = (K, E)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<K: Hash + Eq, E> IntoIterator for ErrorMap<K, E> {
    type Item = (K, E);
    type IntoIter = indexmap::map::IntoIter<K, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod falsy {
        use super::*;

        #[test]
        fn test_strings() {
            assert!("".is_falsy());
            assert!(String::new().is_falsy());
            assert!(!"required".is_falsy());
            assert!(!String::from("x").is_falsy());
        }

        #[test]
        fn test_options() {
            assert!(None::<&str>.is_falsy());
            assert!(Some("").is_falsy());
            assert!(!Some("required").is_falsy());
            assert!(Some(None::<String>).is_falsy());
        }

        #[test]
        fn test_numbers_and_bools() {
            assert!(0i64.is_falsy());
            assert!(!(-1i64).is_falsy());
            assert!(0u8.is_falsy());
            assert!(0.0f64.is_falsy());
            assert!(f64::NAN.is_falsy());
            assert!(!0.5f32.is_falsy());
            assert!(false.is_falsy());
            assert!(!true.is_falsy());
            assert!(().is_falsy());
        }

        #[test]
        fn test_smart_pointers() {
            assert!(Arc::<str>::from("").is_falsy());
            assert!(!Box::new(String::from("bad")).is_falsy());
            assert!(Cow::Borrowed("").is_falsy());
        }
    }

    mod error_map {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_empty_map_is_valid() {
            let errors: ErrorMap<&str, Option<&str>> = ErrorMap::new();
            assert!(errors.is_valid());
            assert!(errors.is_empty());
        }

        #[test]
        fn test_falsy_entries_are_valid() {
            let errors = ErrorMap::new().with("a", "").with("b", "");
            assert!(errors.is_valid());

            let errors: ErrorMap<&str, Option<&str>> =
                ErrorMap::new().with("a", Some("")).with("b", None);
            assert!(errors.is_valid());
        }

        #[test]
        fn test_single_truthy_entry_is_invalid() {
            let errors = ErrorMap::new().with("a", Some("required")).with("b", None);
            assert!(!errors.is_valid());
            assert_eq!(errors.active().collect::<Vec<_>>(), vec![(&"a", &Some("required"))]);
        }

        #[test]
        fn test_preserves_insertion_order() {
            let errors: ErrorMap<&str, u8> = [("z", 1), ("a", 0), ("m", 2)].into_iter().collect();
            let keys: Vec<_> = errors.iter().map(|(k, _)| *k).collect();
            assert_eq!(keys, vec!["z", "a", "m"]);
        }

        #[test]
        fn test_insert_overwrites() {
            let mut errors = ErrorMap::new().with("a", "bad");
            assert_eq!(errors.insert("a", ""), Some("bad"));
            assert_eq!(errors.get(&"a"), Some(&""));
            assert_eq!(errors.len(), 1);
            assert!(errors.contains_key(&"a"));
        }
    }
}

//! Compile-time field sets
//!
//! A form is declared over a values struct whose fields are the form keys.
//! [`Schema`] describes that struct to the engine: its key enum, a tagged
//! value enum carrying one variant per field, and the typed field bundle the
//! form hands back to callers. [`form_schema!`](crate::form_schema) writes all
//! of it from a single declaration.

use std::fmt;
use std::hash::Hash;

use crate::state::{ErrorValue, FieldFactory};

/// Describes a values struct with a fixed, declaration-ordered key set.
pub trait Schema: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// One variant per field.
    type Key: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static;

    /// Tagged union of the field types, one variant per key.
    type Value: Clone + fmt::Debug + PartialEq + Send + Sync + 'static;

    /// Typed per-field handles, built once per form.
    type Fields<E: ErrorValue>;

    /// Every key, in declaration order.
    const KEYS: &'static [Self::Key];

    fn key_name(key: Self::Key) -> &'static str;

    /// The key a tagged value belongs to.
    fn key_of(value: &Self::Value) -> Self::Key;

    fn get(&self, key: Self::Key) -> Self::Value;

    /// Replace the field the value is tagged for. Other fields are untouched.
    fn set(&mut self, value: Self::Value);

    /// Build the typed field bundle. Only callable during form construction.
    fn project<E: ErrorValue>(factory: &FieldFactory<'_, Self, E>) -> Self::Fields<E>;

    fn key_from_name(name: &str) -> Option<Self::Key> {
        Self::KEYS
            .iter()
            .copied()
            .find(|key| Self::key_name(*key) == name)
    }
}

/// Declare a values struct together with its [`Schema`] implementation.
///
/// ```rust,ignore
/// form_schema! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub struct SignUp {
///         Fullname => fullname: String,
///         Age => age: i64,
///     }
///     key SignUpKey;
///     value SignUpValue;
///     fields SignUpFields;
/// }
/// ```
///
/// Generates `SignUp` with public fields, the `SignUpKey` enum, the
/// `SignUpValue` tagged enum and `SignUpFields<E>`, whose members are typed
/// [`Field`](crate::Field) handles named after the struct fields. The struct
/// must derive at least `Debug`, `Clone` and `PartialEq`.
#[macro_export]
macro_rules! form_schema {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $variant:ident => $field:ident : $ty:ty ),+ $(,)?
        }
        key $key:ident;
        value $value:ident;
        fields $fields:ident;
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( pub $field: $ty, )+
        }

        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $key {
            $( $variant, )+
        }

        #[derive(Debug, Clone, PartialEq)]
        $vis enum $value {
            $( $variant($ty), )+
        }

        $vis struct $fields<E: $crate::ErrorValue> {
            $( pub $field: $crate::Field<$name, E, $ty>, )+
        }

        impl $crate::Schema for $name {
            type Key = $key;
            type Value = $value;
            type Fields<E: $crate::ErrorValue> = $fields<E>;

            const KEYS: &'static [$key] = &[ $( $key::$variant, )+ ];

            fn key_name(key: $key) -> &'static str {
                match key {
                    $( $key::$variant => stringify!($field), )+
                }
            }

            fn key_of(value: &$value) -> $key {
                match value {
                    $( $value::$variant(_) => $key::$variant, )+
                }
            }

            fn get(&self, key: $key) -> $value {
                match key {
                    $( $key::$variant => $value::$variant(self.$field.clone()), )+
                }
            }

            fn set(&mut self, value: $value) {
                match value {
                    $( $value::$variant(inner) => self.$field = inner, )+
                }
            }

            fn project<E: $crate::ErrorValue>(
                factory: &$crate::FieldFactory<'_, Self, E>,
            ) -> $fields<E> {
                $fields {
                    $(
                        $field: factory.field(
                            $key::$variant,
                            |values: &$name| values.$field.clone(),
                            $value::$variant,
                        ),
                    )+
                }
            }
        }
    };
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Schemas shared by the crate's unit tests.

    crate::form_schema! {
        #[derive(Debug, Clone, PartialEq)]
        pub struct SignUp {
            Fullname => fullname: String,
            Age => age: i64,
        }
        key SignUpKey;
        value SignUpValue;
        fields SignUpFields;
    }

    impl SignUp {
        pub fn blank() -> Self {
            Self {
                fullname: String::new(),
                age: 0,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{SignUp, SignUpKey, SignUpValue};
    use super::*;

    #[test]
    fn test_keys_follow_declaration_order() {
        assert_eq!(SignUp::KEYS, &[SignUpKey::Fullname, SignUpKey::Age]);
        assert_eq!(SignUp::key_name(SignUpKey::Fullname), "fullname");
        assert_eq!(SignUp::key_name(SignUpKey::Age), "age");
    }

    #[test]
    fn test_key_from_name() {
        assert_eq!(SignUp::key_from_name("age"), Some(SignUpKey::Age));
        assert_eq!(SignUp::key_from_name("email"), None);
    }

    #[test]
    fn test_set_replaces_only_tagged_field() {
        let mut values = SignUp {
            fullname: "Bob".to_string(),
            age: 3,
        };
        values.set(SignUpValue::Age(7));
        assert_eq!(values.fullname, "Bob");
        assert_eq!(values.age, 7);
    }

    #[test]
    fn test_get_and_key_of_agree() {
        let values = SignUp::blank();
        for key in SignUp::KEYS {
            assert_eq!(SignUp::key_of(&values.get(*key)), *key);
        }
    }
}

//! Per-field projections and triggers

use std::fmt;
use std::sync::Arc;

use super::engine::FormCore;
use crate::error::{FormError, Result};
use crate::events::{FieldUpdate, FormEvent};
use crate::schema::Schema;
use crate::state::{ErrorMap, ErrorValue, Projection, TouchedMap};

/// Error of one field: `None` when the errors map has no entry for it.
pub type ErrorProjection<S, E> = Projection<ErrorMap<<S as Schema>::Key, E>, Option<E>>;

/// Touched flag of one field: `None` until the field is touched or edited.
pub type TouchedProjection<S> = Projection<TouchedMap<<S as Schema>::Key>, Option<bool>>;

/// Key-scoped plumbing shared by typed and type-erased field handles.
struct FieldLink<S: Schema, E: ErrorValue> {
    key: S::Key,
    core: Arc<FormCore<S, E>>,
    error: ErrorProjection<S, E>,
    is_touched: TouchedProjection<S>,
}

impl<S: Schema, E: ErrorValue> FieldLink<S, E> {
    fn new(core: &Arc<FormCore<S, E>>, key: S::Key) -> Self {
        Self {
            key,
            core: Arc::clone(core),
            error: Projection::new(&core.errors, move |errors: &ErrorMap<S::Key, E>| {
                errors.get(&key).cloned()
            }),
            is_touched: Projection::new(&core.touched, move |touched: &TouchedMap<S::Key>| {
                touched.get(&key)
            }),
        }
    }

    fn tag(&self, value: S::Value) -> FieldUpdate<S> {
        FieldUpdate {
            key: self.key,
            value,
        }
    }

    fn changed(&self, value: S::Value) {
        self.core.dispatch(FormEvent::ValueChanged(self.tag(value)));
    }

    fn inputed(&self, value: S::Value) {
        self.core.dispatch(FormEvent::ValueInputed(self.tag(value)));
    }

    fn touched(&self) {
        self.core.dispatch(FormEvent::FieldTouched(self.key));
    }
}

/// Typed handle for one field of a form.
///
/// Holds no state: the value, error and touched projections read the form's
/// containers, and every trigger is forwarded to the form's dispatcher tagged
/// with this field's key.
pub struct Field<S: Schema, E: ErrorValue, T> {
    link: FieldLink<S, E>,
    initial_value: T,
    value: Projection<S, T>,
    wrap: fn(T) -> S::Value,
}

impl<S, E, T> Field<S, E, T>
where
    S: Schema,
    E: ErrorValue,
    T: Clone + Send + Sync + 'static,
{
    pub fn key(&self) -> S::Key {
        self.link.key
    }

    pub fn name(&self) -> &'static str {
        S::key_name(self.link.key)
    }

    /// Value captured when the form was built; the target of [`Field::reset`].
    pub fn initial_value(&self) -> &T {
        &self.initial_value
    }

    pub fn value(&self) -> &Projection<S, T> {
        &self.value
    }

    pub fn error(&self) -> &ErrorProjection<S, E> {
        &self.link.error
    }

    pub fn is_touched(&self) -> &TouchedProjection<S> {
        &self.link.is_touched
    }

    /// Programmatic set.
    pub fn changed(&self, value: T) {
        self.link.changed((self.wrap)(value));
    }

    /// User input.
    pub fn inputed(&self, value: T) {
        self.link.inputed((self.wrap)(value));
    }

    /// Re-inject the initial value through the input channel. Other fields,
    /// their touched flags and the errors store are not reset.
    pub fn reset(&self) {
        self.inputed(self.initial_value.clone());
    }

    /// Blur-style touch signal.
    pub fn touched(&self) {
        self.link.touched();
    }
}

impl<S, E, T> fmt::Debug for Field<S, E, T>
where
    S: Schema,
    E: ErrorValue,
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name())
            .field("value", &self.value.get())
            .field("error", &self.link.error.get())
            .field("is_touched", &self.link.is_touched.get())
            .finish()
    }
}

/// Type-erased field handle working on the schema's tagged value enum.
///
/// Used for the ordered field list and lookups by name. Writes reject values
/// tagged for another field.
pub struct FieldEntry<S: Schema, E: ErrorValue> {
    link: FieldLink<S, E>,
    initial_value: S::Value,
    value: Projection<S, S::Value>,
}

impl<S: Schema, E: ErrorValue> FieldEntry<S, E> {
    pub fn key(&self) -> S::Key {
        self.link.key
    }

    pub fn name(&self) -> &'static str {
        S::key_name(self.link.key)
    }

    pub fn initial_value(&self) -> &S::Value {
        &self.initial_value
    }

    pub fn value(&self) -> &Projection<S, S::Value> {
        &self.value
    }

    pub fn error(&self) -> &ErrorProjection<S, E> {
        &self.link.error
    }

    pub fn is_touched(&self) -> &TouchedProjection<S> {
        &self.link.is_touched
    }

    pub fn changed(&self, value: S::Value) -> Result<()> {
        self.check(&value)?;
        self.link.changed(value);
        Ok(())
    }

    pub fn inputed(&self, value: S::Value) -> Result<()> {
        self.check(&value)?;
        self.link.inputed(value);
        Ok(())
    }

    pub fn reset(&self) {
        self.link.inputed(self.initial_value.clone());
    }

    pub fn touched(&self) {
        self.link.touched();
    }

    fn check(&self, value: &S::Value) -> Result<()> {
        let tagged = S::key_of(value);
        if tagged == self.link.key {
            Ok(())
        } else {
            Err(FormError::FieldMismatch {
                field: self.name(),
                value_field: S::key_name(tagged),
            })
        }
    }
}

impl<S: Schema, E: ErrorValue> fmt::Debug for FieldEntry<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldEntry")
            .field("name", &self.name())
            .field("value", &self.value.get())
            .field("error", &self.link.error.get())
            .field("is_touched", &self.link.is_touched.get())
            .finish()
    }
}

/// Builds field handles while a form is being constructed.
///
/// Only the form builder can create a factory, so fields never exist outside
/// the form whose containers they project.
pub struct FieldFactory<'a, S: Schema, E: ErrorValue> {
    core: &'a Arc<FormCore<S, E>>,
}

impl<'a, S: Schema, E: ErrorValue> FieldFactory<'a, S, E> {
    pub(crate) fn new(core: &'a Arc<FormCore<S, E>>) -> Self {
        Self { core }
    }

    /// Typed field for `key`. `read` extracts the field from the values
    /// struct and `wrap` tags a field value with its key.
    pub fn field<T>(&self, key: S::Key, read: fn(&S) -> T, wrap: fn(T) -> S::Value) -> Field<S, E, T>
    where
        T: Clone + Send + Sync + 'static,
    {
        Field {
            link: FieldLink::new(self.core, key),
            initial_value: read(&self.core.initial_values),
            value: Projection::new(&self.core.values, read),
            wrap,
        }
    }

    pub(crate) fn entry(&self, key: S::Key) -> FieldEntry<S, E> {
        FieldEntry {
            link: FieldLink::new(self.core, key),
            initial_value: self.core.initial_values.get(key),
            value: Projection::new(&self.core.values, move |values: &S| values.get(key)),
        }
    }
}

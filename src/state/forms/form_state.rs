//! Form construction and form-level handles

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tokio::runtime::Handle;
use tokio::sync::broadcast;

use super::engine::FormCore;
use super::field::{FieldEntry, FieldFactory};
use super::submission::{self, Submission};
use super::validation::{Strategy, ValidateFn, Validation};
use crate::config::FormConfig;
use crate::effects::{submitter_fn, validator_fn, Submitter, Validator};
use crate::error::{FormError, Result};
use crate::events::{EffectOutcome, FormEvent};
use crate::schema::Schema;
use crate::state::{ErrorMap, ErrorValue, Projection, Store, TouchedMap};

/// Result of a submit trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStatus {
    /// The submitter was invoked; the value is its sequence token.
    Issued(u64),
    /// The form had errors; nothing was invoked.
    Rejected,
    /// Valid, but no submitter was configured.
    Unconfigured,
}

/// Consistent read of all containers at one point between triggers.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSnapshot<S: Schema, E: ErrorValue> {
    pub values: S,
    pub errors: ErrorMap<S::Key, E>,
    pub touched: TouchedMap<S::Key>,
    pub is_valid: bool,
}

/// Options for [`Form::builder`].
///
/// Exactly one of `validate` / `validate_fx` must be set.
pub struct FormBuilder<S: Schema, E: ErrorValue> {
    initial_values: S,
    validate: Option<Arc<ValidateFn<S, E>>>,
    validate_fx: Option<Arc<dyn Validator<S, E>>>,
    submit_fx: Option<Arc<dyn Submitter<S>>>,
    config: FormConfig,
}

impl<S: Schema, E: ErrorValue> FormBuilder<S, E> {
    /// Synchronous validator, rerun on every values change, at init and on reset.
    pub fn validate<F>(mut self, validate: F) -> Self
    where
        F: Fn(&S) -> ErrorMap<S::Key, E> + Send + Sync + 'static,
    {
        self.validate = Some(Arc::new(validate));
        self
    }

    /// Async validator, issued on every values change, at init and on reset.
    pub fn validate_fx<V>(mut self, validator: V) -> Self
    where
        V: Validator<S, E> + 'static,
    {
        self.validate_fx = Some(Arc::new(validator));
        self
    }

    pub fn validate_fx_fn<F, Fut>(self, validate: F) -> Self
    where
        F: Fn(S) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = anyhow::Result<ErrorMap<S::Key, E>>> + Send + 'static,
    {
        self.validate_fx(validator_fn(validate))
    }

    pub fn submit_fx<T>(mut self, submitter: T) -> Self
    where
        T: Submitter<S> + 'static,
    {
        self.submit_fx = Some(Arc::new(submitter));
        self
    }

    pub fn submit_fx_fn<F, Fut>(self, submit: F) -> Self
    where
        F: Fn(S) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.submit_fx(submitter_fn(submit))
    }

    pub fn config(mut self, config: FormConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the form, derive its fields and fire the init trigger.
    ///
    /// Async validators and submitters run on the current Tokio runtime, so a
    /// form using either must be built inside one.
    pub fn build(self) -> Result<Form<S, E>> {
        let strategy = match (self.validate, self.validate_fx) {
            (Some(validate), None) => Strategy::Sync(validate),
            (None, Some(validator)) => Strategy::Async(validator),
            (Some(_), Some(_)) => return Err(FormError::ConflictingValidators),
            (None, None) => return Err(FormError::MissingValidator),
        };
        let validation = Validation::new(strategy);

        let runtime = if validation.is_async() || self.submit_fx.is_some() {
            Some(Handle::try_current().map_err(|_| FormError::RuntimeUnavailable)?)
        } else {
            None
        };

        let core = Arc::new(FormCore::new(
            self.initial_values,
            validation,
            Submission::new(self.submit_fx),
            self.config.event_buffer(),
            self.config.outcome_buffer(),
            runtime,
        ));

        let factory = FieldFactory::new(&core);
        let field_entries: Vec<_> = S::KEYS.iter().map(|key| factory.entry(*key)).collect();
        let fields_by_name = field_entries
            .iter()
            .enumerate()
            .map(|(index, field)| (field.name(), index))
            .collect();
        let fields = S::project(&factory);

        let form = Form {
            is_valid: Projection::new(&core.errors, ErrorMap::is_valid),
            is_validating: Projection::new(&core.validation.pending, |pending: &bool| *pending),
            is_submitting: Projection::new(&core.submission.in_flight, |count: &usize| *count > 0),
            core,
            field_entries,
            fields_by_name,
            fields,
        };

        form.core.dispatch(FormEvent::Init);
        tracing::debug!(fields = S::KEYS.len(), "form built");
        Ok(form)
    }
}

/// Reactive form over the values struct `S` with error values `E`.
///
/// Owns the values, errors and touched containers. Callers read them through
/// stores and projections and write only through field and form triggers.
pub struct Form<S: Schema, E: ErrorValue> {
    core: Arc<FormCore<S, E>>,
    is_valid: Projection<ErrorMap<S::Key, E>, bool>,
    is_validating: Projection<bool, bool>,
    is_submitting: Projection<usize, bool>,
    field_entries: Vec<FieldEntry<S, E>>,
    fields_by_name: IndexMap<&'static str, usize>,
    fields: S::Fields<E>,
}

impl<S: Schema, E: ErrorValue> Form<S, E> {
    pub fn builder(initial_values: S) -> FormBuilder<S, E> {
        FormBuilder {
            initial_values,
            validate: None,
            validate_fx: None,
            submit_fx: None,
            config: FormConfig::default(),
        }
    }

    pub fn initial_values(&self) -> &S {
        &self.core.initial_values
    }

    pub fn values(&self) -> &Store<S> {
        &self.core.values
    }

    pub fn errors(&self) -> &Store<ErrorMap<S::Key, E>> {
        &self.core.errors
    }

    pub fn touched(&self) -> &Store<TouchedMap<S::Key>> {
        &self.core.touched
    }

    /// True iff every entry in the errors store is false-ish.
    pub fn is_valid(&self) -> &Projection<ErrorMap<S::Key, E>, bool> {
        &self.is_valid
    }

    /// True while the latest async validation has not settled.
    pub fn is_validating(&self) -> &Projection<bool, bool> {
        &self.is_validating
    }

    /// True while any submission task is in flight.
    pub fn is_submitting(&self) -> &Projection<usize, bool> {
        &self.is_submitting
    }

    /// Typed field handles.
    pub fn fields(&self) -> &S::Fields<E> {
        &self.fields
    }

    /// Fields in declaration order.
    pub fn field_entries(&self) -> &[FieldEntry<S, E>] {
        &self.field_entries
    }

    pub fn field(&self, name: &str) -> Result<&FieldEntry<S, E>> {
        self.fields_by_name
            .get(name)
            .map(|index| &self.field_entries[*index])
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }

    pub fn field_by_key(&self, key: S::Key) -> Option<&FieldEntry<S, E>> {
        self.field_entries.iter().find(|field| field.key() == key)
    }

    /// Restore values and touched flags to their initial state, then
    /// revalidate the restored values.
    pub fn reset(&self) {
        self.core.dispatch(FormEvent::Reset);
    }

    /// Submit the current values if the form is valid.
    pub fn submit(&self) -> SubmitStatus {
        self.core
            .run(FormEvent::Submit, |core, _| submission::gate(core))
    }

    pub fn snapshot(&self) -> FormSnapshot<S, E> {
        let _gate = self.core.lock();
        let errors = self.core.errors.get();
        FormSnapshot {
            values: self.core.values.get(),
            is_valid: errors.is_valid(),
            errors,
            touched: self.core.touched.get(),
        }
    }

    /// Every handled trigger, in dispatch order.
    pub fn events(&self) -> broadcast::Receiver<FormEvent<S>> {
        self.core.subscribe_events()
    }

    /// Completions of async validation and submission tasks.
    pub fn outcomes(&self) -> broadcast::Receiver<EffectOutcome> {
        self.core.subscribe_outcomes()
    }
}

impl<S: Schema, E: ErrorValue> fmt::Debug for Form<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("snapshot", &self.snapshot())
            .field("fields", &self.field_entries)
            .finish()
    }
}

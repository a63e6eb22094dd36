//! Shared form core: containers, dispatch gate and event bus

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::broadcast;

use super::submission::Submission;
use super::validation::{self, Trigger, Validation};
use crate::events::{EffectOutcome, FieldUpdate, FormEvent};
use crate::schema::Schema;
use crate::state::{ErrorMap, ErrorValue, Store, TouchedMap};

/// Everything a form and its fields share.
///
/// Triggers are serialized by `gate`: each one updates the containers, runs
/// synchronous validation, issues tasks and publishes its event before the
/// next trigger is let in.
pub(crate) struct FormCore<S: Schema, E: ErrorValue> {
    pub(crate) initial_values: S,
    pub(crate) values: Store<S>,
    pub(crate) errors: Store<ErrorMap<S::Key, E>>,
    pub(crate) touched: Store<TouchedMap<S::Key>>,
    pub(crate) validation: Validation<S, E>,
    pub(crate) submission: Submission<S>,
    events: broadcast::Sender<FormEvent<S>>,
    outcomes: broadcast::Sender<EffectOutcome>,
    runtime: Option<Handle>,
    gate: Mutex<()>,
}

impl<S: Schema, E: ErrorValue> FormCore<S, E> {
    pub(crate) fn new(
        initial_values: S,
        validation: Validation<S, E>,
        submission: Submission<S>,
        event_capacity: usize,
        outcome_capacity: usize,
        runtime: Option<Handle>,
    ) -> Self {
        let (events, _) = broadcast::channel(event_capacity);
        let (outcomes, _) = broadcast::channel(outcome_capacity);
        Self {
            values: Store::new(initial_values.clone()),
            errors: Store::new(ErrorMap::new()),
            touched: Store::new(TouchedMap::new()),
            initial_values,
            validation,
            submission,
            events,
            outcomes,
            runtime,
            gate: Mutex::new(()),
        }
    }

    /// Hold the dispatch gate. Poisoning is ignored: a trigger that panicked
    /// may have updated values and touched flags without recomputing errors,
    /// and the next edit or reset revalidates.
    pub(crate) fn lock(&self) -> MutexGuard<'_, ()> {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn dispatch(self: &Arc<Self>, event: FormEvent<S>) {
        self.run(event, |core, event| core.apply(event));
    }

    /// Run `handle` for `event` under the gate, then publish the event.
    pub(crate) fn run<R>(
        self: &Arc<Self>,
        event: FormEvent<S>,
        handle: impl FnOnce(&Arc<Self>, &FormEvent<S>) -> R,
    ) -> R {
        let _gate = self.lock();
        tracing::trace!(
            event = event.label(),
            field = event.key().map(S::key_name),
            "dispatch"
        );
        let result = handle(self, &event);
        // No subscribers is fine: the bus is for optional observers.
        let _ = self.events.send(event);
        result
    }

    fn apply(self: &Arc<Self>, event: &FormEvent<S>) {
        match event {
            FormEvent::Init => validation::run(self, Trigger::Init),
            FormEvent::Reset => {
                self.values.set(self.initial_values.clone());
                self.touched.set(TouchedMap::new());
                validation::run(self, Trigger::Reset);
            }
            FormEvent::Submit => {
                super::submission::gate(self);
            }
            FormEvent::ValueChanged(update) | FormEvent::ValueInputed(update) => {
                self.edit(update);
                validation::run(self, Trigger::ValuesChanged);
            }
            FormEvent::FieldTouched(key) => {
                let key = *key;
                self.touched.update(|touched| touched.mark(key, true));
            }
        }
    }

    /// Shallow merge of one field. Any edit clears the touched flag: only the
    /// dedicated touch trigger sets it.
    fn edit(&self, update: &FieldUpdate<S>) {
        let value = update.value.clone();
        self.values.update(|values| values.set(value));
        let key = update.key;
        self.touched.update(|touched| touched.mark(key, false));
    }

    pub(crate) fn subscribe_events(&self) -> broadcast::Receiver<FormEvent<S>> {
        self.events.subscribe()
    }

    pub(crate) fn subscribe_outcomes(&self) -> broadcast::Receiver<EffectOutcome> {
        self.outcomes.subscribe()
    }

    pub(crate) fn report(&self, outcome: EffectOutcome) {
        let _ = self.outcomes.send(outcome);
    }

    /// Run an effect task on the runtime captured at build time and hand its
    /// result to `done`. A panicking task is reported to `done` as an error.
    pub(crate) fn spawn_effect<T, F, D>(&self, task: F, done: D)
    where
        T: Send + 'static,
        F: Future<Output = anyhow::Result<T>> + Send + 'static,
        D: FnOnce(anyhow::Result<T>) + Send + 'static,
    {
        let Some(runtime) = &self.runtime else {
            tracing::error!("effect task dropped: form was built without a runtime");
            return;
        };
        let task = runtime.spawn(task);
        runtime.spawn(async move {
            let result = match task.await {
                Ok(result) => result,
                Err(err) if err.is_panic() => Err(anyhow::anyhow!("effect task panicked")),
                Err(err) => Err(anyhow::anyhow!("effect task aborted: {err}")),
            };
            done(result);
        });
    }
}

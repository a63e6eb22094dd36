//! Validation orchestration
//!
//! Synchronous validators recompute the errors inline. Async validators are
//! issued as tasks tagged with a sequence token; a completion is applied only
//! if no newer validation was issued in the meantime.

use std::fmt;
use std::sync::Arc;

use super::engine::FormCore;
use crate::effects::{TaskSequence, Validator};
use crate::events::EffectOutcome;
use crate::schema::Schema;
use crate::state::{ErrorMap, ErrorValue, Store};

pub(crate) type ValidateFn<S, E> = dyn Fn(&S) -> ErrorMap<<S as Schema>::Key, E> + Send + Sync;

pub(crate) enum Strategy<S: Schema, E: ErrorValue> {
    Sync(Arc<ValidateFn<S, E>>),
    Async(Arc<dyn Validator<S, E>>),
}

/// What caused a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Trigger {
    Init,
    ValuesChanged,
    Reset,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trigger::Init => "init",
            Trigger::ValuesChanged => "values-changed",
            Trigger::Reset => "reset",
        })
    }
}

pub(crate) struct Validation<S: Schema, E: ErrorValue> {
    strategy: Strategy<S, E>,
    sequence: TaskSequence,
    pub(crate) pending: Store<bool>,
}

impl<S: Schema, E: ErrorValue> Validation<S, E> {
    pub(crate) fn new(strategy: Strategy<S, E>) -> Self {
        Self {
            strategy,
            sequence: TaskSequence::new(),
            pending: Store::new(false),
        }
    }

    pub(crate) fn is_async(&self) -> bool {
        matches!(self.strategy, Strategy::Async(_))
    }
}

/// Validate the current values. Must be called under the dispatch gate.
pub(crate) fn run<S: Schema, E: ErrorValue>(core: &Arc<FormCore<S, E>>, trigger: Trigger) {
    match &core.validation.strategy {
        Strategy::Sync(validate) => {
            let errors = core.values.with(|values| validate(values));
            if core.errors.set_neq(errors) {
                tracing::trace!(%trigger, "errors recomputed");
            }
        }
        Strategy::Async(validator) => {
            let seq = core.validation.sequence.issue();
            let snapshot = core.values.get();
            core.validation.pending.set_neq(true);
            tracing::debug!(seq, %trigger, "validation issued");

            let validator = Arc::clone(validator);
            let form = Arc::downgrade(core);
            core.spawn_effect(
                async move { validator.validate(snapshot).await },
                move |result| match form.upgrade() {
                    Some(core) => complete(&core, seq, result),
                    None => tracing::debug!(seq, "validation finished after its form was dropped"),
                },
            );
        }
    }
}

fn complete<S: Schema, E: ErrorValue>(
    core: &FormCore<S, E>,
    seq: u64,
    result: anyhow::Result<ErrorMap<S::Key, E>>,
) {
    let _gate = core.lock();
    let latest = core.validation.sequence.latest();
    let superseded = seq != latest;

    let outcome = match result {
        Ok(errors) if !superseded => {
            core.errors.set_neq(errors);
            core.validation.pending.set_neq(false);
            EffectOutcome::ValidationApplied { seq }
        }
        Ok(_) => {
            tracing::debug!(seq, latest, "discarding superseded validation result");
            EffectOutcome::ValidationDiscarded { seq, latest }
        }
        Err(error) => {
            if !superseded {
                core.validation.pending.set_neq(false);
            }
            tracing::warn!(seq, superseded, error = %error, "validation task failed");
            EffectOutcome::ValidationFailed {
                seq,
                superseded,
                error: Arc::new(error),
            }
        }
    };
    core.report(outcome);
}

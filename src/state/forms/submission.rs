//! Submission gate

use std::sync::Arc;

use super::engine::FormCore;
use super::form_state::SubmitStatus;
use crate::effects::{Submitter, TaskSequence};
use crate::events::EffectOutcome;
use crate::schema::Schema;
use crate::state::{ErrorMap, ErrorValue, Store};

pub(crate) struct Submission<S: Schema> {
    submitter: Option<Arc<dyn Submitter<S>>>,
    sequence: TaskSequence,
    pub(crate) in_flight: Store<usize>,
}

impl<S: Schema> Submission<S> {
    pub(crate) fn new(submitter: Option<Arc<dyn Submitter<S>>>) -> Self {
        Self {
            submitter,
            sequence: TaskSequence::new(),
            in_flight: Store::new(0),
        }
    }
}

/// Issue the submitter with the current values iff the form is valid.
///
/// Must be called under the dispatch gate so validity and the snapshot are
/// read from the same state.
pub(crate) fn gate<S: Schema, E: ErrorValue>(core: &Arc<FormCore<S, E>>) -> SubmitStatus {
    if !core.errors.with(ErrorMap::is_valid) {
        tracing::debug!("submit rejected: form has errors");
        return SubmitStatus::Rejected;
    }
    let Some(submitter) = core.submission.submitter.clone() else {
        tracing::warn!("submit ignored: no submitter configured");
        return SubmitStatus::Unconfigured;
    };

    let seq = core.submission.sequence.issue();
    let snapshot = core.values.get();
    core.submission.in_flight.update(|count| *count += 1);
    tracing::debug!(seq, "submission issued");

    let form = Arc::downgrade(core);
    core.spawn_effect(
        async move { submitter.submit(snapshot).await },
        move |result| {
            if let Some(core) = form.upgrade() {
                finish(&core, seq, result);
            }
        },
    );
    SubmitStatus::Issued(seq)
}

fn finish<S: Schema, E: ErrorValue>(core: &FormCore<S, E>, seq: u64, result: anyhow::Result<()>) {
    let _gate = core.lock();
    core.submission
        .in_flight
        .update(|count| *count = count.saturating_sub(1));

    let outcome = match result {
        Ok(()) => {
            tracing::debug!(seq, "submission done");
            EffectOutcome::SubmissionDone { seq }
        }
        Err(error) => {
            tracing::warn!(seq, error = %error, "submission task failed");
            EffectOutcome::SubmissionFailed {
                seq,
                error: Arc::new(error),
            }
        }
    };
    core.report(outcome);
}

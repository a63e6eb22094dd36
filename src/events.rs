//! Form event bus payloads
//!
//! Every trigger on a form resolves to one [`FormEvent`]. Field triggers tag
//! their payload with the field key before it reaches the shared dispatcher,
//! so the containers only ever see `(key, value)` pairs. Handled events are
//! re-published on the form's broadcast channel ([`crate::Form::events`]).
//!
//! Async completions are reported separately as [`EffectOutcome`]s.

use std::sync::Arc;

use crate::schema::Schema;

/// A value tagged with the key of the field it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldUpdate<S: Schema> {
    pub key: S::Key,
    pub value: S::Value,
}

impl<S: Schema> FieldUpdate<S> {
    pub fn name(&self) -> &'static str {
        S::key_name(self.key)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent<S: Schema> {
    /// Form-level reset: values and touched flags back to their initial state.
    Reset,
    /// Fired once, when the form is built.
    Init,
    Submit,
    /// Programmatic set.
    ValueChanged(FieldUpdate<S>),
    /// User input. Reacts exactly like `ValueChanged` on the containers.
    ValueInputed(FieldUpdate<S>),
    FieldTouched(S::Key),
}

impl<S: Schema> FormEvent<S> {
    /// Key this event is scoped to, if any.
    pub fn key(&self) -> Option<S::Key> {
        match self {
            FormEvent::ValueChanged(update) | FormEvent::ValueInputed(update) => Some(update.key),
            FormEvent::FieldTouched(key) => Some(*key),
            FormEvent::Reset | FormEvent::Init | FormEvent::Submit => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormEvent::Reset => "reset",
            FormEvent::Init => "init",
            FormEvent::Submit => "submit",
            FormEvent::ValueChanged(_) => "value-changed",
            FormEvent::ValueInputed(_) => "value-inputed",
            FormEvent::FieldTouched(_) => "field-touched",
        }
    }
}

/// Completion report of an async validation or submission task.
///
/// `seq` is the task's sequence token within its family.
#[derive(Debug, Clone)]
pub enum EffectOutcome {
    /// Result written to the errors store.
    ValidationApplied { seq: u64 },
    /// A newer validation was issued before this one completed.
    ValidationDiscarded { seq: u64, latest: u64 },
    /// The validator itself failed; errors were left as they were.
    ValidationFailed {
        seq: u64,
        superseded: bool,
        error: Arc<anyhow::Error>,
    },
    SubmissionDone { seq: u64 },
    SubmissionFailed { seq: u64, error: Arc<anyhow::Error> },
}

impl EffectOutcome {
    pub fn seq(&self) -> u64 {
        match self {
            EffectOutcome::ValidationApplied { seq }
            | EffectOutcome::ValidationDiscarded { seq, .. }
            | EffectOutcome::ValidationFailed { seq, .. }
            | EffectOutcome::SubmissionDone { seq }
            | EffectOutcome::SubmissionFailed { seq, .. } => *seq,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            EffectOutcome::ValidationFailed { .. } | EffectOutcome::SubmissionFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::fixtures::{SignUp, SignUpKey, SignUpValue};

    #[test]
    fn test_key_scoping() {
        let changed: FormEvent<SignUp> = FormEvent::ValueChanged(FieldUpdate {
            key: SignUpKey::Age,
            value: SignUpValue::Age(3),
        });
        assert_eq!(changed.key(), Some(SignUpKey::Age));
        assert_eq!(changed.label(), "value-changed");
        assert_eq!(FormEvent::<SignUp>::Reset.key(), None);
        assert_eq!(
            FormEvent::<SignUp>::FieldTouched(SignUpKey::Fullname).key(),
            Some(SignUpKey::Fullname)
        );
    }

    #[test]
    fn test_update_name() {
        let update = FieldUpdate::<SignUp> {
            key: SignUpKey::Fullname,
            value: SignUpValue::Fullname("Ada".to_string()),
        };
        assert_eq!(update.name(), "fullname");
    }

    #[test]
    fn test_outcome_accessors() {
        let failed = EffectOutcome::SubmissionFailed {
            seq: 4,
            error: Arc::new(anyhow::anyhow!("offline")),
        };
        assert_eq!(failed.seq(), 4);
        assert!(failed.is_failure());
        assert!(!EffectOutcome::ValidationApplied { seq: 1 }.is_failure());
    }
}

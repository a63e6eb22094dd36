//! Scenario steps and the runner that replays them against a form

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use formflow::{EffectOutcome, ErrorValue, Form, Schema, SubmitStatus};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::broadcast::{self, error::RecvError};

/// Upper bound for waiting on in-flight validations and submissions.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

/// One user or program action against the form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Input { field: String, value: Value },
    Change { field: String, value: Value },
    Touch { field: String },
    ResetField { field: String },
    Reset,
    Submit,
    /// Wait until no validation or submission is in flight
    Settle,
}

impl Step {
    pub fn label(&self) -> &'static str {
        match self {
            Step::Input { .. } => "input",
            Step::Change { .. } => "change",
            Step::Touch { .. } => "touch",
            Step::ResetField { .. } => "reset_field",
            Step::Reset => "reset",
            Step::Submit => "submit",
            Step::Settle => "settle",
        }
    }
}

pub fn load(path: &Path) -> Result<Vec<Step>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading scenario {}", path.display()))?;
    parse(&content).with_context(|| format!("parsing scenario {}", path.display()))
}

pub fn parse(content: &str) -> Result<Vec<Step>> {
    Ok(serde_json::from_str(content)?)
}

/// Type in an age, set the name programmatically, blur, submit, then reset.
pub fn sign_up() -> Vec<Step> {
    vec![
        Step::Input {
            field: "age".to_string(),
            value: json!(2),
        },
        Step::Change {
            field: "fullname".to_string(),
            value: json!("Alice"),
        },
        Step::Touch {
            field: "fullname".to_string(),
        },
        Step::Settle,
        Step::Submit,
        Step::Settle,
        Step::Input {
            field: "age".to_string(),
            value: json!(-4),
        },
        Step::Settle,
        Step::Submit,
        Step::ResetField {
            field: "age".to_string(),
        },
        Step::Reset,
        Step::Settle,
    ]
}

/// Decode a JSON value for one field by splicing it into the serialized
/// values struct, so every schema with serde derives works unchanged.
pub fn decode_value<S>(current: &S, key: S::Key, value: Value) -> Result<S::Value>
where
    S: Schema + Serialize + DeserializeOwned,
{
    let name = S::key_name(key);
    let mut object = serde_json::to_value(current)?;
    let slot = object
        .get_mut(name)
        .with_context(|| format!("field {name} is missing from the serialized values"))?;
    *slot = value;
    let values: S =
        serde_json::from_value(object).with_context(|| format!("invalid value for field {name}"))?;
    Ok(values.get(key))
}

/// Form state printed after each step
#[derive(Debug, Serialize)]
pub struct Report<S, E> {
    pub step: usize,
    pub op: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit: Option<String>,
    pub values: S,
    pub errors: IndexMap<&'static str, E>,
    pub touched: IndexMap<&'static str, bool>,
    pub is_valid: bool,
    pub is_validating: bool,
    pub is_submitting: bool,
}

pub struct Runner<'a, S: Schema, E: ErrorValue> {
    form: &'a Form<S, E>,
    outcomes: broadcast::Receiver<EffectOutcome>,
}

impl<'a, S, E> Runner<'a, S, E>
where
    S: Schema + Serialize + DeserializeOwned,
    E: ErrorValue,
{
    pub fn new(form: &'a Form<S, E>) -> Self {
        Self {
            form,
            outcomes: form.outcomes(),
        }
    }

    pub async fn apply(&mut self, step: usize, action: Step) -> Result<Report<S, E>> {
        let op = action.label();
        tracing::debug!(step, op, "applying step");

        let mut submit = None;
        match action {
            Step::Input { field, value } => {
                let value = self.decode(&field, value)?;
                self.form.field(&field)?.inputed(value)?;
            }
            Step::Change { field, value } => {
                let value = self.decode(&field, value)?;
                self.form.field(&field)?.changed(value)?;
            }
            Step::Touch { field } => self.form.field(&field)?.touched(),
            Step::ResetField { field } => self.form.field(&field)?.reset(),
            Step::Reset => self.form.reset(),
            Step::Submit => {
                let status = self.form.submit();
                if status == SubmitStatus::Rejected {
                    tracing::info!(step, "submit rejected, form has errors");
                }
                submit = Some(format!("{status:?}"));
            }
            Step::Settle => self.settle().await?,
        }

        Ok(self.report(step, op, submit))
    }

    /// Wait until the latest validation has settled and no submission is in
    /// flight.
    pub async fn settle(&mut self) -> Result<()> {
        let form = self.form;
        let outcomes = &mut self.outcomes;
        tokio::time::timeout(SETTLE_TIMEOUT, async {
            while form.is_validating().get() || form.is_submitting().get() {
                match outcomes.recv().await {
                    Ok(outcome) if outcome.is_failure() => {
                        tracing::warn!(seq = outcome.seq(), "effect failed: {outcome:?}");
                    }
                    Ok(_) | Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => break,
                }
            }
        })
        .await
        .context("timed out waiting for effects to settle")
    }

    fn decode(&self, field: &str, value: Value) -> Result<S::Value> {
        let key = self.form.field(field)?.key();
        decode_value(&self.form.values().get(), key, value)
    }

    fn report(&self, step: usize, op: &'static str, submit: Option<String>) -> Report<S, E> {
        let snapshot = self.form.snapshot();
        Report {
            step,
            op,
            submit,
            values: snapshot.values,
            errors: snapshot
                .errors
                .into_iter()
                .map(|(key, error)| (S::key_name(key), error))
                .collect(),
            touched: snapshot
                .touched
                .iter()
                .map(|(key, touched)| (S::key_name(*key), touched))
                .collect(),
            is_valid: snapshot.is_valid,
            is_validating: self.form.is_validating().get(),
            is_submitting: self.form.is_submitting().get(),
        }
    }
}

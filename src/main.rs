//! formflow-demo - replay a scenario against a sign-up form
//!
//! Reads a JSON array of steps (or runs the built-in sign-up scenario) and
//! prints one JSON snapshot of the form per step on stdout. Logs go to stderr.

mod scenario;

use std::io;
use std::path::Path;

use anyhow::Result;
use formflow::{form_schema, ErrorMap, Form, FormConfig};
use scenario::Runner;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

form_schema! {
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct SignUp {
        Fullname => fullname: String,
        Age => age: i64,
    }
    key SignUpKey;
    value SignUpValue;
    fields SignUpFields;
}

pub type SignUpForm = Form<SignUp, Option<String>>;

/// Server-side style checks, run as an async validation task.
fn check_sign_up(values: &SignUp) -> ErrorMap<SignUpKey, Option<String>> {
    let fullname = values.fullname.trim();
    let age = values.age;
    ErrorMap::new()
        .with(
            SignUpKey::Fullname,
            fullname.is_empty().then(|| "fullname is required".to_string()),
        )
        .with(
            SignUpKey::Age,
            (!(0..150).contains(&age)).then(|| format!("age {age} is out of range")),
        )
}

pub fn sign_up_form(config: &FormConfig) -> Result<SignUpForm> {
    let latency = config.demo_latency();
    let form = Form::builder(SignUp {
        fullname: String::new(),
        age: 0,
    })
    .config(config.clone())
    .validate_fx_fn(move |values: SignUp| async move {
        tokio::time::sleep(latency).await;
        Ok(check_sign_up(&values))
    })
    .submit_fx_fn(|values: SignUp| async move {
        tracing::info!(fullname = %values.fullname, age = values.age, "sign-up submitted");
        Ok(())
    })
    .build()?;
    Ok(form)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = FormConfig::load()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let steps = match std::env::args().nth(1) {
        Some(path) => scenario::load(Path::new(&path))?,
        None => scenario::sign_up(),
    };
    tracing::info!(steps = steps.len(), "running scenario");

    let form = sign_up_form(&config)?;
    let mut runner = Runner::new(&form);
    runner.settle().await?;

    for (index, step) in steps.into_iter().enumerate() {
        let report = runner.apply(index + 1, step).await?;
        println!("{}", serde_json::to_string(&report)?);
    }

    if let Err(err) = runner.settle().await {
        tracing::warn!("effects still running at exit: {err:#}");
    }
    Ok(())
}

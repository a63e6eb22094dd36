//! formflow - reactive form state
//!
//! Builds per-field reactive handles over a single source of truth (values,
//! errors, touched flags) and wires validation and submission as triggers
//! that react to edits, initialization and reset.
//!
//! ```rust,ignore
//! use formflow::{form_schema, ErrorMap, Form};
//!
//! form_schema! {
//!     #[derive(Debug, Clone, PartialEq)]
//!     pub struct SignUp {
//!         Fullname => fullname: String,
//!         Age => age: i64,
//!     }
//!     key SignUpKey;
//!     value SignUpValue;
//!     fields SignUpFields;
//! }
//!
//! let form = Form::builder(SignUp { fullname: String::new(), age: 0 })
//!     .validate(|v: &SignUp| {
//!         ErrorMap::new()
//!             .with(SignUpKey::Fullname, (v.fullname.is_empty()).then_some("required"))
//!             .with(SignUpKey::Age, (v.age < 0).then_some("invalid"))
//!     })
//!     .build()?;
//!
//! form.fields().fullname.changed("Alice".to_string());
//! assert!(form.is_valid().get());
//! ```

pub mod config;
pub mod effects;
pub mod error;
pub mod events;
pub mod schema;
pub mod state;

pub use config::FormConfig;
pub use effects::{submitter_fn, validator_fn, Submitter, TaskSequence, Validator};
pub use error::{FormError, Result};
pub use events::{EffectOutcome, FieldUpdate, FormEvent};
pub use schema::Schema;
pub use state::*;

//! Form domain layer
//!
//! A [`Form`] owns the values, errors and touched containers. [`Field`]s are
//! derived views over them, produced once by the [`FieldFactory`] while the
//! form is built. Validation and submission run as triggers wired to the
//! same dispatcher.

mod engine;
mod field;
mod form_state;
mod submission;
mod validation;

pub use field::{ErrorProjection, Field, FieldEntry, FieldFactory, TouchedProjection};
pub use form_state::{Form, FormBuilder, FormSnapshot, SubmitStatus};

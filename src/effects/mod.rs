//! Async task seams for validation and submission

mod sequence;
mod traits;

pub use sequence::TaskSequence;
pub use traits::{submitter_fn, validator_fn, FnSubmitter, FnValidator, Submitter, Validator};

#[cfg(test)]
pub use traits::MockSubmitter;

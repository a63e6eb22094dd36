//! Trait abstraction for validation and submission tasks to enable mocking in tests

use std::future::Future;

use anyhow::Result;
use async_trait::async_trait;

use crate::schema::Schema;
use crate::state::{ErrorMap, ErrorValue};

/// Async validation task: values snapshot in, full error map out.
///
/// The returned map replaces the form's errors wholesale. An `Err` is an
/// infrastructure failure (network, timeout) and leaves errors untouched.
#[async_trait]
pub trait Validator<S: Schema, E: ErrorValue>: Send + Sync {
    async fn validate(&self, values: S) -> Result<ErrorMap<S::Key, E>>;
}

/// Async submission task, invoked with the values snapshot of a valid form.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Submitter<S: Schema>: Send + Sync {
    async fn submit(&self, values: S) -> Result<()>;
}

/// [`Validator`] backed by an async closure.
pub struct FnValidator<F>(F);

/// Wrap `Fn(S) -> impl Future<Output = Result<ErrorMap>>` as a [`Validator`].
pub fn validator_fn<F>(f: F) -> FnValidator<F> {
    FnValidator(f)
}

#[async_trait]
impl<S, E, F, Fut> Validator<S, E> for FnValidator<F>
where
    S: Schema,
    E: ErrorValue,
    F: Fn(S) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ErrorMap<S::Key, E>>> + Send + 'static,
{
    async fn validate(&self, values: S) -> Result<ErrorMap<S::Key, E>> {
        (self.0)(values).await
    }
}

/// [`Submitter`] backed by an async closure.
pub struct FnSubmitter<F>(F);

pub fn submitter_fn<F>(f: F) -> FnSubmitter<F> {
    FnSubmitter(f)
}

#[async_trait]
impl<S, F, Fut> Submitter<S> for FnSubmitter<F>
where
    S: Schema,
    F: Fn(S) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    async fn submit(&self, values: S) -> Result<()> {
        (self.0)(values).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::fixtures::{SignUp, SignUpKey};

    #[tokio::test]
    async fn test_validator_fn_forwards_snapshot() {
        let validator = validator_fn(|values: SignUp| async move {
            Ok::<_, anyhow::Error>(ErrorMap::new().with(SignUpKey::Age, values.age < 0))
        });
        let values = SignUp {
            fullname: "Ada".to_string(),
            age: -1,
        };
        let errors = Validator::<SignUp, bool>::validate(&validator, values)
            .await
            .unwrap();
        assert_eq!(errors.get(&SignUpKey::Age), Some(&true));
    }

    #[tokio::test]
    async fn test_submitter_fn_propagates_failure() {
        let submitter = submitter_fn(|_values: SignUp| async { Err::<(), _>(anyhow::anyhow!("offline")) });
        let result = Submitter::<SignUp>::submit(&submitter, SignUp::blank()).await;
        tokio_test::assert_err!(result);
    }

    #[tokio::test]
    async fn test_mock_submitter() {
        let mut mock = MockSubmitter::<SignUp>::new();
        mock.expect_submit()
            .withf(|values| values.fullname == "Ada")
            .times(1)
            .returning(|_| Ok(()));

        let values = SignUp {
            fullname: "Ada".to_string(),
            age: 30,
        };
        tokio_test::assert_ok!(mock.submit(values).await);
    }
}

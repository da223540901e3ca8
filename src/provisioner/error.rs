//! Errors raised by the provisioning saga.

use thiserror::Error;

use super::ledger::CreatedResource;
use super::step::ProvisioningStep;

/// Why a saga step did not complete.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum StepFailure<E>
where
    E: std::error::Error + 'static,
{
    /// The controller rejected the step.
    #[error(transparent)]
    Controller(E),
    /// Cancellation was observed before the step started.
    #[error("operation cancelled before {step}")]
    Cancelled {
        /// Step that was not started.
        step: ProvisioningStep,
    },
    /// A step needed a resource an earlier step should have recorded.
    #[error("{resource} missing before {step}")]
    MissingResource {
        /// Kind of resource that was absent.
        resource: &'static str,
        /// Step that needed it.
        step: ProvisioningStep,
    },
}

/// A compensating delete that failed during rollback.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("failed to delete {resource}: {source}")]
pub struct CompensationFailure<E>
where
    E: std::error::Error + 'static,
{
    /// Resource left behind on the controller.
    pub resource: CreatedResource,
    /// Controller error returned by the delete.
    #[source]
    pub source: E,
}

/// Saga failure after compensation has run.
///
/// The message always reports the root cause; compensation failures are
/// attached but never replace it.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("Failed to create subnet: {cause}")]
pub struct ProvisioningError<E>
where
    E: std::error::Error + 'static,
{
    /// Step that failed or was not started.
    pub step: ProvisioningStep,
    /// Root cause.
    #[source]
    pub cause: StepFailure<E>,
    /// Deletes that failed while rolling back, in the order they ran.
    pub compensation_failures: Vec<CompensationFailure<E>>,
}

impl<E> ProvisioningError<E>
where
    E: std::error::Error + 'static,
{
    /// Whether every created resource was removed during rollback.
    #[must_use]
    pub fn fully_compensated(&self) -> bool {
        self.compensation_failures.is_empty()
    }

    /// Controller error behind the failure, if any.
    #[must_use]
    pub const fn controller_error(&self) -> Option<&E> {
        match &self.cause {
            StepFailure::Controller(err) => Some(err),
            StepFailure::Cancelled { .. } | StepFailure::MissingResource { .. } => None,
        }
    }
}

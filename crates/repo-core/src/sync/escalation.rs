//! Ordered fallback attempts
//!
//! Git exposes overlapping commands (checkout vs. switch, tracked vs.
//! untracked branch creation) whose failure modes depend on local state
//! that is expensive to inspect up front. An [`Escalation`] tries attempts
//! of increasing invasiveness in order and stops at the first success.

use crate::{Error, Result};

type Action<'a> = Box<dyn FnOnce() -> Result<()> + 'a>;

/// An ordered list of named attempts at one operation.
pub struct Escalation<'a> {
    operation: String,
    attempts: Vec<(String, Action<'a>)>,
}

/// The attempt that succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Position in the attempt list, starting at 0.
    pub index: usize,
    pub name: String,
}

/// Every attempt failed.
#[derive(Debug)]
pub struct Exhausted {
    pub operation: String,
    /// `(attempt name, error)` for each attempt, in order.
    pub failures: Vec<(String, Error)>,
}

impl<'a> Escalation<'a> {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            attempts: Vec::new(),
        }
    }

    /// Append an attempt, tried only if every earlier one failed.
    pub fn attempt(
        mut self,
        name: impl Into<String>,
        action: impl FnOnce() -> Result<()> + 'a,
    ) -> Self {
        self.attempts.push((name.into(), Box::new(action)));
        self
    }

    /// Run attempts in order until one succeeds.
    ///
    /// Each failure is logged at `warn` before moving on. An escalation
    /// with no attempts is immediately exhausted.
    pub fn run(self) -> std::result::Result<Resolved, Exhausted> {
        let mut failures = Vec::new();

        for (index, (name, action)) in self.attempts.into_iter().enumerate() {
            match action() {
                Ok(()) => {
                    tracing::debug!(operation = %self.operation, attempt = %name, "Attempt succeeded");
                    return Ok(Resolved { index, name });
                }
                Err(e) => {
                    tracing::warn!(
                        operation = %self.operation,
                        attempt = %name,
                        error = %e,
                        "Attempt failed, trying next strategy"
                    );
                    failures.push((name, e));
                }
            }
        }

        Err(Exhausted {
            operation: self.operation,
            failures,
        })
    }
}

impl Exhausted {
    /// Convert into the terminal reconciliation error.
    pub fn into_critical(self) -> Error {
        Error::CriticalReconciliation {
            operation: self.operation,
            attempts: self
                .failures
                .into_iter()
                .map(|(name, e)| format!("{name}: {e}"))
                .collect(),
        }
    }
}

impl From<Exhausted> for Error {
    fn from(exhausted: Exhausted) -> Self {
        exhausted.into_critical()
    }
}

//! Error accumulator.
//!
//! Independent checks push their batches here and the caller flattens them
//! at the end. In fail-fast mode the list keeps only the first error and
//! reports itself as done so loops can stop early.

use crate::error::Error;

/// Accumulates errors from independent sub-checks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorList {
    errors: Vec<Error>,
    fail_fast: bool,
}

impl ErrorList {
    /// Create an accumulating list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a list that saturates after its first error
    #[must_use]
    pub fn fail_fast() -> Self {
        Self {
            errors: Vec::new(),
            fail_fast: true,
        }
    }

    /// Create a list in the given mode
    #[must_use]
    pub fn with_mode(fail_fast: bool) -> Self {
        if fail_fast { Self::fail_fast() } else { Self::new() }
    }

    /// Append one error
    pub fn push(&mut self, error: Error) {
        if !self.is_done() {
            self.errors.push(error);
        }
    }

    /// Append a batch of errors
    pub fn extend(&mut self, errors: impl IntoIterator<Item = Error>) {
        for error in errors {
            if self.is_done() {
                break;
            }
            self.errors.push(error);
        }
    }

    /// Append the error side of a result and hand back its success value
    pub fn absorb<T>(&mut self, result: Result<T, Vec<Error>>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(errors) => {
                self.extend(errors);
                None
            }
        }
    }

    /// Whether no error has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of recorded errors
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether further checks are pointless (fail-fast and an error is recorded)
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.fail_fast && !self.errors.is_empty()
    }

    /// Whether this list is in fail-fast mode
    #[must_use]
    pub const fn is_fail_fast(&self) -> bool {
        self.fail_fast
    }

    /// Recorded errors
    #[must_use]
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Flatten into a vector
    #[must_use]
    pub fn into_vec(self) -> Vec<Error> {
        self.errors
    }

    /// `Ok(value)` when no error was recorded, otherwise every error
    ///
    /// # Errors
    ///
    /// Returns the accumulated errors when the list is not empty
    pub fn into_result<T>(self, value: T) -> Result<T, Vec<Error>> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }
}

impl From<ErrorList> for Vec<Error> {
    fn from(list: ErrorList) -> Self {
        list.into_vec()
    }
}

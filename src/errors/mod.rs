//! Service error type and deterministic error reporting.
//!
//! # Data Flow
//! ```text
//! handler returns Err(AppError)
//!     → IntoResponse stashes the error behind a bare 500
//!     → boundary.rs (innermost middleware) takes it back out,
//!       builds the chain.rs error tree, logs one error record and
//!       writes one problem response
//! ```

pub mod boundary;
pub mod chain;

pub use boundary::{handle_errors, ErrorBoundary, Problem};
pub use chain::{AggregateError, ErrorDetail, ErrorNode};

use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error as StdError;
use std::panic::Location;

use thiserror::Error;

/// Unhandled failure raised by a handler.
#[derive(Debug, Error)]
pub enum AppError {
    /// Requested sample does not exist.
    #[error("sample {id} was not found")]
    SampleNotFound { id: u64, meta: ErrorMeta },

    /// Any other failure reaching the boundary.
    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
        meta: ErrorMeta,
    },
}

impl AppError {
    #[track_caller]
    pub fn sample_not_found(id: u64) -> Self {
        Self::SampleNotFound {
            id,
            meta: ErrorMeta::capture(),
        }
    }

    #[track_caller]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
            meta: ErrorMeta::capture(),
        }
    }

    #[track_caller]
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
            meta: ErrorMeta::capture(),
        }
    }

    pub fn meta(&self) -> &ErrorMeta {
        match self {
            Self::SampleNotFound { meta, .. } | Self::Internal { meta, .. } => meta,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::SampleNotFound { .. } => "SampleNotFound",
            Self::Internal { .. } => "Internal",
        }
    }

    /// Builds the error tree for this error and everything underneath it.
    pub fn to_chain(&self) -> ErrorNode {
        let mut detail = ErrorDetail::new(self.label(), self.to_string())
            .with_location(self.meta().location().to_string());
        if let Some(stack) = self.meta().stack() {
            detail = detail.with_stack(stack);
        }
        ErrorNode::from_error_with_detail(detail, self)
    }
}

/// Where and under what call stack an [`AppError`] was raised.
#[derive(Debug)]
pub struct ErrorMeta {
    location: &'static Location<'static>,
    backtrace: Backtrace,
}

impl ErrorMeta {
    #[track_caller]
    fn capture() -> Self {
        Self {
            location: Location::caller(),
            backtrace: Backtrace::capture(),
        }
    }

    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Backtrace text when capture was enabled via `RUST_BACKTRACE`.
    pub fn stack(&self) -> Option<String> {
        match self.backtrace.status() {
            BacktraceStatus::Captured => Some(self.backtrace.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_record_the_raising_location() {
        let error = AppError::sample_not_found(7);
        assert!(error.meta().location().file().ends_with("mod.rs"));
        assert_eq!(error.to_string(), "sample 7 was not found");
    }

    #[test]
    fn chain_uses_variant_labels() {
        let error = AppError::internal("pipeline failed");
        let chain = error.to_chain();
        assert_eq!(
            chain.unwrap_messages(),
            "Exception of type Internal was thrown: pipeline failed"
        );
    }

    #[test]
    fn source_errors_extend_the_chain() {
        let cause = std::io::Error::other("disk on fire");
        let error = AppError::internal_with_source("pipeline failed", cause);
        let messages = error.to_chain().unwrap_messages();
        let lines: Vec<_> = messages.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "Exception of type Internal was thrown: pipeline failed"
        );
        assert!(lines[1].ends_with("was thrown: disk on fire"));
    }
}

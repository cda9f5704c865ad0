//! Deterministic rendering of error chains and fan-out failures.
//!
//! The native error value is inspected once at the boundary and turned into
//! an explicit tree; the renderers and the side-effecting visitor then share
//! a single traversal, so text order and visit order are interchangeable.

use std::error::Error as StdError;
use std::fmt::Write;

use thiserror::Error;

/// Facts rendered for one node of an error tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    pub type_name: String,
    pub message: String,
    pub stack: Option<String>,
    pub location: Option<String>,
}

impl ErrorDetail {
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
            stack: None,
            location: None,
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Best-effort facts for a foreign error value.
    pub fn from_error(error: &(dyn StdError + 'static)) -> Self {
        Self::new(type_label(error), error.to_string())
    }
}

/// An error bundling several independent failures, e.g. fanned-out work
/// joined back together.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct AggregateError {
    message: String,
    errors: Vec<Box<dyn StdError + Send + Sync>>,
}

impl AggregateError {
    pub fn new(
        message: impl Into<String>,
        errors: impl IntoIterator<Item = Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            errors: errors.into_iter().collect(),
        }
    }

    /// Child errors with nested aggregates collapsed into one ordered list.
    pub fn flattened(&self) -> Vec<&(dyn StdError + 'static)> {
        fn collect<'a>(
            errors: &'a [Box<dyn StdError + Send + Sync>],
            out: &mut Vec<&'a (dyn StdError + 'static)>,
        ) {
            for error in errors {
                let error: &(dyn StdError + 'static) = &**error;
                match error.downcast_ref::<AggregateError>() {
                    Some(nested) => collect(&nested.errors, out),
                    None => out.push(error),
                }
            }
        }

        let mut out = Vec::new();
        collect(&self.errors, &mut out);
        out
    }
}

/// Explicit error tree: a lone failure, a cause chain, or a fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorNode {
    Leaf(ErrorDetail),
    Chained(ErrorDetail, Box<ErrorNode>),
    FanOut(ErrorDetail, Vec<ErrorNode>),
}

impl ErrorNode {
    /// Inspects a native error value once and builds the tree.
    pub fn from_error(error: &(dyn StdError + 'static)) -> Self {
        Self::build(ErrorDetail::from_error(error), error)
    }

    /// Same construction with a caller-supplied root detail, for roots that
    /// carry richer facts than a `dyn Error` can surface.
    pub fn from_error_with_detail(detail: ErrorDetail, error: &(dyn StdError + 'static)) -> Self {
        Self::build(detail, error)
    }

    fn build(detail: ErrorDetail, error: &(dyn StdError + 'static)) -> Self {
        if let Some(aggregate) = error.downcast_ref::<AggregateError>() {
            let children = aggregate
                .flattened()
                .into_iter()
                .map(Self::from_error)
                .collect();
            Self::FanOut(detail, children)
        } else if let Some(source) = error.source() {
            Self::Chained(detail, Box::new(Self::from_error(source)))
        } else {
            Self::Leaf(detail)
        }
    }

    pub fn detail(&self) -> &ErrorDetail {
        match self {
            Self::Leaf(detail) | Self::Chained(detail, _) | Self::FanOut(detail, _) => detail,
        }
    }

    /// Applies `action` to every node, in exactly the order the text
    /// renderers emit them.
    pub fn visit(&self, action: &mut impl FnMut(&ErrorDetail)) {
        action(self.detail());
        match self {
            Self::Leaf(_) => {}
            Self::Chained(_, cause) => cause.visit(action),
            Self::FanOut(_, children) => {
                for child in children {
                    child.visit(action);
                }
            }
        }
    }

    /// Messages and stack traces for the complete tree.
    pub fn unwrap_full(&self) -> String {
        self.unwrap_with(format_full)
    }

    /// Stack traces only.
    pub fn unwrap_stack_traces(&self) -> String {
        self.unwrap_with(format_stack_trace)
    }

    /// Messages only.
    pub fn unwrap_messages(&self) -> String {
        self.unwrap_with(format_message)
    }

    fn unwrap_with(&self, format: fn(&mut String, &ErrorDetail, bool)) -> String {
        let mut out = String::new();
        let mut first = true;
        self.visit(&mut |detail| {
            format(&mut out, detail, !first);
            first = false;
        });
        out
    }
}

fn format_full(out: &mut String, detail: &ErrorDetail, line_break: bool) {
    if line_break {
        out.push('\n');
    }
    let _ = write!(
        out,
        "Exception of type {} with message: {}\nwas thrown at: {}",
        detail.type_name,
        detail.message,
        detail.stack.as_deref().unwrap_or("")
    );
}

fn format_stack_trace(out: &mut String, detail: &ErrorDetail, line_break: bool) {
    if line_break {
        out.push('\n');
    }
    let _ = write!(
        out,
        "Exception of type {} was thrown at: {}",
        detail.type_name,
        detail.stack.as_deref().unwrap_or("")
    );
}

fn format_message(out: &mut String, detail: &ErrorDetail, line_break: bool) {
    if line_break {
        out.push('\n');
    }
    let _ = write!(
        out,
        "Exception of type {} was thrown: {}",
        detail.type_name, detail.message
    );
}

/// The leading identifier of the `Debug` representation; for derived errors
/// this is the struct or variant name.
fn type_label(error: &(dyn StdError + 'static)) -> String {
    let debug = format!("{error:?}");
    let label: String = debug
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if label.is_empty() {
        "Error".to_owned()
    } else {
        label
    }
}

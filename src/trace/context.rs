//! W3C `traceparent` header construction and parsing.
//!
//! See <https://w3c.github.io/trace-context/#traceparent-header-field-values>
//! for the header layout: `{version}-{trace-id}-{parent-id}-{flags}`.

use std::fmt;
use std::sync::OnceLock;

use thiserror::Error;
use uuid::Uuid;

const VERSION: &str = "00";

const FLAG_SAMPLED: u8 = 1;
const FLAG_RANDOM: u8 = 2;

const PARENT_ID_LENGTH: usize = 16;
const CORRELATION_ID_LENGTH: usize = 32;

/// Validation failure while constructing a [`TraceContext`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TraceContextError {
    /// The parent id is not exactly 16 lowercase hexadecimal characters.
    #[error("parent id must be a 16 character lowercase hexadecimal string")]
    InvalidParentId,

    /// The correlation id is not exactly 32 lowercase hexadecimal characters.
    #[error("correlation id must be a 32 character lowercase hexadecimal string")]
    InvalidCorrelationId,

    /// The header value does not have the `00-{32 hex}-{16 hex}-{2 hex}` shape.
    #[error("malformed traceparent header value")]
    MalformedHeader,
}

/// A W3C-style distributed trace identity.
///
/// The context is immutable once constructed: the `sampled` flag is only
/// settable through the by-value [`TraceContext::sampled`] builder, which
/// discards any previous render, so the memoized header value can never go
/// stale.
#[derive(Debug, Clone)]
pub struct TraceContext {
    correlation_id: String,
    parent_id: String,
    sampled: bool,
    rendered: OnceLock<String>,
}

impl TraceContext {
    /// Creates a context with a random parent id and a fresh correlation id.
    pub fn new() -> Self {
        let bytes: [u8; 8] = rand::random();
        let parent_id = bytes.iter().map(|b| format!("{b:02x}")).collect();

        Self {
            correlation_id: Uuid::new_v4().simple().to_string(),
            parent_id,
            sampled: false,
            rendered: OnceLock::new(),
        }
    }

    /// Builds a context from caller-supplied ids, validating both.
    pub fn parse(parent_id: &str, correlation_id: &str) -> Result<Self, TraceContextError> {
        if parent_id.len() != PARENT_ID_LENGTH || !is_lowercase_hex(parent_id) {
            return Err(TraceContextError::InvalidParentId);
        }

        if correlation_id.len() != CORRELATION_ID_LENGTH || !is_lowercase_hex(correlation_id) {
            return Err(TraceContextError::InvalidCorrelationId);
        }

        Ok(Self {
            correlation_id: correlation_id.to_owned(),
            parent_id: parent_id.to_owned(),
            sampled: false,
            rendered: OnceLock::new(),
        })
    }

    /// Parses a full `traceparent` header value.
    pub fn from_header(value: &str) -> Result<Self, TraceContextError> {
        let mut parts = value.split('-');
        let (version, correlation_id, parent_id, flags) = match (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) {
            (Some(version), Some(correlation_id), Some(parent_id), Some(flags), None) => {
                (version, correlation_id, parent_id, flags)
            }
            _ => return Err(TraceContextError::MalformedHeader),
        };

        if version != VERSION || flags.len() != 2 || !is_lowercase_hex(flags) {
            return Err(TraceContextError::MalformedHeader);
        }

        let flags = u8::from_str_radix(flags, 16).map_err(|_| TraceContextError::MalformedHeader)?;

        Ok(Self::parse(parent_id, correlation_id)?.sampled(flags & FLAG_SAMPLED != 0))
    }

    /// Sets the sampled flag. Consumes the context and drops any previous
    /// render, so a rendered value observed by callers is always final.
    pub fn sampled(mut self, sampled: bool) -> Self {
        self.sampled = sampled;
        self.rendered = OnceLock::new();
        self
    }

    pub fn is_sampled(&self) -> bool {
        self.sampled
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn parent_id(&self) -> &str {
        &self.parent_id
    }

    /// Renders the `traceparent` value; computed once and reused afterwards.
    pub fn render(&self) -> &str {
        self.rendered.get_or_init(|| {
            let flags = FLAG_RANDOM | if self.sampled { FLAG_SAMPLED } else { 0 };
            format!(
                "{VERSION}-{}-{}-{flags:02x}",
                self.correlation_id, self.parent_id
            )
        })
    }
}

impl Default for TraceContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TraceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.render())
    }
}

fn is_lowercase_hex(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARENT: &str = "b7ad6b7169203331";
    const CORRELATION: &str = "0af7651916cd43dd8448eb211c80319c";

    #[test]
    fn new_context_has_valid_ids() {
        let ctx = TraceContext::new();
        assert_eq!(ctx.parent_id().len(), 16);
        assert_eq!(ctx.correlation_id().len(), 32);
        assert!(is_lowercase_hex(ctx.parent_id()));
        assert!(is_lowercase_hex(ctx.correlation_id()));
        assert!(!ctx.is_sampled());
    }

    #[test]
    fn render_produces_w3c_layout() {
        let ctx = TraceContext::parse(PARENT, CORRELATION).unwrap();
        assert_eq!(ctx.render(), format!("00-{CORRELATION}-{PARENT}-02"));
    }

    #[test]
    fn render_reflects_sampled_flag() {
        let ctx = TraceContext::parse(PARENT, CORRELATION).unwrap().sampled(true);
        assert_eq!(ctx.render(), format!("00-{CORRELATION}-{PARENT}-03"));
    }

    #[test]
    fn render_is_idempotent() {
        let ctx = TraceContext::new();
        let first = ctx.render().to_owned();
        assert_eq!(ctx.render(), first);
        assert_eq!(ctx.to_string(), first);
    }

    #[test]
    fn reparse_of_rendered_value_roundtrips() {
        let ctx = TraceContext::parse(PARENT, CORRELATION).unwrap().sampled(true);
        let reparsed = TraceContext::from_header(ctx.render()).unwrap();
        assert_eq!(reparsed.correlation_id(), CORRELATION);
        assert_eq!(reparsed.parent_id(), PARENT);
        assert!(reparsed.is_sampled());
        assert_eq!(reparsed.render(), ctx.render());
    }

    #[test]
    fn parse_rejects_wrong_lengths() {
        // one short and one long of each id length
        assert_eq!(
            TraceContext::parse(&PARENT[..15], CORRELATION).unwrap_err(),
            TraceContextError::InvalidParentId
        );
        assert_eq!(
            TraceContext::parse(&format!("{PARENT}a"), CORRELATION).unwrap_err(),
            TraceContextError::InvalidParentId
        );
        assert_eq!(
            TraceContext::parse(PARENT, &CORRELATION[..31]).unwrap_err(),
            TraceContextError::InvalidCorrelationId
        );
        assert_eq!(
            TraceContext::parse(PARENT, &format!("{CORRELATION}a")).unwrap_err(),
            TraceContextError::InvalidCorrelationId
        );
    }

    #[test]
    fn parse_rejects_uppercase_and_non_hex() {
        assert_eq!(
            TraceContext::parse(&PARENT.to_uppercase(), CORRELATION).unwrap_err(),
            TraceContextError::InvalidParentId
        );
        assert_eq!(
            TraceContext::parse(PARENT, &CORRELATION.to_uppercase()).unwrap_err(),
            TraceContextError::InvalidCorrelationId
        );
        assert_eq!(
            TraceContext::parse("b7ad6b716920333g", CORRELATION).unwrap_err(),
            TraceContextError::InvalidParentId
        );
    }

    #[test]
    fn from_header_rejects_malformed_values() {
        let values = [
            String::new(),
            "00".to_owned(),
            format!("01-{CORRELATION}-{PARENT}-02"),
            format!("00-{CORRELATION}-{PARENT}"),
            format!("00-{CORRELATION}-{PARENT}-02-extra"),
            format!("00-{CORRELATION}-{PARENT}-2"),
            format!("00-{CORRELATION}-{PARENT}-ZZ"),
        ];
        for value in &values {
            assert!(TraceContext::from_header(value).is_err(), "{value:?}");
        }
    }
}

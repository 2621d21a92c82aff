use std::fmt;

use thiserror::Error;

/// Rejected call parameters or malformed input tables.
///
/// This is the only failure the core propagates to callers. Unreachable
/// targets, empty inputs and clustering failures all resolve to ordinary
/// result values instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("k must be at least 1")]
    ZeroK,

    #[error("node at position {position} has an empty id")]
    EmptyNodeId { position: usize },

    #[error("duplicate node id: {0}")]
    DuplicateNodeId(String),

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl ValidationError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::ZeroK | Self::InvalidParameter { .. } => ErrorCode::InvalidParameter,
            Self::EmptyNodeId { .. } | Self::DuplicateNodeId(_) => ErrorCode::InvalidGraph,
        }
    }
}

/// Stable failure classes surfaced by the `aopnet` binary.
///
/// `1xxx` codes are caller mistakes, `2xxx` are environment problems,
/// `9xxx` are bugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidParameter,
    InvalidGraph,
    InputUnreadable,
    ConfigParseError,
    InternalUnexpected,
}

impl ErrorCode {
    pub const ALL: [Self; 5] = [
        Self::InvalidParameter,
        Self::InvalidGraph,
        Self::InputUnreadable,
        Self::ConfigParseError,
        Self::InternalUnexpected,
    ];

    // (code, summary, hint)
    const fn entry(self) -> (&'static str, &'static str, Option<&'static str>) {
        match self {
            Self::InvalidParameter => (
                "E1001",
                "invalid parameter",
                Some("k, max-seeds and max-frontier must all be at least 1."),
            ),
            Self::InvalidGraph => (
                "E1002",
                "invalid graph tables",
                Some("Every node needs a unique, non-empty id."),
            ),
            Self::InputUnreadable => (
                "E2001",
                "graph input unreadable",
                Some("Pass a JSON document with `nodes` and `edges` arrays via --input."),
            ),
            Self::ConfigParseError => (
                "E2002",
                "config file invalid",
                Some("Check the TOML syntax of the aopnet config file."),
            ),
            Self::InternalUnexpected => ("E9001", "internal error", None),
        }
    }

    /// `E####` identifier.
    #[must_use]
    pub const fn code(self) -> &'static str {
        self.entry().0
    }

    #[must_use]
    pub const fn summary(self) -> &'static str {
        self.entry().1
    }

    /// Remediation hint, when there is a useful one.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        self.entry().2
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.summary())
    }
}

//! Error types for push synchronisation domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing push synchronisation domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PushSyncDomainError {
    /// The work item identifier is zero or exceeds the persisted range.
    #[error("invalid work item id {0}, expected a positive integer")]
    InvalidWorkItemId(u64),

    /// The project identifier is zero or exceeds the persisted range.
    #[error("invalid project id {0}, expected a positive integer")]
    InvalidProjectId(u64),

    /// The git ref does not name a branch.
    #[error("invalid git ref '{0}', expected refs/heads/<branch>")]
    InvalidGitRef(String),

    /// The commit identifier is empty after trimming.
    #[error("commit id must not be empty")]
    EmptyCommitId,

    /// The status keyword table contains no usable keywords.
    #[error("status keyword table must contain at least one keyword")]
    EmptyKeywordTable,

    /// A status keyword contains characters the commit grammar cannot match.
    #[error("invalid status keyword '{0}', expected ASCII letters or underscores")]
    InvalidKeyword(String),

    /// A commit message grammar failed to compile.
    #[error("failed to compile commit grammar: {0}")]
    Grammar(String),
}

/// Error returned while parsing canonical statuses from persistence or
/// configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown work item status: {0}")]
pub struct ParseWorkItemStatusError(pub String);

/// Errors returned while normalising an inbound push payload.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PushPayloadError {
    /// The body is not valid JSON or does not match the push shape.
    #[error("invalid JSON payload: {0}")]
    MalformedJson(String),

    /// A required field is absent.
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    /// A field is present but its value is unusable.
    #[error(transparent)]
    Domain(#[from] PushSyncDomainError),
}

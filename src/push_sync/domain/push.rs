//! Inbound push events and their normalisation from webhook JSON.
//!
//! Two payload shapes are accepted: a `commits` array and a single
//! `head_commit`. Both are normalised here into an ordered commit sequence so
//! the engine never sees the difference.

use super::{BranchName, CommitId, PushPayloadError};
use serde::Deserialize;
use serde_json::{Value, json};

/// A commit carried by a push event.
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    id: CommitId,
    message: String,
    author_name: Option<String>,
    raw: Value,
}

impl Commit {
    /// Creates a commit from its parts. The raw representation is synthesised.
    #[must_use]
    pub fn new(id: CommitId, message: impl Into<String>) -> Self {
        let text = message.into();
        let raw = json!({ "id": id.as_str(), "message": text });
        Self {
            id,
            message: text,
            author_name: None,
            raw,
        }
    }

    /// Sets the author name.
    #[must_use]
    pub fn with_author(mut self, author_name: impl Into<String>) -> Self {
        let name = author_name.into();
        if let Some(object) = self.raw.as_object_mut() {
            object.insert("author".to_owned(), json!({ "name": name }));
        }
        self.author_name = Some(name);
        self
    }

    fn from_raw(raw: Value) -> Result<Self, PushPayloadError> {
        let id = raw
            .get("id")
            .and_then(Value::as_str)
            .ok_or(PushPayloadError::MissingField("commit.id"))
            .and_then(|raw_id| CommitId::new(raw_id).map_err(PushPayloadError::from))?;
        let message = raw
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        let author_name = raw
            .get("author")
            .and_then(|author| author.get("name"))
            .and_then(Value::as_str)
            .map(str::to_owned);

        Ok(Self {
            id,
            message,
            author_name,
            raw,
        })
    }

    /// Returns the commit identifier.
    #[must_use]
    pub const fn id(&self) -> &CommitId {
        &self.id
    }

    /// Returns the full commit message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the author display name, if the payload carried one.
    #[must_use]
    pub fn author_name(&self) -> Option<&str> {
        self.author_name.as_deref()
    }

    /// Returns the commit object exactly as received.
    #[must_use]
    pub const fn raw(&self) -> &Value {
        &self.raw
    }
}

/// A push to one branch, with its commits in payload order.
#[derive(Debug, Clone, PartialEq)]
pub struct PushEvent {
    branch: BranchName,
    commits: Vec<Commit>,
    repository: Option<String>,
    pusher: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PushPayload {
    #[serde(rename = "ref")]
    git_ref: Option<String>,
    #[serde(default)]
    commits: Option<Vec<Value>>,
    #[serde(default)]
    head_commit: Option<Value>,
    #[serde(default)]
    repository: Option<Value>,
    #[serde(default)]
    pusher: Option<Value>,
}

impl PushEvent {
    /// Creates a push event from normalised parts.
    #[must_use]
    pub const fn new(branch: BranchName, commits: Vec<Commit>) -> Self {
        Self {
            branch,
            commits,
            repository: None,
            pusher: None,
        }
    }

    /// Sets the repository name carried through to the activity log.
    #[must_use]
    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    /// Sets the pusher name carried through to the activity log.
    #[must_use]
    pub fn with_pusher(mut self, pusher: impl Into<String>) -> Self {
        self.pusher = Some(pusher.into());
        self
    }

    /// Parses and normalises a webhook body.
    ///
    /// A non-empty `commits` array wins; otherwise a non-null `head_commit`
    /// becomes a one-element sequence; otherwise the push has no commits.
    ///
    /// # Errors
    ///
    /// Returns [`PushPayloadError::MalformedJson`] for unparseable bodies,
    /// [`PushPayloadError::MissingField`] when `ref` or a commit `id` is
    /// absent, and [`PushPayloadError::Domain`] when the ref names no branch.
    pub fn from_json_slice(body: &[u8]) -> Result<Self, PushPayloadError> {
        let payload: PushPayload = serde_json::from_slice(body)
            .map_err(|err| PushPayloadError::MalformedJson(err.to_string()))?;
        Self::from_payload(payload)
    }

    fn from_payload(payload: PushPayload) -> Result<Self, PushPayloadError> {
        let git_ref = payload
            .git_ref
            .ok_or(PushPayloadError::MissingField("ref"))?;
        let branch = BranchName::from_git_ref(&git_ref)?;

        let raw_commits = match (payload.commits, payload.head_commit) {
            (Some(commits), _) if !commits.is_empty() => commits,
            (_, Some(head_commit)) if !head_commit.is_null() => vec![head_commit],
            _ => Vec::new(),
        };
        let commits = raw_commits
            .into_iter()
            .map(Commit::from_raw)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            branch,
            commits,
            repository: name_of(payload.repository.as_ref()),
            pusher: name_of(payload.pusher.as_ref()),
        })
    }

    /// Returns the target branch.
    #[must_use]
    pub const fn branch(&self) -> &BranchName {
        &self.branch
    }

    /// Returns the commits in payload order.
    #[must_use]
    pub fn commits(&self) -> &[Commit] {
        &self.commits
    }

    /// Returns the repository name, if present.
    #[must_use]
    pub fn repository(&self) -> Option<&str> {
        self.repository.as_deref()
    }

    /// Returns the pusher name, if present.
    #[must_use]
    pub fn pusher(&self) -> Option<&str> {
        self.pusher.as_deref()
    }
}

fn name_of(entity: Option<&Value>) -> Option<String> {
    entity
        .and_then(|value| value.get("name"))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

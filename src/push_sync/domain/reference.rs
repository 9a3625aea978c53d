//! Task reference extraction from free-text commit messages.

use super::{PushSyncDomainError, StatusTable, WorkItemId};
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;
use std::ops::Range;

/// `TASK-12:#done`, `bug-7 : #inprogress`.
const EXPLICIT_PATTERN: &str = r"\b[A-Z]+-(?P<id>\d+)\s*:\s*#(?P<keyword>[A-Z_]+)\b";

/// `TASK-12`, `wi-9`.
const REFERENCE_PATTERN: &str = r"\b[A-Z]+-(?P<id>\d+)\b";

/// A work item mention carrying an inline status annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReference {
    id: WorkItemId,
    keyword: String,
}

impl TaskReference {
    /// Creates an explicit reference.
    #[must_use]
    pub fn new(id: WorkItemId, keyword: impl Into<String>) -> Self {
        Self {
            id,
            keyword: keyword.into(),
        }
    }

    /// Returns the referenced work item.
    #[must_use]
    pub const fn id(&self) -> WorkItemId {
        self.id
    }

    /// Returns the annotation keyword exactly as written.
    #[must_use]
    pub fn keyword(&self) -> &str {
        &self.keyword
    }
}

/// Everything the grammar found in one commit message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedReferences {
    explicit: Vec<TaskReference>,
    mentioned: Vec<WorkItemId>,
    global_keyword: Option<String>,
}

impl ExtractedReferences {
    /// Explicit `(id, keyword)` annotations in message order, duplicates kept.
    #[must_use]
    pub fn explicit(&self) -> &[TaskReference] {
        &self.explicit
    }

    /// Every referenced id, de-duplicated, in first-appearance order.
    #[must_use]
    pub fn mentioned(&self) -> &[WorkItemId] {
        &self.mentioned
    }

    /// The first free-standing `#keyword`, if any.
    #[must_use]
    pub fn global_keyword(&self) -> Option<&str> {
        self.global_keyword.as_deref()
    }

    /// Returns `true` when the message references no work item at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.explicit.is_empty() && self.mentioned.is_empty()
    }
}

/// Compiled commit message grammars.
///
/// Built once from a [`StatusTable`] and shared; extraction never recompiles.
///
/// # Examples
///
///     use pms_sync::push_sync::domain::{ReferenceGrammar, StatusTable};
///
///     let grammar = ReferenceGrammar::compile(&StatusTable::default()).expect("grammar");
///     let found = grammar.extract("TASK-12:#done fixes BUG-7 #start");
///     assert_eq!(found.explicit().len(), 1);
///     assert_eq!(found.mentioned().len(), 2);
///     assert_eq!(found.global_keyword(), Some("start"));
#[derive(Debug, Clone)]
pub struct ReferenceGrammar {
    explicit: Regex,
    reference: Regex,
    global: Regex,
}

impl ReferenceGrammar {
    /// Compiles the grammars for the keywords of `table`.
    ///
    /// # Errors
    ///
    /// Returns [`PushSyncDomainError::Grammar`] if a pattern fails to compile.
    pub fn compile(table: &StatusTable) -> Result<Self, PushSyncDomainError> {
        let mut keywords: Vec<&str> = table.keywords().collect();
        // Longest first so that `complete` never shadows `completed`.
        keywords.sort_by(|left, right| right.len().cmp(&left.len()).then(left.cmp(right)));
        let alternatives = keywords
            .iter()
            .map(|keyword| regex::escape(keyword))
            .collect::<Vec<_>>()
            .join("|");
        let global_pattern = format!("#(?P<keyword>{alternatives})");

        Ok(Self {
            explicit: case_insensitive(EXPLICIT_PATTERN)?,
            reference: case_insensitive(REFERENCE_PATTERN)?,
            global: case_insensitive(&global_pattern)?,
        })
    }

    /// Scans a commit message.
    ///
    /// A `#keyword` belonging to an explicit annotation is never reported as
    /// the global keyword.
    #[must_use]
    pub fn extract(&self, message: &str) -> ExtractedReferences {
        let mut explicit = Vec::new();
        let mut annotated_spans: Vec<Range<usize>> = Vec::new();
        for captures in self.explicit.captures_iter(message) {
            let (Some(whole), Some(id), Some(keyword)) = (
                captures.get(0),
                captures.name("id"),
                captures.name("keyword"),
            ) else {
                continue;
            };
            annotated_spans.push(whole.range());
            if let Some(work_item_id) = WorkItemId::parse_digits(id.as_str()) {
                explicit.push(TaskReference::new(work_item_id, keyword.as_str()));
            }
        }

        let mut seen = HashSet::new();
        let mentioned = self
            .reference
            .captures_iter(message)
            .filter_map(|captures| captures.name("id"))
            .filter_map(|id| WorkItemId::parse_digits(id.as_str()))
            .filter(|id| seen.insert(*id))
            .collect();

        let global_keyword = self
            .global
            .captures_iter(message)
            .filter_map(|captures| captures.name("keyword"))
            .find(|keyword| {
                !annotated_spans
                    .iter()
                    .any(|span| span.contains(&keyword.start()))
            })
            .map(|keyword| keyword.as_str().to_owned());

        ExtractedReferences {
            explicit,
            mentioned,
            global_keyword,
        }
    }
}

fn case_insensitive(pattern: &str) -> Result<Regex, PushSyncDomainError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|err| PushSyncDomainError::Grammar(err.to_string()))
}

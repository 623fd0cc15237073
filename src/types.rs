use serde::{Serialize, Deserialize};

/// One semantically coherent chunk (ACU) of the original reference passage.
///
/// Units are produced upstream and are read-only here. `start`/`end` are
/// character offsets into the passage; the default containment matcher does
/// not look at them, the offset matcher does.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceUnit {
    pub span: String,
    pub start: usize,
    pub end: usize,
    pub sid: u32,
}

impl ReferenceUnit {
    pub fn new<S: Into<String>>(span: S, start: usize, end: usize, sid: u32) -> Self {
        Self {
            span: span.into(),
            start,
            end,
            sid,
        }
    }

    /// Span length in characters.
    pub fn char_len(&self) -> usize {
        self.span.chars().count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Match,
    Insert,
    Delete,
    Substitute,
}


/// A single primitive edit step turning the target sequence into the said one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentOperation {
    pub kind: OperationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub said_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub said_token: Option<String>,
}

impl AlignmentOperation {
    /// Diagonal step: `Match` when the tokens are equal, `Substitute` otherwise.
    pub fn diagonal(target_index: usize, said_index: usize, target_token: &str, said_token: &str) -> Self {
        let kind = if target_token == said_token {
            OperationKind::Match
        } else {
            OperationKind::Substitute
        };
        Self {
            kind,
            target_index: Some(target_index),
            said_index: Some(said_index),
            target_token: Some(target_token.to_string()),
            said_token: Some(said_token.to_string()),
        }
    }

    pub fn delete(target_index: usize, target_token: &str) -> Self {
        Self {
            kind: OperationKind::Delete,
            target_index: Some(target_index),
            said_index: None,
            target_token: Some(target_token.to_string()),
            said_token: None,
        }
    }

    pub fn insert(said_index: usize, said_token: &str) -> Self {
        Self {
            kind: OperationKind::Insert,
            target_index: None,
            said_index: Some(said_index),
            target_token: None,
            said_token: Some(said_token.to_string()),
        }
    }

    pub fn is_match(&self) -> bool {
        self.kind == OperationKind::Match
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The learner produced tokens that are not in the reference.
    Extra,
    /// The learner skipped reference tokens.
    Missing,
    /// The learner produced different tokens in place of reference ones.
    Substitution,
}


/// One reported reading error.
///
/// `position` indexes the said sequence for `Extra` and the target sequence
/// for the other two kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentError {
    pub kind: ErrorKind,
    pub position: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    pub actual: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<ReferenceUnit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_context: Option<String>,
}

/// Ordered edit script plus its total cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditScript {
    pub distance: usize,
    pub operations: Vec<AlignmentOperation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ErrorLists {
    pub extra: Vec<AlignmentError>,
    pub missing: Vec<AlignmentError>,
    pub substitution: Vec<AlignmentError>,
}

impl ErrorLists {
    pub fn is_empty(&self) -> bool {
        self.extra.is_empty() && self.missing.is_empty() && self.substitution.is_empty()
    }

    pub fn push(&mut self, error: AlignmentError) {
        match error.kind {
            ErrorKind::Extra => self.extra.push(error),
            ErrorKind::Missing => self.missing.push(error),
            ErrorKind::Substitution => self.substitution.push(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentResult {
    pub distance: usize,
    pub operations: Vec<AlignmentOperation>,
    pub extra: Vec<AlignmentError>,
    pub missing: Vec<AlignmentError>,
    pub substitution: Vec<AlignmentError>,
}

impl AlignmentResult {
    pub fn from_parts(script: EditScript, errors: ErrorLists) -> Self {
        Self {
            distance: script.distance,
            operations: script.operations,
            extra: errors.extra,
            missing: errors.missing,
            substitution: errors.substitution,
        }
    }

    pub fn error_count(&self) -> usize {
        self.extra.len() + self.missing.len() + self.substitution.len()
    }

    pub fn is_perfect(&self) -> bool {
        self.distance == 0
    }

    /// Expected texts of every missing error, in report order.
    pub fn missing_texts(&self) -> Vec<String> {
        self.missing
            .iter()
            .map(|e| e.expected.clone().unwrap_or_default())
            .collect()
    }

    /// Actual texts of every extra error, in report order.
    pub fn extra_texts(&self) -> Vec<String> {
        self.extra.iter().map(|e| e.actual.clone()).collect()
    }
}

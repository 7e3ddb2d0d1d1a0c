use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::listing::Listing;

/// One entry of the write-only rejection audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectionRecord {
    #[serde(rename = "firebaseKey")]
    pub item_key: String,
    pub reason: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Per-listing rejection draft. A listing with no draft is `Closed`; a
/// successfully submitted draft leaves the listing hidden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "text", rename_all = "snake_case")]
pub enum RejectionDraft {
    Editing(String),
    Submitting(String),
}

impl RejectionDraft {
    pub fn text(&self) -> &str {
        match self {
            Self::Editing(text) | Self::Submitting(text) => text,
        }
    }
}

/// Derived view of one visible listing. Recomputed on every read.
#[derive(Debug, Clone, Serialize)]
pub struct ModerationEntry {
    pub listing: Listing,
    pub is_approved: bool,
    /// Approve and reject are only offered while the listing is unapproved.
    pub can_moderate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<RejectionDraft>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Listings,
    Approvals,
    RejectionCache,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    Fetch,
    CacheParse,
}

/// Non-fatal problem observed while loading. The view still renders with
/// defaults for the affected source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadWarning {
    pub source: DataSource,
    pub kind: WarningKind,
    pub message: String,
}

impl LoadWarning {
    /// Cache parse problems are logged only, never shown to the moderator.
    pub fn is_user_visible(&self) -> bool {
        self.kind != WarningKind::CacheParse
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub listings: usize,
    pub approvals: usize,
    pub hidden: usize,
    pub warnings: Vec<LoadWarning>,
}

/// Result of an action that passed its preconditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    Applied,
    AlreadyApproved,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModerationPage {
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub entries: Vec<ModerationEntry>,
    pub warnings: Vec<LoadWarning>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ModerationCounts {
    pub total: usize,
    pub visible: usize,
    pub approved: usize,
    pub pending: usize,
    pub hidden: usize,
}

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::{Mutex, MutexGuard};

use crate::app::pagination::{paginate, total_pages};
use crate::app::ports::{ApprovalStore, Confirmer, ItemsStore, KeyValueStore, RejectionLog};
use crate::domain::listing::Listing;
use crate::domain::moderation::{
    ActionOutcome, DataSource, LoadReport, LoadWarning, ModerationCounts, ModerationEntry,
    ModerationPage, RejectionDraft, RejectionRecord, WarningKind,
};

/// Logical name the rejection cache is persisted under.
pub const REJECTION_CACHE_NAME: &str = "rejectedPosts";
pub const DEFAULT_PAGE_SIZE: usize = 3;

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("listing {0} not found")]
    NotFound(String),
    #[error("listing {0} has been rejected")]
    Hidden(String),
    #[error("listing {0} is already approved")]
    AlreadyApproved(String),
    #[error("{0}")]
    Validation(String),
    #[error("rejection of listing {0} is already being submitted")]
    SubmissionInFlight(String),
    #[error("no rejection draft is open for listing {0}")]
    DraftNotOpen(String),
    #[error("action declined")]
    Declined,
    #[error("failed to {action} listing {key}")]
    Write {
        action: &'static str,
        key: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("moderation view has been closed")]
    Closed,
}

impl ModerationError {
    fn write(action: &'static str, key: &str, source: anyhow::Error) -> Self {
        Self::Write {
            action,
            key: key.to_string(),
            source,
        }
    }
}

/// The remote and local stores the reconciler joins together.
#[derive(Clone)]
pub struct ModerationPorts {
    pub items: Arc<dyn ItemsStore>,
    pub approvals: Arc<dyn ApprovalStore>,
    pub rejections: Arc<dyn RejectionLog>,
    pub local: Arc<dyn KeyValueStore>,
}

#[derive(Default)]
struct ModerationState {
    listings: Vec<Listing>,
    approvals: HashMap<String, bool>,
    rejected: BTreeSet<String>,
    drafts: HashMap<String, RejectionDraft>,
    warnings: Vec<LoadWarning>,
    load_generation: u64,
}

impl ModerationState {
    fn find(&self, key: &str) -> Option<&Listing> {
        self.listings.iter().find(|listing| listing.key == key)
    }

    fn is_approved(&self, key: &str) -> bool {
        self.approvals.get(key).copied().unwrap_or(false)
    }

    /// Approve, reject and draft actions only exist for visible listings.
    fn check_actionable(&self, key: &str) -> Result<(), ModerationError> {
        if self.find(key).is_none() {
            return Err(ModerationError::NotFound(key.to_string()));
        }
        if self.rejected.contains(key) {
            return Err(ModerationError::Hidden(key.to_string()));
        }
        Ok(())
    }

    fn visible(&self) -> impl Iterator<Item = &Listing> {
        self.listings
            .iter()
            .filter(|listing| !self.rejected.contains(&listing.key))
    }

    fn entry(&self, listing: &Listing) -> ModerationEntry {
        let is_approved = self.is_approved(&listing.key);
        ModerationEntry {
            listing: listing.clone(),
            is_approved,
            can_moderate: !is_approved,
            draft: if is_approved {
                None
            } else {
                self.drafts.get(&listing.key).cloned()
            },
        }
    }

    fn report(&self) -> LoadReport {
        LoadReport {
            listings: self.listings.len(),
            approvals: self.approvals.values().filter(|approved| **approved).count(),
            hidden: self
                .listings
                .iter()
                .filter(|listing| self.rejected.contains(&listing.key))
                .count(),
            warnings: self.warnings.clone(),
        }
    }
}

/// Joins the listing list with the approval overlay and the locally
/// persisted rejection cache, and coordinates approve, reject and delete.
///
/// Network calls run with the state lock released; every completion applies
/// its update in one critical section and only on success. Once torn down,
/// late completions are discarded.
pub struct ModerationReconciler {
    ports: ModerationPorts,
    confirmer: Arc<dyn Confirmer>,
    page_size: usize,
    state: Mutex<ModerationState>,
    closed: AtomicBool,
}

impl ModerationReconciler {
    pub fn new(ports: ModerationPorts, confirmer: Arc<dyn Confirmer>, page_size: usize) -> Self {
        Self {
            ports,
            confirmer,
            page_size: page_size.max(1),
            state: Mutex::new(ModerationState::default()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    async fn live_state(&self) -> Result<MutexGuard<'_, ModerationState>, ModerationError> {
        let state = self.state.lock().await;
        if self.closed.load(Ordering::Acquire) {
            return Err(ModerationError::Closed);
        }
        Ok(state)
    }

    /// Marks the instance dead. Completions observed afterwards are ignored.
    pub async fn teardown(&self) {
        let _state = self.state.lock().await;
        self.closed.store(true, Ordering::Release);
        tracing::debug!("moderation reconciler torn down");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Fetches listings, approvals and the rejection cache concurrently and
    /// replaces the in-memory view once all three have settled.
    pub async fn load(&self) -> Result<LoadReport, ModerationError> {
        let generation = {
            let mut state = self.live_state().await?;
            state.load_generation += 1;
            state.load_generation
        };

        let (listings, approvals, cached) = tokio::join!(
            self.ports.items.list(),
            self.ports.approvals.get_all(),
            self.ports.local.get(REJECTION_CACHE_NAME),
        );

        let mut warnings = Vec::new();

        let listings = listings.unwrap_or_else(|err| {
            tracing::warn!(error = ?err, "failed to fetch listings");
            warnings.push(LoadWarning {
                source: DataSource::Listings,
                kind: WarningKind::Fetch,
                message: "failed to fetch listings".to_string(),
            });
            Vec::new()
        });

        let approvals = approvals.unwrap_or_else(|err| {
            tracing::warn!(error = ?err, "failed to fetch approvals");
            warnings.push(LoadWarning {
                source: DataSource::Approvals,
                kind: WarningKind::Fetch,
                message: "failed to fetch approvals".to_string(),
            });
            HashMap::new()
        });

        let cached = match cached {
            Ok(Some(raw)) => parse_rejection_cache(&raw).unwrap_or_else(|err| {
                tracing::warn!(error = %err, "malformed rejection cache, starting empty");
                warnings.push(LoadWarning {
                    source: DataSource::RejectionCache,
                    kind: WarningKind::CacheParse,
                    message: "malformed rejection cache".to_string(),
                });
                BTreeSet::new()
            }),
            Ok(None) => BTreeSet::new(),
            Err(err) => {
                tracing::warn!(error = ?err, "failed to read rejection cache, starting empty");
                warnings.push(LoadWarning {
                    source: DataSource::RejectionCache,
                    kind: WarningKind::CacheParse,
                    message: "failed to read rejection cache".to_string(),
                });
                BTreeSet::new()
            }
        };

        let mut state = self.live_state().await?;
        if state.load_generation != generation {
            tracing::debug!(generation, "discarding superseded load");
            return Ok(state.report());
        }

        state
            .drafts
            .retain(|key, _| listings.iter().any(|listing| &listing.key == key));
        state.listings = listings;
        state.approvals = approvals;
        // The cache only grows, so keys hidden while this load was in flight stay hidden.
        state.rejected.extend(cached);
        state.warnings = warnings;

        let report = state.report();
        tracing::info!(
            listings = report.listings,
            approvals = report.approvals,
            hidden = report.hidden,
            warnings = report.warnings.len(),
            "moderation view loaded"
        );
        Ok(report)
    }

    /// Listings not hidden by the rejection cache, in source order.
    pub async fn visible_items(&self) -> Vec<Listing> {
        let state = self.state.lock().await;
        state.visible().cloned().collect()
    }

    pub async fn entries(&self) -> Vec<ModerationEntry> {
        let state = self.state.lock().await;
        state.visible().map(|listing| state.entry(listing)).collect()
    }

    pub async fn page(&self, page: usize) -> ModerationPage {
        let state = self.state.lock().await;
        let visible: Vec<&Listing> = state.visible().collect();
        let entries = paginate(&visible, self.page_size, page)
            .iter()
            .map(|listing| state.entry(listing))
            .collect();

        ModerationPage {
            page,
            page_size: self.page_size,
            total_pages: total_pages(visible.len(), self.page_size),
            total_items: visible.len(),
            entries,
            warnings: state
                .warnings
                .iter()
                .filter(|warning| warning.is_user_visible())
                .cloned()
                .collect(),
        }
    }

    pub async fn counts(&self) -> ModerationCounts {
        let state = self.state.lock().await;
        let total = state.listings.len();
        let visible = state.visible().count();
        let approved = state
            .visible()
            .filter(|listing| state.is_approved(&listing.key))
            .count();

        ModerationCounts {
            total,
            visible,
            approved,
            pending: visible - approved,
            hidden: total - visible,
        }
    }

    pub async fn warnings(&self) -> Vec<LoadWarning> {
        self.state.lock().await.warnings.clone()
    }

    pub async fn is_approved(&self, key: &str) -> bool {
        self.state.lock().await.is_approved(key)
    }

    pub async fn is_hidden(&self, key: &str) -> bool {
        self.state.lock().await.rejected.contains(key)
    }

    pub async fn draft(&self, key: &str) -> Option<RejectionDraft> {
        self.state.lock().await.drafts.get(key).cloned()
    }

    pub async fn approve(&self, key: &str) -> Result<ActionOutcome, ModerationError> {
        {
            let state = self.live_state().await?;
            state.check_actionable(key)?;
            if state.is_approved(key) {
                return Ok(ActionOutcome::AlreadyApproved);
            }
            if let Some(RejectionDraft::Submitting(_)) = state.drafts.get(key) {
                return Err(ModerationError::SubmissionInFlight(key.to_string()));
            }
        }

        if !self
            .confirmer
            .confirm("You are about to approve this post.")
            .await
        {
            tracing::debug!(key = key, "approval declined");
            return Err(ModerationError::Declined);
        }

        if let Err(err) = self.ports.approvals.set_approved(key, true).await {
            tracing::error!(error = ?err, key = key, "failed to approve listing");
            return Err(ModerationError::write("approve", key, err));
        }

        let mut state = self.live_state().await?;
        state.approvals.insert(key.to_string(), true);
        if let Some(RejectionDraft::Editing(_)) = state.drafts.get(key) {
            state.drafts.remove(key);
        }
        tracing::info!(key = key, "listing approved");
        Ok(ActionOutcome::Applied)
    }

    /// Appends a rejection record and, once the log has accepted it, hides
    /// the listing through the local cache.
    pub async fn reject(&self, key: &str, reason: &str) -> Result<ActionOutcome, ModerationError> {
        let previous = {
            let mut state = self.live_state().await?;
            state.check_actionable(key)?;
            if state.is_approved(key) {
                return Err(ModerationError::AlreadyApproved(key.to_string()));
            }
            if let Some(RejectionDraft::Submitting(_)) = state.drafts.get(key) {
                return Err(ModerationError::SubmissionInFlight(key.to_string()));
            }
            if reason.trim().is_empty() {
                return Err(ModerationError::Validation(
                    "please provide a rejection reason".to_string(),
                ));
            }
            state
                .drafts
                .insert(key.to_string(), RejectionDraft::Submitting(reason.to_string()))
        };

        let record = RejectionRecord {
            item_key: key.to_string(),
            reason: reason.trim().to_string(),
            timestamp: OffsetDateTime::now_utc(),
        };
        let appended = self.ports.rejections.append(&record).await;

        let mut state = self.live_state().await?;
        if let Err(err) = appended {
            tracing::error!(error = ?err, key = key, "failed to submit rejection reason");
            match previous {
                Some(draft) if state.find(key).is_some() => {
                    state.drafts.insert(key.to_string(), draft);
                }
                _ => {
                    state.drafts.remove(key);
                }
            }
            return Err(ModerationError::write("reject", key, err));
        }

        state.drafts.remove(key);
        if state.is_approved(key) {
            tracing::warn!(key = key, "listing approved while its rejection was in flight");
            return Err(ModerationError::AlreadyApproved(key.to_string()));
        }

        let mut rejected = state.rejected.clone();
        rejected.insert(key.to_string());
        self.persist_rejections(&rejected).await;
        state.rejected = rejected;

        tracing::info!(key = key, "listing rejected");
        Ok(ActionOutcome::Applied)
    }

    pub async fn delete(&self, key: &str) -> Result<ActionOutcome, ModerationError> {
        let name = {
            let state = self.live_state().await?;
            let listing = state
                .find(key)
                .ok_or_else(|| ModerationError::NotFound(key.to_string()))?;
            listing.display_name().to_string()
        };

        let prompt = format!("You are about to delete \"{}\".", name);
        if !self.confirmer.confirm(&prompt).await {
            tracing::debug!(key = key, "deletion declined");
            return Err(ModerationError::Declined);
        }

        if let Err(err) = self.ports.items.delete(key).await {
            tracing::error!(error = ?err, key = key, "failed to delete listing");
            return Err(ModerationError::write("delete", key, err));
        }

        let mut state = self.live_state().await?;
        state.listings.retain(|listing| listing.key != key);
        state.drafts.remove(key);
        state.approvals.remove(key);
        tracing::info!(key = key, "listing deleted");
        Ok(ActionOutcome::Applied)
    }

    /// Opens a rejection draft. An already open draft keeps its text.
    pub async fn start_rejection(&self, key: &str) -> Result<RejectionDraft, ModerationError> {
        let mut state = self.live_state().await?;
        state.check_actionable(key)?;
        if state.is_approved(key) {
            return Err(ModerationError::AlreadyApproved(key.to_string()));
        }

        let draft = state
            .drafts
            .entry(key.to_string())
            .or_insert_with(|| RejectionDraft::Editing(String::new()))
            .clone();
        match draft {
            RejectionDraft::Submitting(_) => {
                Err(ModerationError::SubmissionInFlight(key.to_string()))
            }
            RejectionDraft::Editing(_) => Ok(draft),
        }
    }

    pub async fn edit_rejection(
        &self,
        key: &str,
        text: &str,
    ) -> Result<RejectionDraft, ModerationError> {
        let mut state = self.live_state().await?;
        state.check_actionable(key)?;
        match state.drafts.get_mut(key) {
            Some(RejectionDraft::Editing(current)) => {
                *current = text.to_string();
                Ok(RejectionDraft::Editing(current.clone()))
            }
            Some(RejectionDraft::Submitting(_)) => {
                Err(ModerationError::SubmissionInFlight(key.to_string()))
            }
            None => Err(ModerationError::DraftNotOpen(key.to_string())),
        }
    }

    pub async fn cancel_rejection(&self, key: &str) -> Result<(), ModerationError> {
        let mut state = self.live_state().await?;
        match state.drafts.get(key) {
            Some(RejectionDraft::Submitting(_)) => {
                Err(ModerationError::SubmissionInFlight(key.to_string()))
            }
            Some(RejectionDraft::Editing(_)) => {
                state.drafts.remove(key);
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Submits the open draft's text as the rejection reason.
    pub async fn submit_rejection(&self, key: &str) -> Result<ActionOutcome, ModerationError> {
        let reason = {
            let state = self.live_state().await?;
            state.check_actionable(key)?;
            match state.drafts.get(key) {
                Some(RejectionDraft::Editing(text)) => text.clone(),
                Some(RejectionDraft::Submitting(_)) => {
                    return Err(ModerationError::SubmissionInFlight(key.to_string()))
                }
                None => return Err(ModerationError::DraftNotOpen(key.to_string())),
            }
        };

        self.reject(key, &reason).await
    }

    async fn persist_rejections(&self, rejected: &BTreeSet<String>) {
        let result = match serde_json::to_string(rejected) {
            Ok(raw) => self.ports.local.set(REJECTION_CACHE_NAME, &raw).await,
            Err(err) => Err(err.into()),
        };
        if let Err(err) = result {
            tracing::warn!(error = ?err, "failed to persist rejection cache");
        }
    }
}

/// Accepts a JSON array of keys; `null` reads as empty.
pub fn parse_rejection_cache(raw: &str) -> Result<BTreeSet<String>, serde_json::Error> {
    let keys: Option<Vec<String>> = serde_json::from_str(raw)?;
    Ok(keys.unwrap_or_default().into_iter().collect())
}

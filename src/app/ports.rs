//! Collaborator contracts consumed by the services in `app`.
//!
//! Each port is an object-safe async trait so services can hold
//! `Arc<dyn Port>` and tests can substitute in-memory fakes.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::directory::{Booking, ContactMessage};
use crate::domain::listing::Listing;
use crate::domain::moderation::RejectionRecord;
use crate::domain::user::User;

/// Source of truth for listings.
#[async_trait]
pub trait ItemsStore: Send + Sync {
    /// Full listing set in source order.
    async fn list(&self) -> Result<Vec<Listing>>;
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Secondary store holding the approval flag per listing key.
#[async_trait]
pub trait ApprovalStore: Send + Sync {
    /// Every key the store knows about. Absent keys are unapproved.
    async fn get_all(&self) -> Result<HashMap<String, bool>>;
    async fn set_approved(&self, key: &str, approved: bool) -> Result<()>;
}

/// Append-only audit trail of rejections. Never read back.
#[async_trait]
pub trait RejectionLog: Send + Sync {
    async fn append(&self, record: &RejectionRecord) -> Result<()>;
}

/// Small persistent string store outliving the process.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, name: &str) -> Result<Option<String>>;
    async fn set(&self, name: &str, value: &str) -> Result<()>;
}

/// Asks whoever drives the service to confirm a destructive action.
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Confirms every prompt. Used when the caller has already confirmed
/// out of band, as the HTTP dashboard does before sending a request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

#[async_trait]
impl Confirmer for AutoConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        tracing::debug!(prompt = prompt, "auto-confirmed");
        true
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list(&self) -> Result<Vec<User>>;
    async fn set_blocked(&self, id: &str, blocked: bool) -> Result<()>;
    async fn set_role(&self, id: &str, role: &str) -> Result<()>;
}

#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn list(&self) -> Result<Vec<ContactMessage>>;
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Booking>>;
}

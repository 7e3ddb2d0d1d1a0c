use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;

use crate::app::ports::{ApprovalStore, ItemsStore, RejectionLog};
use crate::domain::listing::{Listing, ListingRecord};
use crate::domain::moderation::RejectionRecord;
use crate::infra::firebase::FirebaseClient;

/// Listings node. The approval flag lives on each listing as `approve`, so
/// the same node backs both the items and the approval store.
#[derive(Clone)]
pub struct FirebaseListings {
    client: FirebaseClient,
    node: String,
}

impl FirebaseListings {
    pub fn new(client: FirebaseClient, node: impl Into<String>) -> Self {
        Self {
            client,
            node: node.into(),
        }
    }
}

#[async_trait]
impl ItemsStore for FirebaseListings {
    async fn list(&self) -> Result<Vec<Listing>> {
        let records = self
            .client
            .get_collection::<ListingRecord>(&self.node)
            .await?;
        Ok(records
            .into_iter()
            .map(|(key, record)| record.into_listing(key))
            .collect())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.client.delete(&[self.node.as_str(), key]).await
    }
}

#[async_trait]
impl ApprovalStore for FirebaseListings {
    async fn get_all(&self) -> Result<HashMap<String, bool>> {
        let records = self
            .client
            .get_collection::<ListingRecord>(&self.node)
            .await?;
        Ok(records
            .into_iter()
            .map(|(key, record)| (key, record.approve.unwrap_or(false)))
            .collect())
    }

    async fn set_approved(&self, key: &str, approved: bool) -> Result<()> {
        self.client
            .patch(&[self.node.as_str(), key], &json!({ "approve": approved }))
            .await
    }
}

#[derive(Clone)]
pub struct FirebaseRejectionLog {
    client: FirebaseClient,
    node: String,
}

impl FirebaseRejectionLog {
    pub fn new(client: FirebaseClient, node: impl Into<String>) -> Self {
        Self {
            client,
            node: node.into(),
        }
    }
}

#[async_trait]
impl RejectionLog for FirebaseRejectionLog {
    async fn append(&self, record: &RejectionRecord) -> Result<()> {
        let id = self.client.post(&[self.node.as_str()], record).await?;
        tracing::debug!(record_id = %id, key = %record.item_key, "rejection recorded");
        Ok(())
    }
}

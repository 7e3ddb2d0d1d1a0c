use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;

use crate::app::ports::{BookingStore, ContactStore, UserStore};
use crate::domain::directory::{Booking, BookingRecord, ContactMessage, ContactRecord};
use crate::domain::user::{User, UserRecord};
use crate::infra::firebase::FirebaseClient;

#[derive(Clone)]
pub struct FirebaseUsers {
    client: FirebaseClient,
    node: String,
}

impl FirebaseUsers {
    pub fn new(client: FirebaseClient, node: impl Into<String>) -> Self {
        Self {
            client,
            node: node.into(),
        }
    }
}

#[async_trait]
impl UserStore for FirebaseUsers {
    async fn list(&self) -> Result<Vec<User>> {
        let records = self.client.get_collection::<UserRecord>(&self.node).await?;
        Ok(records
            .into_iter()
            .map(|(id, record)| record.into_user(id))
            .collect())
    }

    async fn set_blocked(&self, id: &str, blocked: bool) -> Result<()> {
        self.client
            .patch(&[self.node.as_str(), id], &json!({ "blocked": blocked }))
            .await
    }

    async fn set_role(&self, id: &str, role: &str) -> Result<()> {
        self.client
            .patch(&[self.node.as_str(), id], &json!({ "role": role }))
            .await
    }
}

#[derive(Clone)]
pub struct FirebaseContacts {
    client: FirebaseClient,
    node: String,
}

impl FirebaseContacts {
    pub fn new(client: FirebaseClient, node: impl Into<String>) -> Self {
        Self {
            client,
            node: node.into(),
        }
    }
}

#[async_trait]
impl ContactStore for FirebaseContacts {
    async fn list(&self) -> Result<Vec<ContactMessage>> {
        let records = self
            .client
            .get_collection::<ContactRecord>(&self.node)
            .await?;
        Ok(records
            .into_iter()
            .map(|(id, record)| record.into_message(id))
            .collect())
    }
}

#[derive(Clone)]
pub struct FirebaseBookings {
    client: FirebaseClient,
    node: String,
}

impl FirebaseBookings {
    pub fn new(client: FirebaseClient, node: impl Into<String>) -> Self {
        Self {
            client,
            node: node.into(),
        }
    }
}

#[async_trait]
impl BookingStore for FirebaseBookings {
    async fn list(&self) -> Result<Vec<Booking>> {
        let records = self
            .client
            .get_collection::<BookingRecord>(&self.node)
            .await?;
        Ok(records
            .into_iter()
            .map(|(id, record)| record.into_booking(id))
            .collect())
    }
}

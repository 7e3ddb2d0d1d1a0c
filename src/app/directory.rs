use std::sync::Arc;

use anyhow::Result;

use crate::app::ports::{BookingStore, ContactStore};
use crate::domain::directory::{Booking, ContactMessage};

/// Read-only access to contact messages and bookings.
#[derive(Clone)]
pub struct DirectoryService {
    contacts: Arc<dyn ContactStore>,
    bookings: Arc<dyn BookingStore>,
}

impl DirectoryService {
    pub fn new(contacts: Arc<dyn ContactStore>, bookings: Arc<dyn BookingStore>) -> Self {
        Self { contacts, bookings }
    }

    pub async fn contacts(&self) -> Result<Vec<ContactMessage>> {
        self.contacts.list().await
    }

    pub async fn bookings(&self) -> Result<Vec<Booking>> {
        self.bookings.list().await
    }
}

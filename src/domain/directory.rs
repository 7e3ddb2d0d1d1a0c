use serde::{Deserialize, Serialize};

/// A message left through the public contact form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: String,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactRecord {
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

impl ContactRecord {
    pub fn into_message(self, id: String) -> ContactMessage {
        ContactMessage {
            id,
            email: self.email,
            subject: self.subject,
            message: self.message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub contact_number: Option<String>,
    pub end_date: Option<String>,
    pub gender: Option<String>,
    pub clearance_document: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    pub name: Option<String>,
    pub email: Option<String>,
    pub contact_number: Option<String>,
    pub end_date: Option<String>,
    pub gender: Option<String>,
    pub clearance_document: Option<String>,
}

impl BookingRecord {
    pub fn into_booking(self, id: String) -> Booking {
        Booking {
            id,
            name: self.name,
            email: self.email,
            contact_number: self.contact_number,
            end_date: self.end_date,
            gender: self.gender,
            clearance_document: self.clearance_document,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardSummary {
    pub total_users: usize,
    pub blocked_users: usize,
    pub total_listings: usize,
    pub total_messages: usize,
    pub total_bookings: usize,
    pub moderation: crate::domain::moderation::ModerationCounts,
    pub warnings: Vec<String>,
}

use std::sync::Arc;

use crate::app::directory::DirectoryService;
use crate::app::moderation::ModerationReconciler;
use crate::app::users::UserService;
use crate::domain::directory::DashboardSummary;

/// Totals for the dashboard cards and charts. A failing source counts as
/// zero and adds a warning instead of failing the summary.
#[derive(Clone)]
pub struct DashboardService {
    users: UserService,
    directory: DirectoryService,
    moderation: Arc<ModerationReconciler>,
}

impl DashboardService {
    pub fn new(
        users: UserService,
        directory: DirectoryService,
        moderation: Arc<ModerationReconciler>,
    ) -> Self {
        Self {
            users,
            directory,
            moderation,
        }
    }

    pub async fn summary(&self) -> DashboardSummary {
        let (users, contacts, bookings, moderation) = tokio::join!(
            self.users.list(),
            self.directory.contacts(),
            self.directory.bookings(),
            self.moderation.counts(),
        );

        let mut summary = DashboardSummary {
            total_listings: moderation.total,
            moderation,
            ..DashboardSummary::default()
        };

        match users {
            Ok(users) => {
                summary.total_users = users.len();
                summary.blocked_users = users.iter().filter(|user| user.blocked).count();
            }
            Err(err) => {
                tracing::warn!(error = ?err, "failed to fetch users for dashboard");
                summary.warnings.push("failed to fetch users".to_string());
            }
        }

        match contacts {
            Ok(contacts) => summary.total_messages = contacts.len(),
            Err(err) => {
                tracing::warn!(error = ?err, "failed to fetch contacts for dashboard");
                summary.warnings.push("failed to fetch messages".to_string());
            }
        }

        match bookings {
            Ok(bookings) => summary.total_bookings = bookings.len(),
            Err(err) => {
                tracing::warn!(error = ?err, "failed to fetch bookings for dashboard");
                summary.warnings.push("failed to fetch bookings".to_string());
            }
        }

        summary.warnings.extend(
            self.moderation
                .warnings()
                .await
                .into_iter()
                .filter(|warning| warning.is_user_visible())
                .map(|warning| warning.message),
        );

        summary
    }
}

pub mod app;
pub mod config;
pub mod domain;
pub mod http;
pub mod infra;

use std::sync::Arc;

use crate::app::dashboard::DashboardService;
use crate::app::directory::DirectoryService;
use crate::app::moderation::ModerationReconciler;
use crate::app::users::UserService;
use crate::infra::cache::RedisCache;

#[derive(Clone)]
pub struct AppState {
    pub moderation: Arc<ModerationReconciler>,
    pub users: UserService,
    pub directory: DirectoryService,
    pub dashboard: DashboardService,
    /// Set when the rejection cache lives in Redis, for health checks.
    pub redis: Option<RedisCache>,
}

impl AppState {
    pub fn new(
        moderation: Arc<ModerationReconciler>,
        users: UserService,
        directory: DirectoryService,
        redis: Option<RedisCache>,
    ) -> Self {
        let dashboard = DashboardService::new(users.clone(), directory.clone(), moderation.clone());
        Self {
            moderation,
            users,
            directory,
            dashboard,
            redis,
        }
    }
}

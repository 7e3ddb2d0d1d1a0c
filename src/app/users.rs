use std::sync::Arc;

use crate::app::ports::{Confirmer, UserStore};
use crate::domain::user::User;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("user {0} not found")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("action declined")]
    Declined,
    #[error("failed to {action}")]
    Store {
        action: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    confirmer: Arc<dyn Confirmer>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, confirmer: Arc<dyn Confirmer>) -> Self {
        Self { store, confirmer }
    }

    pub async fn list(&self) -> Result<Vec<User>, UserError> {
        self.store.list().await.map_err(|source| UserError::Store {
            action: "list users",
            source,
        })
    }

    pub async fn block(&self, id: &str) -> Result<User, UserError> {
        self.set_blocked(id, true).await
    }

    pub async fn unblock(&self, id: &str) -> Result<User, UserError> {
        self.set_blocked(id, false).await
    }

    async fn set_blocked(&self, id: &str, blocked: bool) -> Result<User, UserError> {
        let mut user = self.find(id).await?;
        if user.blocked == blocked {
            return Ok(user);
        }

        let action = if blocked { "block" } else { "unblock" };
        let prompt = format!("You are about to {} {}.", action, user.name.as_deref().unwrap_or(id));
        if !self.confirmer.confirm(&prompt).await {
            return Err(UserError::Declined);
        }

        self.store
            .set_blocked(id, blocked)
            .await
            .map_err(|source| UserError::Store {
                action: if blocked { "block user" } else { "unblock user" },
                source,
            })?;

        user.blocked = blocked;
        tracing::info!(user_id = id, blocked, "user block status changed");
        Ok(user)
    }

    pub async fn set_role(&self, id: &str, role: &str) -> Result<User, UserError> {
        let role = role.trim();
        if role.is_empty() {
            return Err(UserError::Validation("role must not be empty".to_string()));
        }

        let mut user = self.find(id).await?;
        self.store
            .set_role(id, role)
            .await
            .map_err(|source| UserError::Store {
                action: "update user role",
                source,
            })?;

        user.role = Some(role.to_string());
        tracing::info!(user_id = id, role = role, "user role changed");
        Ok(user)
    }

    async fn find(&self, id: &str) -> Result<User, UserError> {
        self.list()
            .await?
            .into_iter()
            .find(|user| user.id == id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }
}

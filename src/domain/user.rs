use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub blocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// User node as stored remotely; the id is the parent object key.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserRecord {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub blocked: bool,
    pub role: Option<String>,
}

impl UserRecord {
    pub fn into_user(self, id: String) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            blocked: self.blocked,
            role: self.role,
        }
    }
}

use anyhow::{anyhow, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

use crate::app::moderation::DEFAULT_PAGE_SIZE;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LocalStoreKind {
    File,
    Redis,
    Memory,
}

impl FromStr for LocalStoreKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "file" => Ok(Self::File),
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            other => Err(anyhow!("unknown local store: {}", other)),
        }
    }
}

/// Node names under the document database root.
#[derive(Clone, Debug)]
pub struct NodeNames {
    pub listings: String,
    pub rejections: String,
    pub users: String,
    pub contacts: String,
    pub bookings: String,
}

impl Default for NodeNames {
    fn default() -> Self {
        Self {
            listings: "student_housing".to_string(),
            rejections: "rejections".to_string(),
            users: "users".to_string(),
            contacts: "contacts".to_string(),
            bookings: "bookings".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub http_addr: String,
    pub firebase_url: Url,
    pub firebase_auth_token: Option<String>,
    pub http_timeout_seconds: u64,
    pub listings_per_page: usize,
    pub local_store: LocalStoreKind,
    pub local_store_dir: PathBuf,
    pub redis_url: String,
    pub cors_allow_origin: Option<String>,
    pub nodes: NodeNames,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let http_addr = env_or("HTTP_ADDR", "0.0.0.0:8080");
        let _parsed_http_addr = SocketAddr::from_str(&http_addr)
            .map_err(|err| anyhow!("invalid HTTP_ADDR: {}", err))?;

        let firebase_url = Url::parse(&env_or_err("FIREBASE_URL")?)
            .map_err(|err| anyhow!("invalid FIREBASE_URL: {}", err))?;

        let listings_per_page: usize =
            env_or_parse("LISTINGS_PER_PAGE", &DEFAULT_PAGE_SIZE.to_string())?;
        if listings_per_page == 0 {
            return Err(anyhow!("invalid LISTINGS_PER_PAGE: must be at least 1"));
        }

        let defaults = NodeNames::default();

        Ok(Self {
            http_addr,
            firebase_url,
            firebase_auth_token: std::env::var("FIREBASE_AUTH_TOKEN").ok(),
            http_timeout_seconds: env_or_parse("HTTP_TIMEOUT_SECONDS", "15")?,
            listings_per_page,
            local_store: env_or_parse("LOCAL_STORE", "file")?,
            local_store_dir: PathBuf::from(env_or("LOCAL_STORE_DIR", ".rentdesk")),
            redis_url: env_or("REDIS_URL", "redis://127.0.0.1/"),
            cors_allow_origin: std::env::var("CORS_ALLOW_ORIGIN").ok(),
            nodes: NodeNames {
                listings: env_or("LISTINGS_NODE", &defaults.listings),
                rejections: env_or("REJECTIONS_NODE", &defaults.rejections),
                users: env_or("USERS_NODE", &defaults.users),
                contacts: env_or("CONTACTS_NODE", &defaults.contacts),
                bookings: env_or("BOOKINGS_NODE", &defaults.bookings),
            },
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_err(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| anyhow!("missing required env var: {}", key))
}

fn env_or_parse<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    let value = std::env::var(key).unwrap_or_else(|_| default.to_string());
    value
        .parse::<T>()
        .map_err(|err| anyhow!("invalid {}: {}", key, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_store_kinds() {
        assert_eq!("file".parse::<LocalStoreKind>().unwrap(), LocalStoreKind::File);
        assert_eq!("redis".parse::<LocalStoreKind>().unwrap(), LocalStoreKind::Redis);
        assert_eq!("memory".parse::<LocalStoreKind>().unwrap(), LocalStoreKind::Memory);
        assert!("sqlite".parse::<LocalStoreKind>().is_err());
    }

    #[test]
    fn default_nodes_match_the_database_layout() {
        let nodes = NodeNames::default();
        assert_eq!(nodes.listings, "student_housing");
        assert_eq!(nodes.rejections, "rejections");
    }
}

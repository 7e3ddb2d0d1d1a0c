//! Minimal REST client for a Firebase Realtime Database style document store.
//!
//! Every node is addressed as `{base}/{segments...}.json`. Collections come
//! back either as an object keyed by child id or, for dense integer keys, as
//! an array with `null` holes.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct FirebaseClient {
    http: Client,
    base: Url,
    auth_token: Option<String>,
}

#[derive(Deserialize)]
struct PushResponse {
    name: String,
}

impl FirebaseClient {
    pub fn new(base: Url, auth_token: Option<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self {
            http,
            base,
            auth_token,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            config.firebase_url.clone(),
            config.firebase_auth_token.clone(),
            Duration::from_secs(config.http_timeout_seconds),
        )
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| anyhow!("empty document path"))?;

        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| anyhow!("document store url cannot be a base"))?;
            path.pop_if_empty();
            for segment in parents {
                path.push(segment);
            }
            path.push(&format!("{}.json", last));
        }

        if let Some(token) = &self.auth_token {
            url.query_pairs_mut().append_pair("auth", token);
        }
        Ok(url)
    }

    async fn check(response: Response, path: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(anyhow!(
            "document store error {} on {}: {}",
            status,
            path,
            body.chars().take(200).collect::<String>()
        ))
    }

    /// Reads a node. A missing node comes back as `None`.
    pub async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<Option<T>> {
        let path = segments.join("/");
        let response = self
            .http
            .get(self.url(segments)?)
            .send()
            .await
            .with_context(|| format!("failed to fetch {}", path))?;

        Self::check(response, &path)
            .await?
            .json::<Option<T>>()
            .await
            .with_context(|| format!("failed to parse response from {}", path))
    }

    /// Reads every child of a collection node, skipping children that do
    /// not deserialize as `T`.
    pub async fn get_collection<T: DeserializeOwned>(
        &self,
        node: &str,
    ) -> Result<Vec<(String, T)>> {
        let value: Option<Value> = self.get(&[node]).await?;
        Ok(collection_entries(node, value.unwrap_or(Value::Null)))
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, segments: &[&str], body: &B) -> Result<()> {
        let path = segments.join("/");
        let response = self
            .http
            .patch(self.url(segments)?)
            .json(body)
            .send()
            .await
            .with_context(|| format!("failed to update {}", path))?;
        Self::check(response, &path).await?;
        Ok(())
    }

    /// Appends a child with a server generated key and returns that key.
    pub async fn post<B: Serialize + ?Sized>(&self, segments: &[&str], body: &B) -> Result<String> {
        let path = segments.join("/");
        let response = self
            .http
            .post(self.url(segments)?)
            .json(body)
            .send()
            .await
            .with_context(|| format!("failed to append to {}", path))?;

        let pushed: PushResponse = Self::check(response, &path)
            .await?
            .json()
            .await
            .with_context(|| format!("failed to parse response from {}", path))?;
        Ok(pushed.name)
    }

    pub async fn delete(&self, segments: &[&str]) -> Result<()> {
        let path = segments.join("/");
        let response = self
            .http
            .delete(self.url(segments)?)
            .send()
            .await
            .with_context(|| format!("failed to delete {}", path))?;
        Self::check(response, &path).await?;
        Ok(())
    }
}

fn collection_entries<T: DeserializeOwned>(node: &str, value: Value) -> Vec<(String, T)> {
    let children: Vec<(String, Value)> = match value {
        Value::Object(map) => map.into_iter().collect(),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| (index.to_string(), item))
            .collect(),
        Value::Null => Vec::new(),
        other => {
            tracing::warn!(node = node, value = %other, "collection node is not an object");
            Vec::new()
        }
    };

    children
        .into_iter()
        .filter(|(_, child)| !child.is_null())
        .filter_map(|(key, child)| match serde_json::from_value::<T>(child) {
            Ok(record) => Some((key, record)),
            Err(err) => {
                tracing::warn!(node = node, key = %key, error = %err, "skipping malformed record");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Named {
        name: String,
    }

    #[test]
    fn object_collections_sort_by_key() {
        let value = json!({ "-b": { "name": "two" }, "-a": { "name": "one" } });
        let entries: Vec<(String, Named)> = collection_entries("posts", value);
        let keys: Vec<&str> = entries.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, vec!["-a", "-b"]);
    }

    #[test]
    fn array_collections_skip_holes_and_bad_records() {
        let value = json!([null, { "name": "one" }, { "other": 1 }, { "name": "three" }]);
        let entries: Vec<(String, Named)> = collection_entries("users", value);
        assert_eq!(
            entries,
            vec![
                ("1".to_string(), Named { name: "one".into() }),
                ("3".to_string(), Named { name: "three".into() }),
            ]
        );
    }

    #[test]
    fn url_appends_json_suffix_and_auth() {
        let client = FirebaseClient::new(
            Url::parse("https://example.firebaseio.com/").unwrap(),
            Some("secret".into()),
            Duration::from_secs(1),
        )
        .unwrap();
        let url = client.url(&["student_housing", "-abc"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.firebaseio.com/student_housing/-abc.json?auth=secret"
        );
    }
}

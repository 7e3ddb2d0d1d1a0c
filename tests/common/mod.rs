#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::sync::Notify;
use tower::ServiceExt;

use rentdesk::app::directory::DirectoryService;
use rentdesk::app::moderation::{ModerationPorts, ModerationReconciler, REJECTION_CACHE_NAME};
use rentdesk::app::ports::{
    ApprovalStore, BookingStore, Confirmer, ContactStore, ItemsStore, KeyValueStore,
    RejectionLog, UserStore,
};
use rentdesk::app::users::UserService;
use rentdesk::domain::directory::{Booking, ContactMessage};
use rentdesk::domain::listing::Listing;
use rentdesk::domain::moderation::RejectionRecord;
use rentdesk::domain::user::User;
use rentdesk::infra::local_store::MemoryKeyValueStore;
use rentdesk::AppState;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn listing(key: &str) -> Listing {
    Listing {
        name: Some(format!("Apartment {}", key)),
        location: Some("Amman".to_string()),
        ..Listing::new(key)
    }
}

pub fn listings(keys: &[&str]) -> Vec<Listing> {
    keys.iter().map(|key| listing(key)).collect()
}

pub fn keys(items: &[Listing]) -> Vec<String> {
    items.iter().map(|item| item.key.clone()).collect()
}

pub fn user(id: &str, blocked: bool) -> User {
    User {
        id: id.to_string(),
        name: Some(format!("User {}", id)),
        email: Some(format!("{}@example.com", id)),
        blocked,
        role: None,
    }
}

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Blocks a fake call until the test releases it.
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

impl Gate {
    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

/// Listings node with its approval flags, like the document store layout.
#[derive(Default)]
pub struct FakeListings {
    pub items: Mutex<Vec<Listing>>,
    pub approvals: Mutex<HashMap<String, bool>>,
    pub fail_list: AtomicBool,
    pub fail_approvals: AtomicBool,
    pub fail_set_approved: AtomicBool,
    pub fail_delete: AtomicBool,
    pub set_approved_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub list_gate: Mutex<Option<Arc<Gate>>>,
    pub approve_gate: Mutex<Option<Arc<Gate>>>,
}

impl FakeListings {
    pub fn with(items: Vec<Listing>) -> Self {
        Self {
            items: Mutex::new(items),
            ..Self::default()
        }
    }

    pub fn approve_remotely(&self, key: &str) {
        self.approvals.lock().unwrap().insert(key.to_string(), true);
    }

    pub fn remote_approval(&self, key: &str) -> Option<bool> {
        self.approvals.lock().unwrap().get(key).copied()
    }
}

#[async_trait]
impl ItemsStore for FakeListings {
    async fn list(&self) -> Result<Vec<Listing>> {
        let gate = self.list_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(anyhow!("listings unavailable"));
        }
        Ok(self.items.lock().unwrap().clone())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(anyhow!("delete rejected"));
        }
        self.items.lock().unwrap().retain(|item| item.key != key);
        Ok(())
    }
}

#[async_trait]
impl ApprovalStore for FakeListings {
    async fn get_all(&self) -> Result<HashMap<String, bool>> {
        if self.fail_approvals.load(Ordering::SeqCst) {
            return Err(anyhow!("approvals unavailable"));
        }
        Ok(self.approvals.lock().unwrap().clone())
    }

    async fn set_approved(&self, key: &str, approved: bool) -> Result<()> {
        self.set_approved_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.approve_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        if self.fail_set_approved.load(Ordering::SeqCst) {
            return Err(anyhow!("patch rejected"));
        }
        self.approvals
            .lock()
            .unwrap()
            .insert(key.to_string(), approved);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeRejectionLog {
    pub records: Mutex<Vec<RejectionRecord>>,
    pub fail: AtomicBool,
    pub calls: AtomicUsize,
    pub gate: Mutex<Option<Arc<Gate>>>,
}

impl FakeRejectionLog {
    pub fn records(&self) -> Vec<RejectionRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl RejectionLog for FakeRejectionLog {
    async fn append(&self, record: &RejectionRecord) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("audit log unavailable"));
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// Answers every prompt with `answer` and remembers what was asked.
pub struct ScriptedConfirmer {
    pub answer: AtomicBool,
    pub prompts: Mutex<Vec<String>>,
}

impl Default for ScriptedConfirmer {
    fn default() -> Self {
        Self {
            answer: AtomicBool::new(true),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedConfirmer {
    pub fn decline(&self) {
        self.answer.store(false, Ordering::SeqCst);
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Confirmer for ScriptedConfirmer {
    async fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answer.load(Ordering::SeqCst)
    }
}

/// Local store whose reads always fail.
pub struct UnreadableStore;

#[async_trait]
impl KeyValueStore for UnreadableStore {
    async fn get(&self, _name: &str) -> Result<Option<String>> {
        Err(anyhow!("permission denied"))
    }

    async fn set(&self, _name: &str, _value: &str) -> Result<()> {
        Err(anyhow!("permission denied"))
    }
}

#[derive(Default)]
pub struct FakeUsers {
    pub users: Mutex<Vec<User>>,
    pub fail: AtomicBool,
    pub writes: AtomicUsize,
}

#[async_trait]
impl UserStore for FakeUsers {
    async fn list(&self) -> Result<Vec<User>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("users unavailable"));
        }
        Ok(self.users.lock().unwrap().clone())
    }

    async fn set_blocked(&self, id: &str, blocked: bool) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|user| user.id == id)
            .ok_or_else(|| anyhow!("no such user"))?;
        user.blocked = blocked;
        Ok(())
    }

    async fn set_role(&self, id: &str, role: &str) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|user| user.id == id)
            .ok_or_else(|| anyhow!("no such user"))?;
        user.role = Some(role.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeDirectory {
    pub contacts: Mutex<Vec<ContactMessage>>,
    pub bookings: Mutex<Vec<Booking>>,
    pub fail_contacts: AtomicBool,
    pub fail_bookings: AtomicBool,
}

#[async_trait]
impl ContactStore for FakeDirectory {
    async fn list(&self) -> Result<Vec<ContactMessage>> {
        if self.fail_contacts.load(Ordering::SeqCst) {
            return Err(anyhow!("contacts unavailable"));
        }
        Ok(self.contacts.lock().unwrap().clone())
    }
}

#[async_trait]
impl BookingStore for FakeDirectory {
    async fn list(&self) -> Result<Vec<Booking>> {
        if self.fail_bookings.load(Ordering::SeqCst) {
            return Err(anyhow!("bookings unavailable"));
        }
        Ok(self.bookings.lock().unwrap().clone())
    }
}

// ---------------------------------------------------------------------------
// Harness : reconciler wired to fakes
// ---------------------------------------------------------------------------

pub struct Harness {
    pub reconciler: Arc<ModerationReconciler>,
    pub listings: Arc<FakeListings>,
    pub log: Arc<FakeRejectionLog>,
    pub local: Arc<MemoryKeyValueStore>,
    pub confirmer: Arc<ScriptedConfirmer>,
}

impl Harness {
    pub fn new(items: Vec<Listing>) -> Self {
        Self::with_local(items, MemoryKeyValueStore::new())
    }

    pub fn with_local(items: Vec<Listing>, local: MemoryKeyValueStore) -> Self {
        let listings = Arc::new(FakeListings::with(items));
        let log = Arc::new(FakeRejectionLog::default());
        let local = Arc::new(local);
        let confirmer = Arc::new(ScriptedConfirmer::default());

        let ports = ModerationPorts {
            items: listings.clone(),
            approvals: listings.clone(),
            rejections: log.clone(),
            local: local.clone(),
        };
        let reconciler = Arc::new(ModerationReconciler::new(ports, confirmer.clone(), 3));

        Self {
            reconciler,
            listings,
            log,
            local,
            confirmer,
        }
    }

    pub async fn loaded(items: Vec<Listing>) -> Self {
        let harness = Self::new(items);
        harness.reconciler.load().await.expect("load failed");
        harness
    }

    pub async fn cached_rejections(&self) -> Option<String> {
        self.local.get(REJECTION_CACHE_NAME).await.unwrap()
    }

    pub async fn visible_keys(&self) -> Vec<String> {
        keys(&self.reconciler.visible_items().await)
    }
}

// ---------------------------------------------------------------------------
// TestApp : HTTP router over a harness
// ---------------------------------------------------------------------------

pub struct TestApp {
    router: Router,
    pub harness: Harness,
    pub users: Arc<FakeUsers>,
    pub directory: Arc<FakeDirectory>,
}

pub struct TestResponse {
    pub status: StatusCode,
    body_bytes: bytes::Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body_bytes).unwrap_or(Value::Null)
    }

    pub fn error_message(&self) -> String {
        self.json()["error"].as_str().unwrap_or("").to_string()
    }
}

impl TestApp {
    pub async fn new(items: Vec<Listing>) -> Self {
        let harness = Harness::loaded(items).await;
        let users = Arc::new(FakeUsers::default());
        let directory = Arc::new(FakeDirectory::default());

        let state = AppState::new(
            harness.reconciler.clone(),
            UserService::new(users.clone(), harness.confirmer.clone()),
            DirectoryService::new(directory.clone(), directory.clone()),
            None,
        );
        let router = rentdesk::http::router(state, None).expect("router");

        Self {
            router,
            harness,
            users,
            directory,
        }
    }

    pub async fn request(&self, method: Method, path: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder()
            .method(method)
            .uri(path)
            .header("host", "localhost");

        let request = if let Some(body) = body {
            builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap()
        } else {
            builder.body(Body::empty()).unwrap()
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot failed");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to collect body")
            .to_bytes();

        TestResponse { status, body_bytes }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str) -> TestResponse {
        self.request(Method::POST, path, None).await
    }

    pub async fn post_json(&self, path: &str, body: Value) -> TestResponse {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn patch_json(&self, path: &str, body: Value) -> TestResponse {
        self.request(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request(Method::DELETE, path, None).await
    }
}

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rentdesk::app::directory::DirectoryService;
use rentdesk::app::moderation::{ModerationPorts, ModerationReconciler};
use rentdesk::app::ports::{AutoConfirm, Confirmer, KeyValueStore};
use rentdesk::app::users::UserService;
use rentdesk::config::{AppConfig, LocalStoreKind};
use rentdesk::http;
use rentdesk::infra::cache::RedisCache;
use rentdesk::infra::directory::{FirebaseBookings, FirebaseContacts, FirebaseUsers};
use rentdesk::infra::firebase::FirebaseClient;
use rentdesk::infra::listings::{FirebaseListings, FirebaseRejectionLog};
use rentdesk::infra::local_store::{FileKeyValueStore, MemoryKeyValueStore};
use rentdesk::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let firebase = FirebaseClient::from_config(&config)?;

    let (local, redis): (Arc<dyn KeyValueStore>, Option<RedisCache>) = match config.local_store {
        LocalStoreKind::File => (
            Arc::new(FileKeyValueStore::new(config.local_store_dir.clone())),
            None,
        ),
        LocalStoreKind::Redis => {
            let cache = RedisCache::connect(&config.redis_url).await?;
            (Arc::new(cache.clone()), Some(cache))
        }
        LocalStoreKind::Memory => {
            tracing::warn!("rejection cache is in memory and will not survive a restart");
            (Arc::new(MemoryKeyValueStore::new()), None)
        }
    };

    let listings = Arc::new(FirebaseListings::new(firebase.clone(), config.nodes.listings.clone()));
    let ports = ModerationPorts {
        items: listings.clone(),
        approvals: listings,
        rejections: Arc::new(FirebaseRejectionLog::new(
            firebase.clone(),
            config.nodes.rejections.clone(),
        )),
        local,
    };

    // The dashboard asks the moderator before it sends a mutating request.
    let confirmer: Arc<dyn Confirmer> = Arc::new(AutoConfirm);
    let moderation = Arc::new(ModerationReconciler::new(
        ports,
        confirmer.clone(),
        config.listings_per_page,
    ));

    let report = moderation.load().await?;
    for warning in report.warnings.iter().filter(|w| w.is_user_visible()) {
        tracing::warn!(source = ?warning.source, "{}", warning.message);
    }

    let users = UserService::new(
        Arc::new(FirebaseUsers::new(firebase.clone(), config.nodes.users.clone())),
        confirmer,
    );
    let directory = DirectoryService::new(
        Arc::new(FirebaseContacts::new(firebase.clone(), config.nodes.contacts.clone())),
        Arc::new(FirebaseBookings::new(firebase, config.nodes.bookings.clone())),
    );

    let state = AppState::new(moderation.clone(), users, directory, redis);

    let app: Router = http::router(state, config.cors_allow_origin.as_deref())?
        .layer(TraceLayer::new_for_http());
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    tracing::info!("listening on {}", config.http_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    moderation.teardown().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}

use std::sync::Arc;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use usermanager_repository::{
    CacheSource, MemoryUserRepository, MemoryVoteRepository, PostgresUserRepository, PostgresVoteRepository,
    UserCache, UserRepository, VoteCache, VoteRepository, MIGRATOR,
};
use usermanager_usecase::{Clock, SystemClock, UserService, VotingEngine};

use crate::api::{self, AppState};
use crate::config::{Settings, StoreBackend};
use crate::errors::AppError;

/// `Dependencies` holds the wired services of the user manager.
///
/// The voting engine is shared with the user service, which checks vote
/// targets before delegating to it.
pub struct Dependencies {
    pub service: Arc<UserService>,
    pub voting: Arc<VotingEngine>,
}

impl Dependencies {
    /// Connects the configured store and cache backends and builds the services.
    ///
    /// For PostgreSQL, pending migrations are applied before anything else
    /// touches the pool.
    pub async fn new(settings: &Settings) -> Result<Self, AppError> {
        let (users, votes): (Arc<dyn UserRepository>, Arc<dyn VoteRepository>) =
            match &settings.store {
                StoreBackend::Postgres { url, max_connections } => {
                    let pool = PgPoolOptions::new()
                        .max_connections(*max_connections)
                        .connect(url)
                        .await?;
                    MIGRATOR.run(&pool).await?;
                    info!(max_connections, "Store backend: postgres");
                    (
                        Arc::new(PostgresUserRepository::new(pool.clone())),
                        Arc::new(PostgresVoteRepository::new(pool)),
                    )
                }
                StoreBackend::Memory => {
                    info!("Store backend: memory");
                    (
                        Arc::new(MemoryUserRepository::default()),
                        Arc::new(MemoryVoteRepository::default()),
                    )
                }
            };

        let storage = settings.cache.clone().into_storage().await?;
        let cache_backend = match settings.cache {
            CacheSource::Memory => "memory",
            CacheSource::Redis { .. } => "redis",
        };
        info!(cache_backend, ttl_secs = settings.cache_ttl.as_secs(), "Cache connected");

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let voting = Arc::new(
            VotingEngine::new(votes, VoteCache::new(storage.clone(), settings.cache_ttl), clock.clone())
                .with_vote_interval(settings.vote_interval),
        );
        let service = Arc::new(
            UserService::new(
                users,
                UserCache::new(storage, settings.cache_ttl),
                voting.clone(),
                clock,
            )
            .with_hash_cost(settings.hash_cost),
        );

        Ok(Self { service, voting })
    }

    /// REST router serving the wired services.
    pub fn router(&self) -> Router {
        api::router(AppState::new(self.service.clone()))
    }
}

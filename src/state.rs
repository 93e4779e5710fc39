use std::sync::Arc;

use anyhow::Result;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AnalyticsService, AuthService, MasterDataService, RequestService, SeaOrmAnalyticsService,
    SeaOrmAuthService, SeaOrmMasterDataService, SeaOrmRequestService,
};
use crate::session::SessionKeys;

/// Application-wide shared state: configuration, the store, and the
/// domain services wired over it.
pub struct SharedState {
    pub config: Config,
    pub store: Store,
    pub auth_service: Arc<dyn AuthService>,
    pub request_service: Arc<dyn RequestService>,
    pub master_data_service: Arc<dyn MasterDataService>,
    pub analytics_service: Arc<dyn AnalyticsService>,
}

impl SharedState {
    pub async fn new(config: Config) -> Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Ok(Self::with_store(config, store))
    }

    /// Wires services over an existing store. Used directly by tests
    /// running against an in-memory database.
    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let keys = SessionKeys::new(
            &config.security.jwt_secret,
            config.security.session_ttl_hours,
        );

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            keys,
            config.security.clone(),
        ));
        let request_service = Arc::new(SeaOrmRequestService::new(store.clone()));
        let master_data_service = Arc::new(SeaOrmMasterDataService::new(store.clone()));
        let analytics_service = Arc::new(SeaOrmAnalyticsService::new(store.clone()));

        Self {
            config,
            store,
            auth_service,
            request_service,
            master_data_service,
            analytics_service,
        }
    }
}

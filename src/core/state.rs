use std::sync::Arc;

use crate::core::{config::Settings, redis::RedisHandle};
use crate::repositories::{
    clients::ClientRepository, draws::DrawRepository, health::StoreHealth,
    users::UserRepository, Repositories,
};
use crate::services::pagination::PageDefaults;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    repositories: Repositories,
    redis: RedisHandle,
}

impl AppState {
    pub(crate) fn new(settings: Settings, repositories: Repositories, redis: RedisHandle) -> Self {
        Self { inner: Arc::new(InnerState { settings, repositories, redis }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn users(&self) -> &dyn UserRepository {
        self.inner.repositories.users.as_ref()
    }

    pub(crate) fn clients(&self) -> &dyn ClientRepository {
        self.inner.repositories.clients.as_ref()
    }

    pub(crate) fn draws(&self) -> &dyn DrawRepository {
        self.inner.repositories.draws.as_ref()
    }

    pub(crate) fn store_health(&self) -> &dyn StoreHealth {
        self.inner.repositories.health.as_ref()
    }

    pub(crate) fn redis(&self) -> &RedisHandle {
        &self.inner.redis
    }

    pub(crate) fn page_defaults(&self) -> PageDefaults {
        let pagination = self.settings().pagination();
        PageDefaults::new(pagination.default_limit, pagination.max_limit)
    }
}

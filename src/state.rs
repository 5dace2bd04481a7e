use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::Config,
    error::AppError,
    models::curriculum::{Subject, SubjectSummary},
    services::curriculum_cache::CurriculumCache,
    store::Store,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub cache: Arc<CurriculumCache>,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        let cache = Arc::new(CurriculumCache::with_system_clock(config.cache_ttl));
        Self {
            store,
            cache,
            config,
        }
    }

    /// Subject tree, served from the cache when it is still fresh.
    pub async fn subject(&self, id: &str) -> Result<Option<Arc<Subject>>, AppError> {
        if let Some(subject) = self.cache.subject(id) {
            return Ok(Some(subject));
        }

        // Taken before the await so an invalidation during the read wins.
        let generation = self.cache.generation();
        Ok(self
            .store
            .fetch_subject(id)
            .await?
            .map(|subject| self.cache.insert_subject(subject, generation)))
    }

    pub async fn subject_listing(&self) -> Result<Arc<Vec<SubjectSummary>>, AppError> {
        if let Some(listing) = self.cache.listing() {
            return Ok(listing);
        }

        let generation = self.cache.generation();
        let listing = self.store.list_subjects().await?;
        Ok(self.cache.insert_listing(listing, generation))
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

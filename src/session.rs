use std::sync::Arc;
use std::time::Duration;

use crate::cache::{ErrorLogReporter, KeyValueStore};
use crate::catalog::{ChannelCatalogCache, FavoritesStore, ProgramGuideCache, RecencyStore};
use crate::config::Settings;
use crate::engine::{NavMode, RemoteInputRouter};

/// Process-wide shared state, constructed once at startup and passed
/// by reference to consumers. No lazily-initialized globals: first-use
/// order is explicit here instead of scattered across screens.
pub struct Session<H> {
    pub settings: Settings,
    pub reporter: Arc<ErrorLogReporter>,
    pub catalog: ChannelCatalogCache,
    pub guide: ProgramGuideCache,
    pub favorites: FavoritesStore,
    pub recents: RecencyStore,
    pub router: RemoteInputRouter<H>,
}

impl<H: Clone> Session<H> {
    pub fn new(
        settings: Settings,
        store: Arc<dyn KeyValueStore>,
        base_overlay: &str,
        base_mode: NavMode,
    ) -> Self {
        let reporter = Arc::new(ErrorLogReporter::default().with_store(store.clone()));
        let catalog = ChannelCatalogCache::new(Duration::from_secs(settings.catalog_ttl_secs))
            .with_store(store.clone())
            .with_reporter(reporter.clone());
        let guide = ProgramGuideCache::new(Duration::from_secs(settings.guide_ttl_secs))
            .with_store(store.clone())
            .with_reporter(reporter.clone());
        let favorites = FavoritesStore::new().with_store(store.clone());
        let recents = RecencyStore::new(settings.recents_capacity).with_store(store);
        let router = RemoteInputRouter::with_digit_timeout(
            base_overlay,
            base_mode,
            Duration::from_millis(settings.digit_timeout_ms),
        );
        Self {
            settings,
            reporter,
            catalog,
            guide,
            favorites,
            recents,
            router,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;

    #[test]
    fn session_applies_settings_to_stores() {
        let mut settings = Settings::default();
        settings.recents_capacity = 3;
        let session: Session<String> = Session::new(
            settings,
            Arc::new(MemoryStore::new()),
            "home",
            NavMode::Grid { columns: 4 },
        );
        assert_eq!(session.recents.capacity(), 3);
        assert_eq!(session.router.overlays().active_id().as_str(), "home");
    }
}

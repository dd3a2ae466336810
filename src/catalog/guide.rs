use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::cache::{
    CacheError, ErrorReporter, KeyValueStore, SubscriptionId, TimeBoundedCache,
};

use super::types::EpgProgram;

pub const DEFAULT_GUIDE_TTL: Duration = Duration::from_secs(3600);

/// EPG cache keyed by channel id. Values are program lists kept sorted
/// by start time.
///
/// Beyond the TTL, a slice is stale once its last program has ended:
/// the UI must never show a guide that has visibly run out.
pub struct ProgramGuideCache {
    inner: TimeBoundedCache<String, Vec<EpgProgram>>,
}

impl ProgramGuideCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: TimeBoundedCache::new("epg_cache", ttl)
                .with_staleness(|programs: &Vec<EpgProgram>, now| {
                    !programs.iter().any(|p| p.end > now)
                }),
        }
    }

    pub fn with_store(self, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            inner: self.inner.with_store(store),
        }
    }

    pub fn with_reporter(self, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            inner: self.inner.with_reporter(reporter),
        }
    }

    /// Program list for a channel, freshly sorted by start time after
    /// every refetch.
    pub async fn programs<F, Fut>(
        &self,
        channel_id: &str,
        fetch: F,
    ) -> Result<Vec<EpgProgram>, CacheError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Vec<EpgProgram>>>,
    {
        self.inner
            .get(channel_id.to_string(), || async move {
                let mut programs = fetch().await?;
                programs.sort_by_key(|p| p.start);
                Ok(programs)
            })
            .await
    }

    /// Program airing right now, from cache only.
    pub fn current_program(&self, channel_id: &str) -> Option<EpgProgram> {
        let now = Utc::now();
        self.inner
            .peek(&channel_id.to_string())?
            .into_iter()
            .find(|p| p.start <= now && now < p.end)
    }

    /// First program starting after now, from cache only.
    pub fn next_program(&self, channel_id: &str) -> Option<EpgProgram> {
        let now = Utc::now();
        self.inner
            .peek(&channel_id.to_string())?
            .into_iter()
            .find(|p| p.start > now)
    }

    pub fn peek(&self, channel_id: &str) -> Option<Vec<EpgProgram>> {
        self.inner.peek(&channel_id.to_string())
    }

    pub fn invalidate(&self, channel_id: &str) {
        self.inner.invalidate(&channel_id.to_string());
    }

    pub fn clear(&self) {
        self.inner.clear();
    }

    pub fn subscribe(
        &self,
        channel_id: &str,
        listener: impl Fn(&Vec<EpgProgram>) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.inner.subscribe(channel_id.to_string(), listener)
    }

    pub fn unsubscribe(&self, channel_id: &str, id: SubscriptionId) -> bool {
        self.inner.unsubscribe(&channel_id.to_string(), id)
    }
}

impl Default for ProgramGuideCache {
    fn default() -> Self {
        Self::new(DEFAULT_GUIDE_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn program(id: &str, start_off_min: i64, end_off_min: i64) -> EpgProgram {
        let now = Utc::now();
        EpgProgram {
            id: id.to_string(),
            title: format!("program {id}"),
            channel_id: "news24".into(),
            start: now + ChronoDuration::minutes(start_off_min),
            end: now + ChronoDuration::minutes(end_off_min),
            description: None,
        }
    }

    #[tokio::test]
    async fn programs_are_sorted_by_start_time() {
        let guide = ProgramGuideCache::default();
        let fetched = vec![
            program("b", 60, 120),
            program("a", -30, 30),
            program("c", 120, 180),
        ];
        let payload = fetched.clone();
        let programs = guide
            .programs("news24", move || async move { Ok(payload) })
            .await
            .unwrap();
        let ids: Vec<&str> = programs.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn current_and_next_resolve_against_now() {
        let guide = ProgramGuideCache::default();
        guide
            .programs("news24", || async {
                Ok(vec![program("on-air", -10, 20), program("up-next", 20, 50)])
            })
            .await
            .unwrap();
        assert_eq!(guide.current_program("news24").unwrap().id, "on-air");
        assert_eq!(guide.next_program("news24").unwrap().id, "up-next");
        assert!(guide.current_program("unknown").is_none());
    }
}

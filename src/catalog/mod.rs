//! Read paths behind the public pages.
//!
//! Every listing is a full scan filtered and sorted here. Reads degrade to
//! empty/absent on store failure; counters are fire-and-forget.

mod render;

pub use render::render_signal;

use std::cmp::Reverse;

use tokio::task::JoinHandle;

use crate::dates::sort_key;
use crate::db::{LocalStore, Record};
use crate::errors::AppError;
use crate::models::{
    AboutData, ConnectConfig, SensorData, Signal, Work, CONNECT_CONFIG_ID, PROFILE_ID,
    SENSOR_METRICS_ID,
};

/// Page-side view of the store.
#[derive(Clone)]
pub struct Catalog {
    store: LocalStore,
}

impl Catalog {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    // ==================== WORKS ====================

    /// Visible works, newest first.
    pub async fn visible_works(&self) -> Vec<Work> {
        let mut works: Vec<Work> = self
            .store
            .fetch_all::<Work>()
            .await
            .into_iter()
            .filter(|w| w.is_visible)
            .collect();
        sort_works(&mut works);
        works
    }

    /// Visible works flagged as featured, newest first.
    pub async fn featured_works(&self) -> Vec<Work> {
        self.visible_works()
            .await
            .into_iter()
            .filter(|w| w.is_featured)
            .collect()
    }

    /// Look a visible work up by slug, then by id.
    pub async fn find_work(&self, slug_or_id: &str) -> Option<Work> {
        let works = self.visible_works().await;
        works
            .iter()
            .position(|w| w.slug.as_deref() == Some(slug_or_id))
            .or_else(|| works.iter().position(|w| w.id == slug_or_id))
            .map(|i| works[i].clone())
    }

    /// Open a work's detail view, counting the view in the background.
    ///
    /// The handle can be dropped; awaiting it waits for the counter write.
    pub async fn open_work(&self, slug_or_id: &str) -> Option<(Work, JoinHandle<()>)> {
        let work = self.find_work(slug_or_id).await?;
        let counted = self.record_work_view(&work.id);
        Some((work, counted))
    }

    /// Spawn a `views + 1` upsert for a work.
    pub fn record_work_view(&self, id: &str) -> JoinHandle<()> {
        let store = self.store.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            if let Err(e) = bump_views::<Work>(&store, &id).await {
                tracing::warn!("Counting view of work {} failed: {}", id, e);
            }
        })
    }

    // ==================== SIGNALS ====================

    /// Published signals, newest first by display date.
    pub async fn published_signals(&self) -> Vec<Signal> {
        let mut signals: Vec<Signal> = self
            .store
            .fetch_all::<Signal>()
            .await
            .into_iter()
            .filter(Signal::is_published)
            .collect();
        signals.sort_by_cached_key(|s| Reverse(sort_key(&s.date)));
        signals
    }

    /// A published signal by id.
    pub async fn find_signal(&self, id: &str) -> Option<Signal> {
        self.store
            .fetch::<Signal>(id)
            .await
            .filter(Signal::is_published)
    }

    /// Open a signal, counting the view in the background.
    pub async fn open_signal(&self, id: &str) -> Option<(Signal, JoinHandle<()>)> {
        let signal = self.find_signal(id).await?;
        let counted = self.record_signal_view(&signal.id);
        Some((signal, counted))
    }

    /// Spawn a `views + 1` upsert for a signal.
    pub fn record_signal_view(&self, id: &str) -> JoinHandle<()> {
        let store = self.store.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            if let Err(e) = bump_views::<Signal>(&store, &id).await {
                tracing::warn!("Counting view of signal {} failed: {}", id, e);
            }
        })
    }

    // ==================== ABOUT ====================

    pub async fn profile(&self) -> Option<AboutData> {
        self.store.fetch(PROFILE_ID).await
    }

    pub async fn connect_config(&self) -> Option<ConnectConfig> {
        self.store.fetch(CONNECT_CONFIG_ID).await
    }

    pub async fn sensor_data(&self) -> SensorData {
        self.store
            .fetch(SENSOR_METRICS_ID)
            .await
            .unwrap_or_default()
    }

    /// Count a site visit.
    pub fn record_visit(&self) -> JoinHandle<()> {
        self.bump_sensor(|s| s.visits += 1)
    }

    /// Count a click on a contact link.
    pub fn record_click(&self) -> JoinHandle<()> {
        self.bump_sensor(|s| s.clicks += 1)
    }

    fn bump_sensor(&self, apply: fn(&mut SensorData)) -> JoinHandle<()> {
        let store = self.store.clone();
        tokio::spawn(async move {
            if let Err(e) = update_sensor(&store, apply).await {
                tracing::warn!("Updating sensor metrics failed: {}", e);
            }
        })
    }
}

/// Newest first by ISO date; undated works last.
pub fn sort_works(works: &mut [Work]) {
    works.sort_by_cached_key(|w| Reverse(sort_key(&w.date)));
}

/// Records carrying a view counter.
pub trait Viewed: Record {
    fn views_mut(&mut self) -> &mut u64;
}

impl Viewed for Work {
    fn views_mut(&mut self) -> &mut u64 {
        &mut self.views
    }
}

impl Viewed for Signal {
    fn views_mut(&mut self) -> &mut u64 {
        &mut self.views
    }
}

async fn bump_views<T: Viewed>(store: &LocalStore, id: &str) -> Result<(), AppError> {
    let Some(mut record) = store.get::<T>(id).await? else {
        return Err(AppError::NotFound(format!("{} {} not found", T::COLLECTION, id)));
    };
    *record.views_mut() += 1;
    store.save(&record).await?;
    tracing::debug!("Counted view of {}/{}", T::COLLECTION, id);
    Ok(())
}

/// Read-modify-write of the sensor singleton, created on first use.
async fn update_sensor(store: &LocalStore, apply: fn(&mut SensorData)) -> Result<(), AppError> {
    let mut sensor = store
        .get::<SensorData>(SENSOR_METRICS_ID)
        .await?
        .unwrap_or_default();
    apply(&mut sensor);
    store.save(&sensor).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn work(id: &str, date: &str) -> Work {
        serde_json::from_value(serde_json::json!({ "id": id, "title": id, "date": date })).unwrap()
    }

    #[test]
    fn test_sort_works_newest_first_undated_last() {
        let mut works = vec![
            work("a", "2023-01-01"),
            work("b", ""),
            work("c", "2025-06-30"),
            work("d", "2024-12-31"),
        ];
        sort_works(&mut works);
        let ids: Vec<_> = works.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "d", "a", "b"]);
    }
}

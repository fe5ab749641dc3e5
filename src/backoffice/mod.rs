//! Password-gated content management.
//!
//! Constructing a [`Backoffice`] needs an [`AdminAccess`] from the password gate.

use std::cmp::Reverse;

use crate::auth::AdminAccess;
use crate::catalog::sort_works;
use crate::config::EditorConfig;
use crate::dates::sort_key;
use crate::db::LocalStore;
use crate::editor::EditorSession;
use crate::errors::AppError;
use crate::models::{
    slugify, AboutData, ConnectConfig, ExportBundle, ImportSummary, Signal, Work, WorkForm,
};
use crate::transfer;

/// Editing surface over works, signals and the about records.
pub struct Backoffice {
    store: LocalStore,
    editor: EditorConfig,
    _access: AdminAccess,
}

impl Backoffice {
    pub fn new(store: LocalStore, editor: EditorConfig, access: AdminAccess) -> Self {
        Self {
            store,
            editor,
            _access: access,
        }
    }

    // ==================== WORKS ====================

    /// Every work, hidden ones included, newest first.
    pub async fn works(&self) -> Result<Vec<Work>, AppError> {
        let mut works = self.store.get_all::<Work>().await?;
        sort_works(&mut works);
        Ok(works)
    }

    /// Create or update a work from the backoffice form.
    ///
    /// The view counter of an existing work is kept.
    pub async fn save_work(&self, form: WorkForm) -> Result<Work, AppError> {
        let title = form.title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }

        let (id, views) = match form.id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => {
                let existing = self.store.get::<Work>(id).await?;
                (id.to_string(), existing.map(|w| w.views).unwrap_or(0))
            }
            None => (uuid::Uuid::new_v4().to_string(), 0),
        };

        let slug = form
            .slug
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(slugify)
            .unwrap_or_else(|| slugify(title));

        let work = Work {
            id,
            title: title.to_string(),
            year: form.year,
            month: form.month,
            date: form.date,
            technique: form.technique,
            dimensions: form.dimensions,
            image_url: form.image_url,
            gallery: form.gallery.filter(|g| !g.is_empty()),
            status: form.status,
            is_visible: form.is_visible,
            is_featured: form.is_featured,
            views,
            description: form.description.filter(|d| !d.trim().is_empty()),
            slug: (!slug.is_empty()).then_some(slug),
        };

        self.store.save(&work).await?;
        tracing::info!("Saved work {} ({})", work.id, work.title);
        Ok(work)
    }

    pub async fn delete_work(&self, id: &str) -> Result<(), AppError> {
        if !self.store.remove::<Work>(id).await? {
            return Err(AppError::NotFound(format!("Work {} not found", id)));
        }
        tracing::info!("Deleted work {}", id);
        Ok(())
    }

    pub async fn set_work_visibility(&self, id: &str, visible: bool) -> Result<Work, AppError> {
        self.update_work(id, |w| w.is_visible = visible).await
    }

    pub async fn set_work_featured(&self, id: &str, featured: bool) -> Result<Work, AppError> {
        self.update_work(id, |w| w.is_featured = featured).await
    }

    async fn update_work(
        &self,
        id: &str,
        apply: impl FnOnce(&mut Work),
    ) -> Result<Work, AppError> {
        let mut work = self
            .store
            .get::<Work>(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Work {} not found", id)))?;
        apply(&mut work);
        self.store.save(&work).await?;
        Ok(work)
    }

    // ==================== SIGNALS ====================

    /// Every signal, drafts included, newest first; undated ones last.
    pub async fn signals(&self) -> Result<Vec<Signal>, AppError> {
        let mut signals = self.store.get_all::<Signal>().await?;
        signals.sort_by_cached_key(|s| Reverse(sort_key(&s.date)));
        Ok(signals)
    }

    /// Store a new empty draft and open it for editing.
    pub async fn create_signal(&self) -> Result<EditorSession, AppError> {
        let signal = Signal::empty();
        self.store.save(&signal).await?;
        tracing::info!("Created signal {}", signal.id);
        Ok(EditorSession::new(signal, &self.editor))
    }

    pub async fn edit_signal(&self, id: &str) -> Result<EditorSession, AppError> {
        EditorSession::open(&self.store, id, &self.editor).await
    }

    pub async fn delete_signal(&self, id: &str) -> Result<(), AppError> {
        if !self.store.remove::<Signal>(id).await? {
            return Err(AppError::NotFound(format!("Signal {} not found", id)));
        }
        tracing::info!("Deleted signal {}", id);
        Ok(())
    }

    // ==================== ABOUT ====================

    pub async fn save_profile(&self, bio: &str, image_url: &str) -> Result<AboutData, AppError> {
        let profile = AboutData::new(bio.trim(), image_url.trim());
        self.store.save(&profile).await?;
        Ok(profile)
    }

    /// Save the contact terminal's email and links. Links need a label and a URL.
    pub async fn save_connect(&self, config: ConnectConfig) -> Result<ConnectConfig, AppError> {
        if let Some(link) = config
            .links
            .iter()
            .find(|l| l.label.trim().is_empty() || l.url.trim().is_empty())
        {
            return Err(AppError::Validation(format!(
                "Link {:?} needs both a label and a URL",
                link.label
            )));
        }

        let config = ConnectConfig::new(config.email.trim(), config.links);
        self.store.save(&config).await?;
        Ok(config)
    }

    // ==================== TRANSFER ====================

    pub async fn export(&self) -> Result<ExportBundle, AppError> {
        transfer::export(&self.store).await
    }

    /// Import an uploaded export file's contents.
    pub async fn import(&self, raw: &str) -> Result<ImportSummary, AppError> {
        let bundle = transfer::parse_bundle(raw)?;
        transfer::import(&self.store, &bundle).await
    }
}

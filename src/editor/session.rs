//! Editing session over one signal.
//!
//! Mutations move the session to `Dirty` and reschedule a debounced autosave.
//! Keystroke-level edits are coalesced into one history entry on a longer
//! window; structural edits push a snapshot right away.

use tokio::time::Instant;

use super::debounce::Debounce;
use super::embed::normalize_embed;
use super::history::History;
use super::inline::{apply_format, Format, Selection};
use crate::config::EditorConfig;
use crate::dates;
use crate::db::LocalStore;
use crate::errors::AppError;
use crate::models::{BlockKind, Signal, SignalBlock, SignalStatus};

/// Persistence state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    Clean,
    Dirty,
    Saving,
}

/// Transient message shown next to the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorStatus {
    Saved,
    DraftSaved,
    Published,
    SaveFailed(String),
    UnsupportedLink,
}

impl EditorStatus {
    pub fn label(&self) -> String {
        match self {
            EditorStatus::Saved => "saved".to_string(),
            EditorStatus::DraftSaved => "draft saved".to_string(),
            EditorStatus::Published => "published".to_string(),
            EditorStatus::SaveFailed(reason) => format!("save failed: {}", reason),
            EditorStatus::UnsupportedLink => "unsupported link".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// What a [`EditorSession::tick`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub snapshot_committed: bool,
    pub saved: bool,
}

/// In-memory copy of one signal plus its undo history and timers.
#[derive(Debug)]
pub struct EditorSession {
    signal: Signal,
    history: History<Signal>,
    state: SaveState,
    autosave: Debounce,
    snapshot: Debounce,
    status: Option<EditorStatus>,
}

impl EditorSession {
    /// Start a clean session on a signal as stored.
    pub fn new(signal: Signal, config: &EditorConfig) -> Self {
        Self {
            history: History::new(signal.clone(), config.history_limit),
            signal,
            state: SaveState::Clean,
            autosave: Debounce::new(config.autosave_delay),
            snapshot: Debounce::new(config.history_delay),
            status: None,
        }
    }

    /// Load a signal from the store and start a session on it.
    pub async fn open(store: &LocalStore, id: &str, config: &EditorConfig) -> Result<Self, AppError> {
        let signal = store
            .get::<Signal>(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Signal {} not found", id)))?;
        Ok(Self::new(signal, config))
    }

    pub fn signal(&self) -> &Signal {
        &self.signal
    }

    pub fn state(&self) -> SaveState {
        self.state
    }

    pub fn status(&self) -> Option<&EditorStatus> {
        self.status.as_ref()
    }

    pub fn take_status(&mut self) -> Option<EditorStatus> {
        self.status.take()
    }

    pub fn can_undo(&self) -> bool {
        self.snapshot.is_pending() || self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        !self.snapshot.is_pending() && self.history.can_redo()
    }

    /// Earliest pending timer, for a driver loop.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.autosave.deadline(), self.snapshot.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // ==================== CONTINUOUS EDITS ====================

    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        if self.signal.title != title {
            self.signal.title = title;
            self.touch_continuous();
        }
    }

    pub fn set_subtitle(&mut self, subtitle: impl Into<String>) {
        let subtitle = subtitle.into();
        if self.signal.subtitle != subtitle {
            self.signal.subtitle = subtitle;
            self.touch_continuous();
        }
    }

    pub fn set_date(&mut self, date: impl Into<String>) {
        let date = date.into();
        if self.signal.date != date {
            self.signal.date = date;
            self.touch_continuous();
        }
    }

    pub fn set_block_content(
        &mut self,
        block_id: &str,
        content: impl Into<String>,
    ) -> Result<(), AppError> {
        let content = content.into();
        let block = self.block_mut(block_id)?;
        if block.content != content {
            block.content = content;
            self.touch_continuous();
        }
        Ok(())
    }

    pub fn set_block_caption(
        &mut self,
        block_id: &str,
        caption: Option<String>,
    ) -> Result<(), AppError> {
        let caption = caption.filter(|c| !c.is_empty());
        let block = self.block_mut(block_id)?;
        if block.caption != caption {
            block.caption = caption;
            self.touch_continuous();
        }
        Ok(())
    }

    // ==================== STRUCTURAL EDITS ====================

    /// Insert an empty block after `after` (or at the end). Returns its id.
    pub fn add_block(&mut self, kind: BlockKind, after: Option<&str>) -> Result<String, AppError> {
        self.insert_block(SignalBlock::new(kind, ""), after)
    }

    /// Normalize a pasted link and insert it as an embed block.
    pub fn insert_embed(&mut self, raw: &str, after: Option<&str>) -> Result<String, AppError> {
        let embed = match normalize_embed(raw) {
            Ok(embed) => embed,
            Err(e) => {
                self.status = Some(EditorStatus::UnsupportedLink);
                return Err(e);
            }
        };
        self.insert_block(SignalBlock::new(BlockKind::Embed, embed.url), after)
    }

    pub fn remove_block(&mut self, block_id: &str) -> Result<(), AppError> {
        let index = self.block_index(block_id)?;
        if self.signal.blocks.len() == 1 {
            return Err(AppError::Validation(
                "A signal keeps at least one block".to_string(),
            ));
        }

        self.commit_pending_snapshot();
        self.signal.blocks.remove(index);
        self.record_immediate();
        Ok(())
    }

    /// Swap a block with its neighbour. Returns false at either end.
    pub fn move_block(&mut self, block_id: &str, direction: MoveDirection) -> Result<bool, AppError> {
        let index = self.block_index(block_id)?;
        let target = match direction {
            MoveDirection::Up if index > 0 => index - 1,
            MoveDirection::Down if index + 1 < self.signal.blocks.len() => index + 1,
            _ => return Ok(false),
        };

        self.commit_pending_snapshot();
        self.signal.blocks.swap(index, target);
        self.record_immediate();
        Ok(true)
    }

    /// Wrap a character range of a text block with a format's delimiters.
    ///
    /// Returns the selection moved inside the delimiters.
    pub fn apply_format(
        &mut self,
        block_id: &str,
        selection: Selection,
        format: &Format,
    ) -> Result<Selection, AppError> {
        let index = self.block_index(block_id)?;
        if self.signal.blocks[index].kind != BlockKind::Text {
            return Err(AppError::Validation(format!(
                "Block {} is not a text block",
                block_id
            )));
        }

        self.commit_pending_snapshot();
        let formatted = apply_format(&self.signal.blocks[index].content, selection, format);
        self.signal.blocks[index].content = formatted.text;
        self.record_immediate();
        Ok(formatted.selection)
    }

    // ==================== HISTORY ====================

    /// Restore the previous snapshot. The publish status is kept as is.
    pub fn undo(&mut self) -> bool {
        self.commit_pending_snapshot();
        match self.history.undo() {
            Some(snapshot) => {
                let snapshot = snapshot.clone();
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        if self.snapshot.is_pending() {
            return false;
        }
        match self.history.redo() {
            Some(snapshot) => {
                let snapshot = snapshot.clone();
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    /// A published signal never goes back to an empty date.
    fn restore(&mut self, snapshot: Signal) {
        let status = self.signal.status;
        let views = self.signal.views;
        let date = std::mem::take(&mut self.signal.date);
        self.signal = snapshot;
        self.signal.status = status;
        self.signal.views = views;
        if status == SignalStatus::Published && self.signal.date.trim().is_empty() {
            self.signal.date = date;
        }
        self.mark_dirty();
    }

    // ==================== TIMERS & PERSISTENCE ====================

    /// Push the coalesced snapshot if its window has elapsed.
    pub fn commit_due_snapshot(&mut self, now: Instant) -> bool {
        if self.snapshot.fire_if_due(now) {
            self.history.push(self.signal.clone());
            true
        } else {
            false
        }
    }

    /// Run whatever timers are due at `now`.
    ///
    /// A failed autosave is logged and leaves the session dirty.
    pub async fn tick(&mut self, now: Instant, store: &LocalStore) -> TickOutcome {
        let snapshot_committed = self.commit_due_snapshot(now);

        let mut saved = false;
        if self.autosave.fire_if_due(now) && self.state == SaveState::Dirty {
            tracing::debug!("Autosaving signal {}", self.signal.id);
            saved = self.persist(store, EditorStatus::Saved).await.is_ok();
        }

        TickOutcome {
            snapshot_committed,
            saved,
        }
    }

    /// Sleep through pending timers until none is left.
    pub async fn settle(&mut self, store: &LocalStore) {
        while let Some(deadline) = self.next_deadline() {
            tokio::time::sleep_until(deadline).await;
            self.tick(Instant::now(), store).await;
        }
    }

    /// Publish now, stamping today's date when none is set.
    pub async fn publish(&mut self, store: &LocalStore) -> Result<(), AppError> {
        self.commit_pending_snapshot();
        self.signal.status = SignalStatus::Published;
        if self.signal.date.trim().is_empty() {
            self.signal.date = dates::today_display();
            self.history.push(self.signal.clone());
        }
        self.autosave.cancel();
        self.persist(store, EditorStatus::Published).await?;
        tracing::info!("Signal {} published", self.signal.id);
        Ok(())
    }

    /// Save now as a draft.
    pub async fn save_draft(&mut self, store: &LocalStore) -> Result<(), AppError> {
        self.commit_pending_snapshot();
        self.signal.status = SignalStatus::Draft;
        self.autosave.cancel();
        self.persist(store, EditorStatus::DraftSaved).await
    }

    /// Commit pending history and save if dirty, as when leaving the editor.
    pub async fn flush(&mut self, store: &LocalStore) -> Result<(), AppError> {
        self.commit_pending_snapshot();
        self.autosave.cancel();
        if self.state == SaveState::Dirty {
            self.persist(store, EditorStatus::Saved).await?;
        }
        Ok(())
    }

    async fn persist(&mut self, store: &LocalStore, on_success: EditorStatus) -> Result<(), AppError> {
        self.state = SaveState::Saving;
        match store.save(&self.signal).await {
            Ok(()) => {
                self.state = SaveState::Clean;
                self.status = Some(on_success);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Saving signal {} failed: {}", self.signal.id, e);
                self.state = SaveState::Dirty;
                self.status = Some(EditorStatus::SaveFailed(e.message()));
                Err(e)
            }
        }
    }

    // ==================== INTERNALS ====================

    fn insert_block(&mut self, block: SignalBlock, after: Option<&str>) -> Result<String, AppError> {
        let position = match after {
            Some(id) => self.block_index(id)? + 1,
            None => self.signal.blocks.len(),
        };

        self.commit_pending_snapshot();
        let id = block.id.clone();
        self.signal.blocks.insert(position, block);
        self.record_immediate();
        Ok(id)
    }

    fn block_index(&self, block_id: &str) -> Result<usize, AppError> {
        self.signal
            .block_index(block_id)
            .ok_or_else(|| AppError::NotFound(format!("Block {} not found", block_id)))
    }

    fn block_mut(&mut self, block_id: &str) -> Result<&mut SignalBlock, AppError> {
        let index = self.block_index(block_id)?;
        Ok(&mut self.signal.blocks[index])
    }

    fn commit_pending_snapshot(&mut self) {
        if self.snapshot.is_pending() {
            self.snapshot.cancel();
            self.history.push(self.signal.clone());
        }
    }

    fn mark_dirty(&mut self) {
        self.state = SaveState::Dirty;
        self.autosave.schedule(Instant::now());
    }

    fn touch_continuous(&mut self) {
        self.mark_dirty();
        self.snapshot.schedule(Instant::now());
    }

    fn record_immediate(&mut self) {
        self.history.push(self.signal.clone());
        self.mark_dirty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn session() -> EditorSession {
        let mut signal = Signal::empty();
        signal.id = "s1".to_string();
        EditorSession::new(signal, &EditorConfig::default())
    }

    fn first_block(session: &EditorSession) -> String {
        session.signal().blocks[0].id.clone()
    }

    fn later() -> Instant {
        Instant::now() + Duration::from_secs(60)
    }

    #[test]
    fn test_new_session_is_clean() {
        let session = session();
        assert_eq!(session.state(), SaveState::Clean);
        assert!(!session.can_undo());
        assert!(session.next_deadline().is_none());
    }

    #[test]
    fn test_edit_marks_dirty_and_schedules() {
        let mut session = session();
        session.set_title("ruído");
        assert_eq!(session.state(), SaveState::Dirty);
        assert!(session.next_deadline().is_some());
    }

    #[test]
    fn test_same_value_is_not_an_edit() {
        let mut session = session();
        session.set_title("");
        assert_eq!(session.state(), SaveState::Clean);
    }

    #[test]
    fn test_keystrokes_coalesce_into_one_entry() {
        let mut session = session();
        let block = first_block(&session);
        for text in ["o", "o r", "o ru", "o ruído"] {
            session.set_block_content(&block, text).unwrap();
        }
        assert!(!session.commit_due_snapshot(Instant::now()));
        assert!(session.commit_due_snapshot(later()));

        assert!(session.undo());
        assert_eq!(session.signal().blocks[0].content, "");
        assert!(!session.undo());
    }

    #[test]
    fn test_undo_commits_pending_typing() {
        let mut session = session();
        session.set_title("primeiro");
        assert!(session.can_undo());
        assert!(session.undo());
        assert_eq!(session.signal().title, "");
        assert!(session.redo());
        assert_eq!(session.signal().title, "primeiro");
    }

    #[test]
    fn test_undo_steps_back_one_mutation() {
        let mut session = session();
        let first = first_block(&session);
        let second = session.add_block(BlockKind::Text, None).unwrap();
        let third = session.add_block(BlockKind::Image, Some(&first)).unwrap();

        let ids: Vec<_> = session.signal().blocks.iter().map(|b| b.id.clone()).collect();
        assert_eq!(ids, vec![first.clone(), third.clone(), second.clone()]);

        assert!(session.undo());
        let ids: Vec<_> = session.signal().blocks.iter().map(|b| b.id.clone()).collect();
        assert_eq!(ids, vec![first.clone(), second.clone()]);

        assert!(session.redo());
        assert_eq!(session.signal().blocks.len(), 3);
    }

    #[test]
    fn test_new_edit_after_undo_discards_redo() {
        let mut session = session();
        session.add_block(BlockKind::Text, None).unwrap();
        session.add_block(BlockKind::Text, None).unwrap();
        session.undo();
        assert!(session.can_redo());

        session.add_block(BlockKind::Image, None).unwrap();
        assert!(!session.can_redo());
        assert!(!session.redo());
        assert_eq!(session.signal().blocks[2].kind, BlockKind::Image);
    }

    #[test]
    fn test_undo_is_a_dirty_edit() {
        let mut session = session();
        session.add_block(BlockKind::Text, None).unwrap();
        session.undo();
        assert_eq!(session.state(), SaveState::Dirty);
        assert!(session.next_deadline().is_some());
    }

    #[test]
    fn test_remove_last_block_is_rejected() {
        let mut session = session();
        let only = first_block(&session);
        let err = session.remove_block(&only).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let other = session.add_block(BlockKind::Text, None).unwrap();
        session.remove_block(&only).unwrap();
        assert_eq!(session.signal().blocks.len(), 1);
        assert_eq!(session.signal().blocks[0].id, other);
    }

    #[test]
    fn test_move_block() {
        let mut session = session();
        let first = first_block(&session);
        let second = session.add_block(BlockKind::Image, None).unwrap();

        assert!(!session.move_block(&first, MoveDirection::Up).unwrap());
        assert!(session.move_block(&first, MoveDirection::Down).unwrap());
        assert_eq!(session.signal().blocks[0].id, second);
        assert!(matches!(
            session.move_block("missing", MoveDirection::Up),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_unsupported_embed_sets_status() {
        let mut session = session();
        let err = session.insert_embed("https://example.org/x", None).unwrap_err();
        assert!(matches!(err, AppError::UnsupportedEmbed(_)));
        assert_eq!(session.status(), Some(&EditorStatus::UnsupportedLink));
        assert_eq!(session.signal().blocks.len(), 1);
        assert_eq!(session.state(), SaveState::Clean);
    }

    #[test]
    fn test_embed_is_normalized() {
        let mut session = session();
        let id = session
            .insert_embed("https://youtu.be/dQw4w9WgXcQ", None)
            .unwrap();
        let block = &session.signal().blocks[1];
        assert_eq!(block.id, id);
        assert_eq!(block.kind, BlockKind::Embed);
        assert_eq!(block.content, "https://www.youtube.com/embed/dQw4w9WgXcQ");
    }

    #[test]
    fn test_format_only_text_blocks() {
        let mut session = session();
        let text = first_block(&session);
        session.set_block_content(&text, "ruído branco").unwrap();
        let selection = session
            .apply_format(&text, Selection::new(0, 5), &Format::Bold)
            .unwrap();
        assert_eq!(session.signal().blocks[0].content, "**ruído** branco");
        assert_eq!(selection, Selection::new(2, 7));

        let image = session.add_block(BlockKind::Image, None).unwrap();
        assert!(session
            .apply_format(&image, Selection::new(0, 1), &Format::Italic)
            .is_err());

        // image block, bold, typing: one undo step each
        assert!(session.undo());
        assert!(session.undo());
        assert_eq!(session.signal().blocks[0].content, "ruído branco");
        assert!(session.undo());
        assert_eq!(session.signal().blocks[0].content, "");
    }

    #[test]
    fn test_undo_keeps_publish_status() {
        let mut session = session();
        session.add_block(BlockKind::Text, None).unwrap();
        session.signal.status = SignalStatus::Published;
        session.undo();
        assert_eq!(session.signal().status, SignalStatus::Published);
        assert_eq!(session.signal().blocks.len(), 1);
    }
}

use std::time::{Duration, Instant};

use rand::Rng;

use crate::error::{PolishError, StoreError};
use crate::models::{
    Attachment, AttachmentKind, AttachmentPatch, NEW_STICKY_CONTENT, NotebookPatch,
    NotebookSession, NotebookTheme, PageData, PagePatch,
};
use crate::polish::{PolishOutcome, PolishRequest};
use crate::store::{BlobStore, NOTEBOOKS_KEY};

pub const FIRST_NOTEBOOK_NAME: &str = "My First Notebook";
pub const REPLACEMENT_NOTEBOOK_NAME: &str = "My New Notebook";
const SAVED_AFTER: Duration = Duration::from_millis(500);
const IDLE_AFTER: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Idle,
    Saving,
    Saved,
    /// The last write did not reach the store.
    Failed,
}

impl SaveStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Safe",
            Self::Saving => "Saving...",
            Self::Saved => "Saved!",
            Self::Failed => "Not saved!",
        }
    }
}

/// What happened when a polish result came back.
#[derive(Debug)]
pub enum PolishResolution {
    Applied,
    /// The page (or its notebook) was gone by the time the text arrived.
    TargetMissing,
    Failed(PolishError),
}

/// All notebooks plus the active notebook/page cursors. Every change goes
/// through here and is written to the store as one JSON document.
pub struct Library {
    notebooks: Vec<NotebookSession>,
    active_id: String,
    page_index: usize,
    store: Box<dyn BlobStore>,
    last_saved_at: Option<Instant>,
    save_failed: bool,
    polish_in_flight: bool,
}

impl Library {
    /// Never fails: unreadable or unparsable data falls back to a fresh notebook.
    pub fn load(store: Box<dyn BlobStore>) -> Self {
        let notebooks = match store.get(NOTEBOOKS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<NotebookSession>>(&raw) {
                Ok(parsed) if !parsed.is_empty() => parsed,
                Ok(_) => {
                    tracing::warn!("stored notebook list is empty, starting fresh");
                    Vec::new()
                }
                Err(err) => {
                    tracing::warn!(error = %err, "failed to parse stored notebooks");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read stored notebooks");
                Vec::new()
            }
        };

        let notebooks = if notebooks.is_empty() {
            vec![NotebookSession::new(FIRST_NOTEBOOK_NAME)]
        } else {
            notebooks
        };
        tracing::info!(count = notebooks.len(), "notebooks loaded");

        Self {
            active_id: notebooks[0].id.clone(),
            notebooks,
            page_index: 0,
            store,
            last_saved_at: None,
            save_failed: false,
            polish_in_flight: false,
        }
    }

    pub fn notebooks(&self) -> &[NotebookSession] {
        &self.notebooks
    }

    #[cfg(test)]
    pub fn store(&self) -> &dyn BlobStore {
        self.store.as_ref()
    }

    fn active_index(&self) -> usize {
        self.notebooks
            .iter()
            .position(|nb| nb.id == self.active_id)
            .unwrap_or(0)
    }

    /// First notebook matching the cursor, or the first notebook overall.
    pub fn active(&self) -> &NotebookSession {
        &self.notebooks[self.active_index()]
    }

    pub fn active_id(&self) -> &str {
        &self.active().id
    }

    pub fn page_index(&self) -> usize {
        self.page_index.min(self.active().pages.len() - 1)
    }

    pub fn current_page(&self) -> &PageData {
        &self.active().pages[self.page_index()]
    }

    pub fn save_status(&self, now: Instant) -> SaveStatus {
        if self.save_failed {
            return SaveStatus::Failed;
        }
        match self.last_saved_at {
            None => SaveStatus::Idle,
            Some(at) => {
                let elapsed = now.saturating_duration_since(at);
                if elapsed < SAVED_AFTER {
                    SaveStatus::Saving
                } else if elapsed < IDLE_AFTER {
                    SaveStatus::Saved
                } else {
                    SaveStatus::Idle
                }
            }
        }
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        let written = serde_json::to_string(&self.notebooks)
            .map_err(StoreError::from)
            .and_then(|raw| self.store.set(NOTEBOOKS_KEY, &raw).map(|()| raw.len()));
        match written {
            Ok(bytes) => {
                self.save_failed = false;
                self.last_saved_at = Some(Instant::now());
                tracing::debug!(bytes, "notebooks saved");
                Ok(())
            }
            Err(err) => {
                self.save_failed = true;
                Err(err)
            }
        }
    }

    /// Merge `patch` into the active notebook, stamp it and save everything.
    pub fn update_active(&mut self, patch: NotebookPatch) -> Result<(), StoreError> {
        let index = self.active_index();
        let notebook = &mut self.notebooks[index];
        patch.apply(notebook);
        notebook.touch();
        self.persist()
    }

    pub fn create_notebook(&mut self) -> Result<(), StoreError> {
        let notebook = NotebookSession::new(format!("Notebook {}", self.notebooks.len() + 1));
        tracing::info!(id = %notebook.id, name = %notebook.name, "notebook created");
        self.active_id = notebook.id.clone();
        self.notebooks.insert(0, notebook);
        self.page_index = 0;
        self.persist()
    }

    /// Returns false when no notebook has that id.
    pub fn select_notebook(&mut self, id: &str) -> bool {
        if !self.notebooks.iter().any(|nb| nb.id == id) {
            return false;
        }
        self.active_id = id.to_string();
        self.page_index = 0;
        true
    }

    pub fn delete_notebook(&mut self, id: &str) -> Result<(), StoreError> {
        let was_active = self.active_id() == id;
        self.notebooks.retain(|nb| nb.id != id);

        if self.notebooks.is_empty() {
            let fresh = NotebookSession::new(REPLACEMENT_NOTEBOOK_NAME);
            self.active_id = fresh.id.clone();
            self.notebooks.push(fresh);
            self.page_index = 0;
        } else if was_active {
            self.active_id = self.notebooks[0].id.clone();
            self.page_index = 0;
        }
        tracing::info!(id, remaining = self.notebooks.len(), "notebook deleted");
        self.persist()
    }

    pub fn rename_active(&mut self, name: impl Into<String>) -> Result<(), StoreError> {
        self.update_active(NotebookPatch {
            name: Some(name.into()),
            ..Default::default()
        })
    }

    pub fn set_theme(&mut self, theme: NotebookTheme) -> Result<(), StoreError> {
        self.update_active(NotebookPatch {
            theme: Some(theme),
            ..Default::default()
        })
    }

    pub fn add_page(&mut self) -> Result<(), StoreError> {
        let mut pages = self.active().pages.clone();
        pages.push(PageData::blank());
        let last = pages.len() - 1;
        let result = self.update_active(NotebookPatch {
            pages: Some(pages),
            ..Default::default()
        });
        self.page_index = last;
        result
    }

    /// Edit title/date/content of the page under the cursor.
    pub fn update_page(&mut self, patch: PagePatch) -> Result<(), StoreError> {
        let index = self.page_index();
        let mut pages = self.active().pages.clone();
        patch.apply(&mut pages[index]);
        self.update_active(NotebookPatch {
            pages: Some(pages),
            ..Default::default()
        })
    }

    pub fn prev_page(&mut self) {
        self.page_index = self.page_index().saturating_sub(1);
    }

    pub fn next_page(&mut self) {
        let last = self.active().pages.len() - 1;
        self.page_index = (self.page_index() + 1).min(last);
    }

    fn push_attachment(&mut self, attachment: Attachment) -> Result<String, StoreError> {
        let id = attachment.id.clone();
        let mut attachments = self.active().attachments.clone();
        attachments.push(attachment);
        self.update_active(NotebookPatch {
            attachments: Some(attachments),
            ..Default::default()
        })?;
        Ok(id)
    }

    /// Add a photo at a jittered spot so repeated photos don't stack exactly.
    pub fn add_image(&mut self, data_uri: impl Into<String>) -> Result<String, StoreError> {
        let mut rng = rand::thread_rng();
        let x = 100.0 + rng.gen_range(0.0..200.0);
        let y = 100.0 + rng.gen_range(0.0..200.0);
        self.push_attachment(Attachment::new(AttachmentKind::Image, x, y, data_uri))
    }

    pub fn add_sticky(&mut self) -> Result<String, StoreError> {
        let mut rng = rand::thread_rng();
        let x = 50.0 + rng.gen_range(0.0..100.0);
        let y = 50.0 + rng.gen_range(0.0..100.0);
        self.push_attachment(Attachment::new(
            AttachmentKind::Sticky,
            x,
            y,
            NEW_STICKY_CONTENT,
        ))
    }

    pub fn remove_attachment(&mut self, id: &str) -> Result<(), StoreError> {
        let attachments = self
            .active()
            .attachments
            .iter()
            .filter(|a| a.id != id)
            .cloned()
            .collect();
        self.update_active(NotebookPatch {
            attachments: Some(attachments),
            ..Default::default()
        })
    }

    pub fn update_attachment(&mut self, id: &str, patch: AttachmentPatch) -> Result<(), StoreError> {
        let mut attachments = self.active().attachments.clone();
        let Some(attachment) = attachments.iter_mut().find(|a| a.id == id) else {
            tracing::debug!(id, "no attachment to update");
            return Ok(());
        };
        patch.apply(attachment);
        self.update_active(NotebookPatch {
            attachments: Some(attachments),
            ..Default::default()
        })
    }

    pub fn is_polishing(&self) -> bool {
        self.polish_in_flight
    }

    /// Capture the current page for polishing. `None` when the page is blank
    /// or another polish is still running.
    pub fn begin_polish(&mut self) -> Option<PolishRequest> {
        if self.polish_in_flight {
            return None;
        }
        let page = self.current_page();
        if page.content.trim().is_empty() {
            return None;
        }
        let request = PolishRequest {
            notebook_id: self.active().id.clone(),
            page_id: page.id.clone(),
            content: page.content.clone(),
        };
        self.polish_in_flight = true;
        Some(request)
    }

    /// Drop the busy flag without a result, e.g. when the worker could not be reached.
    pub fn cancel_polish(&mut self) {
        self.polish_in_flight = false;
    }

    /// Apply a polish result to the page it was requested for, wherever the
    /// cursors are now.
    pub fn finish_polish(&mut self, outcome: PolishOutcome) -> Result<PolishResolution, StoreError> {
        self.polish_in_flight = false;
        let PolishOutcome { request, result } = outcome;

        let text = match result {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(error = %err, page_id = %request.page_id, "AI polish failed");
                return Ok(PolishResolution::Failed(err));
            }
        };

        if text.trim().is_empty() {
            tracing::warn!(page_id = %request.page_id, "AI polish returned no text");
            return Ok(PolishResolution::Failed(PolishError::EmptyResponse));
        }

        let Some(notebook) = self
            .notebooks
            .iter_mut()
            .find(|nb| nb.id == request.notebook_id)
        else {
            tracing::info!(notebook_id = %request.notebook_id, "polished notebook no longer exists");
            return Ok(PolishResolution::TargetMissing);
        };
        let Some(page) = notebook.pages.iter_mut().find(|p| p.id == request.page_id) else {
            tracing::info!(page_id = %request.page_id, "polished page no longer exists");
            return Ok(PolishResolution::TargetMissing);
        };

        page.content = text;
        notebook.touch();
        self.persist()?;
        tracing::info!(page_id = %request.page_id, "page polished");
        Ok(PolishResolution::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LineStyle, NotebookColor, TextureStyle, WELCOME_CONTENT, WELCOME_TITLE};
    use crate::polish::tests::ScriptedGenerator;
    use crate::polish::{PolishWorker, TextGenerator, build_prompt, SYSTEM_INSTRUCTION};
    use crate::store::MemoryBlobStore;
    use std::sync::{Arc, Mutex};

    fn fresh_library() -> Library {
        Library::load(Box::new(MemoryBlobStore::new()))
    }

    fn stored(library: &Library) -> Vec<NotebookSession> {
        let raw = library
            .store()
            .get(NOTEBOOKS_KEY)
            .expect("get")
            .expect("blob present");
        serde_json::from_str(&raw).expect("parse stored blob")
    }

    fn assert_round_trips(library: &Library) {
        assert_eq!(stored(library), library.notebooks());
    }

    #[test]
    fn empty_store_starts_with_welcome_notebook() {
        let library = fresh_library();
        assert_eq!(library.notebooks().len(), 1);
        let nb = library.active();
        assert_eq!(nb.name, FIRST_NOTEBOOK_NAME);
        assert_eq!(nb.pages.len(), 1);
        assert_eq!(nb.pages[0].title, WELCOME_TITLE);
        assert_eq!(nb.pages[0].content, WELCOME_CONTENT);
        assert!(nb.attachments.is_empty());
        assert_eq!(nb.theme.line_style, LineStyle::College);
        assert_eq!(library.save_status(Instant::now()), SaveStatus::Idle);
    }

    #[test]
    fn garbage_blob_falls_back_to_default() {
        for raw in ["{not json", "[]", r#"[{"id":"x"}]"#] {
            let library = Library::load(Box::new(MemoryBlobStore::with_value(NOTEBOOKS_KEY, raw)));
            assert_eq!(library.notebooks().len(), 1);
            assert_eq!(library.active().name, FIRST_NOTEBOOK_NAME);
        }
    }

    #[test]
    fn reload_picks_up_saved_collection() {
        let mut library = fresh_library();
        library.create_notebook().expect("create");
        library.add_sticky().expect("sticky");
        let raw = library.store().get(NOTEBOOKS_KEY).expect("get").expect("blob");

        let reloaded = Library::load(Box::new(MemoryBlobStore::with_value(NOTEBOOKS_KEY, &raw)));
        assert_eq!(reloaded.notebooks(), library.notebooks());
        assert_eq!(reloaded.active_id(), reloaded.notebooks()[0].id);
    }

    #[test]
    fn add_page_grows_by_one_and_moves_cursor_to_end() {
        let mut library = fresh_library();
        for expected in 2..=6 {
            library.add_page().expect("add page");
            assert_eq!(library.active().pages.len(), expected);
            assert_eq!(library.page_index(), expected - 1);
            assert_round_trips(&library);
        }
        assert_eq!(library.current_page().title, "New Page");
        assert!(library.current_page().content.is_empty());
    }

    #[test]
    fn page_cursor_is_clamped_without_wraparound() {
        let mut library = fresh_library();
        library.prev_page();
        assert_eq!(library.page_index(), 0);
        library.next_page();
        assert_eq!(library.page_index(), 0);

        library.add_page().expect("add");
        library.add_page().expect("add");
        assert_eq!(library.page_index(), 2);
        library.next_page();
        assert_eq!(library.page_index(), 2);
        library.prev_page();
        library.prev_page();
        library.prev_page();
        assert_eq!(library.page_index(), 0);
        library.next_page();
        assert_eq!(library.page_index(), 1);
    }

    #[test]
    fn update_page_edits_only_the_current_page() {
        let mut library = fresh_library();
        library.add_page().expect("add");
        library.prev_page();
        library
            .update_page(PagePatch {
                title: Some("Picnic".into()),
                date: Some("someday".into()),
                ..Default::default()
            })
            .expect("update");

        let pages = &library.active().pages;
        assert_eq!(pages[0].title, "Picnic");
        assert_eq!(pages[0].date, "someday");
        assert_eq!(pages[0].content, WELCOME_CONTENT);
        assert_eq!(pages[1].title, "New Page");
        assert_round_trips(&library);
    }

    #[test]
    fn update_active_bumps_timestamp_and_marks_saving() {
        let mut library = fresh_library();
        let before = library.active().updated_at;
        library.rename_active("Dreams").expect("rename");
        assert_eq!(library.active().name, "Dreams");
        assert!(library.active().updated_at > before);

        let now = Instant::now();
        assert_eq!(library.save_status(now), SaveStatus::Saving);
        assert_eq!(library.save_status(now + Duration::from_millis(600)), SaveStatus::Saved);
        assert_eq!(library.save_status(now + Duration::from_millis(2100)), SaveStatus::Idle);
    }

    #[test]
    fn mutations_only_touch_the_active_notebook() {
        let mut library = fresh_library();
        library.create_notebook().expect("create");
        let untouched = library.notebooks()[1].clone();
        library
            .set_theme(NotebookTheme {
                line_style: LineStyle::Dotted,
                color: NotebookColor::Mint,
                texture: TextureStyle::Grid,
            })
            .expect("theme");
        assert_eq!(library.notebooks()[1], untouched);
        assert_eq!(library.active().theme.color, NotebookColor::Mint);
        assert_round_trips(&library);
    }

    #[test]
    fn create_notebook_prepends_and_activates() {
        let mut library = fresh_library();
        library.add_page().expect("add");
        library.create_notebook().expect("create");
        assert_eq!(library.notebooks().len(), 2);
        assert_eq!(library.active_id(), library.notebooks()[0].id);
        assert_eq!(library.active().name, "Notebook 2");
        assert_eq!(library.page_index(), 0);
        assert_round_trips(&library);
    }

    #[test]
    fn select_notebook_resets_page_cursor() {
        let mut library = fresh_library();
        let first = library.active_id().to_string();
        library.create_notebook().expect("create");
        library.add_page().expect("add");
        assert_eq!(library.page_index(), 1);

        assert!(library.select_notebook(&first));
        assert_eq!(library.active_id(), first);
        assert_eq!(library.page_index(), 0);
        assert!(!library.select_notebook("missing"));
        assert_eq!(library.active_id(), first);
    }

    #[test]
    fn deleting_last_notebook_creates_a_fresh_one() {
        let mut library = fresh_library();
        let id = library.active_id().to_string();
        library.delete_notebook(&id).expect("delete");

        assert_eq!(library.notebooks().len(), 1);
        let nb = library.active();
        assert_ne!(nb.id, id);
        assert_eq!(nb.name, REPLACEMENT_NOTEBOOK_NAME);
        assert_eq!(nb.pages.len(), 1);
        assert_round_trips(&library);
    }

    #[test]
    fn deleting_inactive_notebook_keeps_cursor() {
        let mut library = fresh_library();
        let older = library.active_id().to_string();
        library.create_notebook().expect("create");
        let active = library.active_id().to_string();

        library.delete_notebook(&older).expect("delete");
        assert_eq!(library.active_id(), active);
        assert_eq!(library.notebooks().len(), 1);
    }

    #[test]
    fn deleting_active_notebook_retargets_to_first() {
        let mut library = fresh_library();
        library.create_notebook().expect("create");
        library.create_notebook().expect("create");
        let middle = library.notebooks()[1].id.clone();
        assert!(library.select_notebook(&middle));

        library.delete_notebook(&middle).expect("delete");
        assert_eq!(library.notebooks().len(), 2);
        assert_eq!(library.active_id(), library.notebooks()[0].id);
        assert_round_trips(&library);
    }

    #[test]
    fn image_attachment_can_be_found_and_removed() {
        let mut library = fresh_library();
        let sticky = library.add_sticky().expect("sticky");
        let image = library.add_image("data:image/png;base64,AAA").expect("image");
        let other = library.add_sticky().expect("sticky");
        let before = library.active().attachments.clone();

        let matches: Vec<_> = library
            .active()
            .attachments
            .iter()
            .filter(|a| a.id == image)
            .collect();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].kind, AttachmentKind::Image);
        assert_eq!(matches[0].content, "data:image/png;base64,AAA");
        assert!((100.0..300.0).contains(&matches[0].x));
        assert!((100.0..300.0).contains(&matches[0].y));

        library.remove_attachment(&image).expect("remove");
        let after = &library.active().attachments;
        assert_eq!(after.len(), before.len() - 1);
        let kept: Vec<_> = before.iter().filter(|a| a.id != image).cloned().collect();
        assert_eq!(after, &kept);
        assert!(after.iter().any(|a| a.id == sticky));
        assert!(after.iter().any(|a| a.id == other));
        assert_round_trips(&library);
    }

    #[test]
    fn sticky_lands_in_small_window() {
        let mut library = fresh_library();
        for _ in 0..20 {
            library.add_sticky().expect("sticky");
        }
        for sticky in &library.active().attachments {
            assert!((50.0..150.0).contains(&sticky.x));
            assert!((50.0..150.0).contains(&sticky.y));
        }
    }

    #[test]
    fn update_attachment_moves_and_edits_in_place() {
        let mut library = fresh_library();
        let id = library.add_sticky().expect("sticky");
        library
            .update_attachment(&id, AttachmentPatch::position(-40.0, 900.5))
            .expect("move");
        library
            .update_attachment(
                &id,
                AttachmentPatch {
                    content: Some("buy milk".into()),
                    ..Default::default()
                },
            )
            .expect("edit");

        let sticky = &library.active().attachments[0];
        assert_eq!((sticky.x, sticky.y), (-40.0, 900.5));
        assert_eq!(sticky.content, "buy milk");
        assert_round_trips(&library);
    }

    #[test]
    fn write_failure_is_reported_but_memory_keeps_change() {
        let mut library = Library::load(Box::new(MemoryBlobStore::new().failing_writes()));
        assert!(library.add_sticky().is_err());
        assert_eq!(library.active().attachments.len(), 1);

        let now = Instant::now();
        for later in [0, 600, 2100] {
            let status = library.save_status(now + Duration::from_millis(later));
            assert_eq!(status, SaveStatus::Failed, "{later}ms after failed write");
        }
    }

    #[test]
    fn successful_write_clears_failed_status() {
        let mut library = fresh_library();
        library.save_failed = true;
        library.add_page().expect("add");
        assert_eq!(library.save_status(Instant::now()), SaveStatus::Saving);
    }

    #[test]
    fn updating_unknown_attachment_changes_nothing() {
        let mut library = fresh_library();
        library.add_sticky().expect("sticky");
        let before = library.active().clone();
        let saved_at = library.last_saved_at;

        library
            .update_attachment("nope", AttachmentPatch::position(1.0, 2.0))
            .expect("no-op");
        assert_eq!(library.active(), &before);
        assert_eq!(library.last_saved_at, saved_at);
        assert_eq!(stored(&library), library.notebooks());
    }

    #[test]
    fn polish_skips_blank_pages() {
        let mut library = fresh_library();
        library.add_page().expect("add");
        assert!(library.begin_polish().is_none());
        library.update_page(PagePatch::content(" \n\t ")).expect("blank");
        assert!(library.begin_polish().is_none());
        assert!(!library.is_polishing());
    }

    #[test]
    fn polish_is_serialized_by_busy_flag() {
        let mut library = fresh_library();
        let request = library.begin_polish().expect("welcome page has text");
        assert!(library.is_polishing());
        assert!(library.begin_polish().is_none());

        let resolution = library
            .finish_polish(PolishOutcome {
                request,
                result: Err(PolishError::EmptyResponse),
            })
            .expect("finish");
        assert!(matches!(resolution, PolishResolution::Failed(_)));
        assert!(!library.is_polishing());
        assert_eq!(library.current_page().content, WELCOME_CONTENT);
        assert!(library.begin_polish().is_some());
        library.cancel_polish();
        assert!(!library.is_polishing());
    }

    #[test]
    fn polish_result_targets_the_requested_page() {
        let mut library = fresh_library();
        library.update_page(PagePatch::content("first page")).expect("edit");
        let request = library.begin_polish().expect("request");
        let target_page = request.page_id.clone();

        library.add_page().expect("add");
        library.create_notebook().expect("switch away");

        let resolution = library
            .finish_polish(PolishOutcome {
                request,
                result: Ok("polished!".to_string()),
            })
            .expect("finish");
        assert!(matches!(resolution, PolishResolution::Applied));

        let original = &library.notebooks()[1];
        let page = original
            .pages
            .iter()
            .find(|p| p.id == target_page)
            .expect("page");
        assert_eq!(page.content, "polished!");
        assert_eq!(original.pages[1].content, "");
        assert_eq!(library.current_page().content, WELCOME_CONTENT);
        assert_round_trips(&library);
    }

    #[test]
    fn polish_result_for_deleted_notebook_is_dropped() {
        let mut library = fresh_library();
        let request = library.begin_polish().expect("request");
        let id = request.notebook_id.clone();
        library.delete_notebook(&id).expect("delete");
        let snapshot = library.notebooks().to_vec();

        let resolution = library
            .finish_polish(PolishOutcome {
                request,
                result: Ok("late".to_string()),
            })
            .expect("finish");
        assert!(matches!(resolution, PolishResolution::TargetMissing));
        assert_eq!(library.notebooks(), snapshot.as_slice());
    }

    #[test]
    fn welcome_scenario_with_sticky_and_polish() {
        let mut library = fresh_library();
        assert_eq!(library.active().name, "My First Notebook");
        assert!(library.current_page().content.starts_with("Start writing"));

        library.add_sticky().expect("sticky");
        let attachments = &library.active().attachments;
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].kind, AttachmentKind::Sticky);
        assert_eq!(attachments[0].content, "New Note");

        let prompts = Arc::new(Mutex::new(Vec::new()));
        let generator = ScriptedGenerator {
            reply: Ok("Hi there! 🌸".to_string()),
            prompts: prompts.clone(),
        };

        library.update_page(PagePatch::content("")).expect("clear");
        assert!(library.begin_polish().is_none());
        assert!(prompts.lock().expect("lock").is_empty());
        assert_eq!(library.current_page().content, "");

        library.update_page(PagePatch::content("hi")).expect("type");
        let request = library.begin_polish().expect("request");
        let result = generator.generate(SYSTEM_INSTRUCTION, &build_prompt(&request.content));
        library
            .finish_polish(PolishOutcome { request, result })
            .expect("finish");

        assert_eq!(library.current_page().content, "Hi there! 🌸");
        assert_eq!(prompts.lock().expect("lock").len(), 1);
        assert_round_trips(&library);
    }

    #[test]
    fn polish_through_worker_thread() {
        let mut library = fresh_library();
        library.update_page(PagePatch::content("hi")).expect("type");
        let worker = PolishWorker::spawn(
            eframe::egui::Context::default(),
            Box::new(ScriptedGenerator {
                reply: Ok("Hi there! 🌸".to_string()),
                prompts: Arc::new(Mutex::new(Vec::new())),
            }),
        );
        worker
            .submit(library.begin_polish().expect("request"))
            .expect("submit");

        let deadline = Instant::now() + Duration::from_secs(5);
        let outcome = loop {
            if let Some(outcome) = worker.try_recv().expect("worker alive") {
                break outcome;
            }
            assert!(Instant::now() < deadline, "no outcome");
            std::thread::sleep(Duration::from_millis(5));
        };
        library.finish_polish(outcome).expect("finish");
        assert_eq!(library.current_page().content, "Hi there! 🌸");
    }
}

//! Checklist session controller.
//!
//! # Responsibility
//! - Own the in-memory item list of one open checklist note.
//! - Apply add/toggle/remove-done/replace mutations and hand the encoded
//!   result to the background worker for persistence.
//! - Reapply the sort policy and notify observers after every change.
//!
//! # Invariants
//! - State moves `Unloaded -> Loading -> Ready`; mutations are only accepted
//!   in `Ready`.
//! - A toggle persists before it reloads, and the reload runs on the same
//!   worker queue, so it reads the value just written.
//! - Configuration is read through `ConfigSource::snapshot` at the start of
//!   each operation and never cached.
//! - Completions that arrive after `detach` are discarded.
//! - Missing notes, vanished backing files, failed writes and unknown item ids
//!   are logged and absorbed, never returned as errors.

use crate::codec::checklist_codec::{self, CodecError};
use crate::config::checklist_config::ConfigSource;
use crate::model::checklist_item::{
    next_item_id, normalize_titles, reassign_duplicate_ids, split_item_lines, ChecklistItem,
    ChecklistItemId,
};
use crate::model::note::{Note, NoteId};
use crate::repo::note_repo::{NoteRepository, RepoError, RepoResult};
use crate::service::note_worker::{Completion, NoteWorker, Ticket, WorkerError};
use crate::sort::sort_policy::order;
use chrono::Utc;
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type ChecklistResult<T> = Result<T, ChecklistError>;

/// Lifecycle of one loaded checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Unloaded,
    Loading,
    Ready,
}

impl Display for ControllerState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Unloaded => "unloaded",
            Self::Loading => "loading",
            Self::Ready => "ready",
        };
        f.write_str(name)
    }
}

/// Errors returned by controller operations.
#[derive(Debug)]
pub enum ChecklistError {
    /// A mutation was issued before the checklist reached `Ready`.
    NotReady(ControllerState),
    /// The session has been torn down.
    Detached,
    Codec(CodecError),
    Worker(WorkerError),
}

impl Display for ChecklistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotReady(state) => write!(f, "checklist is not ready (state: {state})"),
            Self::Detached => write!(f, "checklist session has been detached"),
            Self::Codec(err) => write!(f, "{err}"),
            Self::Worker(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ChecklistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Codec(err) => Some(err),
            Self::Worker(err) => Some(err),
            Self::NotReady(_) | Self::Detached => None,
        }
    }
}

impl From<CodecError> for ChecklistError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

impl From<WorkerError> for ChecklistError {
    fn from(value: WorkerError) -> Self {
        Self::Worker(value)
    }
}

/// Receives the full ordered item list whenever it changes.
pub trait ChecklistObserver {
    fn on_items_changed(&mut self, items: &[ChecklistItem]);
}

impl<F> ChecklistObserver for F
where
    F: FnMut(&[ChecklistItem]),
{
    fn on_items_changed(&mut self, items: &[ChecklistItem]) {
        self(items)
    }
}

type PersistCallback = Box<dyn FnOnce(&[ChecklistItem])>;

/// Follow-up to run on the interactive thread once a write settles.
enum AfterPersist {
    Nothing,
    Reload,
    Callback(PersistCallback),
}

enum PendingJob {
    Load { previous: ControllerState },
    Persist(AfterPersist),
}

/// Controller for the checklist embedded in one note.
pub struct ChecklistController<C: ConfigSource> {
    note_id: NoteId,
    config: C,
    worker: NoteWorker,
    state: ControllerState,
    detached: bool,
    note: Option<Note>,
    items: Vec<ChecklistItem>,
    show_locked_content: bool,
    observers: Vec<Box<dyn ChecklistObserver>>,
    pending: HashMap<Ticket, PendingJob>,
}

impl<C: ConfigSource> ChecklistController<C> {
    /// Creates an empty, unloaded session for `note_id`.
    pub fn attach(
        note_id: NoteId,
        repo: Arc<dyn NoteRepository>,
        config: C,
    ) -> ChecklistResult<Self> {
        let worker = NoteWorker::spawn(repo)?;
        debug!("event=checklist_attach module=service status=ok note_id={note_id}");
        Ok(Self {
            note_id,
            config,
            worker,
            state: ControllerState::Unloaded,
            detached: false,
            note: None,
            items: Vec::new(),
            show_locked_content: false,
            observers: Vec::new(),
            pending: HashMap::new(),
        })
    }

    pub fn note_id(&self) -> NoteId {
        self.note_id
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn note(&self) -> Option<&Note> {
        self.note.as_ref()
    }

    /// Current items in display order.
    pub fn items(&self) -> &[ChecklistItem] {
        &self.items
    }

    /// Whether no load or write is awaiting completion.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn add_observer(&mut self, observer: impl ChecklistObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Whether the checklist content may be shown for the loaded note.
    pub fn is_content_visible(&self) -> bool {
        self.note
            .as_ref()
            .is_some_and(|note| note.content_visible(self.show_locked_content))
    }

    /// User override that reveals the content of a locked note.
    pub fn set_show_locked_content(&mut self, show: bool) {
        self.show_locked_content = show;
    }

    /// Starts fetching the note and decoding its checklist.
    ///
    /// A load already in flight absorbs the request. A missing note leaves
    /// the previous state untouched.
    pub fn load(&mut self) -> ChecklistResult<()> {
        self.ensure_attached()?;
        if self.state == ControllerState::Loading {
            debug!(
                "event=checklist_load module=service status=skipped note_id={} reason=already_loading",
                self.note_id
            );
            return Ok(());
        }
        self.submit_load(self.state)
    }

    /// Adds one item per non-blank line of `titles`.
    ///
    /// New ids continue from the current maximum id. The batch keeps input
    /// order and goes to the front when `prepend` is set, otherwise to the end.
    /// Returns the ids assigned to the new items.
    pub fn add_items<I, S>(
        &mut self,
        titles: I,
        prepend: bool,
    ) -> ChecklistResult<Vec<ChecklistItemId>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ensure_ready()?;
        let config = self.config.snapshot();

        let lines: Vec<String> = titles
            .into_iter()
            .flat_map(|title| split_item_lines(title.as_ref()))
            .collect();
        if lines.is_empty() {
            debug!(
                "event=checklist_add module=service status=skipped note_id={} reason=no_titles",
                self.note_id
            );
            return Ok(Vec::new());
        }

        let first_id = next_item_id(&self.items);
        let created_at = Utc::now().timestamp_millis();
        let batch: Option<Vec<ChecklistItem>> = lines
            .into_iter()
            .enumerate()
            .map(|(offset, title)| {
                let offset = ChecklistItemId::try_from(offset).ok()?;
                let id = first_id?.checked_add(offset)?;
                Some(ChecklistItem::created(id, created_at, title))
            })
            .collect();
        let Some(batch) = batch else {
            warn!(
                "event=checklist_add module=service status=rejected note_id={} reason=id_overflow",
                self.note_id
            );
            return Ok(Vec::new());
        };

        let added: Vec<ChecklistItemId> = batch.iter().map(|item| item.id).collect();
        self.items = if prepend {
            batch.into_iter().chain(self.items.iter().cloned()).collect()
        } else {
            self.items.iter().cloned().chain(batch).collect()
        };
        info!(
            "event=checklist_add module=service status=ok note_id={} added={} prepend={}",
            self.note_id,
            added.len(),
            prepend
        );

        self.persist_current(AfterPersist::Nothing)?;
        self.items = order(&self.items, &config);
        self.notify();
        Ok(added)
    }

    /// Adds items at the position chosen by `add_new_items_at_top`.
    pub fn add_new_items<I, S>(&mut self, titles: I) -> ChecklistResult<Vec<ChecklistItemId>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prepend = self.config.snapshot().add_new_items_at_top;
        self.add_items(titles, prepend)
    }

    /// Flips the done flag of `item_id`, persists, then reloads.
    ///
    /// Returns `false` when no item has that id.
    pub fn toggle(&mut self, item_id: ChecklistItemId) -> ChecklistResult<bool> {
        self.ensure_ready()?;
        if !self.items.iter().any(|item| item.id == item_id) {
            info!(
                "event=checklist_toggle module=service status=skipped note_id={} item_id={} reason=unknown_item",
                self.note_id, item_id
            );
            return Ok(false);
        }

        self.items = self
            .items
            .iter()
            .map(|item| {
                if item.id == item_id {
                    item.toggled()
                } else {
                    item.clone()
                }
            })
            .collect();

        self.state = ControllerState::Loading;
        if let Err(err) = self.persist_current(AfterPersist::Reload) {
            self.state = ControllerState::Ready;
            return Err(err);
        }
        Ok(true)
    }

    /// Removes every done item. Returns how many were removed.
    pub fn remove_done(&mut self) -> ChecklistResult<usize> {
        self.ensure_ready()?;
        let config = self.config.snapshot();

        let remaining: Vec<ChecklistItem> =
            self.items.iter().filter(|item| !item.is_done).cloned().collect();
        let removed = self.items.len() - remaining.len();
        if removed == 0 {
            return Ok(0);
        }

        self.items = remaining;
        info!(
            "event=checklist_remove_done module=service status=ok note_id={} removed={}",
            self.note_id, removed
        );
        self.persist_current(AfterPersist::Nothing)?;
        self.items = order(&self.items, &config);
        self.notify();
        Ok(removed)
    }

    /// Replaces the whole list, e.g. after a bulk edit.
    ///
    /// Titles are trimmed and blank ones dropped. When ids repeat, the first
    /// occurrence keeps its id and later ones get fresh ids past the maximum.
    /// `callback` runs on the calling thread once the write settles, from
    /// `process_completions` or `wait_until_idle`, and sees the list as stored.
    pub fn replace_all(
        &mut self,
        items: Vec<ChecklistItem>,
        callback: impl FnOnce(&[ChecklistItem]) + 'static,
    ) -> ChecklistResult<()> {
        self.ensure_ready()?;
        let (items, dropped) = normalize_titles(items);
        let (items, reassigned) = reassign_duplicate_ids(items);
        if dropped > 0 || reassigned > 0 {
            info!(
                "event=checklist_replace module=service status=normalized note_id={} dropped_blank={} duplicate_ids={}",
                self.note_id, dropped, reassigned
            );
        }
        self.items = items;
        self.persist_current(AfterPersist::Callback(Box::new(callback)))?;
        self.notify();
        Ok(())
    }

    /// Re-runs the sort policy with the current configuration.
    pub fn reapply_order(&mut self) -> ChecklistResult<()> {
        self.ensure_ready()?;
        self.refresh_display();
        Ok(())
    }

    /// Encodes the in-memory list in its current order.
    pub fn serialize(&self) -> ChecklistResult<String> {
        self.ensure_attached()?;
        Ok(checklist_codec::encode(&self.items)?)
    }

    /// Applies every finished background job without blocking.
    ///
    /// Returns the number of completions consumed.
    pub fn process_completions(&mut self) -> ChecklistResult<usize> {
        let mut handled = 0;
        while let Some(completion) = self.worker.try_completion()? {
            self.handle_completion(completion);
            handled += 1;
        }
        Ok(handled)
    }

    /// Blocks until every submitted load and write has been applied,
    /// including reloads they trigger.
    pub fn wait_until_idle(&mut self) -> ChecklistResult<()> {
        while !self.pending.is_empty() {
            let completion = self.worker.wait_completion()?;
            self.handle_completion(completion);
        }
        Ok(())
    }

    /// Ends the session. Queued writes still reach storage; their results
    /// and any pending callbacks are dropped.
    pub fn detach(&mut self) {
        if self.detached {
            return;
        }
        self.detached = true;
        let abandoned = self.pending.len();
        self.pending.clear();
        self.observers.clear();
        self.items.clear();
        self.note = None;
        self.state = ControllerState::Unloaded;
        info!(
            "event=checklist_detach module=service status=ok note_id={} abandoned_jobs={}",
            self.note_id, abandoned
        );
    }

    fn ensure_attached(&self) -> ChecklistResult<()> {
        if self.detached {
            return Err(ChecklistError::Detached);
        }
        Ok(())
    }

    fn ensure_ready(&self) -> ChecklistResult<()> {
        self.ensure_attached()?;
        if self.state != ControllerState::Ready {
            warn!(
                "event=checklist_mutation module=service status=error note_id={} state={} error_code=not_ready",
                self.note_id, self.state
            );
            return Err(ChecklistError::NotReady(self.state));
        }
        Ok(())
    }

    fn submit_load(&mut self, previous: ControllerState) -> ChecklistResult<()> {
        let ticket = self.worker.submit_load(self.note_id)?;
        self.pending.insert(ticket, PendingJob::Load { previous });
        self.state = ControllerState::Loading;
        Ok(())
    }

    fn persist_current(&mut self, then: AfterPersist) -> ChecklistResult<()> {
        let Some(note) = self.note.as_mut() else {
            self.settle_skipped_write(then);
            return Ok(());
        };
        if note.backing_file_missing() {
            info!(
                "event=checklist_persist module=service status=skipped note_id={} reason=stale_backing_file",
                note.id
            );
            self.settle_skipped_write(then);
            return Ok(());
        }

        let value = checklist_codec::encode(&self.items)?;
        note.value = value.clone();
        let snapshot = note.clone();
        let ticket = self.worker.submit_persist(snapshot, value)?;
        self.pending.insert(ticket, PendingJob::Persist(then));
        Ok(())
    }

    /// Completes a follow-up whose write did not reach storage. In-memory
    /// state is kept; a reload would revert it, so the display is refreshed
    /// instead.
    fn settle_skipped_write(&mut self, then: AfterPersist) {
        match then {
            AfterPersist::Nothing => {}
            AfterPersist::Reload => {
                self.state = ControllerState::Ready;
                self.refresh_display();
            }
            AfterPersist::Callback(callback) => callback(self.items.as_slice()),
        }
    }

    fn handle_completion(&mut self, completion: Completion) {
        let Some(job) = self.pending.remove(&completion.ticket()) else {
            debug!(
                "event=checklist_completion module=service status=skipped note_id={} ticket={} reason=not_pending",
                self.note_id,
                completion.ticket()
            );
            return;
        };

        match (job, completion) {
            (PendingJob::Load { previous }, Completion::Loaded { result, .. }) => {
                self.finish_load(previous, result)
            }
            (PendingJob::Persist(then), Completion::Persisted { result, .. }) => {
                self.finish_persist(then, result)
            }
            (_, completion) => error!(
                "event=checklist_completion module=service status=error note_id={} ticket={} error_code=job_kind_mismatch",
                self.note_id,
                completion.ticket()
            ),
        }
    }

    fn finish_load(&mut self, previous: ControllerState, result: RepoResult<Option<Note>>) {
        let note = match result {
            Ok(Some(note)) => note,
            Ok(None) => {
                info!(
                    "event=checklist_load module=service status=skipped note_id={} reason=missing_note",
                    self.note_id
                );
                self.restore_state(previous);
                return;
            }
            Err(err) => {
                error!(
                    "event=checklist_load module=service status=error note_id={} error={}",
                    self.note_id, err
                );
                self.restore_state(previous);
                return;
            }
        };

        let config = self.config.snapshot();
        let decoded = checklist_codec::decode(Some(note.value.as_str()));
        let repair = decoded.needs_write_through();
        self.note = Some(note);
        self.items = decoded.items;

        if repair {
            if let Err(err) = self.persist_current(AfterPersist::Nothing) {
                error!(
                    "event=checklist_migrate module=service status=error note_id={} error={}",
                    self.note_id, err
                );
            }
        }

        self.items = order(&self.items, &config);
        self.state = ControllerState::Ready;
        info!(
            "event=checklist_load module=service status=ok note_id={} item_count={} origin={:?}",
            self.note_id,
            self.items.len(),
            decoded.origin
        );
        self.notify();
    }

    fn finish_persist(&mut self, then: AfterPersist, result: RepoResult<()>) {
        match result {
            Ok(()) => match then {
                AfterPersist::Nothing => {}
                AfterPersist::Reload => {
                    if let Err(err) = self.submit_load(ControllerState::Ready) {
                        error!(
                            "event=checklist_reload module=service status=error note_id={} error={}",
                            self.note_id, err
                        );
                        self.settle_skipped_write(AfterPersist::Reload);
                    }
                }
                AfterPersist::Callback(callback) => callback(self.items.as_slice()),
            },
            Err(RepoError::StaleBackingFile(_)) => {
                info!(
                    "event=checklist_persist module=service status=skipped note_id={} reason=stale_backing_file",
                    self.note_id
                );
                self.settle_skipped_write(then);
            }
            Err(err) => {
                error!(
                    "event=checklist_persist module=service status=error note_id={} error={}",
                    self.note_id, err
                );
                self.settle_skipped_write(then);
            }
        }
    }

    /// Leaves the list as it was before a load that produced nothing.
    fn restore_state(&mut self, previous: ControllerState) {
        self.state = previous;
        if previous == ControllerState::Ready {
            self.refresh_display();
        }
    }

    fn refresh_display(&mut self) {
        let config = self.config.snapshot();
        self.items = order(&self.items, &config);
        self.notify();
    }

    fn notify(&mut self) {
        let items = &self.items;
        for observer in self.observers.iter_mut() {
            observer.on_items_changed(items);
        }
    }
}

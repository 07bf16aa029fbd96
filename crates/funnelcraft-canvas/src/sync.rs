//! Synchronization Controller
//!
//! Owns the working element list of the tracked step and keeps it
//! eventually consistent with an [`ElementStore`]:
//!
//! - `Idle`: working copy equals the last saved snapshot
//! - `Loading`: a step switch is fetching storage; mutations are suppressed
//! - `Dirty`: working copy differs; a debounce timer is armed (or a retry is pending)
//! - `Saving`: a write is in flight; mutations still land in the working copy
//!
//! Saves are serialized by an async lock. Every step switch bumps a
//! generation counter, and any completion captured under an older generation
//! is discarded. The controller remembers the last list it persisted or
//! loaded for every step it has visited; that record outranks a host's
//! cached list, which may predate the controller's own writes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::CanvasConfig;
use crate::element::{has_unique_ids, Element, ElementList, StepId};
use crate::error::{Error, Result};
use crate::events::{CanvasEvent, EventBus};
use crate::store::ElementStore;

/// Controller phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// Working copy matches storage
    Idle,
    /// Fetching a newly selected step
    Loading,
    /// Unsaved changes pending
    Dirty,
    /// Write in flight
    Saving,
}

impl std::fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Loading => write!(f, "Loading"),
            Self::Dirty => write!(f, "Dirty"),
            Self::Saving => write!(f, "Saving"),
        }
    }
}

/// Result of a step switch
#[derive(Debug, Clone, PartialEq)]
pub enum SwitchOutcome {
    /// The requested step is already tracked
    Unchanged,
    /// The step was loaded; this is the new working copy
    Loaded(ElementList),
    /// A newer switch started before this one finished
    Superseded,
}

struct SyncState {
    step: Option<StepId>,
    generation: u64,
    phase: SyncPhase,
    working: ElementList,
    last_saved: ElementList,
    // Last list known to match storage, per visited step
    persisted: HashMap<StepId, ElementList>,
    timer: Option<CancellationToken>,
}

impl SyncState {
    fn cancel_timer(&mut self) {
        if let Some(token) = self.timer.take() {
            token.cancel();
        }
    }

    fn is_tracking(&self, step_id: &StepId) -> bool {
        self.step.as_ref() == Some(step_id)
    }
}

struct Shared {
    state: Mutex<SyncState>,
    save_lock: tokio::sync::Mutex<()>,
    store: Arc<dyn ElementStore>,
    events: EventBus,
    debounce: Duration,
    use_cached_steps: bool,
}

/// Keeps one step's working copy in sync with storage
#[derive(Clone)]
pub struct SyncController {
    shared: Arc<Shared>,
}

impl SyncController {
    /// Create a controller with no tracked step
    #[must_use]
    pub fn new(store: Arc<dyn ElementStore>, events: EventBus, config: &CanvasConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(SyncState {
                    step: None,
                    generation: 0,
                    phase: SyncPhase::Idle,
                    working: Vec::new(),
                    last_saved: Vec::new(),
                    persisted: HashMap::new(),
                    timer: None,
                }),
                save_lock: tokio::sync::Mutex::new(()),
                store,
                events,
                debounce: config.debounce(),
                use_cached_steps: config.use_cached_steps,
            }),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, SyncState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Current phase
    #[must_use]
    pub fn phase(&self) -> SyncPhase {
        self.lock_state().phase
    }

    /// Tracked step
    #[must_use]
    pub fn step_id(&self) -> Option<StepId> {
        self.lock_state().step.clone()
    }

    /// Copy of the working list
    #[must_use]
    pub fn working(&self) -> ElementList {
        self.lock_state().working.clone()
    }

    /// Copy of the last list known to be persisted
    #[must_use]
    pub fn last_saved(&self) -> ElementList {
        self.lock_state().last_saved.clone()
    }

    /// Whether unsaved changes exist
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        let state = self.lock_state();
        state.working != state.last_saved
    }

    /// Whether a debounce timer is armed
    #[must_use]
    pub fn has_pending_save(&self) -> bool {
        self.lock_state().timer.is_some()
    }

    /// Record a committed mutation of `step_id`'s list.
    ///
    /// Returns `false` when the notification was suppressed because another
    /// step is tracked or a load is in progress.
    pub fn notify_changed(&self, step_id: &StepId, elements: &[Element]) -> bool {
        let mut state = self.lock_state();
        if !state.is_tracking(step_id) {
            debug!(step_id = %step_id, "Ignoring change for untracked step");
            return false;
        }
        if state.phase == SyncPhase::Loading {
            debug!(step_id = %step_id, "Suppressing change while loading");
            return false;
        }

        state.working = elements.to_vec();
        match state.phase {
            // Re-evaluated once the in-flight write resolves
            SyncPhase::Saving => {}
            _ if state.working == state.last_saved => {
                state.cancel_timer();
                state.phase = SyncPhase::Idle;
            }
            _ => {
                state.phase = SyncPhase::Dirty;
                self.arm_timer(&mut state);
            }
        }
        true
    }

    fn arm_timer(&self, state: &mut SyncState) {
        state.cancel_timer();

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime; auto-save disabled until the next flush");
            return;
        };

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let generation = state.generation;
        let debounce = self.shared.debounce;
        let controller = self.clone();
        handle.spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(debounce) => {
                    controller.autosave(generation).await;
                }
            }
        });
        state.timer = Some(token);
    }

    async fn autosave(&self, generation: u64) {
        if self.lock_state().generation != generation {
            return;
        }
        // A write is already in flight; it re-arms on completion if needed
        let Ok(_guard) = self.shared.save_lock.try_lock() else {
            debug!("Save already in progress, skipping debounce fire");
            return;
        };
        if let Err(e) = self.save_locked().await {
            debug!(error = %e, "Auto-save failed");
        }
    }

    /// Write the working copy now if it has unsaved changes.
    ///
    /// Waits for an in-flight save first. Returns whether a write happened.
    pub async fn flush(&self) -> Result<bool> {
        let _guard = self.shared.save_lock.lock().await;
        self.save_locked().await
    }

    // Caller holds `save_lock`.
    async fn save_locked(&self) -> Result<bool> {
        let (step_id, generation, snapshot) = {
            let mut state = self.lock_state();
            if state.phase != SyncPhase::Dirty {
                return Ok(false);
            }
            let Some(step_id) = state.step.clone() else {
                return Ok(false);
            };
            state.cancel_timer();
            state.phase = SyncPhase::Saving;
            (step_id, state.generation, state.working.clone())
        };

        debug!(step_id = %step_id, count = snapshot.len(), "Saving elements");
        let result = self.shared.store.set_elements(&step_id, &snapshot).await;

        let mut state = self.lock_state();
        if result.is_ok() {
            state.persisted.insert(step_id.clone(), snapshot.clone());
        }
        if state.generation != generation {
            debug!(step_id = %step_id, "Discarding save completion for previous step");
            return result.map(|()| true);
        }

        match &result {
            Ok(()) => {
                state.last_saved = snapshot;
                self.shared.events.publish(CanvasEvent::Saved {
                    step_id: step_id.clone(),
                    count: state.last_saved.len(),
                });
            }
            Err(e) => {
                warn!(step_id = %step_id, error = %e, "Failed to save elements");
                self.shared.events.publish(CanvasEvent::SaveFailed {
                    step_id: step_id.clone(),
                    error: e.to_string(),
                });
            }
        }

        if state.working == state.last_saved {
            state.phase = SyncPhase::Idle;
        } else {
            state.phase = SyncPhase::Dirty;
            // A failed write waits for the next mutation or flush
            if result.is_ok() {
                self.arm_timer(&mut state);
            }
        }

        result.map(|()| true)
    }

    /// Make `step_id` the tracked step.
    ///
    /// Unsaved changes of the previous step are flushed first (best effort).
    /// When cached steps are enabled and `cached` is offered, the list this
    /// controller last persisted for the step replaces it; a non-empty result
    /// is used instead of a storage read. A failed read loads an empty list.
    pub async fn switch_step(&self, step_id: StepId, cached: Option<ElementList>) -> SwitchOutcome {
        let (generation, known) = {
            let _guard = self.shared.save_lock.lock().await;
            if self.lock_state().is_tracking(&step_id) {
                return SwitchOutcome::Unchanged;
            }

            if let Err(e) = self.save_locked().await {
                warn!(error = %e, "Failed to save previous step before switching");
            }

            let mut state = self.lock_state();
            state.cancel_timer();
            state.generation += 1;
            state.step = Some(step_id.clone());
            state.phase = SyncPhase::Loading;
            state.working.clear();
            state.last_saved.clear();
            (state.generation, state.persisted.get(&step_id).cloned())
        };

        let cached = cached
            .filter(|_| self.shared.use_cached_steps)
            .map(|list| known.unwrap_or(list))
            .filter(|list| !list.is_empty());
        let (elements, from_storage, load_error) = match cached {
            Some(list) => {
                debug!(step_id = %step_id, count = list.len(), "Using cached step elements");
                (list, false, None)
            }
            None => match self.shared.store.get_elements(&step_id).await {
                Ok(list) => (list, true, None),
                Err(e) => (Vec::new(), false, Some(e)),
            },
        };

        let mut state = self.lock_state();
        if state.generation != generation {
            debug!(step_id = %step_id, "Discarding stale step load");
            return SwitchOutcome::Superseded;
        }

        if let Some(e) = load_error {
            warn!(step_id = %step_id, error = %e, "Failed to load elements, starting empty");
            self.shared.events.publish(CanvasEvent::LoadFailed {
                step_id: step_id.clone(),
                error: e.to_string(),
            });
        }

        if !has_unique_ids(&elements) {
            warn!(step_id = %step_id, "Loaded element list contains duplicate ids");
        }
        if from_storage {
            state.persisted.insert(step_id.clone(), elements.clone());
        }

        state.working = elements.clone();
        state.last_saved = elements.clone();
        state.phase = SyncPhase::Idle;
        info!(step_id = %step_id, count = elements.len(), "Step loaded");
        self.shared.events.publish(CanvasEvent::StepLoaded {
            step_id,
            count: elements.len(),
        });
        SwitchOutcome::Loaded(elements)
    }

    /// Flush pending changes and stop tracking the current step
    pub async fn close(&self) -> Result<()> {
        let _guard = self.shared.save_lock.lock().await;
        let result = self.save_locked().await;

        let mut state = self.lock_state();
        state.cancel_timer();
        state.generation += 1;
        state.step = None;
        state.phase = SyncPhase::Idle;
        state.working.clear();
        state.last_saved.clear();
        result.map(|_| ())
    }

    /// Fail unless a step is tracked and loaded
    pub fn ensure_ready(&self) -> Result<StepId> {
        let state = self.lock_state();
        match (&state.step, state.phase) {
            (Some(_), SyncPhase::Loading) | (None, _) => Err(Error::StepNotLoaded),
            (Some(step_id), _) => Ok(step_id.clone()),
        }
    }
}

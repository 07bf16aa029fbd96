//! Canvas notifications
//!
//! Broadcast-based bus carrying editor notifications to preview rendering
//! and other UI subscribers. Slow subscribers lag instead of blocking edits.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

use crate::element::{ElementId, ElementList, StepId};

/// Notifications emitted by the editor and its synchronization controller
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CanvasEvent {
    /// A mutation was committed (or history moved)
    ElementsChanged {
        /// Step the list belongs to
        step_id: StepId,
        /// Full list after the change
        elements: ElementList,
    },
    /// The active element changed
    SelectionChanged {
        /// Newly selected element, `None` when cleared
        element_id: Option<ElementId>,
    },
    /// A step was loaded into the working copy
    StepLoaded {
        /// Step that was loaded
        step_id: StepId,
        /// Number of elements loaded
        count: usize,
    },
    /// A save completed
    Saved {
        /// Step that was saved
        step_id: StepId,
        /// Number of elements written
        count: usize,
    },
    /// A save was rejected by storage; the working copy is kept
    SaveFailed {
        /// Step that failed to save
        step_id: StepId,
        /// Error description
        error: String,
    },
    /// A load was rejected by storage; the step starts empty
    LoadFailed {
        /// Step that failed to load
        step_id: StepId,
        /// Error description
        error: String,
    },
}

impl CanvasEvent {
    /// Get the event name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ElementsChanged { .. } => "elements_changed",
            Self::SelectionChanged { .. } => "selection_changed",
            Self::StepLoaded { .. } => "step_loaded",
            Self::Saved { .. } => "saved",
            Self::SaveFailed { .. } => "save_failed",
            Self::LoadFailed { .. } => "load_failed",
        }
    }

    /// Step this event is scoped to, if any
    #[must_use]
    pub fn step_id(&self) -> Option<&StepId> {
        match self {
            Self::ElementsChanged { step_id, .. }
            | Self::StepLoaded { step_id, .. }
            | Self::Saved { step_id, .. }
            | Self::SaveFailed { step_id, .. }
            | Self::LoadFailed { step_id, .. } => Some(step_id),
            Self::SelectionChanged { .. } => None,
        }
    }

    /// Check if this is a persistence event
    #[must_use]
    pub fn is_storage_event(&self) -> bool {
        matches!(
            self,
            Self::Saved { .. } | Self::SaveFailed { .. } | Self::LoadFailed { .. }
        )
    }
}

impl std::fmt::Display for CanvasEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broadcast channel for [`CanvasEvent`]s
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CanvasEvent>,
}

impl EventBus {
    /// Create a bus buffering `capacity` events per subscriber
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to all future events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CanvasEvent> {
        self.sender.subscribe()
    }

    /// Publish an event. Returns the number of receivers; zero is not an error.
    pub fn publish(&self, event: CanvasEvent) -> usize {
        trace!(event = %event, "Publishing canvas event");
        self.sender.send(event).unwrap_or(0)
    }

    /// Number of active subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

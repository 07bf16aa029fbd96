//! Canvas Editor
//!
//! Wires the history, selection, drag session and synchronization
//! controller together for one active step.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::command::EditCommand;
use crate::config::CanvasConfig;
use crate::drag::{DragPayload, DragSession, DropAction, DropTarget};
use crate::element::{contains, Element, ElementFlags, ElementId, ElementKind, ElementList, Layout, StepId};
use crate::error::Result;
use crate::events::{CanvasEvent, EventBus};
use crate::funnel::Funnel;
use crate::history::History;
use crate::operations;
use crate::selection::Selection;
use crate::store::ElementStore;
use crate::sync::{SwitchOutcome, SyncController, SyncPhase};

/// Editing surface for the elements of one step
pub struct CanvasEditor {
    step_id: Option<StepId>,
    history: History<ElementList>,
    selection: Selection,
    drag: DragSession,
    flags: HashMap<ElementId, ElementFlags>,
    sync: SyncController,
    events: EventBus,
}

impl CanvasEditor {
    /// Create an editor over `store`. No step is loaded until [`Self::switch_step`].
    pub fn new(store: Arc<dyn ElementStore>, config: CanvasConfig) -> Result<Self> {
        config.validate()?;
        let events = EventBus::new(config.event_capacity);
        let sync = SyncController::new(store, events.clone(), &config);
        Ok(Self {
            step_id: None,
            history: History::new(Vec::new(), config.history_limit),
            selection: Selection::new(),
            drag: DragSession::new(),
            flags: HashMap::new(),
            sync,
            events,
        })
    }

    /// Subscribe to editor notifications
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CanvasEvent> {
        self.events.subscribe()
    }

    /// Loaded step
    #[must_use]
    pub fn step_id(&self) -> Option<&StepId> {
        self.step_id.as_ref()
    }

    /// Current element list
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        self.history.current()
    }

    /// Current element list with transient flags applied
    #[must_use]
    pub fn display_elements(&self) -> ElementList {
        self.elements()
            .iter()
            .map(|e| {
                let mut element = e.clone();
                element.flags = self.flags.get(&e.id).copied().unwrap_or_default();
                element
            })
            .collect()
    }

    /// Synchronization controller
    #[must_use]
    pub fn sync(&self) -> &SyncController {
        &self.sync
    }

    /// Synchronization phase
    #[must_use]
    pub fn phase(&self) -> SyncPhase {
        self.sync.phase()
    }

    // ---------------------------------------------------------------------
    // Step lifecycle
    // ---------------------------------------------------------------------

    /// Load `step_id` from storage, flushing the current step first
    pub async fn switch_step(&mut self, step_id: impl Into<StepId>) -> SwitchOutcome {
        self.load_step(step_id.into(), None).await
    }

    /// Load `step_id`, preferring the list already held by `funnel`
    pub async fn switch_step_with_funnel(
        &mut self,
        step_id: impl Into<StepId>,
        funnel: &Funnel,
    ) -> SwitchOutcome {
        let step_id = step_id.into();
        let cached = funnel.cached_elements(&step_id).map(<[Element]>::to_vec);
        self.load_step(step_id, cached).await
    }

    async fn load_step(&mut self, step_id: StepId, cached: Option<ElementList>) -> SwitchOutcome {
        let outcome = self.sync.switch_step(step_id.clone(), cached).await;
        if let SwitchOutcome::Loaded(elements) = &outcome {
            self.history.reset(elements.clone());
            self.flags.clear();
            self.drag.cancel();
            self.step_id = Some(step_id.clone());
            self.clear_selection();
            self.events.publish(CanvasEvent::ElementsChanged {
                step_id,
                elements: elements.clone(),
            });
        }
        outcome
    }

    /// Save pending changes now
    pub async fn flush(&self) -> Result<bool> {
        self.sync.flush().await
    }

    /// Flush and unload the current step
    pub async fn close(&mut self) -> Result<()> {
        let result = self.sync.close().await;
        if let Some(step_id) = self.step_id.take() {
            info!(step_id = %step_id, "Editor closed");
        }
        self.history.reset(Vec::new());
        self.flags.clear();
        self.drag.cancel();
        self.clear_selection();
        result
    }

    // ---------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------

    fn ready_step(&self) -> Option<StepId> {
        let step_id = self.step_id.clone()?;
        match self.sync.ensure_ready() {
            Ok(tracked) if tracked == step_id => Some(step_id),
            _ => {
                debug!(step_id = %step_id, "Edit rejected, step not ready");
                None
            }
        }
    }

    fn commit(&mut self, next: ElementList) -> bool {
        let Some(step_id) = self.ready_step() else {
            return false;
        };
        if !self.history.commit(next) {
            return false;
        }
        self.after_change(step_id);
        true
    }

    fn after_change(&mut self, step_id: StepId) {
        let elements = self.history.current().clone();
        self.sync.notify_changed(&step_id, &elements);
        if self.selection.sync_with(&elements) {
            self.publish_selection();
        }
        self.flags.retain(|id, _| contains(&elements, *id));
        self.events
            .publish(CanvasEvent::ElementsChanged { step_id, elements });
    }

    /// Append a new element of `kind` and select it
    pub fn add(&mut self, kind: ElementKind) -> Option<Element> {
        let (next, element) = operations::add(self.elements(), kind);
        self.commit(next).then(|| self.select_new(element))
    }

    /// Insert a new element of `kind` at `index` and select it
    pub fn insert_at(&mut self, kind: ElementKind, index: usize) -> Option<Element> {
        let (next, element) = operations::insert_at(self.elements(), kind, index);
        self.commit(next).then(|| self.select_new(element))
    }

    /// Remove an element, clearing the selection if it was selected
    pub fn remove(&mut self, id: ElementId) -> bool {
        let next = operations::remove(self.elements(), id);
        self.commit(next)
    }

    /// Duplicate an element and select the copy
    pub fn duplicate(&mut self, id: ElementId) -> Option<Element> {
        let (next, copy) = operations::duplicate(self.elements(), id);
        let copy = copy?;
        self.commit(next).then(|| self.select_new(copy))
    }

    /// Swap an element with its predecessor
    pub fn move_up(&mut self, id: ElementId) -> bool {
        let next = operations::move_up(self.elements(), id);
        self.commit(next)
    }

    /// Swap an element with its successor
    pub fn move_down(&mut self, id: ElementId) -> bool {
        let next = operations::move_down(self.elements(), id);
        self.commit(next)
    }

    /// Move the element at `source` to post-removal index `target`
    pub fn reorder(&mut self, source: usize, target: usize) -> bool {
        let next = operations::reorder(self.elements(), source, target);
        self.commit(next)
    }

    /// Replace an element's content
    pub fn update_content(&mut self, id: ElementId, content: serde_json::Value) -> bool {
        let next = operations::update_content(self.elements(), id, content);
        self.commit(next)
    }

    /// Replace an element's layout hints
    pub fn update_layout(&mut self, id: ElementId, layout: Option<Layout>) -> bool {
        let next = operations::update_layout(self.elements(), id, layout);
        self.commit(next)
    }

    /// Toggle preview mode of an element; never recorded or saved
    pub fn set_preview(&mut self, id: ElementId, preview: bool) -> bool {
        if !contains(self.elements(), id) {
            return false;
        }
        self.flags.entry(id).or_default().preview = preview;
        true
    }

    // ---------------------------------------------------------------------
    // History
    // ---------------------------------------------------------------------

    /// Step back one change
    pub fn undo(&mut self) -> bool {
        let Some(step_id) = self.ready_step() else {
            return false;
        };
        if self.history.undo().is_none() {
            return false;
        }
        self.clear_selection();
        self.after_change(step_id);
        true
    }

    /// Step forward one change
    pub fn redo(&mut self) -> bool {
        let Some(step_id) = self.ready_step() else {
            return false;
        };
        if self.history.redo().is_none() {
            return false;
        }
        self.clear_selection();
        self.after_change(step_id);
        true
    }

    /// Whether undo is available
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether redo is available
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ---------------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------------

    /// Select an element by id, or clear with `None`.
    ///
    /// Unknown ids clear the selection.
    pub fn select(&mut self, id: Option<ElementId>) -> bool {
        let element = id.and_then(|id| self.elements().iter().find(|e| e.id == id).cloned());
        let changed = self.selection.select(element);
        if changed {
            self.publish_selection();
        }
        changed
    }

    /// Selected element
    #[must_use]
    pub fn selection(&self) -> Option<&Element> {
        self.selection.current()
    }

    fn select_new(&mut self, element: Element) -> Element {
        if self.selection.select(Some(element.clone())) {
            self.publish_selection();
        }
        element
    }

    fn clear_selection(&mut self) {
        if self.selection.clear() {
            self.publish_selection();
        }
    }

    fn publish_selection(&self) {
        self.events.publish(CanvasEvent::SelectionChanged {
            element_id: self.selection.id(),
        });
    }

    // ---------------------------------------------------------------------
    // Drag and drop
    // ---------------------------------------------------------------------

    /// Drag session state
    #[must_use]
    pub fn drag(&self) -> &DragSession {
        &self.drag
    }

    /// Start dragging an element on the canvas
    pub fn begin_drag_existing(&mut self, id: ElementId) {
        self.drag.start_existing(id);
    }

    /// Start dragging a new element from the palette
    pub fn begin_drag_palette(&mut self, kind: ElementKind) {
        self.drag.start_palette(kind);
    }

    /// Update the hover target and highlight the element under it
    pub fn drag_hover(&mut self, target: Option<DropTarget>) {
        self.drag.hover(target);
        let hovered = match self.drag.hover_target() {
            Some(DropTarget::Element(index)) => self.elements().get(index).map(|e| e.id),
            _ => None,
        };
        self.set_hovered(hovered);
    }

    fn set_hovered(&mut self, id: Option<ElementId>) {
        for flags in self.flags.values_mut() {
            flags.hovered = false;
        }
        if let Some(id) = id {
            self.flags.entry(id).or_default().hovered = true;
        }
    }

    /// Drop over `target` and apply the resulting edit
    pub fn drop_on(&mut self, target: DropTarget, transfer: Option<DragPayload>) -> DropAction {
        let action = self.drag.drop_on(target, self.history.current(), transfer);
        self.set_hovered(None);
        let applied = match action {
            DropAction::None => false,
            DropAction::Reorder { source, target } => self.reorder(source, target),
            DropAction::Insert { kind, index: None } => self.add(kind).is_some(),
            DropAction::Insert {
                kind,
                index: Some(index),
            } => self.insert_at(kind, index).is_some(),
        };
        if applied {
            action
        } else {
            DropAction::None
        }
    }

    /// Drag finished without a drop
    pub fn end_drag(&mut self) {
        self.drag.end();
        self.set_hovered(None);
    }

    /// Drag aborted
    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
        self.set_hovered(None);
    }

    // ---------------------------------------------------------------------
    // Commands
    // ---------------------------------------------------------------------

    /// Apply a serialized command. Returns whether anything changed.
    pub fn apply(&mut self, command: EditCommand) -> bool {
        debug!(command = command.as_str(), "Applying edit command");
        match command {
            EditCommand::Add { kind } => self.add(kind).is_some(),
            EditCommand::InsertAt { kind, index } => self.insert_at(kind, index).is_some(),
            EditCommand::Remove { element_id } => self.remove(element_id),
            EditCommand::Duplicate { element_id } => self.duplicate(element_id).is_some(),
            EditCommand::MoveUp { element_id } => self.move_up(element_id),
            EditCommand::MoveDown { element_id } => self.move_down(element_id),
            EditCommand::Reorder { source, target } => self.reorder(source, target),
            EditCommand::UpdateContent {
                element_id,
                content,
            } => self.update_content(element_id, content),
            EditCommand::UpdateLayout { element_id, layout } => {
                self.update_layout(element_id, layout)
            }
            EditCommand::Select { element_id } => self.select(element_id),
            EditCommand::Undo => self.undo(),
            EditCommand::Redo => self.redo(),
        }
    }
}

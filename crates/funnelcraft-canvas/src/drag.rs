//! Drag-Reorder Protocol
//!
//! A drag session carries one payload (an existing element or a palette
//! kind) and the current hover target. Dropping resolves the payload and
//! target into a [`DropAction`]; dropping, ending and cancelling all return
//! the session to idle.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::element::{position_of, Element, ElementId, ElementKind};

/// What is being dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum DragPayload {
    /// An element already on the canvas
    Existing {
        /// Dragged element
        element_id: ElementId,
    },
    /// A new element from the palette
    Palette {
        /// Kind to create
        kind: ElementKind,
    },
}

impl DragPayload {
    /// Build a payload from raw transfer data. An element id wins over a kind.
    #[must_use]
    pub fn from_transfer(element_id: Option<ElementId>, kind: Option<ElementKind>) -> Option<Self> {
        match (element_id, kind) {
            (Some(element_id), _) => Some(Self::Existing { element_id }),
            (None, Some(kind)) => Some(Self::Palette { kind }),
            (None, None) => None,
        }
    }
}

/// Where the pointer is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", content = "index", rename_all = "snake_case")]
pub enum DropTarget {
    /// Over the element at this index
    Element(usize),
    /// Insertion zone before the element at this index; `len` is after the last
    Zone(usize),
    /// Past the end of the list
    End,
}

/// Edit a drop resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropAction {
    /// Nothing to do
    None,
    /// Move `source` to `target` (post-removal index)
    Reorder {
        /// Current index of the dragged element
        source: usize,
        /// Index after removal
        target: usize,
    },
    /// Create a new element
    Insert {
        /// Kind to create
        kind: ElementKind,
        /// Insertion index, `None` to append
        index: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum DragState {
    #[default]
    Idle,
    Dragging {
        payload: DragPayload,
        hover: Option<DropTarget>,
    },
}

/// One pointer-drag interaction
#[derive(Debug, Clone, Default)]
pub struct DragSession {
    state: DragState,
}

impl DragSession {
    /// Create an idle session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin dragging, replacing any stale drag
    pub fn start(&mut self, payload: DragPayload) {
        debug!(?payload, "Drag started");
        self.state = DragState::Dragging {
            payload,
            hover: None,
        };
    }

    /// Begin dragging an existing element
    pub fn start_existing(&mut self, element_id: ElementId) {
        self.start(DragPayload::Existing { element_id });
    }

    /// Begin dragging a palette kind
    pub fn start_palette(&mut self, kind: ElementKind) {
        self.start(DragPayload::Palette { kind });
    }

    /// Update the hover target. Ignored when not dragging.
    pub fn hover(&mut self, target: Option<DropTarget>) {
        if let DragState::Dragging { hover, .. } = &mut self.state {
            *hover = target;
        }
    }

    /// Whether a drag is active
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Active payload
    #[must_use]
    pub fn payload(&self) -> Option<DragPayload> {
        match self.state {
            DragState::Dragging { payload, .. } => Some(payload),
            DragState::Idle => None,
        }
    }

    /// Current hover target, for highlighting
    #[must_use]
    pub fn hover_target(&self) -> Option<DropTarget> {
        match self.state {
            DragState::Dragging { hover, .. } => hover,
            DragState::Idle => None,
        }
    }

    /// Finish the drag over `target`.
    ///
    /// `transfer` is the payload carried by the drop event itself and is used
    /// when it names an existing element or when the session has no payload.
    pub fn drop_on(
        &mut self,
        target: DropTarget,
        list: &[Element],
        transfer: Option<DragPayload>,
    ) -> DropAction {
        let session_payload = self.payload();
        self.state = DragState::Idle;

        let payload = match (transfer, session_payload) {
            (Some(p @ DragPayload::Existing { .. }), _) => p,
            (_, Some(p @ DragPayload::Existing { .. })) => p,
            (_, Some(p)) => p,
            (Some(p), None) => p,
            (None, None) => return DropAction::None,
        };

        let action = resolve(payload, target, list);
        debug!(?payload, ?target, ?action, "Drop resolved");
        action
    }

    /// Drag ended without a drop
    pub fn end(&mut self) {
        self.state = DragState::Idle;
    }

    /// Drag aborted by the platform
    pub fn cancel(&mut self) {
        if self.is_dragging() {
            debug!("Drag cancelled");
        }
        self.state = DragState::Idle;
    }
}

/// Map a payload dropped on `target` to an edit of `list`
#[must_use]
pub fn resolve(payload: DragPayload, target: DropTarget, list: &[Element]) -> DropAction {
    let len = list.len();
    match payload {
        DragPayload::Existing { element_id } => {
            let Some(source) = position_of(list, element_id) else {
                return DropAction::None;
            };
            let target = match target {
                DropTarget::Element(index) if index < len => index,
                DropTarget::Element(_) | DropTarget::End => len - 1,
                DropTarget::Zone(zone) => {
                    let zone = zone.min(len);
                    if zone == source || zone == source + 1 {
                        return DropAction::None;
                    }
                    if zone > source {
                        zone - 1
                    } else {
                        zone
                    }
                }
            };
            if target == source {
                DropAction::None
            } else {
                DropAction::Reorder { source, target }
            }
        }
        DragPayload::Palette { kind } => {
            let index = match target {
                DropTarget::Element(index) | DropTarget::Zone(index) if index < len => Some(index),
                _ => None,
            };
            DropAction::Insert { kind, index }
        }
    }
}

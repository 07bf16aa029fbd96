//! Edit commands
//!
//! Serializable form of every editor mutation, used by scripted edits and
//! keyboard-shortcut wiring.

use serde::{Deserialize, Serialize};

use crate::element::{ElementId, ElementKind, Layout};

/// A single editor operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditCommand {
    /// Append a new element
    Add {
        /// Element kind
        kind: ElementKind,
    },

    /// Insert a new element at a position
    InsertAt {
        /// Element kind
        kind: ElementKind,
        /// Insertion index
        index: usize,
    },

    /// Remove an element
    Remove {
        /// Element to remove
        element_id: ElementId,
    },

    /// Duplicate an element
    Duplicate {
        /// Element to copy
        element_id: ElementId,
    },

    /// Swap an element with its predecessor
    MoveUp {
        /// Element to move
        element_id: ElementId,
    },

    /// Swap an element with its successor
    MoveDown {
        /// Element to move
        element_id: ElementId,
    },

    /// Move by index
    Reorder {
        /// Current index
        source: usize,
        /// Index after removal
        target: usize,
    },

    /// Replace an element's content
    UpdateContent {
        /// Element to edit
        element_id: ElementId,
        /// New content
        content: serde_json::Value,
    },

    /// Replace an element's layout hints
    UpdateLayout {
        /// Element to edit
        element_id: ElementId,
        /// New layout, `None` to clear
        #[serde(default)]
        layout: Option<Layout>,
    },

    /// Change the selection
    Select {
        /// Element to select, `None` to clear
        #[serde(default)]
        element_id: Option<ElementId>,
    },

    /// Undo the last change
    Undo,

    /// Redo the last undone change
    Redo,
}

impl EditCommand {
    /// Get the command name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::InsertAt { .. } => "insert_at",
            Self::Remove { .. } => "remove",
            Self::Duplicate { .. } => "duplicate",
            Self::MoveUp { .. } => "move_up",
            Self::MoveDown { .. } => "move_down",
            Self::Reorder { .. } => "reorder",
            Self::UpdateContent { .. } => "update_content",
            Self::UpdateLayout { .. } => "update_layout",
            Self::Select { .. } => "select",
            Self::Undo => "undo",
            Self::Redo => "redo",
        }
    }

    /// Whether the command edits the element list
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::Select { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parsing() {
        let script = r#"[
            { "type": "add", "kind": "button" },
            { "type": "reorder", "source": 0, "target": 2 },
            { "type": "select" },
            { "type": "undo" }
        ]"#;
        let commands: Vec<EditCommand> = serde_json::from_str(script).unwrap();
        assert_eq!(
            commands[0],
            EditCommand::Add {
                kind: ElementKind::Button
            }
        );
        assert_eq!(commands[1].as_str(), "reorder");
        assert_eq!(commands[2], EditCommand::Select { element_id: None });
        assert!(!commands[2].is_mutation());
        assert_eq!(commands[3], EditCommand::Undo);
    }

    #[test]
    fn test_command_serialization() {
        let command = EditCommand::MoveUp {
            element_id: ElementId::new(),
        };
        let json = serde_json::to_string(&command).unwrap();
        assert!(json.contains("\"type\":\"move_up\""));
        let parsed: EditCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, command);
    }
}

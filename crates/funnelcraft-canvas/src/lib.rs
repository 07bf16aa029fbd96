//! Funnelcraft Canvas - Step Editing Engine
//!
//! This crate provides the canvas editing engine for Funnelcraft:
//! - Element: Element model and identifiers
//! - Funnel: Host funnel and step types
//! - History: Bounded undo/redo snapshot history
//! - Operations: Total element list transformations
//! - Selection: Active element tracking
//! - Sync: Debounced, step-scoped persistence controller
//! - Drag: Drag-reorder protocol
//! - Editor: Facade wiring the pieces together
//! - Store: Persistence contract with memory and SQLite backends
//! - Events: Notification bus for preview and UI subscribers
//! - Error: Error types for canvas operations
//!
//! ## Usage
//!
//! ```ignore
//! use funnelcraft_canvas::{CanvasConfig, CanvasEditor, ElementKind, MemoryElementStore};
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryElementStore::new());
//! let mut editor = CanvasEditor::new(store, CanvasConfig::default())?;
//! editor.switch_step("landing").await;
//!
//! let button = editor.add(ElementKind::Button);
//! editor.undo();
//! editor.flush().await?;
//! ```
//!
//! ## Configuration
//!
//! ```toml
//! [canvas]
//! history_limit = 50
//! autosave_debounce_ms = 500
//! use_cached_steps = true
//! event_capacity = 256
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod command;
pub mod config;
pub mod drag;
pub mod editor;
pub mod element;
pub mod error;
pub mod events;
pub mod funnel;
pub mod history;
pub mod operations;
pub mod selection;
pub mod store;
pub mod sync;

// Re-export main types
pub use command::EditCommand;
pub use config::CanvasConfig;
pub use drag::{DragPayload, DragSession, DropAction, DropTarget};
pub use editor::CanvasEditor;
pub use element::{Element, ElementFlags, ElementId, ElementKind, ElementList, Layout, StepId};
pub use error::{Error, Result};
pub use events::{CanvasEvent, EventBus};
pub use funnel::{Funnel, Step};
pub use history::{History, DEFAULT_HISTORY_LIMIT};
pub use selection::Selection;
pub use store::{ElementStore, MemoryElementStore, SqliteElementStore};
pub use sync::{SwitchOutcome, SyncController, SyncPhase};

//! Selection State
//!
//! Tracks the single active element. Selection does not observe the element
//! list; callers invoke [`Selection::sync_with`] after list changes.

use crate::element::{Element, ElementId};

/// The currently active element, if any
#[derive(Debug, Clone, Default)]
pub struct Selection {
    current: Option<Element>,
}

impl Selection {
    /// Create an empty selection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `element`, or clear with `None`. Returns whether the selected id changed.
    pub fn select(&mut self, element: Option<Element>) -> bool {
        let changed = self.id() != element.as_ref().map(|e| e.id);
        self.current = element;
        changed
    }

    /// Selected element
    #[must_use]
    pub fn current(&self) -> Option<&Element> {
        self.current.as_ref()
    }

    /// Selected element id
    #[must_use]
    pub fn id(&self) -> Option<ElementId> {
        self.current.as_ref().map(|e| e.id)
    }

    /// Whether `id` is selected
    #[must_use]
    pub fn is_selected(&self, id: ElementId) -> bool {
        self.id() == Some(id)
    }

    /// Clear the selection. Returns whether something was selected.
    pub fn clear(&mut self) -> bool {
        self.current.take().is_some()
    }

    /// Refresh the held element from `list`, clearing it when absent.
    ///
    /// Returns `true` if the selection was cleared.
    pub fn sync_with(&mut self, list: &[Element]) -> bool {
        let Some(id) = self.id() else {
            return false;
        };
        match list.iter().find(|e| e.id == id) {
            Some(element) => {
                self.current = Some(element.clone());
                false
            }
            None => self.clear(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;
    use serde_json::json;

    #[test]
    fn test_select_and_clear() {
        let mut selection = Selection::new();
        let element = Element::new(ElementKind::Button);

        assert!(selection.select(Some(element.clone())));
        assert!(selection.is_selected(element.id));
        assert!(!selection.select(Some(element.clone())));

        assert!(selection.clear());
        assert!(selection.current().is_none());
        assert!(!selection.clear());
    }

    #[test]
    fn test_sync_clears_missing() {
        let mut selection = Selection::new();
        let element = Element::new(ElementKind::Text);
        selection.select(Some(element));

        assert!(selection.sync_with(&[Element::new(ElementKind::Text)]));
        assert!(selection.id().is_none());
    }

    #[test]
    fn test_sync_refreshes_present() {
        let mut selection = Selection::new();
        let element = Element::new(ElementKind::Text);
        selection.select(Some(element.clone()));

        let edited = element.clone().with_content(json!({ "text": "new" }));
        assert!(!selection.sync_with(&[edited]));
        assert_eq!(selection.current().unwrap().content["text"], "new");
    }
}

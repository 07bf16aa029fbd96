//! Element list operations
//!
//! Total functions from `(list, params)` to a new list. Unknown ids and
//! out-of-range indices degrade to returning an unchanged copy, so stale UI
//! references can never fail an edit.

use crate::element::{position_of, Element, ElementId, ElementKind, ElementList, Layout};

/// Append a new element of `kind`
#[must_use]
pub fn add(list: &[Element], kind: ElementKind) -> (ElementList, Element) {
    let element = Element::new(kind);
    let mut next = list.to_vec();
    next.push(element.clone());
    (next, element)
}

/// Insert a new element of `kind` at `index` (clamped to the list length)
#[must_use]
pub fn insert_at(list: &[Element], kind: ElementKind, index: usize) -> (ElementList, Element) {
    let element = Element::new(kind);
    let mut next = list.to_vec();
    next.insert(index.min(list.len()), element.clone());
    (next, element)
}

/// Remove the element with `id`
#[must_use]
pub fn remove(list: &[Element], id: ElementId) -> ElementList {
    list.iter().filter(|e| e.id != id).cloned().collect()
}

/// Clone the element with `id` under a new id, directly after the original
#[must_use]
pub fn duplicate(list: &[Element], id: ElementId) -> (ElementList, Option<Element>) {
    let Some(index) = position_of(list, id) else {
        return (list.to_vec(), None);
    };
    let copy = list[index].duplicate();
    let mut next = list.to_vec();
    next.insert(index + 1, copy.clone());
    (next, Some(copy))
}

/// Swap the element with its predecessor
#[must_use]
pub fn move_up(list: &[Element], id: ElementId) -> ElementList {
    let mut next = list.to_vec();
    if let Some(index) = position_of(list, id) {
        if index > 0 {
            next.swap(index, index - 1);
        }
    }
    next
}

/// Swap the element with its successor
#[must_use]
pub fn move_down(list: &[Element], id: ElementId) -> ElementList {
    let mut next = list.to_vec();
    if let Some(index) = position_of(list, id) {
        if index + 1 < list.len() {
            next.swap(index, index + 1);
        }
    }
    next
}

/// Move the element at `source` so it ends up at `target`.
///
/// `target` indexes the list after the source element has been removed.
#[must_use]
pub fn reorder(list: &[Element], source: usize, target: usize) -> ElementList {
    let mut next = list.to_vec();
    if source == target || source >= list.len() || target >= list.len() {
        return next;
    }
    let element = next.remove(source);
    next.insert(target, element);
    next
}

/// Replace the content payload of the element with `id`
#[must_use]
pub fn update_content(list: &[Element], id: ElementId, content: serde_json::Value) -> ElementList {
    let mut next = list.to_vec();
    if let Some(element) = next.iter_mut().find(|e| e.id == id) {
        element.content = content;
    }
    next
}

/// Replace the layout hints of the element with `id`
#[must_use]
pub fn update_layout(list: &[Element], id: ElementId, layout: Option<Layout>) -> ElementList {
    let mut next = list.to_vec();
    if let Some(element) = next.iter_mut().find(|e| e.id == id) {
        element.layout = layout;
    }
    next
}

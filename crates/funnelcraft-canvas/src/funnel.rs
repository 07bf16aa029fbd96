//! Funnel and step types
//!
//! A funnel is the host-provided object holding every step. The editor only
//! reads it, as an optional fast path when switching steps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::element::{Element, ElementList, StepId};

/// One page of a funnel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Step key
    pub id: StepId,

    /// Display name
    pub name: String,

    /// Last known element list
    #[serde(default)]
    pub elements: ElementList,
}

impl Step {
    /// Create an empty step
    #[must_use]
    pub fn new(id: impl Into<StepId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            elements: Vec::new(),
        }
    }

    /// Set the element list
    #[must_use]
    pub fn with_elements(mut self, elements: ElementList) -> Self {
        self.elements = elements;
        self
    }
}

/// A funnel: an ordered set of steps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Funnel {
    /// Unique identifier
    pub id: Uuid,

    /// Funnel name
    pub name: String,

    /// Ordered steps
    pub steps: Vec<Step>,

    /// When the funnel was last modified
    pub updated_at: DateTime<Utc>,
}

impl Funnel {
    /// Create a new funnel without steps
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            steps: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Append a step
    #[must_use]
    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Get a step by id
    #[must_use]
    pub fn step(&self, step_id: &StepId) -> Option<&Step> {
        self.steps.iter().find(|s| &s.id == step_id)
    }

    /// Element list already held for `step_id`, when non-empty
    #[must_use]
    pub fn cached_elements(&self, step_id: &StepId) -> Option<&[Element]> {
        self.step(step_id)
            .map(|s| s.elements.as_slice())
            .filter(|elements| !elements.is_empty())
    }

    /// Overwrite the cached list for `step_id`. Returns `false` for unknown steps.
    pub fn update_step_elements(&mut self, step_id: &StepId, elements: ElementList) -> bool {
        match self.steps.iter_mut().find(|s| &s.id == step_id) {
            Some(step) => {
                step.elements = elements;
                self.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }
}

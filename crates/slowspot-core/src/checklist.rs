//! Physical setup checklist.
//!
//! One item per setup step of the active instruction, keyed by the step's
//! order number. Required items gate progression out of the setup step;
//! optional items never do.

use serde::{Deserialize, Serialize};

use crate::instructions::PhysicalSetupStep;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub required: bool,
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checklist {
    items: Vec<ChecklistItem>,
}

impl Checklist {
    pub fn from_setup(steps: &[PhysicalSetupStep]) -> Self {
        Self {
            items: steps
                .iter()
                .map(|step| ChecklistItem {
                    id: step.order.to_string(),
                    required: !step.optional,
                    completed: false,
                })
                .collect(),
        }
    }

    pub fn items(&self) -> &[ChecklistItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&ChecklistItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Flip an item's completion flag. Returns the new flag, or `None` when
    /// no item has that id (nothing changes).
    pub fn toggle(&mut self, id: &str) -> Option<bool> {
        let item = self.items.iter_mut().find(|item| item.id == id)?;
        item.completed = !item.completed;
        Some(item.completed)
    }

    /// True iff every required item is completed. Vacuously true when
    /// nothing is required.
    pub fn all_required_complete(&self) -> bool {
        self.items
            .iter()
            .filter(|item| item.required)
            .all(|item| item.completed)
    }

    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|item| item.completed).count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

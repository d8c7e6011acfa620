use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::ActionId;

/// Consumed authorization ids with the time they were consumed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsedActions {
    used: BTreeMap<ActionId, u64>,
}

impl UsedActions {
    pub fn is_used(&self, action_id: &ActionId) -> bool {
        self.used.contains_key(action_id)
    }

    pub fn used_at(&self, action_id: &ActionId) -> Option<u64> {
        self.used.get(action_id).copied()
    }

    /// Returns false if the id was already consumed
    pub fn mark(&mut self, action_id: ActionId, timestamp: u64) -> bool {
        if self.used.contains_key(&action_id) {
            return false;
        }
        self.used.insert(action_id, timestamp);
        true
    }

    /// Only for rolling back a mark whose mint failed in the same operation
    pub(crate) fn unmark(&mut self, action_id: &ActionId) {
        self.used.remove(action_id);
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}

pub mod access_control;
pub mod badge_ledger;
pub mod global_config;
pub mod token_ledger;
pub mod used_actions;

pub use access_control::*;
pub use badge_ledger::*;
pub use global_config::*;
pub use token_ledger::*;
pub use used_actions::*;

use serde::{Deserialize, Serialize};

use crate::events::EventLog;

/// Complete ledger state. Serializable so a host can snapshot and restore it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    pub config: GlobalConfig,
    pub access: AccessControl,
    pub token: TokenLedger,
    pub used_actions: UsedActions,
    pub badges: BadgeLedger,
    pub events: EventLog,
}

/// Copy of everything except the event log, which is append-only and is
/// rolled back by truncating to its recorded length
#[derive(Debug, Clone)]
pub struct Checkpoint {
    config: GlobalConfig,
    access: AccessControl,
    token: TokenLedger,
    used_actions: UsedActions,
    badges: BadgeLedger,
    events_len: usize,
}

impl LedgerState {
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            config: self.config.clone(),
            access: self.access.clone(),
            token: self.token.clone(),
            used_actions: self.used_actions.clone(),
            badges: self.badges.clone(),
            events_len: self.events.len(),
        }
    }

    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.config = checkpoint.config;
        self.access = checkpoint.access;
        self.token = checkpoint.token;
        self.used_actions = checkpoint.used_actions;
        self.badges = checkpoint.badges;
        self.events.truncate(checkpoint.events_len);
    }
}

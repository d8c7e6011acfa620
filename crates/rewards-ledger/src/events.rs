use serde::{Deserialize, Serialize};

use crate::types::{ActionId, Address, Amount, BadgeId, Role};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    RoleGranted {
        role: Role,
        account: Address,
        sender: Address,
    },
    RoleRevoked {
        role: Role,
        account: Address,
        sender: Address,
    },
    Paused {
        account: Address,
    },
    Unpaused {
        account: Address,
    },
    /// Zero address as `from` is a mint, as `to` a burn
    Transfer {
        from: Address,
        to: Address,
        value: Amount,
    },
    Approval {
        owner: Address,
        spender: Address,
        value: Amount,
    },
    RelayMinted {
        to: Address,
        amount: Amount,
        action_id: ActionId,
    },
    Redeemed {
        user: Address,
        amount: Amount,
        voucher_id: String,
    },
    RateUpdated {
        old_rate: Amount,
        new_rate: Amount,
    },
    PointsReconciled {
        user: Address,
        points: Amount,
        tokens: Amount,
    },
    BatchReconciled {
        users: usize,
        total_points: Amount,
        total_tokens: Amount,
    },
    BackendSignerUpdated {
        old_signer: Address,
        new_signer: Address,
    },
    BadgeTransfer {
        operator: Address,
        from: Address,
        to: Address,
        ids: Vec<BadgeId>,
        amounts: Vec<Amount>,
    },
    ApprovalForAll {
        owner: Address,
        operator: Address,
        approved: bool,
    },
    SoulboundStatusChanged {
        id: BadgeId,
        soulbound: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub seq: u64,
    pub timestamp: u64,
    pub event: LedgerEvent,
}

/// Append-only audit log. Sequence numbers start at 1
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn emit(&mut self, timestamp: u64, event: LedgerEvent) -> u64 {
        let seq = self.last_seq() + 1;
        self.records.push(EventRecord {
            seq,
            timestamp,
            event,
        });
        seq
    }

    pub fn last_seq(&self) -> u64 {
        self.records.last().map(|r| r.seq).unwrap_or(0)
    }

    /// Records with a sequence number strictly greater than `seq`
    pub fn since(&self, seq: u64) -> &[EventRecord] {
        let start = self.records.partition_point(|r| r.seq <= seq);
        &self.records[start..]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every record after the first `len`
    pub fn truncate(&mut self, len: usize) {
        self.records.truncate(len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_since_returns_tail() {
        let mut log = EventLog::default();
        for i in 0..5u64 {
            log.emit(
                i,
                LedgerEvent::Paused {
                    account: Address::ZERO,
                },
            );
        }

        assert_eq!(log.last_seq(), 5);
        assert_eq!(log.since(0).len(), 5);
        assert_eq!(log.since(3).len(), 2);
        assert_eq!(log.since(3)[0].seq, 4);
        assert!(log.since(5).is_empty());
        assert!(log.since(99).is_empty());
    }

    #[test]
    fn test_record_serializes_with_event_name() {
        let mut log = EventLog::default();
        log.emit(
            42,
            LedgerEvent::RateUpdated {
                old_rate: 100,
                new_rate: 50,
            },
        );
        let json = serde_json::to_value(&log.since(0)[0]).unwrap();
        assert_eq!(json["seq"], 1);
        assert_eq!(json["event"]["RateUpdated"]["new_rate"], 50);
    }
}

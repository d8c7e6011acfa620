/// Off-ledger activity points awaiting conversion into tokens
use rewards_ledger::constants::MAX_BATCH_SIZE;
use rewards_ledger::{Address, Amount};
use rewards_sdk::api::{PendingStatus, PointsBalance};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{RelayerError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsEntry {
    pub total_points: Amount,
    pub points_reconciled: Amount,
}

impl PointsEntry {
    pub fn pending(&self) -> Amount {
        self.total_points.saturating_sub(self.points_reconciled)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsBook {
    entries: BTreeMap<Address, PointsEntry>,
    last_run: Option<u64>,
}

impl PointsBook {
    pub fn award(&mut self, user: Address, points: Amount) -> Result<PointsBalance> {
        if user.is_zero() {
            return Err(RelayerError::InvalidRequest("user is the zero address".into()));
        }
        if points == 0 {
            return Err(RelayerError::InvalidRequest("points must be positive".into()));
        }

        let entry = self.entries.entry(user).or_default();
        entry.total_points = entry
            .total_points
            .checked_add(points)
            .ok_or_else(|| RelayerError::InvalidRequest("points total overflows".into()))?;
        Ok(Self::balance(user, entry))
    }

    pub fn balance_of(&self, user: &Address) -> PointsBalance {
        let entry = self.entries.get(user).copied().unwrap_or_default();
        Self::balance(*user, &entry)
    }

    fn balance(user: Address, entry: &PointsEntry) -> PointsBalance {
        PointsBalance {
            user,
            total_points: entry.total_points,
            points_reconciled: entry.points_reconciled,
        }
    }

    pub fn status(&self) -> PendingStatus {
        let pending: Vec<Amount> = self
            .entries
            .values()
            .map(PointsEntry::pending)
            .filter(|p| *p > 0)
            .collect();

        PendingStatus {
            pending_users: pending.len(),
            pending_points: pending.iter().fold(0, |acc: Amount, p| acc.saturating_add(*p)),
            last_run: self.last_run,
        }
    }

    /// Users whose pending points are worth at least one token at `rate`,
    /// chunked into reconcile batches
    pub fn pending_batches(&self, rate: Amount) -> Vec<Vec<(Address, Amount)>> {
        if rate == 0 {
            return Vec::new();
        }
        let eligible: Vec<(Address, Amount)> = self
            .entries
            .iter()
            .map(|(user, entry)| (*user, entry.pending()))
            .filter(|(_, pending)| *pending >= rate)
            .collect();

        eligible.chunks(MAX_BATCH_SIZE).map(|c| c.to_vec()).collect()
    }

    /// Record a reconciled batch. Only the points that became whole tokens
    /// are marked, the remainder stays pending for the next run.
    pub fn mark_reconciled(&mut self, batch: &[(Address, Amount)], rate: Amount) {
        if rate == 0 {
            return;
        }
        for (user, points) in batch {
            if let Some(entry) = self.entries.get_mut(user) {
                let converted = (points / rate) * rate;
                entry.points_reconciled = entry
                    .points_reconciled
                    .saturating_add(converted)
                    .min(entry.total_points);
            }
        }
    }

    pub fn set_last_run(&mut self, timestamp: u64) {
        self.last_run = Some(timestamp);
    }
}

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::errors::{LedgerError, Result};
use crate::types::{Address, Amount, BadgeId};

/// Multi-token ledger for achievement badges
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeLedger {
    balances: BTreeMap<BadgeId, BTreeMap<Address, Amount>>,
    supply: BTreeMap<BadgeId, Amount>,
    soulbound: BTreeSet<BadgeId>,
    operators: BTreeMap<Address, BTreeSet<Address>>,
}

impl BadgeLedger {
    pub fn balance_of(&self, account: &Address, id: BadgeId) -> Amount {
        self.balances
            .get(&id)
            .and_then(|m| m.get(account))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_supply(&self, id: BadgeId) -> Amount {
        self.supply.get(&id).copied().unwrap_or(0)
    }

    pub fn is_soulbound(&self, id: BadgeId) -> bool {
        self.soulbound.contains(&id)
    }

    /// Returns true only when the flag was newly set
    pub fn mark_soulbound(&mut self, id: BadgeId) -> bool {
        self.soulbound.insert(id)
    }

    pub fn is_approved_for_all(&self, owner: &Address, operator: &Address) -> bool {
        self.operators
            .get(owner)
            .map(|set| set.contains(operator))
            .unwrap_or(false)
    }

    pub fn set_approval(&mut self, owner: &Address, operator: &Address, approved: bool) {
        if approved {
            self.operators.entry(*owner).or_default().insert(*operator);
        } else if let Some(set) = self.operators.get_mut(owner) {
            set.remove(operator);
        }
    }

    /// Every badge held by `account` with a nonzero balance
    pub fn holdings(&self, account: &Address) -> BTreeMap<BadgeId, Amount> {
        self.balances
            .iter()
            .filter_map(|(id, m)| m.get(account).filter(|b| **b > 0).map(|b| (*id, *b)))
            .collect()
    }

    /// Single movement primitive: mint when `from` is None, burn when `to`
    /// is None, transfer otherwise. All entries are validated against a
    /// staged copy before anything is written.
    pub fn update(
        &mut self,
        from: Option<&Address>,
        to: Option<&Address>,
        ids: &[BadgeId],
        amounts: &[Amount],
    ) -> Result<()> {
        if ids.len() != amounts.len() {
            return Err(LedgerError::ArrayLengthMismatch {
                left: ids.len(),
                right: amounts.len(),
            });
        }

        if from.is_some() && to.is_some() {
            if let Some(id) = ids.iter().find(|id| self.is_soulbound(**id)) {
                return Err(LedgerError::SoulboundTransferNotAllowed(*id));
            }
        }

        let mut staged_balances: BTreeMap<(BadgeId, Address), Amount> = BTreeMap::new();
        let mut staged_supply: BTreeMap<BadgeId, Amount> = BTreeMap::new();

        for (&id, &amount) in ids.iter().zip(amounts) {
            if let Some(from) = from {
                let have = *staged_balances
                    .entry((id, *from))
                    .or_insert_with(|| self.balance_of(from, id));
                let next = have
                    .checked_sub(amount)
                    .ok_or(LedgerError::InsufficientBalance { have, need: amount })?;
                staged_balances.insert((id, *from), next);
            }

            if let Some(to) = to {
                let have = *staged_balances
                    .entry((id, *to))
                    .or_insert_with(|| self.balance_of(to, id));
                let next = have
                    .checked_add(amount)
                    .ok_or(LedgerError::ArithmeticOverflow)?;
                staged_balances.insert((id, *to), next);
            }

            match (from, to) {
                (None, Some(_)) => {
                    let supply = *staged_supply
                        .entry(id)
                        .or_insert_with(|| self.total_supply(id));
                    let next = supply
                        .checked_add(amount)
                        .ok_or(LedgerError::ArithmeticOverflow)?;
                    staged_supply.insert(id, next);
                }
                (Some(_), None) => {
                    let supply = *staged_supply
                        .entry(id)
                        .or_insert_with(|| self.total_supply(id));
                    let next = supply
                        .checked_sub(amount)
                        .ok_or(LedgerError::ArithmeticOverflow)?;
                    staged_supply.insert(id, next);
                }
                _ => {}
            }
        }

        for ((id, account), balance) in staged_balances {
            self.balances.entry(id).or_default().insert(account, balance);
        }
        for (id, supply) in staged_supply {
            self.supply.insert(id, supply);
        }
        Ok(())
    }
}

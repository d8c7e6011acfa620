use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::{LedgerError, Result};
use crate::types::{Address, Amount};

/// Fungible balances, allowances and supply.
///
/// Invariant: the sum of `balances` equals `total_supply`. Every helper
/// validates before it writes, so an `Err` leaves the ledger untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLedger {
    balances: BTreeMap<Address, Amount>,
    allowances: BTreeMap<Address, BTreeMap<Address, Amount>>,
    total_supply: Amount,
}

impl TokenLedger {
    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(owner)
            .and_then(|m| m.get(spender))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    pub fn holders(&self) -> impl Iterator<Item = (&Address, &Amount)> {
        self.balances.iter()
    }

    pub fn credit(&mut self, to: &Address, amount: Amount) -> Result<()> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;

        self.total_supply = supply;
        self.balances.insert(*to, balance);
        Ok(())
    }

    pub fn debit(&mut self, from: &Address, amount: Amount) -> Result<()> {
        let have = self.balance_of(from);
        let balance = have
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance { have, need: amount })?;
        let supply = self
            .total_supply
            .checked_sub(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;

        self.total_supply = supply;
        self.balances.insert(*from, balance);
        Ok(())
    }

    /// Move `amount` between two accounts; a self-move only checks the balance
    pub fn move_balance(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<()> {
        let have = self.balance_of(from);
        let from_balance = have
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance { have, need: amount })?;
        if from == to {
            return Ok(());
        }
        let to_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;

        self.balances.insert(*from, from_balance);
        self.balances.insert(*to, to_balance);
        Ok(())
    }

    pub fn set_allowance(&mut self, owner: &Address, spender: &Address, amount: Amount) {
        self.allowances
            .entry(*owner)
            .or_default()
            .insert(*spender, amount);
    }

    pub fn check_allowance(&self, owner: &Address, spender: &Address, amount: Amount) -> Result<()> {
        let have = self.allowance(owner, spender);
        if have < amount {
            return Err(LedgerError::InsufficientAllowance { have, need: amount });
        }
        Ok(())
    }

    pub fn spend_allowance(&mut self, owner: &Address, spender: &Address, amount: Amount) -> Result<()> {
        self.check_allowance(owner, spender, amount)?;
        let remaining = self.allowance(owner, spender) - amount;
        self.set_allowance(owner, spender, remaining);
        Ok(())
    }

    pub fn sum_of_balances(&self) -> Option<Amount> {
        self.balances
            .values()
            .try_fold(0u128, |acc, b| acc.checked_add(*b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Address = Address([0xaa; 20]);
    const B: Address = Address([0xbb; 20]);

    #[test]
    fn test_credit_debit_keep_supply() {
        let mut ledger = TokenLedger::default();
        ledger.credit(&A, 100).unwrap();
        ledger.debit(&A, 40).unwrap();

        assert_eq!(ledger.balance_of(&A), 60);
        assert_eq!(ledger.total_supply(), 60);
        assert_eq!(ledger.sum_of_balances(), Some(60));
    }

    #[test]
    fn test_debit_shortfall_leaves_state() {
        let mut ledger = TokenLedger::default();
        ledger.credit(&A, 10).unwrap();
        let before = ledger.clone();

        assert_eq!(
            ledger.debit(&A, 11),
            Err(LedgerError::InsufficientBalance { have: 10, need: 11 })
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_credit_overflow() {
        let mut ledger = TokenLedger::default();
        ledger.credit(&A, u128::MAX).unwrap();
        assert_eq!(ledger.credit(&B, 1), Err(LedgerError::ArithmeticOverflow));
        assert_eq!(ledger.balance_of(&B), 0);
    }

    #[test]
    fn test_self_move_is_noop() {
        let mut ledger = TokenLedger::default();
        ledger.credit(&A, 5).unwrap();
        ledger.move_balance(&A, &A, 5).unwrap();
        assert_eq!(ledger.balance_of(&A), 5);
        assert!(ledger.move_balance(&A, &A, 6).is_err());
    }

    #[test]
    fn test_spend_allowance() {
        let mut ledger = TokenLedger::default();
        ledger.set_allowance(&A, &B, 100);
        ledger.spend_allowance(&A, &B, 30).unwrap();
        assert_eq!(ledger.allowance(&A, &B), 70);
        assert_eq!(
            ledger.spend_allowance(&A, &B, 71),
            Err(LedgerError::InsufficientAllowance { have: 70, need: 71 })
        );
    }
}

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::types::{Address, Role};

/// Role membership: maps roles to sets of member addresses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    members: BTreeMap<Role, BTreeSet<Address>>,
}

impl AccessControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the account was already a member
    pub fn add(&mut self, role: Role, account: Address) -> bool {
        self.members.entry(role).or_default().insert(account)
    }

    /// Returns false if the account was not a member
    pub fn remove(&mut self, role: Role, account: &Address) -> bool {
        self.members
            .get_mut(&role)
            .map(|set| set.remove(account))
            .unwrap_or(false)
    }

    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.members
            .get(&role)
            .map(|set| set.contains(account))
            .unwrap_or(false)
    }

    pub fn members(&self, role: Role) -> impl Iterator<Item = &Address> {
        self.members
            .get(&role)
            .map(|set| set.iter())
            .into_iter()
            .flatten()
    }

    pub fn member_count(&self, role: Role) -> usize {
        self.members.get(&role).map(|set| set.len()).unwrap_or(0)
    }

    pub fn roles_of(&self, account: &Address) -> Vec<Role> {
        Role::ALL
            .into_iter()
            .filter(|role| self.has_role(*role, account))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_remove_membership() {
        let mut acl = AccessControl::new();
        let a = Address([1; 20]);

        assert!(acl.add(Role::Minter, a));
        assert!(!acl.add(Role::Minter, a));
        assert!(acl.has_role(Role::Minter, &a));
        assert!(!acl.has_role(Role::Admin, &a));
        assert_eq!(acl.roles_of(&a), vec![Role::Minter]);

        assert!(acl.remove(Role::Minter, &a));
        assert!(!acl.remove(Role::Minter, &a));
        assert_eq!(acl.member_count(Role::Minter), 0);
    }
}

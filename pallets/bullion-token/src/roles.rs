//! Role identifiers and the role-registry half of the pallet.
//!
//! Roles are opaque 32-byte ids. Each role has one administering role
//! (`RoleAdmins`, defaulting to [`DEFAULT_ADMIN_ROLE`]); holding the admin role
//! is what allows granting and revoking the role itself.
//!
//! [`FROZEN_ROLE`] is reserved. Its membership lives in the `Frozen` map rather
//! than in `RoleMembers`, so the generic grant/revoke surface can set and clear
//! it under the risk manager's authority while `renounce_role` can never clear it.

use frame_support::{dispatch::DispatchResult, ensure};

use crate::{Config, Error, Event, Frozen, Pallet, RoleAdmins, RoleMembers, LOG_TARGET};

/// Opaque role identifier.
pub type RoleId = [u8; 32];

/// Zero-padded ASCII name as a role id.
pub const fn role_id(name: &[u8]) -> RoleId {
    let mut id = [0u8; 32];
    let mut i = 0;
    while i < name.len() && i < 32 {
        id[i] = name[i];
        i += 1;
    }
    id
}

/// Root role; administers every role that has not been reassigned.
pub const DEFAULT_ADMIN_ROLE: RoleId = [0u8; 32];
pub const PAUSER_ROLE: RoleId = role_id(b"PAUSER_ROLE");
pub const MINTER_ROLE: RoleId = role_id(b"MINTER_ROLE");
pub const BURNER_ROLE: RoleId = role_id(b"BURNER_ROLE");
/// Administers [`FROZEN_ROLE`] and may wipe frozen balances.
pub const RISK_MANAGER_ROLE: RoleId = role_id(b"RISK_MANAGER_ROLE");
/// Reserved quarantine marker. See the module docs.
pub const FROZEN_ROLE: RoleId = role_id(b"FROZEN_ROLE");
/// Signs mint authorizations.
pub const MINT_APPROVER_ROLE: RoleId = role_id(b"MINT_APPROVER_ROLE");
/// Submits signed mint authorizations on behalf of the vault.
pub const VAULT_MINTER_ROLE: RoleId = role_id(b"VAULT_MINTER_ROLE");
pub const AUDITOR_ROLE: RoleId = role_id(b"AUDITOR_ROLE");
pub const UPGRADER_ROLE: RoleId = role_id(b"UPGRADER_ROLE");

/// Every role with a fixed meaning in this pallet.
pub const NAMED_ROLES: [RoleId; 9] = [
    PAUSER_ROLE,
    MINTER_ROLE,
    BURNER_ROLE,
    RISK_MANAGER_ROLE,
    FROZEN_ROLE,
    MINT_APPROVER_ROLE,
    VAULT_MINTER_ROLE,
    AUDITOR_ROLE,
    UPGRADER_ROLE,
];

/// Printable form of a role id for log lines.
pub(crate) fn role_label(role: &RoleId) -> &str {
    if *role == DEFAULT_ADMIN_ROLE {
        return "DEFAULT_ADMIN_ROLE";
    }
    let len = role.iter().position(|b| *b == 0).unwrap_or(role.len());
    match sp_std::str::from_utf8(&role[..len]) {
        Ok(name) if !name.is_empty() => name,
        _ => "<opaque role>",
    }
}

impl<T: Config> Pallet<T> {
    pub fn has_role(role: RoleId, account: &T::AccountId) -> bool {
        if role == FROZEN_ROLE {
            return Frozen::<T>::get(account);
        }
        RoleMembers::<T>::get(role, account)
    }

    pub(crate) fn ensure_role(role: RoleId, who: &T::AccountId) -> DispatchResult {
        if Self::has_role(role, who) {
            return Ok(());
        }
        log::debug!(
            target: LOG_TARGET,
            "{:?} rejected: missing {}",
            who,
            role_label(&role)
        );
        Err(Error::<T>::MissingRole.into())
    }

    /// Caller must hold the role that administers `role`.
    pub(crate) fn ensure_role_admin(role: RoleId, who: &T::AccountId) -> DispatchResult {
        Self::ensure_role(RoleAdmins::<T>::get(role), who)
    }

    pub(crate) fn do_grant_role(role: RoleId, account: T::AccountId, sender: T::AccountId) {
        if role == FROZEN_ROLE {
            Frozen::<T>::insert(&account, true);
            log::info!(target: LOG_TARGET, "{:?} frozen by {:?}", account, sender);
            Self::deposit_event(Event::Frozen { account });
            return;
        }
        RoleMembers::<T>::insert(role, &account, true);
        Self::deposit_event(Event::RoleGranted { role, account, sender });
    }

    pub(crate) fn do_revoke_role(role: RoleId, account: T::AccountId, sender: T::AccountId) {
        if role == FROZEN_ROLE {
            Frozen::<T>::remove(&account);
            log::info!(target: LOG_TARGET, "{:?} unfrozen by {:?}", account, sender);
            Self::deposit_event(Event::Unfrozen { account });
            return;
        }
        RoleMembers::<T>::remove(role, &account);
        Self::deposit_event(Event::RoleRevoked { role, account, sender });
    }

    /// Holders may drop their own roles, except the frozen marker.
    pub(crate) fn do_renounce_role(
        role: RoleId,
        account: T::AccountId,
        caller: T::AccountId,
    ) -> DispatchResult {
        if role == FROZEN_ROLE {
            log::debug!(target: LOG_TARGET, "{:?} attempted to renounce FROZEN_ROLE", caller);
            return Err(Error::<T>::FrozenRoleRenounceAttempt.into());
        }
        ensure!(account == caller, Error::<T>::CanOnlyRenounceForSelf);
        Self::do_revoke_role(role, account, caller);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ids_are_zero_padded_names() {
        let id = role_id(b"PAUSER_ROLE");
        assert_eq!(&id[..11], b"PAUSER_ROLE");
        assert!(id[11..].iter().all(|b| *b == 0));
    }

    #[test]
    fn named_roles_are_distinct_and_not_root() {
        for (i, a) in NAMED_ROLES.iter().enumerate() {
            assert_ne!(*a, DEFAULT_ADMIN_ROLE);
            for b in NAMED_ROLES.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn role_label_prints_names() {
        assert_eq!(role_label(&RISK_MANAGER_ROLE), "RISK_MANAGER_ROLE");
        assert_eq!(role_label(&DEFAULT_ADMIN_ROLE), "DEFAULT_ADMIN_ROLE");
        assert_eq!(role_label(&[0xff; 32]), "<opaque role>");
    }
}

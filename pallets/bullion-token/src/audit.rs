//! Two-phase upgrade gate.
//!
//! An auditor records the hash of the only runtime code that may be deployed
//! next; an upgrader may then authorize exactly that hash with
//! `frame_system`. Neither role can complete an upgrade alone.

use frame_support::dispatch::DispatchResult;

use crate::{AuditedImplementation, Config, Error, Pallet, LOG_TARGET, UPGRADER_ROLE};

impl<T: Config> Pallet<T> {
    /// Caller holds `UPGRADER_ROLE` and `code_hash` is the audited one.
    pub fn ensure_upgrade_authorized(who: &T::AccountId, code_hash: &T::Hash) -> DispatchResult {
        Self::ensure_role(UPGRADER_ROLE, who)?;
        match AuditedImplementation::<T>::get() {
            Some(audited) if audited == *code_hash => Ok(()),
            audited => {
                log::warn!(
                    target: LOG_TARGET,
                    "upgrade to {:?} by {:?} refused: audited implementation is {:?}",
                    code_hash,
                    who,
                    audited
                );
                Err(Error::<T>::NotAudited.into())
            }
        }
    }

    pub(crate) fn do_authorize_upgrade(who: &T::AccountId, code_hash: T::Hash) -> DispatchResult {
        Self::ensure_upgrade_authorized(who, &code_hash)?;
        log::info!(target: LOG_TARGET, "{:?} authorized upgrade to {:?}", who, code_hash);
        frame_system::Pallet::<T>::do_authorize_upgrade(code_hash, true);
        Ok(())
    }
}

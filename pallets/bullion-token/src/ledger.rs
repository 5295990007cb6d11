//! Base ledger bookkeeping and the policy checks wrapped around it.
//!
//! `update_unchecked` is the raw balance primitive: `from == None` mints,
//! `to == None` burns, both set moves. `update` is the mediated form every
//! user-facing path goes through; only compulsory seizure calls the raw one.
//!
//! All fallible checks run before the first storage write, so a rejected call
//! leaves storage untouched even outside a transactional layer.

use frame_support::{dispatch::DispatchResult, ensure};
use sp_runtime::DispatchError;

use crate::{
    Allowances, Balances, Config, Error, Event, Frozen, Pallet, Paused, TotalSupply, LOG_TARGET,
};

impl<T: Config> Pallet<T> {
    pub(crate) fn ensure_not_paused() -> DispatchResult {
        ensure!(!Paused::<T>::get(), Error::<T>::ContractPaused);
        Ok(())
    }

    pub(crate) fn ensure_not_frozen(account: &T::AccountId) -> DispatchResult {
        if Frozen::<T>::get(account) {
            log::debug!(target: LOG_TARGET, "rejected: account {:?} is frozen", account);
            return Err(Error::<T>::AccountFrozen.into());
        }
        Ok(())
    }

    /// Pause- and freeze-checked balance update.
    pub(crate) fn update(
        from: Option<&T::AccountId>,
        to: Option<&T::AccountId>,
        amount: u128,
    ) -> DispatchResult {
        Self::ensure_not_paused()?;
        if let Some(from) = from {
            Self::ensure_not_frozen(from)?;
        }
        if let Some(to) = to {
            Self::ensure_not_frozen(to)?;
        }
        Self::update_unchecked(from, to, amount)
    }

    /// Raw balance update. Skips pause and freeze policy.
    pub(crate) fn update_unchecked(
        from: Option<&T::AccountId>,
        to: Option<&T::AccountId>,
        amount: u128,
    ) -> DispatchResult {
        let supply = TotalSupply::<T>::get();
        let new_supply = match (from, to) {
            (None, _) => supply.checked_add(amount).ok_or(Error::<T>::Overflow)?,
            (Some(_), None) => supply.saturating_sub(amount),
            (Some(_), Some(_)) => supply,
        };

        if let Some(from) = from {
            let balance = Balances::<T>::get(from);
            if balance < amount {
                log::debug!(
                    target: LOG_TARGET,
                    "rejected: {:?} holds {} but {} requested",
                    from,
                    balance,
                    amount
                );
                return Err(Error::<T>::InsufficientBalance.into());
            }
            Balances::<T>::insert(from, balance - amount);
        }
        // Balances sum to the supply, so a credit can never exceed `new_supply`.
        if let Some(to) = to {
            Balances::<T>::mutate(to, |balance| *balance = balance.saturating_add(amount));
        }
        TotalSupply::<T>::put(new_supply);
        Ok(())
    }

    pub(crate) fn do_transfer(from: &T::AccountId, to: &T::AccountId, amount: u128) -> DispatchResult {
        Self::update(Some(from), Some(to), amount)?;
        Self::deposit_event(Event::Transferred { from: from.clone(), to: to.clone(), amount });
        Ok(())
    }

    pub(crate) fn do_mint(to: &T::AccountId, amount: u128) -> DispatchResult {
        Self::update(None, Some(to), amount)?;
        Self::deposit_event(Event::Minted { to: to.clone(), amount });
        Ok(())
    }

    pub(crate) fn do_burn(from: &T::AccountId, amount: u128) -> DispatchResult {
        Self::update(Some(from), None, amount)?;
        Self::deposit_event(Event::Burned { from: from.clone(), amount });
        Ok(())
    }

    pub(crate) fn do_approve(owner: T::AccountId, spender: T::AccountId, amount: u128) -> DispatchResult {
        Self::ensure_not_paused()?;
        Self::ensure_not_frozen(&owner)?;
        Self::ensure_not_frozen(&spender)?;
        Allowances::<T>::insert(&owner, &spender, amount);
        Self::deposit_event(Event::Approval { owner, spender, amount });
        Ok(())
    }

    /// Allowance left after spending `amount`, or `None` for an unlimited
    /// allowance which is never decremented. Does not write.
    pub(crate) fn remaining_allowance(
        owner: &T::AccountId,
        spender: &T::AccountId,
        amount: u128,
    ) -> Result<Option<u128>, DispatchError> {
        let current = Allowances::<T>::get(owner, spender);
        if current == u128::MAX {
            return Ok(None);
        }
        match current.checked_sub(amount) {
            Some(remaining) => Ok(Some(remaining)),
            None => {
                log::debug!(
                    target: LOG_TARGET,
                    "rejected: {:?} may spend {} of {:?}, {} requested",
                    spender,
                    current,
                    owner,
                    amount
                );
                Err(Error::<T>::InsufficientAllowance.into())
            }
        }
    }

    pub(crate) fn do_transfer_from(
        spender: &T::AccountId,
        from: &T::AccountId,
        to: &T::AccountId,
        amount: u128,
    ) -> DispatchResult {
        Self::ensure_not_paused()?;
        Self::ensure_not_frozen(spender)?;
        let remaining = Self::remaining_allowance(from, spender, amount)?;
        Self::do_transfer(from, to, amount)?;
        if let Some(remaining) = remaining {
            Allowances::<T>::insert(from, spender, remaining);
        }
        Ok(())
    }

    /// Ledger invariant: balances sum to the recorded supply.
    #[cfg(any(feature = "try-runtime", test))]
    pub fn do_try_state() -> DispatchResult {
        let sum = Balances::<T>::iter_values()
            .try_fold(0u128, |acc, balance| acc.checked_add(balance))
            .ok_or(DispatchError::Other("balance sum overflows"))?;
        ensure!(
            sum == TotalSupply::<T>::get(),
            DispatchError::Other("sum of balances differs from total supply")
        );
        Ok(())
    }
}

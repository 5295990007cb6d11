//! Storage migrations for pallet-bullion-token.
//!
//! Every dispatchable rejects calls with `StorageVersionMismatch` until the
//! on-chain storage version equals [`crate::STORAGE_VERSION`]. A runtime that
//! ships new code therefore has to run the matching migration in the same
//! upgrade, or the token is inert until it does.
//!
//! # Migration Pattern
//!
//! 1. **Increment `STORAGE_VERSION`** in `lib.rs`
//! 2. **Add a module** `vN::MigrateToVN` implementing `OnRuntimeUpgrade`
//! 3. **Gate on the on-chain version** so re-runs are no-ops
//! 4. **Stamp the new version** as the last write
//! 5. **Wire it into the runtime** via the `Executive` migration tuple
//!
//! Storage items are addressed by name (`twox_128(pallet) ++ twox_128(item)`).
//! Items that must never move pin their name with `#[pallet::storage_prefix]`,
//! so renaming the Rust type does not require a migration.
//!
//! # Wiring Migrations in Runtime
//!
//! ```ignore
//! pub type Executive = frame_executive::Executive<
//!     Runtime,
//!     Block,
//!     frame_system::ChainContext<Runtime>,
//!     Runtime,
//!     AllPalletsWithSystem,
//!     pallet_bullion_token::migrations::v1::MigrateToV1<Runtime>,
//! >;
//! ```
//!
//! # Removing Storage
//!
//! ```ignore
//! let _ = frame_support::storage::unhashed::clear_prefix(
//!     &frame_support::storage::storage_prefix(b"BullionToken", b"DeprecatedItem"),
//!     None,
//!     None,
//! );
//! ```

use frame_support::{pallet_prelude::*, traits::OnRuntimeUpgrade};
use sp_std::marker::PhantomData;

use crate::{Config, Pallet, RoleAdmins, FROZEN_ROLE, LOG_TARGET, RISK_MANAGER_ROLE};

/// Version 0 → 1.
///
/// v0 storage predates role administration for the frozen role: quarantine was
/// governed by the root admin. v1 hands `FROZEN_ROLE` to the risk manager. An
/// admin entry already written by governance is kept.
pub mod v1 {
    use super::*;

    pub struct MigrateToV1<T>(PhantomData<T>);

    impl<T: Config> OnRuntimeUpgrade for MigrateToV1<T> {
        fn on_runtime_upgrade() -> Weight {
            let on_chain_version = Pallet::<T>::on_chain_storage_version();

            if on_chain_version < 1 {
                let mut writes = 1;
                if !RoleAdmins::<T>::contains_key(FROZEN_ROLE) {
                    RoleAdmins::<T>::insert(FROZEN_ROLE, RISK_MANAGER_ROLE);
                    writes += 1;
                }

                StorageVersion::new(1).put::<Pallet<T>>();
                log::info!(target: LOG_TARGET, "Migrated storage v0 → v1");

                T::DbWeight::get().reads_writes(2, writes)
            } else {
                log::info!(
                    target: LOG_TARGET,
                    "Storage already at v{on_chain_version:?}, skipping v1 migration"
                );
                T::DbWeight::get().reads(1)
            }
        }

        #[cfg(feature = "try-runtime")]
        fn pre_upgrade() -> Result<sp_std::vec::Vec<u8>, sp_runtime::TryRuntimeError> {
            let on_chain_version = Pallet::<T>::on_chain_storage_version();
            log::info!(
                target: LOG_TARGET,
                "Pre-upgrade: on-chain storage version is {:?}",
                on_chain_version
            );
            Ok(on_chain_version.encode())
        }

        #[cfg(feature = "try-runtime")]
        fn post_upgrade(state: sp_std::vec::Vec<u8>) -> Result<(), sp_runtime::TryRuntimeError> {
            let pre_version: u16 = Decode::decode(&mut &state[..])
                .map_err(|_| sp_runtime::TryRuntimeError::Other("Failed to decode pre-state"))?;
            let post_version = Pallet::<T>::on_chain_storage_version();

            if pre_version < 1 {
                frame_support::ensure!(
                    post_version == 1,
                    sp_runtime::TryRuntimeError::Other("Migration to v1 did not complete")
                );
                frame_support::ensure!(
                    RoleAdmins::<T>::contains_key(FROZEN_ROLE),
                    sp_runtime::TryRuntimeError::Other("Frozen role has no admin after v1")
                );
            }
            Pallet::<T>::do_try_state()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mock::*, Error, DEFAULT_ADMIN_ROLE, STORAGE_VERSION};
    use frame_support::{assert_noop, assert_ok, traits::StorageVersion};

    /// Strip genesis back to what a v0 chain would hold.
    fn make_v0() {
        StorageVersion::new(0).put::<Pallet<Test>>();
        RoleAdmins::<Test>::remove(FROZEN_ROLE);
    }

    #[test]
    fn migration_v1_from_v0_works() {
        new_test_ext().execute_with(|| {
            make_v0();
            assert_eq!(Pallet::<Test>::on_chain_storage_version(), 0);
            assert_eq!(Pallet::<Test>::role_admin(FROZEN_ROLE), DEFAULT_ADMIN_ROLE);

            let _weight = v1::MigrateToV1::<Test>::on_runtime_upgrade();

            assert_eq!(Pallet::<Test>::on_chain_storage_version(), STORAGE_VERSION);
            assert_eq!(Pallet::<Test>::role_admin(FROZEN_ROLE), RISK_MANAGER_ROLE);
        });
    }

    /// Calls are refused until the migration has run.
    #[test]
    fn calls_rejected_before_migration() {
        new_test_ext().execute_with(|| {
            make_v0();

            assert_noop!(
                BullionToken::transfer(RuntimeOrigin::signed(ALICE), BOB, 1),
                Error::<Test>::StorageVersionMismatch
            );
            assert_noop!(
                BullionToken::freeze(RuntimeOrigin::signed(RISK_MANAGER), BOB),
                Error::<Test>::StorageVersionMismatch
            );

            v1::MigrateToV1::<Test>::on_runtime_upgrade();

            assert_ok!(BullionToken::transfer(RuntimeOrigin::signed(ALICE), BOB, 1));
            assert_ok!(BullionToken::freeze(RuntimeOrigin::signed(RISK_MANAGER), BOB));
        });
    }

    /// An admin chosen by governance before the upgrade survives it.
    #[test]
    fn migration_v1_keeps_existing_frozen_admin() {
        new_test_ext().execute_with(|| {
            make_v0();
            RoleAdmins::<Test>::insert(FROZEN_ROLE, DEFAULT_ADMIN_ROLE);

            v1::MigrateToV1::<Test>::on_runtime_upgrade();

            assert!(RoleAdmins::<Test>::contains_key(FROZEN_ROLE));
            assert_eq!(Pallet::<Test>::role_admin(FROZEN_ROLE), DEFAULT_ADMIN_ROLE);
        });
    }

    #[test]
    fn migration_v1_idempotent() {
        new_test_ext().execute_with(|| {
            make_v0();
            v1::MigrateToV1::<Test>::on_runtime_upgrade();

            // Governance reassigns after the upgrade; a re-run must not undo it
            RoleAdmins::<Test>::insert(FROZEN_ROLE, DEFAULT_ADMIN_ROLE);
            v1::MigrateToV1::<Test>::on_runtime_upgrade();

            assert_eq!(Pallet::<Test>::on_chain_storage_version(), 1);
            assert_eq!(Pallet::<Test>::role_admin(FROZEN_ROLE), DEFAULT_ADMIN_ROLE);
        });
    }

    #[test]
    fn migration_v1_skipped_on_higher_version() {
        new_test_ext().execute_with(|| {
            StorageVersion::new(5).put::<Pallet<Test>>();
            RoleAdmins::<Test>::remove(FROZEN_ROLE);

            v1::MigrateToV1::<Test>::on_runtime_upgrade();

            assert_eq!(Pallet::<Test>::on_chain_storage_version(), 5);
            assert!(!RoleAdmins::<Test>::contains_key(FROZEN_ROLE));
        });
    }
}

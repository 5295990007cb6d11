#![cfg_attr(not(feature = "std"), no_std)]
// Storage getters are the pallet's public read surface.
#![allow(deprecated)]
#![allow(clippy::let_unit_value)]

//! # Bullion Token Pallet
//!
//! Policy layer of a regulated, commodity-backed fungible token:
//!
//! - **Roles**: opaque 32-byte role ids with per-role administering roles.
//! - **Pause**: one switch that halts every balance-affecting call.
//! - **Freeze**: risk-manager quarantine, self-quarantine, and compulsory
//!   seizure (`wipe_frozen_account`) of frozen balances.
//! - **Signed authorizations**: replay-protected mint, transfer, receive and
//!   cancel flows submitted by a third party on a signer's behalf.
//! - **Upgrade audit gate**: an auditor approves a runtime code hash, an
//!   upgrader may then authorize exactly that hash.
//!
//! ## Storage schema
//!
//! Keys are `twox_128(pallet) ++ twox_128(item) ++ hashed key`, derived from
//! names and never from declaration order. `AuditedImplementation` and
//! `AuthorizationStates` pin their item names explicitly; renaming the Rust
//! items must not move that data. Every dispatchable refuses to run unless the
//! on-chain storage version equals [`STORAGE_VERSION`], so freshly swapped code
//! never writes to unmigrated storage.
//!
//! | Item                    | Key                         | Value            |
//! |-------------------------|-----------------------------|------------------|
//! | `TokenName`             | -                           | bytes (≤ 64)     |
//! | `TokenSymbol`           | -                           | bytes (≤ 16)     |
//! | `Decimals`              | -                           | `u8`             |
//! | `TotalSupply`           | -                           | `u128`           |
//! | `Balances`              | account                     | `u128`           |
//! | `Allowances`            | (owner, spender)            | `u128`           |
//! | `Frozen`                | account                     | `bool`           |
//! | `Paused`                | -                           | `bool`           |
//! | `RoleMembers`           | (role, account)             | `bool`           |
//! | `RoleAdmins`            | role                        | role             |
//! | `AuthorizationStates`   | (signer, nonce)             | `bool`           |
//! | `AuditedImplementation` | -                           | code hash        |

use frame_support::{dispatch::DispatchResult, pallet_prelude::*, traits::UnixTime};
use frame_system::{ensure_signed, pallet_prelude::*};
use sp_runtime::traits::{IdentifyAccount, Verify};
use sp_std::prelude::*;

pub use pallet::*;

mod audit;
mod authorization;
mod ledger;
pub mod migrations;
mod roles;
pub mod weights;

pub use authorization::{
    AuthorizationNonce, MintAuthorization, TransferAuthorization, DOMAIN_VERSION,
};
pub use roles::{
    role_id, RoleId, AUDITOR_ROLE, BURNER_ROLE, DEFAULT_ADMIN_ROLE, FROZEN_ROLE,
    MINTER_ROLE, MINT_APPROVER_ROLE, NAMED_ROLES, PAUSER_ROLE, RISK_MANAGER_ROLE,
    UPGRADER_ROLE, VAULT_MINTER_ROLE,
};
pub use weights::WeightInfo;

#[cfg(test)]
mod mock;


#[cfg(feature = "runtime-benchmarks")]
pub mod benchmarking;

pub(crate) const LOG_TARGET: &str = "pallet-bullion-token";

/// The current storage version.
pub const STORAGE_VERSION: StorageVersion = StorageVersion::new(1);

#[frame_support::pallet]
pub mod pallet {
    use super::*;

    #[pallet::config]
    pub trait Config: frame_system::Config {
        type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;

        /// Signature scheme accepted on signed authorizations.
        type OffchainSignature: Verify<Signer = Self::OffchainPublic> + Parameter;

        /// Public key whose account form is compared with the claimed signer.
        type OffchainPublic: IdentifyAccount<AccountId = Self::AccountId>;

        /// Clock for authorization validity windows.
        type TimeProvider: UnixTime;

        type WeightInfo: WeightInfo;

        #[cfg(feature = "runtime-benchmarks")]
        type BenchmarkHelper: benchmarking::BenchmarkHelper<
            Self::OffchainPublic,
            Self::AccountId,
            Self::OffchainSignature,
        >;
    }

    #[pallet::pallet]
    #[pallet::storage_version(STORAGE_VERSION)]
    pub struct Pallet<T>(_);

    /// Token name (e.g., "Vaulted Gold")
    #[pallet::storage]
    #[pallet::getter(fn token_name)]
    pub type TokenName<T> = StorageValue<_, BoundedVec<u8, ConstU32<64>>, ValueQuery>;

    /// Token symbol (e.g., "VGLD")
    #[pallet::storage]
    #[pallet::getter(fn token_symbol)]
    pub type TokenSymbol<T> = StorageValue<_, BoundedVec<u8, ConstU32<16>>, ValueQuery>;

    /// Token decimals
    #[pallet::storage]
    #[pallet::getter(fn decimals)]
    pub type Decimals<T> = StorageValue<_, u8, ValueQuery>;

    /// Total token supply
    #[pallet::storage]
    #[pallet::getter(fn total_supply)]
    pub type TotalSupply<T> = StorageValue<_, u128, ValueQuery>;

    /// Account balances
    #[pallet::storage]
    #[pallet::getter(fn balance_of)]
    pub type Balances<T: Config> = StorageMap<_, Blake2_128Concat, T::AccountId, u128, ValueQuery>;

    /// Spending allowances, keyed by (owner, spender). `u128::MAX` never decreases.
    #[pallet::storage]
    #[pallet::getter(fn allowance)]
    pub type Allowances<T: Config> = StorageDoubleMap<
        _,
        Blake2_128Concat,
        T::AccountId,
        Blake2_128Concat,
        T::AccountId,
        u128,
        ValueQuery,
    >;

    /// Members of the reserved `FROZEN_ROLE`
    #[pallet::storage]
    #[pallet::getter(fn is_frozen)]
    pub type Frozen<T: Config> = StorageMap<_, Blake2_128Concat, T::AccountId, bool, ValueQuery>;

    /// Global pause switch
    #[pallet::storage]
    #[pallet::getter(fn paused)]
    pub type Paused<T> = StorageValue<_, bool, ValueQuery>;

    /// Role membership, keyed by (role, account). Never holds `FROZEN_ROLE`.
    #[pallet::storage]
    pub type RoleMembers<T: Config> = StorageDoubleMap<
        _,
        Blake2_128Concat,
        RoleId,
        Blake2_128Concat,
        T::AccountId,
        bool,
        ValueQuery,
    >;

    /// Administering role of each role; unset means `DEFAULT_ADMIN_ROLE`.
    #[pallet::storage]
    #[pallet::getter(fn role_admin)]
    pub type RoleAdmins<T> = StorageMap<_, Blake2_128Concat, RoleId, RoleId, ValueQuery>;

    /// Used authorizations, keyed by (signer, nonce). Entries are never removed.
    #[pallet::storage]
    #[pallet::storage_prefix = "AuthorizationStates"]
    #[pallet::getter(fn authorization_state)]
    pub type AuthorizationStates<T: Config> = StorageDoubleMap<
        _,
        Blake2_128Concat,
        T::AccountId,
        Blake2_128Concat,
        AuthorizationNonce,
        bool,
        ValueQuery,
    >;

    /// Code hash an upgrader is allowed to authorize.
    #[pallet::storage]
    #[pallet::storage_prefix = "AuditedImplementation"]
    #[pallet::getter(fn audited_impl)]
    pub type AuditedImplementation<T: Config> = StorageValue<_, T::Hash, OptionQuery>;

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        /// Tokens transferred from one account to another
        Transferred { from: T::AccountId, to: T::AccountId, amount: u128 },
        /// New tokens minted
        Minted { to: T::AccountId, amount: u128 },
        /// Tokens burned by their holder
        Burned { from: T::AccountId, amount: u128 },
        /// Spending allowance set
        Approval { owner: T::AccountId, spender: T::AccountId, amount: u128 },
        /// Account frozen
        Frozen { account: T::AccountId },
        /// Account unfrozen
        Unfrozen { account: T::AccountId },
        /// Entire balance of a frozen account seized and burned
        Wiped { account: T::AccountId, amount: u128 },
        Paused { account: T::AccountId },
        Unpaused { account: T::AccountId },
        RoleGranted { role: RoleId, account: T::AccountId, sender: T::AccountId },
        RoleRevoked { role: RoleId, account: T::AccountId, sender: T::AccountId },
        /// A signed authorization was consumed
        AuthorizationUsed { authorizer: T::AccountId, nonce: AuthorizationNonce },
        /// A signer burned one of its own nonces
        AuthorizationCanceled { authorizer: T::AccountId, nonce: AuthorizationNonce },
        /// Vault-backed mint with the reported metal weight
        VaultedMint {
            to: T::AccountId,
            amount: u128,
            vaulted_weight: u128,
            approver: T::AccountId,
        },
    }

    #[pallet::error]
    pub enum Error<T> {
        /// Caller lacks the role the operation requires.
        MissingRole,
        /// `renounce_role` named an account other than the caller.
        CanOnlyRenounceForSelf,
        /// Quarantine cannot be lifted by its holder.
        FrozenRoleRenounceAttempt,
        ContractPaused,
        AccountFrozen,
        AccountNotFrozen,
        InsufficientBalance,
        InsufficientAllowance,
        Overflow,
        /// Current time is outside the authorization's validity window.
        AuthorizationExpired,
        /// Signature does not verify for the required signer.
        InvalidSignature,
        /// The (signer, nonce) pair was already used or canceled.
        InvalidAuthorization,
        /// `receive_with_authorization` submitted by someone other than the payee.
        CallerIsNotRecipient,
        /// Proposed code hash is not the audited implementation.
        NotAudited,
        /// On-chain storage is not at the version this code expects.
        StorageVersionMismatch,
    }

    #[pallet::hooks]
    impl<T: Config> Hooks<BlockNumberFor<T>> for Pallet<T> {
        fn integrity_test() {
            for (i, role) in NAMED_ROLES.iter().enumerate() {
                assert!(*role != DEFAULT_ADMIN_ROLE, "named role collides with the root role");
                assert!(
                    !NAMED_ROLES[i + 1..].contains(role),
                    "duplicate role id {}",
                    roles::role_label(role)
                );
            }
        }

        #[cfg(feature = "try-runtime")]
        fn try_state(_n: BlockNumberFor<T>) -> Result<(), sp_runtime::TryRuntimeError> {
            Self::do_try_state()
        }
    }

    #[pallet::call]
    impl<T: Config> Pallet<T> {
        #[pallet::call_index(0)]
        #[pallet::weight(T::WeightInfo::mint())]
        pub fn mint(origin: OriginFor<T>, to: T::AccountId, amount: u128) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::ensure_live()?;
            Self::ensure_role(MINTER_ROLE, &who)?;
            Self::do_mint(&to, amount)
        }

        #[pallet::call_index(1)]
        #[pallet::weight(T::WeightInfo::transfer())]
        pub fn transfer(origin: OriginFor<T>, to: T::AccountId, amount: u128) -> DispatchResult {
            let sender = ensure_signed(origin)?;
            Self::ensure_live()?;
            Self::do_transfer(&sender, &to, amount)
        }

        /// Grant `FROZEN_ROLE`. Requires its admin role (the risk manager).
        #[pallet::call_index(2)]
        #[pallet::weight(T::WeightInfo::freeze())]
        pub fn freeze(origin: OriginFor<T>, account: T::AccountId) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::ensure_live()?;
            Self::ensure_role_admin(FROZEN_ROLE, &who)?;
            Self::do_grant_role(FROZEN_ROLE, account, who);
            Ok(())
        }

        #[pallet::call_index(3)]
        #[pallet::weight(T::WeightInfo::unfreeze())]
        pub fn unfreeze(origin: OriginFor<T>, account: T::AccountId) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::ensure_live()?;
            Self::ensure_role_admin(FROZEN_ROLE, &who)?;
            Self::do_revoke_role(FROZEN_ROLE, account, who);
            Ok(())
        }

        /// Burn from the caller's own balance.
        #[pallet::call_index(4)]
        #[pallet::weight(T::WeightInfo::burn())]
        pub fn burn(origin: OriginFor<T>, amount: u128) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::ensure_live()?;
            Self::ensure_role(BURNER_ROLE, &who)?;
            Self::do_burn(&who, amount)
        }

        #[pallet::call_index(5)]
        #[pallet::weight(T::WeightInfo::transfer_from())]
        pub fn transfer_from(
            origin: OriginFor<T>,
            from: T::AccountId,
            to: T::AccountId,
            amount: u128,
        ) -> DispatchResult {
            let spender = ensure_signed(origin)?;
            Self::ensure_live()?;
            Self::do_transfer_from(&spender, &from, &to, amount)
        }

        #[pallet::call_index(6)]
        #[pallet::weight(T::WeightInfo::approve())]
        pub fn approve(origin: OriginFor<T>, spender: T::AccountId, amount: u128) -> DispatchResult {
            let owner = ensure_signed(origin)?;
            Self::ensure_live()?;
            Self::do_approve(owner, spender, amount)
        }

        #[pallet::call_index(7)]
        #[pallet::weight(T::WeightInfo::grant_role())]
        pub fn grant_role(
            origin: OriginFor<T>,
            role: RoleId,
            account: T::AccountId,
        ) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::ensure_live()?;
            Self::ensure_role_admin(role, &who)?;
            Self::do_grant_role(role, account, who);
            Ok(())
        }

        #[pallet::call_index(8)]
        #[pallet::weight(T::WeightInfo::revoke_role())]
        pub fn revoke_role(
            origin: OriginFor<T>,
            role: RoleId,
            account: T::AccountId,
        ) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::ensure_live()?;
            Self::ensure_role_admin(role, &who)?;
            Self::do_revoke_role(role, account, who);
            Ok(())
        }

        /// `account` must be the caller. `FROZEN_ROLE` can never be renounced.
        #[pallet::call_index(9)]
        #[pallet::weight(T::WeightInfo::renounce_role())]
        pub fn renounce_role(
            origin: OriginFor<T>,
            role: RoleId,
            account: T::AccountId,
        ) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::ensure_live()?;
            Self::do_renounce_role(role, account, who)
        }

        #[pallet::call_index(10)]
        #[pallet::weight(T::WeightInfo::pause())]
        pub fn pause(origin: OriginFor<T>) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::ensure_live()?;
            Self::ensure_role(PAUSER_ROLE, &who)?;
            Paused::<T>::put(true);
            log::info!(target: LOG_TARGET, "paused by {:?}", who);
            Self::deposit_event(Event::Paused { account: who });
            Ok(())
        }

        #[pallet::call_index(11)]
        #[pallet::weight(T::WeightInfo::unpause())]
        pub fn unpause(origin: OriginFor<T>) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::ensure_live()?;
            Self::ensure_role(PAUSER_ROLE, &who)?;
            Paused::<T>::put(false);
            log::info!(target: LOG_TARGET, "unpaused by {:?}", who);
            Self::deposit_event(Event::Unpaused { account: who });
            Ok(())
        }

        /// Quarantine the caller. Only the risk manager can undo it.
        #[pallet::call_index(12)]
        #[pallet::weight(T::WeightInfo::self_freeze())]
        pub fn self_freeze(origin: OriginFor<T>) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::ensure_live()?;
            Self::do_grant_role(FROZEN_ROLE, who.clone(), who);
            Ok(())
        }

        /// Seize and burn the whole balance of a frozen account.
        ///
        /// Goes through the unmediated ledger update: the freeze that blocks the
        /// holder's own transfers does not block seizure.
        #[pallet::call_index(13)]
        #[pallet::weight(T::WeightInfo::wipe_frozen_account())]
        pub fn wipe_frozen_account(origin: OriginFor<T>, account: T::AccountId) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::ensure_live()?;
            Self::ensure_role(RISK_MANAGER_ROLE, &who)?;
            if !Frozen::<T>::get(&account) {
                log::debug!(target: LOG_TARGET, "wipe of {:?} refused: not frozen", account);
                return Err(Error::<T>::AccountNotFrozen.into());
            }
            let amount = Balances::<T>::get(&account);
            Self::update_unchecked(Some(&account), None, amount)?;
            log::info!(target: LOG_TARGET, "wiped {} from {:?} by {:?}", amount, account, who);
            Self::deposit_event(Event::Wiped { account, amount });
            Ok(())
        }

        /// Mint against a mint approver's signature. Caller must be a vault minter.
        #[pallet::call_index(14)]
        #[pallet::weight(T::WeightInfo::mint_with_authorization())]
        pub fn mint_with_authorization(
            origin: OriginFor<T>,
            authorization: MintAuthorization<T::AccountId>,
            approver: T::AccountId,
            vaulted_weight: u128,
            signature: T::OffchainSignature,
        ) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::ensure_live()?;
            Self::ensure_role(VAULT_MINTER_ROLE, &who)?;
            Self::do_mint_with_authorization(authorization, approver, vaulted_weight, &signature)
        }

        /// Move funds signed for by `authorization.from`; any account may submit.
        #[pallet::call_index(15)]
        #[pallet::weight(T::WeightInfo::transfer_with_authorization())]
        pub fn transfer_with_authorization(
            origin: OriginFor<T>,
            authorization: TransferAuthorization<T::AccountId>,
            signature: T::OffchainSignature,
        ) -> DispatchResult {
            ensure_signed(origin)?;
            Self::ensure_live()?;
            let digest = Self::transfer_authorization_digest(&authorization);
            Self::do_transfer_with_authorization(digest, authorization, &signature)
        }

        /// Like `transfer_with_authorization`, but only the payee may submit,
        /// so a front-runner cannot consume the authorization first.
        #[pallet::call_index(16)]
        #[pallet::weight(T::WeightInfo::receive_with_authorization())]
        pub fn receive_with_authorization(
            origin: OriginFor<T>,
            authorization: TransferAuthorization<T::AccountId>,
            signature: T::OffchainSignature,
        ) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::ensure_live()?;
            if who != authorization.to {
                log::debug!(
                    target: LOG_TARGET,
                    "receive by {:?} refused: payee is {:?}",
                    who,
                    authorization.to
                );
                return Err(Error::<T>::CallerIsNotRecipient.into());
            }
            let digest = Self::receive_authorization_digest(&authorization);
            Self::do_transfer_with_authorization(digest, authorization, &signature)
        }

        #[pallet::call_index(17)]
        #[pallet::weight(T::WeightInfo::cancel_authorization())]
        pub fn cancel_authorization(
            origin: OriginFor<T>,
            authorizer: T::AccountId,
            nonce: AuthorizationNonce,
            signature: T::OffchainSignature,
        ) -> DispatchResult {
            ensure_signed(origin)?;
            Self::ensure_live()?;
            Self::do_cancel_authorization(authorizer, nonce, &signature)
        }

        /// Record the code hash the next upgrade must match.
        #[pallet::call_index(18)]
        #[pallet::weight(T::WeightInfo::update_audited_impl())]
        pub fn update_audited_impl(origin: OriginFor<T>, code_hash: T::Hash) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::ensure_live()?;
            Self::ensure_role(AUDITOR_ROLE, &who)?;
            AuditedImplementation::<T>::put(code_hash);
            log::info!(target: LOG_TARGET, "{:?} audited implementation {:?}", who, code_hash);
            Ok(())
        }

        /// Authorize a runtime upgrade to the audited code hash. The code itself
        /// is then supplied through `frame_system::apply_authorized_upgrade`.
        #[pallet::call_index(19)]
        #[pallet::weight(T::WeightInfo::authorize_upgrade())]
        pub fn authorize_upgrade(origin: OriginFor<T>, code_hash: T::Hash) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::ensure_live()?;
            Self::do_authorize_upgrade(&who, code_hash)
        }
    }

    #[pallet::genesis_config]
    #[derive(frame_support::DefaultNoBound)]
    pub struct GenesisConfig<T: Config> {
        /// Holder of `DEFAULT_ADMIN_ROLE`
        pub admin: Option<T::AccountId>,
        /// Token name
        pub token_name: Vec<u8>,
        /// Token symbol
        pub token_symbol: Vec<u8>,
        /// Token decimals
        pub decimals: u8,
        /// Initial role assignments (role, account)
        pub roles: Vec<(RoleId, T::AccountId)>,
        /// Initial token mints (account, amount)
        pub initial_balances: Vec<(T::AccountId, u128)>,
    }

    #[pallet::genesis_build]
    impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
        fn build(&self) {
            let name: BoundedVec<u8, ConstU32<64>> =
                self.token_name.clone().try_into().expect("Token name too long (max 64 bytes)");
            TokenName::<T>::put(name);

            let symbol: BoundedVec<u8, ConstU32<16>> =
                self.token_symbol.clone().try_into().expect("Token symbol too long (max 16 bytes)");
            TokenSymbol::<T>::put(symbol);

            Decimals::<T>::put(self.decimals);

            // The risk manager, not the root admin, administers quarantine.
            RoleAdmins::<T>::insert(FROZEN_ROLE, RISK_MANAGER_ROLE);

            if let Some(ref admin) = self.admin {
                RoleMembers::<T>::insert(DEFAULT_ADMIN_ROLE, admin, true);
            }

            for (role, account) in &self.roles {
                if *role == FROZEN_ROLE {
                    Frozen::<T>::insert(account, true);
                } else {
                    RoleMembers::<T>::insert(role, account, true);
                }
            }

            let mut total: u128 = 0;
            for (account, amount) in &self.initial_balances {
                total = total.checked_add(*amount).expect("Initial balances overflow u128");
                Balances::<T>::mutate(account, |balance| *balance = balance.saturating_add(*amount));
            }
            TotalSupply::<T>::put(total);

            STORAGE_VERSION.put::<Pallet<T>>();
        }
    }
}

impl<T: Config> Pallet<T> {
    /// Mutations are only accepted while storage matches this code's schema.
    pub(crate) fn ensure_live() -> DispatchResult {
        let on_chain = Self::on_chain_storage_version();
        if on_chain != STORAGE_VERSION {
            log::warn!(
                target: LOG_TARGET,
                "rejected: on-chain storage {:?}, code expects {:?}",
                on_chain,
                STORAGE_VERSION
            );
            return Err(Error::<T>::StorageVersionMismatch.into());
        }
        Ok(())
    }
}

//! Benchmarking setup for pallet-bullion-token

use super::*;

#[allow(unused)]
use crate::Pallet as BullionToken;
use frame_benchmarking::v2::*;
use frame_system::RawOrigin;

/// Produces signed authorizations for benchmarks.
pub trait BenchmarkHelper<Public, AccountId, Signature> {
    /// A key pair known to the helper, with its account.
    fn signer() -> (Public, AccountId);
    fn sign(signer: &Public, message: &[u8]) -> Signature;
}

const SEED: u32 = 0;
const BALANCE: u128 = 10_000_000;

fn funded<T: Config>(name: &'static str) -> T::AccountId {
    let who: T::AccountId = account(name, 0, SEED);
    Balances::<T>::insert(&who, BALANCE);
    TotalSupply::<T>::mutate(|supply| *supply = supply.saturating_add(BALANCE));
    who
}

fn member<T: Config>(role: RoleId, who: &T::AccountId) {
    RoleMembers::<T>::insert(role, who, true);
}

#[benchmarks]
mod benchmarks {
    use super::*;

    #[benchmark]
    fn mint() {
        let caller: T::AccountId = whitelisted_caller();
        member::<T>(MINTER_ROLE, &caller);
        let recipient: T::AccountId = account("recipient", 0, SEED);

        #[extrinsic_call]
        _(RawOrigin::Signed(caller), recipient.clone(), BALANCE);

        assert_eq!(Balances::<T>::get(&recipient), BALANCE);
    }

    #[benchmark]
    fn transfer() {
        let caller: T::AccountId = whitelisted_caller();
        Balances::<T>::insert(&caller, BALANCE);
        TotalSupply::<T>::put(BALANCE);
        let recipient: T::AccountId = account("recipient", 0, SEED);

        #[extrinsic_call]
        _(RawOrigin::Signed(caller), recipient.clone(), 1_000);

        assert_eq!(Balances::<T>::get(&recipient), 1_000);
    }

    #[benchmark]
    fn freeze() {
        let caller: T::AccountId = whitelisted_caller();
        member::<T>(RISK_MANAGER_ROLE, &caller);
        let target: T::AccountId = account("target", 0, SEED);

        #[extrinsic_call]
        _(RawOrigin::Signed(caller), target.clone());

        assert!(Frozen::<T>::get(&target));
    }

    #[benchmark]
    fn unfreeze() {
        let caller: T::AccountId = whitelisted_caller();
        member::<T>(RISK_MANAGER_ROLE, &caller);
        let target: T::AccountId = account("target", 0, SEED);
        Frozen::<T>::insert(&target, true);

        #[extrinsic_call]
        _(RawOrigin::Signed(caller), target.clone());

        assert!(!Frozen::<T>::get(&target));
    }

    #[benchmark]
    fn burn() {
        let caller: T::AccountId = whitelisted_caller();
        member::<T>(BURNER_ROLE, &caller);
        Balances::<T>::insert(&caller, BALANCE);
        TotalSupply::<T>::put(BALANCE);

        #[extrinsic_call]
        _(RawOrigin::Signed(caller.clone()), BALANCE);

        assert_eq!(Balances::<T>::get(&caller), 0);
    }

    #[benchmark]
    fn transfer_from() {
        let caller: T::AccountId = whitelisted_caller();
        let owner = funded::<T>("owner");
        let recipient: T::AccountId = account("recipient", 0, SEED);
        // Finite allowance so the decrement is written
        Allowances::<T>::insert(&owner, &caller, BALANCE);

        #[extrinsic_call]
        _(RawOrigin::Signed(caller.clone()), owner.clone(), recipient.clone(), 1_000);

        assert_eq!(Allowances::<T>::get(&owner, &caller), BALANCE - 1_000);
    }

    #[benchmark]
    fn approve() {
        let caller: T::AccountId = whitelisted_caller();
        let spender: T::AccountId = account("spender", 0, SEED);

        #[extrinsic_call]
        _(RawOrigin::Signed(caller.clone()), spender.clone(), BALANCE);

        assert_eq!(Allowances::<T>::get(&caller, &spender), BALANCE);
    }

    #[benchmark]
    fn grant_role() {
        let caller: T::AccountId = whitelisted_caller();
        member::<T>(DEFAULT_ADMIN_ROLE, &caller);
        let target: T::AccountId = account("target", 0, SEED);

        #[extrinsic_call]
        _(RawOrigin::Signed(caller), MINTER_ROLE, target.clone());

        assert!(Pallet::<T>::has_role(MINTER_ROLE, &target));
    }

    #[benchmark]
    fn revoke_role() {
        let caller: T::AccountId = whitelisted_caller();
        member::<T>(DEFAULT_ADMIN_ROLE, &caller);
        let target: T::AccountId = account("target", 0, SEED);
        member::<T>(MINTER_ROLE, &target);

        #[extrinsic_call]
        _(RawOrigin::Signed(caller), MINTER_ROLE, target.clone());

        assert!(!Pallet::<T>::has_role(MINTER_ROLE, &target));
    }

    #[benchmark]
    fn renounce_role() {
        let caller: T::AccountId = whitelisted_caller();
        member::<T>(PAUSER_ROLE, &caller);

        #[extrinsic_call]
        _(RawOrigin::Signed(caller.clone()), PAUSER_ROLE, caller.clone());

        assert!(!Pallet::<T>::has_role(PAUSER_ROLE, &caller));
    }

    #[benchmark]
    fn pause() {
        let caller: T::AccountId = whitelisted_caller();
        member::<T>(PAUSER_ROLE, &caller);

        #[extrinsic_call]
        _(RawOrigin::Signed(caller));

        assert!(Paused::<T>::get());
    }

    #[benchmark]
    fn unpause() {
        let caller: T::AccountId = whitelisted_caller();
        member::<T>(PAUSER_ROLE, &caller);
        Paused::<T>::put(true);

        #[extrinsic_call]
        _(RawOrigin::Signed(caller));

        assert!(!Paused::<T>::get());
    }

    #[benchmark]
    fn self_freeze() {
        let caller: T::AccountId = whitelisted_caller();

        #[extrinsic_call]
        _(RawOrigin::Signed(caller.clone()));

        assert!(Frozen::<T>::get(&caller));
    }

    #[benchmark]
    fn wipe_frozen_account() {
        let caller: T::AccountId = whitelisted_caller();
        member::<T>(RISK_MANAGER_ROLE, &caller);
        let target = funded::<T>("target");
        Frozen::<T>::insert(&target, true);

        #[extrinsic_call]
        _(RawOrigin::Signed(caller), target.clone());

        assert_eq!(Balances::<T>::get(&target), 0);
    }

    #[benchmark]
    fn mint_with_authorization() {
        let caller: T::AccountId = whitelisted_caller();
        member::<T>(VAULT_MINTER_ROLE, &caller);
        let (public, approver) = T::BenchmarkHelper::signer();
        member::<T>(MINT_APPROVER_ROLE, &approver);
        let recipient: T::AccountId = account("recipient", 0, SEED);
        let authorization = MintAuthorization {
            to: recipient.clone(),
            amount: BALANCE,
            nonce: [1u8; 32],
            valid_after: 0,
            valid_before: u64::MAX,
        };
        let digest = Pallet::<T>::mint_authorization_digest(&authorization);
        let signature = T::BenchmarkHelper::sign(&public, &digest);

        #[extrinsic_call]
        _(RawOrigin::Signed(caller), authorization, approver.clone(), BALANCE, signature);

        assert_eq!(Balances::<T>::get(&recipient), BALANCE);
        assert!(AuthorizationStates::<T>::get(&approver, [1u8; 32]));
    }

    #[benchmark]
    fn transfer_with_authorization() {
        let caller: T::AccountId = whitelisted_caller();
        let (public, from) = T::BenchmarkHelper::signer();
        Balances::<T>::insert(&from, BALANCE);
        TotalSupply::<T>::put(BALANCE);
        let recipient: T::AccountId = account("recipient", 0, SEED);
        let authorization = TransferAuthorization {
            from: from.clone(),
            to: recipient.clone(),
            value: 1_000,
            valid_after: 0,
            valid_before: u64::MAX,
            nonce: [2u8; 32],
        };
        let digest = Pallet::<T>::transfer_authorization_digest(&authorization);
        let signature = T::BenchmarkHelper::sign(&public, &digest);

        #[extrinsic_call]
        _(RawOrigin::Signed(caller), authorization, signature);

        assert_eq!(Balances::<T>::get(&recipient), 1_000);
        assert!(AuthorizationStates::<T>::get(&from, [2u8; 32]));
    }

    #[benchmark]
    fn receive_with_authorization() {
        let (public, from) = T::BenchmarkHelper::signer();
        Balances::<T>::insert(&from, BALANCE);
        TotalSupply::<T>::put(BALANCE);
        let recipient: T::AccountId = whitelisted_caller();
        let authorization = TransferAuthorization {
            from: from.clone(),
            to: recipient.clone(),
            value: 1_000,
            valid_after: 0,
            valid_before: u64::MAX,
            nonce: [3u8; 32],
        };
        let digest = Pallet::<T>::receive_authorization_digest(&authorization);
        let signature = T::BenchmarkHelper::sign(&public, &digest);

        #[extrinsic_call]
        _(RawOrigin::Signed(recipient.clone()), authorization, signature);

        assert_eq!(Balances::<T>::get(&recipient), 1_000);
    }

    #[benchmark]
    fn cancel_authorization() {
        let caller: T::AccountId = whitelisted_caller();
        let (public, authorizer) = T::BenchmarkHelper::signer();
        let nonce = [4u8; 32];
        let digest = Pallet::<T>::cancel_authorization_digest(&authorizer, &nonce);
        let signature = T::BenchmarkHelper::sign(&public, &digest);

        #[extrinsic_call]
        _(RawOrigin::Signed(caller), authorizer.clone(), nonce, signature);

        assert!(AuthorizationStates::<T>::get(&authorizer, nonce));
    }

    #[benchmark]
    fn update_audited_impl() {
        let caller: T::AccountId = whitelisted_caller();
        member::<T>(AUDITOR_ROLE, &caller);
        let code_hash = T::Hash::default();

        #[extrinsic_call]
        _(RawOrigin::Signed(caller), code_hash);

        assert_eq!(AuditedImplementation::<T>::get(), Some(code_hash));
    }

    #[benchmark]
    fn authorize_upgrade() {
        let caller: T::AccountId = whitelisted_caller();
        member::<T>(UPGRADER_ROLE, &caller);
        let code_hash = T::Hash::default();
        AuditedImplementation::<T>::put(code_hash);

        #[extrinsic_call]
        _(RawOrigin::Signed(caller), code_hash);

        frame_system::Pallet::<T>::assert_last_event(
            frame_system::Event::UpgradeAuthorized { code_hash, check_version: true }.into(),
        );
    }

    impl_benchmark_test_suite!(BullionToken, crate::mock::new_test_ext(), crate::mock::Test);
}

//! Signed authorizations (meta-transactions).
//!
//! A signer authorizes one operation off-chain; anyone may submit it. What is
//! signed is a typed digest:
//!
//! ```text
//! digest        = blake2_256(0x19 0x01 ++ domain_separator ++ struct_hash)
//! struct_hash   = blake2_256(blake2_256(TYPE) ++ SCALE(payload))
//! domain        = struct_hash(DOMAIN_TYPE, (name, DOMAIN_VERSION, genesis hash, pallet index, pallet name))
//! ```
//!
//! The domain binds every signature to this token on this chain at this pallet
//! index. The per-flow `TYPE` strings keep a signature for one flow from being
//! accepted by another.
//!
//! Each `(signer, nonce)` pair is single-use. Nonces are picked by the signer
//! and need not be sequential; once marked used they stay used.

use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use frame_support::{dispatch::DispatchResult, traits::{PalletInfoAccess, UnixTime}};
use frame_system::pallet_prelude::BlockNumberFor;
use scale_info::TypeInfo;
use sp_io::hashing::blake2_256;
use sp_runtime::{
    traits::{Verify, Zero},
    RuntimeDebug,
};
use sp_std::prelude::*;

use crate::{
    AuthorizationStates, Config, Error, Event, Pallet, TokenName, LOG_TARGET, MINT_APPROVER_ROLE,
};

/// Caller-chosen one-time token.
pub type AuthorizationNonce = [u8; 32];

/// Version string bound into the domain separator.
pub const DOMAIN_VERSION: &[u8] = b"1";

const DIGEST_PREFIX: [u8; 2] = [0x19, 0x01];

const DOMAIN_TYPE: &[u8] =
    b"TokenDomain(bytes name,bytes version,hash genesis,u32 palletIndex,bytes palletName)";
const CANCEL_AUTHORIZATION_TYPE: &[u8] = b"CancelAuthorization(account authorizer,bytes32 nonce)";
const MINT_WITH_AUTHORIZATION_TYPE: &[u8] =
    b"MintWithAuthorization(account to,u128 amount,bytes32 nonce,u64 validAfter,u64 validBefore)";
const TRANSFER_WITH_AUTHORIZATION_TYPE: &[u8] =
    b"TransferWithAuthorization(account from,account to,u128 value,u64 validAfter,u64 validBefore,bytes32 nonce)";
const RECEIVE_WITH_AUTHORIZATION_TYPE: &[u8] =
    b"ReceiveWithAuthorization(account from,account to,u128 value,u64 validAfter,u64 validBefore,bytes32 nonce)";

/// Payload signed by a mint approver. Field order is the signed encoding.
#[derive(
    Clone, Encode, Decode, DecodeWithMemTracking, Eq, PartialEq, RuntimeDebug, TypeInfo, MaxEncodedLen,
)]
pub struct MintAuthorization<AccountId> {
    pub to: AccountId,
    pub amount: u128,
    pub nonce: AuthorizationNonce,
    pub valid_after: u64,
    pub valid_before: u64,
}

/// Payload signed by `from` for both transfer and receive flows.
#[derive(
    Clone, Encode, Decode, DecodeWithMemTracking, Eq, PartialEq, RuntimeDebug, TypeInfo, MaxEncodedLen,
)]
pub struct TransferAuthorization<AccountId> {
    pub from: AccountId,
    pub to: AccountId,
    pub value: u128,
    pub valid_after: u64,
    pub valid_before: u64,
    pub nonce: AuthorizationNonce,
}

fn struct_hash(type_signature: &[u8], payload: &impl Encode) -> [u8; 32] {
    let mut preimage = blake2_256(type_signature).to_vec();
    payload.encode_to(&mut preimage);
    blake2_256(&preimage)
}

impl<T: Config> Pallet<T> {
    /// Current chain time in Unix seconds.
    pub fn now() -> u64 {
        T::TimeProvider::now().as_secs()
    }

    pub fn domain_separator() -> [u8; 32] {
        let genesis = frame_system::Pallet::<T>::block_hash(BlockNumberFor::<T>::zero());
        let index = <Self as PalletInfoAccess>::index() as u32;
        let pallet_name = <Self as PalletInfoAccess>::name().as_bytes();
        struct_hash(
            DOMAIN_TYPE,
            &(TokenName::<T>::get(), DOMAIN_VERSION, genesis, index, pallet_name),
        )
    }

    fn typed_digest(struct_hash: [u8; 32]) -> [u8; 32] {
        let mut preimage = Vec::with_capacity(66);
        preimage.extend_from_slice(&DIGEST_PREFIX);
        preimage.extend_from_slice(&Self::domain_separator());
        preimage.extend_from_slice(&struct_hash);
        blake2_256(&preimage)
    }

    pub fn cancel_authorization_digest(
        authorizer: &T::AccountId,
        nonce: &AuthorizationNonce,
    ) -> [u8; 32] {
        Self::typed_digest(struct_hash(CANCEL_AUTHORIZATION_TYPE, &(authorizer, nonce)))
    }

    pub fn mint_authorization_digest(authorization: &MintAuthorization<T::AccountId>) -> [u8; 32] {
        Self::typed_digest(struct_hash(MINT_WITH_AUTHORIZATION_TYPE, authorization))
    }

    pub fn transfer_authorization_digest(
        authorization: &TransferAuthorization<T::AccountId>,
    ) -> [u8; 32] {
        Self::typed_digest(struct_hash(TRANSFER_WITH_AUTHORIZATION_TYPE, authorization))
    }

    pub fn receive_authorization_digest(
        authorization: &TransferAuthorization<T::AccountId>,
    ) -> [u8; 32] {
        Self::typed_digest(struct_hash(RECEIVE_WITH_AUTHORIZATION_TYPE, authorization))
    }

    /// `valid_after <= now <= valid_before`.
    pub(crate) fn ensure_within_window(valid_after: u64, valid_before: u64) -> DispatchResult {
        let now = Self::now();
        if now < valid_after || now > valid_before {
            log::debug!(
                target: LOG_TARGET,
                "authorization outside window: valid_after={} valid_before={} now={}",
                valid_after,
                valid_before,
                now
            );
            return Err(Error::<T>::AuthorizationExpired.into());
        }
        Ok(())
    }

    pub(crate) fn ensure_signed_by(
        digest: &[u8; 32],
        signature: &T::OffchainSignature,
        signer: &T::AccountId,
    ) -> DispatchResult {
        if signature.verify(&digest[..], signer) {
            return Ok(());
        }
        log::debug!(target: LOG_TARGET, "signature does not match signer {:?}", signer);
        Err(Error::<T>::InvalidSignature.into())
    }

    pub(crate) fn ensure_unused_authorization(
        signer: &T::AccountId,
        nonce: &AuthorizationNonce,
    ) -> DispatchResult {
        if AuthorizationStates::<T>::get(signer, nonce) {
            log::debug!(
                target: LOG_TARGET,
                "authorization already used: signer={:?} nonce={:?}",
                signer,
                nonce
            );
            return Err(Error::<T>::InvalidAuthorization.into());
        }
        Ok(())
    }

    /// Write-once; there is no path that clears an entry.
    pub(crate) fn consume_authorization(authorizer: T::AccountId, nonce: AuthorizationNonce) {
        AuthorizationStates::<T>::insert(&authorizer, nonce, true);
        Self::deposit_event(Event::AuthorizationUsed { authorizer, nonce });
    }

    /// Shared body of the transfer and receive flows; `digest` selects which.
    pub(crate) fn do_transfer_with_authorization(
        digest: [u8; 32],
        authorization: TransferAuthorization<T::AccountId>,
        signature: &T::OffchainSignature,
    ) -> DispatchResult {
        let TransferAuthorization { from, to, value, valid_after, valid_before, nonce } =
            authorization;
        Self::ensure_not_paused()?;
        Self::ensure_within_window(valid_after, valid_before)?;
        Self::ensure_signed_by(&digest, signature, &from)?;
        Self::ensure_unused_authorization(&from, &nonce)?;

        Self::do_transfer(&from, &to, value)?;
        Self::consume_authorization(from, nonce);
        Ok(())
    }

    pub(crate) fn do_mint_with_authorization(
        authorization: MintAuthorization<T::AccountId>,
        approver: T::AccountId,
        vaulted_weight: u128,
        signature: &T::OffchainSignature,
    ) -> DispatchResult {
        Self::ensure_not_paused()?;
        let digest = Self::mint_authorization_digest(&authorization);
        let MintAuthorization { to, amount, nonce, valid_after, valid_before } = authorization;
        Self::ensure_within_window(valid_after, valid_before)?;
        Self::ensure_signed_by(&digest, signature, &approver)?;
        if !Self::has_role(MINT_APPROVER_ROLE, &approver) {
            log::debug!(target: LOG_TARGET, "mint signer {:?} is not a mint approver", approver);
            return Err(Error::<T>::InvalidSignature.into());
        }
        Self::ensure_unused_authorization(&approver, &nonce)?;

        Self::do_mint(&to, amount)?;
        Self::deposit_event(Event::VaultedMint {
            to,
            amount,
            vaulted_weight,
            approver: approver.clone(),
        });
        Self::consume_authorization(approver, nonce);
        Ok(())
    }

    pub(crate) fn do_cancel_authorization(
        authorizer: T::AccountId,
        nonce: AuthorizationNonce,
        signature: &T::OffchainSignature,
    ) -> DispatchResult {
        Self::ensure_not_paused()?;
        let digest = Self::cancel_authorization_digest(&authorizer, &nonce);
        Self::ensure_signed_by(&digest, signature, &authorizer)?;
        Self::ensure_unused_authorization(&authorizer, &nonce)?;

        Self::consume_authorization(authorizer.clone(), nonce);
        Self::deposit_event(Event::AuthorizationCanceled { authorizer, nonce });
        Ok(())
    }
}

use crate as pallet_bullion_token;
use crate::{
    AuthorizationNonce, MintAuthorization, RoleId, TransferAuthorization, AUDITOR_ROLE,
    BURNER_ROLE, MINTER_ROLE, MINT_APPROVER_ROLE, PAUSER_ROLE, RISK_MANAGER_ROLE,
    UPGRADER_ROLE, VAULT_MINTER_ROLE,
};
use core::{cell::RefCell, time::Duration};
use frame_support::{
    derive_impl,
    traits::{ConstU32, ConstU64, UnixTime},
};
use sp_core::H256;
use sp_runtime::{
    testing::{TestSignature, UintAuthorityId},
    traits::{BlakeTwo256, IdentityLookup},
    BuildStorage,
};

type Block = frame_system::mocking::MockBlock<Test>;

// Configure a mock runtime to test the pallet.
frame_support::construct_runtime!(
    pub enum Test {
        System: frame_system,
        BullionToken: pallet_bullion_token,
    }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
    type BaseCallFilter = frame_support::traits::Everything;
    type BlockWeights = ();
    type BlockLength = ();
    type DbWeight = ();
    type RuntimeOrigin = RuntimeOrigin;
    type RuntimeCall = RuntimeCall;
    type Nonce = u64;
    type Hash = H256;
    type Hashing = BlakeTwo256;
    type AccountId = u64;
    type Lookup = IdentityLookup<Self::AccountId>;
    type Block = Block;
    type RuntimeEvent = RuntimeEvent;
    type BlockHashCount = ConstU64<250>;
    type Version = ();
    type PalletInfo = PalletInfo;
    type AccountData = ();
    type OnNewAccount = ();
    type OnKilledAccount = ();
    type SystemWeightInfo = ();
    type SS58Prefix = ();
    type OnSetCode = ();
    type MaxConsumers = ConstU32<16>;
}

pub const ADMIN: u64 = 1;
pub const ALICE: u64 = 2;
pub const BOB: u64 = 3;
pub const PAUSER: u64 = 4;
pub const MINTER: u64 = 5;
pub const RISK_MANAGER: u64 = 6;
pub const MINT_APPROVER: u64 = 7;
pub const VAULT_MINTER: u64 = 8;
pub const AUDITOR: u64 = 9;
pub const UPGRADER: u64 = 10;
pub const BURNER: u64 = 11;
/// Relayer with no roles and no balance.
pub const RELAYER: u64 = 20;

pub const ALICE_BALANCE: u128 = 1_000_000;
pub const BOB_BALANCE: u128 = 500_000;
pub const BURNER_BALANCE: u128 = 100_000;
pub const INITIAL_SUPPLY: u128 = ALICE_BALANCE + BOB_BALANCE + BURNER_BALANCE;

/// Wall-clock reading at the start of every test, in seconds.
pub const GENESIS_TIME: u64 = 1_700_000_000;

thread_local! {
    static NOW: RefCell<u64> = const { RefCell::new(GENESIS_TIME) };
}

/// Settable clock for authorization windows.
pub struct MockTime;

impl MockTime {
    pub fn set(secs: u64) {
        NOW.with(|now| *now.borrow_mut() = secs);
    }
}

impl UnixTime for MockTime {
    fn now() -> Duration {
        Duration::from_secs(NOW.with(|now| *now.borrow()))
    }
}

#[cfg(feature = "runtime-benchmarks")]
pub struct TestBenchmarkHelper;

#[cfg(feature = "runtime-benchmarks")]
impl crate::benchmarking::BenchmarkHelper<UintAuthorityId, u64, TestSignature>
    for TestBenchmarkHelper
{
    fn signer() -> (UintAuthorityId, u64) {
        (UintAuthorityId(42), 42)
    }

    fn sign(signer: &UintAuthorityId, message: &[u8]) -> TestSignature {
        TestSignature(signer.0, message.to_vec())
    }
}

impl pallet_bullion_token::Config for Test {
    type RuntimeEvent = RuntimeEvent;
    type OffchainSignature = TestSignature;
    type OffchainPublic = UintAuthorityId;
    type TimeProvider = MockTime;
    type WeightInfo = ();
    #[cfg(feature = "runtime-benchmarks")]
    type BenchmarkHelper = TestBenchmarkHelper;
}

fn genesis_roles() -> Vec<(RoleId, u64)> {
    vec![
        (PAUSER_ROLE, PAUSER),
        (MINTER_ROLE, MINTER),
        (BURNER_ROLE, BURNER),
        (RISK_MANAGER_ROLE, RISK_MANAGER),
        (MINT_APPROVER_ROLE, MINT_APPROVER),
        (VAULT_MINTER_ROLE, VAULT_MINTER),
        (AUDITOR_ROLE, AUDITOR),
        (UPGRADER_ROLE, UPGRADER),
    ]
}

// Build genesis storage according to the mock runtime.
pub fn new_test_ext() -> sp_io::TestExternalities {
    let mut t = frame_system::GenesisConfig::<Test>::default().build_storage().unwrap();

    pallet_bullion_token::GenesisConfig::<Test> {
        admin: Some(ADMIN),
        token_name: b"Vaulted Gold".to_vec(),
        token_symbol: b"VGLD".to_vec(),
        decimals: 6,
        roles: genesis_roles(),
        initial_balances: vec![
            (ALICE, ALICE_BALANCE),
            (BOB, BOB_BALANCE),
            (BURNER, BURNER_BALANCE),
        ],
    }
    .assimilate_storage(&mut t)
    .unwrap();

    let mut ext = sp_io::TestExternalities::new(t);
    ext.execute_with(|| {
        System::set_block_number(1);
        MockTime::set(GENESIS_TIME);
    });
    ext
}

/// Nonce whose bytes are all `byte`.
pub fn nonce(byte: u8) -> AuthorizationNonce {
    [byte; 32]
}

/// Signature by `signer` over `digest`.
pub fn sign(signer: u64, digest: [u8; 32]) -> TestSignature {
    TestSignature(signer, digest.to_vec())
}

/// Authorization valid from genesis time with no expiry.
pub fn transfer_auth(from: u64, to: u64, value: u128, n: u8) -> TransferAuthorization<u64> {
    TransferAuthorization {
        from,
        to,
        value,
        valid_after: 0,
        valid_before: u64::MAX,
        nonce: nonce(n),
    }
}

pub fn mint_auth(to: u64, amount: u128, n: u8) -> MintAuthorization<u64> {
    MintAuthorization { to, amount, nonce: nonce(n), valid_after: 0, valid_before: u64::MAX }
}

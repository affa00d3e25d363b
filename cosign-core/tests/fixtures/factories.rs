#![allow(dead_code)]

use crate::fixtures::TEST_LOCK_TIMEOUT_MS;
use cosign_core::application::CoordinatorContext;
use cosign_core::domain::resolver::{address_from_public_key, personal_message_hash};
use cosign_core::domain::{SignatureValue, Signer};
use cosign_core::foundation::SignerKey;
use cosign_core::infrastructure::ledger::DevnetLedger;
use cosign_core::infrastructure::storage::{RocksStorage, Storage};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Deterministic wallet: secret key `[seed; 32]` and its EVM address.
#[derive(Clone, Debug)]
pub struct TestSigner {
    pub secret: SecretKey,
    pub key: SignerKey,
    pub name: String,
}

impl TestSigner {
    pub fn from_seed(seed: u8) -> Self {
        let secret = SecretKey::from_slice(&[seed; 32]).expect("secret key");
        let public = PublicKey::from_secret_key(&Secp256k1::new(), &secret);
        Self { secret, key: address_from_public_key(&public), name: format!("signer-{}", seed) }
    }

    pub fn signer(&self) -> Signer {
        Signer::new(self.key.clone(), self.name.clone())
    }

    /// EIP-191 personal signature over `message`.
    pub fn sign(&self, message: &[u8]) -> SignatureValue {
        let secp = Secp256k1::new();
        let digest = Message::from_digest(personal_message_hash(message));
        let (recovery_id, compact) = secp.sign_ecdsa_recoverable(&digest, &self.secret).serialize_compact();
        SignatureValue::from_compact(&compact, recovery_id.to_i32() as u8)
    }
}

pub fn test_signers(count: u8) -> Vec<TestSigner> {
    (1..=count).map(TestSigner::from_seed).collect()
}

pub fn signer_list(signers: &[TestSigner]) -> Vec<Signer> {
    signers.iter().map(TestSigner::signer).collect()
}

/// Well-formed signature that does not recover to any test signer; enough for non-Register flows.
pub fn placeholder_signature(byte: u8) -> SignatureValue {
    SignatureValue { r: format!("0x{}", hex::encode([byte; 32])), s: format!("0x{}", hex::encode([byte.wrapping_add(1); 32])), v: 27 }
}

pub struct TestEnv {
    pub ctx: CoordinatorContext,
    pub ledger: Arc<DevnetLedger>,
    pub storage: Arc<RocksStorage>,
    pub _dir: TempDir,
}

/// RocksDB in a temp dir plus an in-process devnet ledger.
pub fn test_env() -> TestEnv {
    test_env_with_ledger(DevnetLedger::with_auto_fee())
}

pub fn test_env_with_ledger(ledger: DevnetLedger) -> TestEnv {
    let dir = TempDir::new().expect("temp dir");
    let storage = Arc::new(RocksStorage::open_in_dir(dir.path()).expect("open rocksdb"));
    let ledger = Arc::new(ledger);
    let storage_dyn: Arc<dyn Storage> = storage.clone();
    let ctx = CoordinatorContext::new(storage_dyn, ledger.clone(), Duration::from_millis(TEST_LOCK_TIMEOUT_MS));
    TestEnv { ctx, ledger, storage, _dir: dir }
}

/// Deterministic generator so randomized checks are reproducible without a property-testing crate.
pub struct Lcg(pub u64);

impl Lcg {
    pub fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 33
    }

    pub fn below(&mut self, bound: usize) -> usize {
        (self.next() % bound as u64) as usize
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.below(i + 1);
            items.swap(i, j);
        }
    }
}

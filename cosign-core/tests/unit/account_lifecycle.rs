use crate::fixtures::{placeholder_signature, signer_list, test_signers, TestSigner, TEST_ACCOUNT_NAME, TEST_CHAIN_RID, TEST_NETWORK};
use cosign_core::domain::account::lifecycle::{self, NewAccount, SignerUpdate, SignerUpdateOutcome};
use cosign_core::domain::{AccountStatus, AuthDescriptor, MultiSigAccount, PendingTransfer, Signer, TransactionKind, TransactionStatus};
use cosign_core::foundation::{ErrorKind, Network};
use cosign_core::CosignError;

const NOW: u64 = 1_000;

fn new_account(signers: &[TestSigner], threshold: u16) -> NewAccount {
    NewAccount {
        name: TEST_ACCOUNT_NAME.to_string(),
        signers: signer_list(signers),
        signatures_required: threshold,
        initiator: signers[0].key.clone(),
        network: TEST_NETWORK,
        chain_identity: TEST_CHAIN_RID.to_string(),
    }
}

fn fee() -> Vec<PendingTransfer> {
    vec![PendingTransfer {
        transfer_id: "fee-1".to_string(),
        asset_id: "fee".to_string(),
        asset_symbol: "FEE".to_string(),
        amount: "100".to_string(),
        sender: "faucet".to_string(),
    }]
}

fn created(signers: &[TestSigner], threshold: u16) -> MultiSigAccount {
    let mut account = lifecycle::create(new_account(signers, threshold), &[], NOW).expect("create");
    lifecycle::mark_fee_obligation_detected(&mut account, fee(), NOW + 1).expect("fee");
    lifecycle::begin_registration(&mut account, &signers[0].key, b"register".to_vec(), placeholder_signature(1), NOW + 2).expect("register");
    let descriptor = AuthDescriptor {
        id: account.account_id.to_string(),
        signers: signers.iter().map(|s| s.key.clone()).collect(),
        signatures_required: threshold,
        rules: None,
    };
    lifecycle::confirm_registration(&mut account, descriptor, NOW + 3).expect("confirm");
    account
}

#[test]
fn test_create_when_valid_then_pending_with_derived_identity() {
    let signers = test_signers(3);
    let account = lifecycle::create(new_account(&signers, 2), &[], NOW).expect("create");
    assert_eq!(account.status, AccountStatus::Pending);
    assert!(account.main_descriptor.is_none());
    assert_eq!(account.created_by, signers[0].key);
    let keys: Vec<_> = signers.iter().map(|s| s.key.clone()).collect();
    assert_eq!(account.account_id, cosign_core::domain::resolver::derive_account_id(&keys, 2).expect("id").account_id);
}

#[test]
fn test_create_rejects_invalid_requests() {
    let signers = test_signers(3);

    let mut request = new_account(&signers, 2);
    request.name = "   ".to_string();
    assert_eq!(lifecycle::create(request, &[], NOW).expect_err("blank name").kind(), ErrorKind::Validation);

    let request = new_account(&signers[..1], 1);
    assert!(matches!(lifecycle::create(request, &[], NOW), Err(CosignError::InvalidSignerSet(_))));

    let request = new_account(&signers, 4);
    assert!(matches!(lifecycle::create(request, &[], NOW), Err(CosignError::InvalidSignerSet(_))));

    let mut request = new_account(&signers, 2);
    request.initiator = TestSigner::from_seed(77).key;
    assert!(matches!(lifecycle::create(request, &[], NOW), Err(CosignError::InitiatorNotASigner(_))));

    let mut request = new_account(&signers, 2);
    request.signers.push(signers[1].signer());
    assert!(matches!(lifecycle::create(request, &[], NOW), Err(CosignError::InvalidSignerSet(_))));

    let mut request = new_account(&signers, 2);
    request.signers[2] = Signer::new("not-an-address", "broken");
    assert_eq!(lifecycle::create(request, &[], NOW).expect_err("bad key").kind(), ErrorKind::Validation);
}

#[test]
fn test_create_when_same_key_set_on_same_chain_then_duplicate() {
    let signers = test_signers(3);
    let existing = lifecycle::create(new_account(&signers, 2), &[], NOW).expect("first");

    let mut reordered = new_account(&signers, 3);
    reordered.signers.reverse();
    let err = lifecycle::create(reordered, std::slice::from_ref(&existing), NOW).expect_err("duplicate");
    assert!(matches!(err, CosignError::DuplicateSignerSet { .. }));

    let mut other_network = new_account(&signers, 2);
    other_network.network = Network::Mainnet;
    assert!(lifecycle::create(other_network, std::slice::from_ref(&existing), NOW).is_ok());

    let mut other_chain = new_account(&signers, 2);
    other_chain.chain_identity = "another-chain".to_string();
    assert!(lifecycle::create(other_chain, std::slice::from_ref(&existing), NOW).is_ok());
}

#[test]
fn test_fee_detection_requires_a_pending_transfer() {
    let signers = test_signers(2);
    let mut account = lifecycle::create(new_account(&signers, 2), &[], NOW).expect("create");
    let err = lifecycle::mark_fee_obligation_detected(&mut account, Vec::new(), NOW).expect_err("no fee");
    assert!(matches!(err, CosignError::NoPendingTransfer { .. }));
    assert_eq!(account.status, AccountStatus::Pending);

    lifecycle::mark_fee_obligation_detected(&mut account, fee(), NOW).expect("fee");
    assert_eq!(account.status, AccountStatus::TransferFee);
    assert_eq!(account.pending_transfer.len(), 1);
}

#[test]
fn test_registration_requires_every_owner() {
    let signers = test_signers(3);
    let mut account = lifecycle::create(new_account(&signers, 2), &[], NOW).expect("create");
    let err = lifecycle::begin_registration(&mut account, &signers[0].key, b"r".to_vec(), placeholder_signature(1), NOW)
        .expect_err("pending account");
    assert!(matches!(err, CosignError::InvalidStateTransition { .. }));

    lifecycle::mark_fee_obligation_detected(&mut account, fee(), NOW).expect("fee");
    let tx = lifecycle::begin_registration(&mut account, &signers[1].key, b"r".to_vec(), placeholder_signature(1), NOW).expect("register");
    assert_eq!(account.status, AccountStatus::Registering);
    assert_eq!(tx.kind(), TransactionKind::Register);
    assert_eq!(tx.signatures_required, 3);
    assert_eq!(tx.status, TransactionStatus::Pending);
    assert_eq!(tx.initiator, signers[1].key);
}

#[test]
fn test_abandoned_registration_keeps_fee_transfer() {
    let signers = test_signers(2);
    let mut account = lifecycle::create(new_account(&signers, 2), &[], NOW).expect("create");
    let err = lifecycle::abandon_registration(&mut account, NOW).expect_err("pending account");
    assert!(matches!(err, CosignError::InvalidStateTransition { .. }));

    lifecycle::mark_fee_obligation_detected(&mut account, fee(), NOW).expect("fee");
    lifecycle::begin_registration(&mut account, &signers[0].key, b"r".to_vec(), placeholder_signature(1), NOW).expect("register");
    lifecycle::abandon_registration(&mut account, NOW + 1).expect("abandon");
    assert_eq!(account.status, AccountStatus::TransferFee);
    assert_eq!(account.pending_transfer, fee());

    lifecycle::begin_registration(&mut account, &signers[1].key, b"r".to_vec(), placeholder_signature(1), NOW + 2).expect("register again");
    assert_eq!(account.status, AccountStatus::Registering);
}

#[test]
fn test_confirm_registration_sets_descriptor_and_clears_fee() {
    let signers = test_signers(2);
    let account = created(&signers, 2);
    assert_eq!(account.status, AccountStatus::Created);
    assert!(account.pending_transfer.is_empty());
    assert_eq!(account.descriptor_id(), Some(account.account_id.to_string().as_str()));
}

#[test]
fn test_signer_update_when_same_key_set_then_metadata_only() {
    let signers = test_signers(3);
    let mut account = created(&signers, 2);
    let mut renamed = signer_list(&signers);
    renamed.reverse();
    renamed[0].name = "lead".to_string();
    let update = SignerUpdate { name: Some("ops vault".to_string()), signers: renamed, signatures_required: 2 };

    let outcome = lifecycle::request_signer_update(&mut account, update, &signers[1].key, None, NOW + 10).expect("update");
    assert!(matches!(outcome, SignerUpdateOutcome::MetadataUpdated));
    assert_eq!(account.name, "ops vault");
    assert_eq!(account.signers[0].name, "lead");
    assert_eq!(account.signatures_required, 2);
}

#[test]
fn test_signer_update_when_key_set_changes_then_union_transaction_needs_authorization() {
    let signers = test_signers(4);
    let mut account = created(&signers[..3], 2);
    let target = vec![signers[0].signer(), signers[3].signer()];

    let missing = SignerUpdate { name: None, signers: target.clone(), signatures_required: 2 };
    let err = lifecycle::request_signer_update(&mut account, missing, &signers[0].key, None, NOW).expect_err("no authorization");
    assert_eq!(err.kind(), ErrorKind::Validation);

    let update = SignerUpdate { name: None, signers: target, signatures_required: 2 };
    let outcome = lifecycle::request_signer_update(
        &mut account,
        update,
        &signers[0].key,
        Some((b"update".to_vec(), placeholder_signature(1))),
        NOW + 10,
    )
    .expect("update");
    let SignerUpdateOutcome::DescriptorChange(tx) = outcome else {
        panic!("expected descriptor change");
    };
    assert_eq!(tx.kind(), TransactionKind::UpdateDescriptor);
    assert_eq!(tx.signers.len(), 4);
    assert_eq!(tx.signatures_required, 4);
    assert_eq!(tx.signers_to_update().len(), 2);
    assert_eq!(account.signers.len(), 3, "account unchanged until the update is confirmed");
}

#[test]
fn test_signer_update_when_only_threshold_changes_then_descriptor_change() {
    let signers = test_signers(3);
    let account = created(&signers, 2);
    assert!(lifecycle::signer_set_changes(&account, &account.signers, 3));
    assert!(!lifecycle::signer_set_changes(&account, &account.signers, 2));
}

#[test]
fn test_signer_update_rejected_before_registration() {
    let signers = test_signers(2);
    let mut account = lifecycle::create(new_account(&signers, 2), &[], NOW).expect("create");
    let update = SignerUpdate { name: Some("x".to_string()), signers: signer_list(&signers), signatures_required: 2 };
    let err = lifecycle::request_signer_update(&mut account, update, &signers[0].key, None, NOW).expect_err("pending");
    assert!(matches!(err, CosignError::InvalidStateTransition { .. }));
}

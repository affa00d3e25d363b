use crate::fixtures::{placeholder_signature, signer_list, test_signers, TestSigner, TEST_CHAIN_RID, TEST_NETWORK};
use cosign_core::domain::account::lifecycle::{self, NewAccount};
use cosign_core::domain::transaction::aggregator::{self, OpenTransaction};
use cosign_core::domain::transaction::ordering::build_submission;
use cosign_core::domain::{AuthDescriptor, MultiSigAccount, Signer, Submission, Transaction, TransactionDetails};
use cosign_core::CosignError;

const NOW: u64 = 1_700_000_000_000_000_000;

fn account_for(signers: &[TestSigner], threshold: u16) -> MultiSigAccount {
    let mut account = lifecycle::create(
        NewAccount {
            name: "ops".to_string(),
            signers: signer_list(signers),
            signatures_required: threshold,
            initiator: signers[0].key.clone(),
            network: TEST_NETWORK,
            chain_identity: TEST_CHAIN_RID.to_string(),
        },
        &[],
        NOW,
    )
    .expect("create account");
    account.main_descriptor = Some(AuthDescriptor {
        id: "descriptor-1".to_string(),
        signers: signers.iter().map(|s| s.key.clone()).collect(),
        signatures_required: threshold,
        rules: None,
    });
    account
}

fn open(account: &MultiSigAccount, details: TransactionDetails, signers: Vec<Signer>, required: u16, payload: &[u8], initiator: &TestSigner) -> Transaction {
    aggregator::open(
        OpenTransaction {
            account: account.id.clone(),
            account_id: account.account_id,
            details,
            payload: payload.to_vec(),
            signers,
            signatures_required: required,
            initiator: initiator.key.clone(),
            initiator_signature: initiator.sign(payload),
        },
        NOW,
    )
    .expect("open transaction")
}

fn transfer_details() -> TransactionDetails {
    TransactionDetails::TransferFund {
        recipient: "recipient".to_string(),
        asset_id: "asset".to_string(),
        asset_symbol: "AST".to_string(),
        amount: "10".to_string(),
        note: None,
        auth_descriptor_id: "descriptor-1".to_string(),
    }
}

#[test]
fn test_transfer_submission_when_middle_signer_missing_then_keeps_positional_gap() {
    let signers = test_signers(3);
    let account = account_for(&signers, 2);
    let mut tx = open(&account, transfer_details(), account.signers.clone(), 2, b"transfer", &signers[0]);
    aggregator::add_signature(&mut tx, &signers[2].key, signers[2].sign(b"transfer"), NOW + 1).expect("sign");

    let Submission::TransferFund { auth_descriptor_id, signers: keys, signatures } = build_submission(&tx, &account, None).expect("build")
    else {
        panic!("expected transfer submission");
    };
    assert_eq!(auth_descriptor_id, "descriptor-1");
    assert_eq!(keys, signers.iter().map(|s| s.key.clone()).collect::<Vec<_>>());
    assert_eq!(signatures.len(), 3);
    assert!(signatures[0].is_some());
    assert!(signatures[1].is_none());
    assert!(signatures[2].is_some());
}

#[test]
fn test_update_submission_aligns_both_signature_vectors() {
    let signers = test_signers(4);
    let current = &signers[..3];
    let account = account_for(current, 2);
    let target: Vec<Signer> = vec![signers[1].signer(), signers[3].signer()];
    let union = cosign_core::domain::signer::union(&account.signers, &target);
    let details = TransactionDetails::UpdateDescriptor {
        signers_to_update: target.clone(),
        signatures_required_to_update: 2,
        auth_descriptor_id: "descriptor-1".to_string(),
    };
    let mut tx = open(&account, details, union, 4, b"update", &signers[0]);
    aggregator::add_signature(&mut tx, &signers[3].key, placeholder_signature(3), NOW + 1).expect("sign target");

    let Submission::UpdateDescriptor { new_signers, new_signatures_required, new_descriptor_signatures, authorizing_signatures, .. } =
        build_submission(&tx, &account, None).expect("build")
    else {
        panic!("expected update submission");
    };
    assert_eq!(new_signers, vec![signers[1].key.clone(), signers[3].key.clone()]);
    assert_eq!(new_signatures_required, 2);
    assert_eq!(new_descriptor_signatures, vec![None, Some(placeholder_signature(3))]);
    assert_eq!(authorizing_signatures.len(), 3);
    assert!(authorizing_signatures[0].is_some());
    assert!(authorizing_signatures[1].is_none() && authorizing_signatures[2].is_none());
}

#[test]
fn test_register_submission_sorts_owners_and_signatures_by_address() {
    let signers = test_signers(3);
    let account = account_for(&signers, 2);
    let payload = b"register payload";
    let mut tx = open(&account, TransactionDetails::Register, account.signers.clone(), 3, payload, &signers[2]);
    for signer in &signers[..2] {
        aggregator::add_signature(&mut tx, &signer.key, signer.sign(payload), NOW + 1).expect("sign");
    }

    let Submission::Register { owners, signatures_required, signatures } = build_submission(&tx, &account, Some(payload)).expect("build")
    else {
        panic!("expected register submission");
    };
    assert_eq!(signatures_required, 2);
    let owner_bytes: Vec<Vec<u8>> = owners.iter().map(|k| k.to_bytes().expect("bytes")).collect();
    let mut sorted = owner_bytes.clone();
    sorted.sort();
    assert_eq!(owner_bytes, sorted);
    let recovered: Vec<Vec<u8>> = signatures.iter().map(|r| r.address.to_bytes().expect("bytes")).collect();
    assert_eq!(recovered, sorted);
}

#[test]
fn test_register_submission_when_signature_filed_under_wrong_key_then_fails() {
    let signers = test_signers(2);
    let account = account_for(&signers, 2);
    let payload = b"register payload";
    let mut tx = open(&account, TransactionDetails::Register, account.signers.clone(), 2, payload, &signers[0]);
    // signer 0 signs on behalf of signer 1
    aggregator::add_signature(&mut tx, &signers[1].key, signers[0].sign(payload), NOW + 1).expect("format-valid signature");

    let err = build_submission(&tx, &account, Some(payload)).expect_err("mismatch must fail");
    assert!(matches!(err, CosignError::SignatureVerificationFailed { .. }));
}

#[test]
fn test_register_submission_without_message_fails() {
    let signers = test_signers(2);
    let account = account_for(&signers, 2);
    let tx = open(&account, TransactionDetails::Register, account.signers.clone(), 2, b"p", &signers[0]);
    assert!(matches!(build_submission(&tx, &account, None), Err(CosignError::SignatureVerificationFailed { .. })));
}

#[test]
fn test_transfer_against_replaced_descriptor_is_stale() {
    let signers = test_signers(3);
    let mut account = account_for(&signers, 2);
    let tx = open(&account, transfer_details(), account.signers.clone(), 2, b"transfer", &signers[0]);
    if let Some(descriptor) = account.main_descriptor.as_mut() {
        descriptor.id = "descriptor-2".to_string();
    }

    let err = build_submission(&tx, &account, None).expect_err("stale descriptor");
    assert!(matches!(err, CosignError::StaleDescriptor { ref expected, ref current } if expected == "descriptor-1" && current == "descriptor-2"));
}

use crate::fixtures::{created_account, placeholder_signature, signer_list, test_env, test_signers, transfer_params};
use cosign_core::application::{accounts, dispatcher, transactions, UpdateAccountParams};
use cosign_core::domain::{signer, Submission, TransactionKind, TransactionStatus};
use cosign_core::foundation::ErrorKind;
use cosign_core::CosignError;

#[tokio::test]
async fn test_descriptor_update_replaces_signers_after_unanimous_union_signs() {
    let env = test_env();
    let signers = test_signers(4);
    let account = created_account(&env, &signers[..3], 2).await;
    let old_descriptor = account.descriptor_id().expect("descriptor").to_string();
    let target = vec![signers[0].signer(), signers[3].signer()];

    let outcome = accounts::update_account(
        &env.ctx,
        &account.id,
        UpdateAccountParams {
            name: Some("rotated".to_string()),
            signers: target.clone(),
            signatures_required: 2,
            initiator: signers[0].key.clone(),
            payload: None,
            signature: Some(placeholder_signature(1)),
        },
    )
    .await
    .expect("update");
    let tx = outcome.transaction.expect("descriptor change spawns a transaction");
    assert_eq!(tx.kind(), TransactionKind::UpdateDescriptor);
    assert_eq!(tx.signers.len(), 4);
    assert_eq!(tx.signatures_required, 4);
    assert_eq!(outcome.account.signers.len(), 3, "signers unchanged until execution");

    for (idx, member) in signers.iter().enumerate().skip(1) {
        let signed = transactions::sign_transaction(&env.ctx, &tx.id, &member.key, placeholder_signature(idx as u8 + 1)).await.expect("sign");
        assert_eq!(signed.status == TransactionStatus::Ready, idx == 3);
    }

    // the incoming member may trigger execution
    let executed = dispatcher::execute(&env.ctx, &tx.id, &signers[3].key).await.expect("execute");
    assert_eq!(executed.status, TransactionStatus::Completed);

    let submissions = env.ledger.submissions();
    let Some(Submission::UpdateDescriptor { new_signers, authorizing_signatures, new_descriptor_signatures, .. }) =
        submissions.last().map(|s| &s.submission)
    else {
        panic!("expected update submission");
    };
    assert_eq!(new_signers, &vec![signers[0].key.clone(), signers[3].key.clone()]);
    assert_eq!(authorizing_signatures.iter().flatten().count(), 3);
    assert_eq!(new_descriptor_signatures.iter().flatten().count(), 2);

    let updated = accounts::get_account(&env.ctx, &account.id).await.expect("reload");
    assert!(signer::same_key_set(&updated.signers, &target));
    assert_eq!(updated.signatures_required, 2);
    let new_descriptor = updated.descriptor_id().expect("descriptor").to_string();
    assert_ne!(new_descriptor, old_descriptor);

    let transfer = transactions::create_transfer(&env.ctx, transfer_params(&updated, &signers[3])).await.expect("transfer");
    let removed = transactions::sign_transaction(&env.ctx, &transfer.id, &signers[1].key, placeholder_signature(9)).await;
    assert!(matches!(removed, Err(CosignError::NotASigner(_))));
    transactions::sign_transaction(&env.ctx, &transfer.id, &signers[0].key, placeholder_signature(8)).await.expect("sign");
    let done = dispatcher::execute(&env.ctx, &transfer.id, &signers[0].key).await.expect("execute transfer");
    assert_eq!(done.status, TransactionStatus::Completed, "transfer authorized by the new descriptor");
}

#[tokio::test]
async fn test_metadata_update_spawns_no_transaction() {
    let env = test_env();
    let signers = test_signers(3);
    let account = created_account(&env, &signers, 2).await;
    let mut renamed = signer_list(&signers);
    renamed[2].name = "backup".to_string();

    let outcome = accounts::update_account(
        &env.ctx,
        &account.id,
        UpdateAccountParams {
            name: Some("ops".to_string()),
            signers: renamed,
            signatures_required: 2,
            initiator: signers[1].key.clone(),
            payload: None,
            signature: None,
        },
    )
    .await
    .expect("update");
    assert!(outcome.transaction.is_none());
    let stored = accounts::get_account(&env.ctx, &account.id).await.expect("reload");
    assert_eq!(stored.name, "ops");
    assert_eq!(stored.signers[2].name, "backup");
    assert_eq!(env.ledger.submission_count(), 1, "only the registration was submitted");
}

#[tokio::test]
async fn test_descriptor_update_requires_initiator_signature() {
    let env = test_env();
    let signers = test_signers(3);
    let account = created_account(&env, &signers, 2).await;
    let err = accounts::update_account(
        &env.ctx,
        &account.id,
        UpdateAccountParams {
            name: None,
            signers: signer_list(&signers),
            signatures_required: 3,
            initiator: signers[0].key.clone(),
            payload: None,
            signature: None,
        },
    )
    .await
    .expect_err("threshold change without signature");
    assert_eq!(err.kind(), ErrorKind::Validation);
}

fn rotate_to(signers: Vec<cosign_core::domain::Signer>, initiator: &crate::fixtures::TestSigner, threshold: u16) -> UpdateAccountParams {
    UpdateAccountParams {
        name: None,
        signers,
        signatures_required: threshold,
        initiator: initiator.key.clone(),
        payload: None,
        signature: Some(placeholder_signature(1)),
    }
}

#[tokio::test]
async fn test_second_descriptor_update_refused_while_first_is_open() {
    let env = test_env();
    let signers = test_signers(4);
    let account = created_account(&env, &signers[..3], 2).await;

    let grow = accounts::update_account(&env.ctx, &account.id, rotate_to(signer_list(&signers), &signers[0], 2)).await.expect("grow");
    let first = grow.transaction.expect("update transaction");

    let shrink = vec![signers[0].signer(), signers[1].signer()];
    let err = accounts::update_account(&env.ctx, &account.id, rotate_to(shrink.clone(), &signers[1], 2)).await.expect_err("in progress");
    assert!(matches!(err, CosignError::DescriptorUpdateInProgress { ref tx_id } if tx_id == &first.id.to_string()));
    assert_eq!(err.kind(), ErrorKind::StateConflict);

    transactions::reject_transaction(&env.ctx, &first.id, &signers[2].key).await.expect("reject first");
    let second = accounts::update_account(&env.ctx, &account.id, rotate_to(shrink, &signers[1], 2)).await.expect("after reject");
    assert!(second.transaction.is_some());
}

#[tokio::test]
async fn test_transfer_opened_before_descriptor_change_is_closed_on_execute() {
    let env = test_env();
    let signers = test_signers(4);
    let account = created_account(&env, &signers[..3], 2).await;
    let transfer = transactions::create_transfer(&env.ctx, transfer_params(&account, &signers[0])).await.expect("transfer");
    transactions::sign_transaction(&env.ctx, &transfer.id, &signers[1].key, placeholder_signature(5)).await.expect("sign transfer");

    let update = accounts::update_account(&env.ctx, &account.id, rotate_to(signer_list(&signers), &signers[0], 3))
        .await
        .expect("update")
        .transaction
        .expect("update transaction");
    for (idx, member) in signers.iter().enumerate().skip(1) {
        transactions::sign_transaction(&env.ctx, &update.id, &member.key, placeholder_signature(idx as u8 + 1)).await.expect("sign update");
    }
    dispatcher::execute(&env.ctx, &update.id, &signers[0].key).await.expect("execute update");
    let submitted = env.ledger.submission_count();

    let err = dispatcher::execute(&env.ctx, &transfer.id, &signers[0].key).await.expect_err("stale");
    assert!(matches!(err, CosignError::StaleDescriptor { .. }));
    assert_eq!(err.kind(), ErrorKind::StateConflict);
    assert_eq!(env.ledger.submission_count(), submitted, "stale transfer never reaches the ledger");

    let closed = transactions::get_transaction(&env.ctx, &transfer.id).expect("reload");
    assert_eq!(closed.status, TransactionStatus::Rejected);
    assert!(closed.ledger_error.as_deref().is_some_and(|e| e.contains("descriptor")));
    let retry = dispatcher::execute(&env.ctx, &transfer.id, &signers[0].key).await.expect_err("closed");
    assert!(matches!(retry, CosignError::TransactionClosed { .. }));
}

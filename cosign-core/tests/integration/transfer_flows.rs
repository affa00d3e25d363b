use crate::fixtures::{created_account, placeholder_signature, test_env, test_signers, transfer_params, TestSigner};
use cosign_core::application::{dispatcher, transactions};
use cosign_core::domain::{ActivityAction, LedgerStatus, Submission, TransactionKind, TransactionStatus};
use cosign_core::foundation::ErrorKind;
use cosign_core::infrastructure::ledger::DevnetOutcome;
use cosign_core::infrastructure::storage::{ListQuery, TransactionFilter};
use cosign_core::CosignError;

#[tokio::test]
async fn test_transfer_when_threshold_reached_then_executes_once() {
    let env = test_env();
    let signers = test_signers(3);
    let (a, b, c) = (&signers[0], &signers[1], &signers[2]);
    let account = created_account(&env, &signers, 2).await;
    let submissions_before = env.ledger.submission_count();

    let tx = transactions::create_transfer(&env.ctx, transfer_params(&account, a)).await.expect("create transfer");
    assert_eq!(tx.kind(), TransactionKind::TransferFund);
    assert_eq!(tx.status, TransactionStatus::Pending, "1 of 2 signatures");

    let err = dispatcher::execute(&env.ctx, &tx.id, &a.key).await.expect_err("pending");
    assert!(matches!(err, CosignError::NotReady { .. }));

    let tx = transactions::sign_transaction(&env.ctx, &tx.id, &b.key, placeholder_signature(2)).await.expect("sign");
    assert_eq!(tx.status, TransactionStatus::Ready, "2 of 2 signatures");

    let outcome = dispatcher::execute(&env.ctx, &tx.id, &c.key).await.expect("execute");
    assert_eq!(outcome.status, TransactionStatus::Completed);
    assert_eq!(outcome.ledger_status, Some(LedgerStatus::Confirmed));
    let ledger_tx_id = outcome.ledger_tx_id.expect("ledger tx id");

    let submissions = env.ledger.submissions();
    assert_eq!(submissions.len(), submissions_before + 1);
    let Submission::TransferFund { signatures, auth_descriptor_id, .. } = &submissions[submissions_before].submission else {
        panic!("expected transfer submission");
    };
    assert_eq!(auth_descriptor_id, &account.account_id.to_string());
    assert_eq!(signatures.iter().flatten().count(), 2);
    assert!(signatures[2].is_none());

    let stored = transactions::get_transaction(&env.ctx, &tx.id).expect("reload");
    assert_eq!(stored.ledger_tx_id, Some(ledger_tx_id));
    assert_eq!(stored.submission_attempts, 1);
    assert_eq!(stored.activity_log.last().map(|e| (e.action, e.actor_public_key.clone())), Some((ActivityAction::Executed, c.key.clone())));

    let err = dispatcher::execute(&env.ctx, &tx.id, &a.key).await.expect_err("second execute");
    assert!(matches!(err, CosignError::AlreadyExecuted { .. }));
    assert_eq!(env.ledger.submission_count(), submissions_before + 1, "no second submission");
}

#[tokio::test]
async fn test_transfer_when_threshold_one_then_ready_at_creation() {
    let env = test_env();
    let signers = test_signers(2);
    let account = created_account(&env, &signers, 1).await;
    let tx = transactions::create_transfer(&env.ctx, transfer_params(&account, &signers[1])).await.expect("create");
    assert_eq!(tx.status, TransactionStatus::Ready);
}

#[tokio::test]
async fn test_transfer_rejects_invalid_requests() {
    let env = test_env();
    let signers = test_signers(2);
    let account = created_account(&env, &signers, 2).await;

    let mut params = transfer_params(&account, &signers[0]);
    params.amount = "0".to_string();
    assert_eq!(transactions::create_transfer(&env.ctx, params).await.expect_err("zero").kind(), ErrorKind::Validation);

    let mut params = transfer_params(&account, &signers[0]);
    params.amount = "12.5".to_string();
    assert_eq!(transactions::create_transfer(&env.ctx, params).await.expect_err("decimal").kind(), ErrorKind::Validation);

    let mut params = transfer_params(&account, &signers[0]);
    params.recipient = " ".to_string();
    assert_eq!(transactions::create_transfer(&env.ctx, params).await.expect_err("recipient").kind(), ErrorKind::Validation);

    let outsider = TestSigner::from_seed(88);
    let params = transfer_params(&account, &outsider);
    assert!(matches!(transactions::create_transfer(&env.ctx, params).await, Err(CosignError::InitiatorNotASigner(_))));
}

#[tokio::test]
async fn test_transfer_requires_registered_account() {
    let env = test_env();
    let signers = test_signers(2);
    let pending = cosign_core::application::accounts::create_account(&env.ctx, crate::fixtures::AccountBuilder::new(&signers, 2).build())
        .await
        .expect("create");
    let err = transactions::create_transfer(&env.ctx, transfer_params(&pending, &signers[0])).await.expect_err("pending account");
    assert_eq!(err.kind(), ErrorKind::StateConflict);
}

#[tokio::test]
async fn test_sign_when_not_a_signer_then_no_state_change() {
    let env = test_env();
    let signers = test_signers(3);
    let account = created_account(&env, &signers, 3).await;
    let tx = transactions::create_transfer(&env.ctx, transfer_params(&account, &signers[0])).await.expect("create");

    let outsider = TestSigner::from_seed(55);
    let err = transactions::sign_transaction(&env.ctx, &tx.id, &outsider.key, placeholder_signature(5)).await.expect_err("outsider");
    assert!(matches!(err, CosignError::NotASigner(_)));
    assert_eq!(transactions::get_transaction(&env.ctx, &tx.id).expect("reload"), tx);

    let err = transactions::sign_transaction(&env.ctx, &tx.id, &signers[1].key, cosign_core::domain::SignatureValue {
        r: "0x12".to_string(),
        s: "0x34".to_string(),
        v: 27,
    })
    .await
    .expect_err("malformed signature");
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_resign_replaces_without_counting_twice() {
    let env = test_env();
    let signers = test_signers(3);
    let account = created_account(&env, &signers, 3).await;
    let tx = transactions::create_transfer(&env.ctx, transfer_params(&account, &signers[0])).await.expect("create");

    transactions::sign_transaction(&env.ctx, &tx.id, &signers[1].key, placeholder_signature(1)).await.expect("sign");
    let resigned = transactions::sign_transaction(&env.ctx, &tx.id, &signers[1].key, placeholder_signature(7)).await.expect("re-sign");
    assert_eq!(resigned.signatures.len(), 2);
    assert_eq!(resigned.status, TransactionStatus::Pending);
    assert_eq!(resigned.signature_for(&signers[1].key), Some(&placeholder_signature(7)));
}

#[tokio::test]
async fn test_reject_closes_transaction() {
    let env = test_env();
    let signers = test_signers(2);
    let account = created_account(&env, &signers, 2).await;
    let tx = transactions::create_transfer(&env.ctx, transfer_params(&account, &signers[0])).await.expect("create");

    let rejected = transactions::reject_transaction(&env.ctx, &tx.id, &signers[1].key).await.expect("reject");
    assert_eq!(rejected.status, TransactionStatus::Rejected);
    let err = transactions::sign_transaction(&env.ctx, &tx.id, &signers[1].key, placeholder_signature(3)).await.expect_err("closed");
    assert!(matches!(err, CosignError::TransactionClosed { .. }));
    let err = dispatcher::execute(&env.ctx, &tx.id, &signers[0].key).await.expect_err("rejected");
    assert!(matches!(err, CosignError::TransactionClosed { .. }));
}

#[tokio::test]
async fn test_ledger_rejection_keeps_ready_and_records_status() {
    let env = test_env();
    let signers = test_signers(2);
    let account = created_account(&env, &signers, 1).await;
    let tx = transactions::create_transfer(&env.ctx, transfer_params(&account, &signers[0])).await.expect("create");

    env.ledger.push_outcome(DevnetOutcome::Reject("insufficient balance".to_string()));
    let outcome = dispatcher::execute(&env.ctx, &tx.id, &signers[0].key).await.expect("execute returns outcome");
    assert_eq!(outcome.status, TransactionStatus::Ready);
    assert_eq!(outcome.ledger_status, Some(LedgerStatus::Rejected));
    let stored = transactions::get_transaction(&env.ctx, &tx.id).expect("reload");
    assert_eq!(stored.ledger_error.as_deref(), Some("insufficient balance"));

    let retried = dispatcher::execute(&env.ctx, &tx.id, &signers[0].key).await.expect("retry");
    assert_eq!(retried.status, TransactionStatus::Completed);
    assert_eq!(transactions::get_transaction(&env.ctx, &tx.id).expect("reload").submission_attempts, 2);
}

#[tokio::test]
async fn test_list_transactions_by_signer_and_status() {
    let env = test_env();
    let signers = test_signers(3);
    let account = created_account(&env, &signers, 2).await;
    for _ in 0..3 {
        transactions::create_transfer(&env.ctx, transfer_params(&account, &signers[0])).await.expect("create");
    }

    let err = transactions::list_transactions(&env.ctx, &TransactionFilter::default(), &ListQuery::default()).expect_err("no signer");
    assert_eq!(err.kind(), ErrorKind::Validation);

    let filter = TransactionFilter {
        signer: Some(signers[2].key.clone()),
        kind: Some(TransactionKind::TransferFund),
        status: Some(TransactionStatus::Pending),
        ..TransactionFilter::default()
    };
    assert_eq!(transactions::count_transactions(&env.ctx, &filter).expect("count"), 3);
    let page = transactions::list_transactions(&env.ctx, &filter, &ListQuery::new(Some(2), Some(2)).expect("query")).expect("list");
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 1);
}

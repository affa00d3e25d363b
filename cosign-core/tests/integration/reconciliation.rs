use crate::fixtures::{begin_registration, created_account, test_env, test_signers, transfer_params, AccountBuilder};
use cosign_core::application::{accounts, dispatcher, reconcile_pending, transactions, ReconcileReport};
use cosign_core::domain::{AccountStatus, ActivityAction, LedgerStatus, TransactionStatus};
use cosign_core::infrastructure::ledger::DevnetOutcome;

#[tokio::test]
async fn test_reconcile_finalizes_waiting_transfer_after_confirmation() {
    let env = test_env();
    let signers = test_signers(2);
    let account = created_account(&env, &signers, 1).await;
    let tx = transactions::create_transfer(&env.ctx, transfer_params(&account, &signers[1])).await.expect("create");

    env.ledger.push_outcome(DevnetOutcome::Wait);
    let outcome = dispatcher::execute(&env.ctx, &tx.id, &signers[0].key).await.expect("execute");
    assert_eq!(outcome.status, TransactionStatus::Ready);
    assert_eq!(outcome.ledger_status, Some(LedgerStatus::Waiting));
    let ledger_tx_id = outcome.ledger_tx_id.expect("ledger tx id while waiting");

    let idle = reconcile_pending(&env.ctx).await.expect("reconcile");
    assert_eq!(idle, ReconcileReport { checked: 1, finalized: 0, failed: 0 });

    env.ledger.confirm(&ledger_tx_id).expect("confirm");
    let report = reconcile_pending(&env.ctx).await.expect("reconcile");
    assert_eq!(report.finalized, 1);

    let stored = transactions::get_transaction(&env.ctx, &tx.id).expect("reload");
    assert_eq!(stored.status, TransactionStatus::Completed);
    assert_eq!(stored.ledger_tx_id, Some(ledger_tx_id));
    let executed = stored.activity_log.iter().find(|e| e.action == ActivityAction::Executed).expect("executed entry");
    assert_eq!(executed.actor_public_key, signers[1].key, "attributed to the initiator");

    assert_eq!(reconcile_pending(&env.ctx).await.expect("reconcile"), ReconcileReport::default());
}

#[tokio::test]
async fn test_execute_on_waiting_transaction_polls_instead_of_resubmitting() {
    let env = test_env();
    let signers = test_signers(2);
    let account = created_account(&env, &signers, 1).await;
    let tx = transactions::create_transfer(&env.ctx, transfer_params(&account, &signers[0])).await.expect("create");

    env.ledger.push_outcome(DevnetOutcome::Wait);
    let waiting = dispatcher::execute(&env.ctx, &tx.id, &signers[0].key).await.expect("execute");
    let submitted = env.ledger.submission_count();

    let still_waiting = dispatcher::execute(&env.ctx, &tx.id, &signers[0].key).await.expect("poll");
    assert_eq!(still_waiting.ledger_status, Some(LedgerStatus::Waiting));

    env.ledger.confirm(&waiting.ledger_tx_id.expect("id")).expect("confirm");
    let done = dispatcher::execute(&env.ctx, &tx.id, &signers[0].key).await.expect("finalize");
    assert_eq!(done.status, TransactionStatus::Completed);
    assert_eq!(env.ledger.submission_count(), submitted, "polling never resubmits");
}

#[tokio::test]
async fn test_reconcile_completes_waiting_registration() {
    let env = test_env();
    let signers = test_signers(2);
    let account = accounts::create_account(&env.ctx, AccountBuilder::new(&signers, 2).build()).await.expect("create");
    let tx = begin_registration(&env, &account, &signers).await;
    transactions::sign_transaction(&env.ctx, &tx.id, &signers[1].key, signers[1].sign(&tx.payload)).await.expect("sign");

    env.ledger.push_outcome(DevnetOutcome::Wait);
    let outcome = dispatcher::execute(&env.ctx, &tx.id, &signers[0].key).await.expect("execute");
    assert_eq!(outcome.ledger_status, Some(LedgerStatus::Waiting));
    assert_eq!(accounts::get_account(&env.ctx, &account.id).await.expect("reload").status, AccountStatus::Registering);

    env.ledger.confirm(&outcome.ledger_tx_id.expect("id")).expect("confirm");
    assert_eq!(reconcile_pending(&env.ctx).await.expect("reconcile").finalized, 1);
    let created = accounts::get_account(&env.ctx, &account.id).await.expect("reload");
    assert_eq!(created.status, AccountStatus::Created);
    assert!(created.main_descriptor.is_some());
}

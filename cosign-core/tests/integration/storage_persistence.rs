use crate::fixtures::{test_signers, AccountBuilder, TEST_LOCK_TIMEOUT_MS};
use cosign_core::application::{accounts, dispatcher, transactions, CoordinatorContext, RegisterParams};
use cosign_core::domain::{AccountStatus, TransactionStatus};
use cosign_core::infrastructure::ledger::DevnetLedger;
use cosign_core::infrastructure::storage::{RocksStorage, Storage};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn context(dir: &TempDir, ledger: Arc<DevnetLedger>) -> CoordinatorContext {
    let storage: Arc<dyn Storage> = Arc::new(RocksStorage::open_in_dir(dir.path()).expect("open rocksdb"));
    CoordinatorContext::new(storage, ledger, Duration::from_millis(TEST_LOCK_TIMEOUT_MS))
}

#[tokio::test]
async fn test_records_survive_reopen() {
    let dir = TempDir::new().expect("temp dir");
    let ledger = Arc::new(DevnetLedger::with_auto_fee());
    let signers = test_signers(2);

    let (account_id, tx_id) = {
        let ctx = context(&dir, ledger.clone());
        let account = accounts::create_account(&ctx, AccountBuilder::new(&signers, 2).build()).await.expect("create");
        accounts::detect_transfer_fee(&ctx, &account.id).await.expect("fee");
        let payload = b"register-once".to_vec();
        let tx = accounts::register_account(
            &ctx,
            &account.id,
            RegisterParams { payload: Some(payload.clone()), signature: signers[0].sign(&payload), initiator: signers[0].key.clone() },
        )
        .await
        .expect("register");
        (account.id, tx.id)
    };

    let ctx = context(&dir, ledger.clone());
    let account = accounts::get_account(&ctx, &account_id).await.expect("account after reopen");
    assert_eq!(account.status, AccountStatus::Registering);
    assert_eq!(account.pending_transfer.len(), 1);

    let tx = transactions::get_transaction(&ctx, &tx_id).expect("transaction after reopen");
    assert_eq!(tx.status, TransactionStatus::Pending);
    assert_eq!(tx.signatures.len(), 1);

    transactions::sign_transaction(&ctx, &tx_id, &signers[1].key, signers[1].sign(&tx.payload)).await.expect("sign");
    let outcome = dispatcher::execute(&ctx, &tx_id, &signers[1].key).await.expect("execute");
    assert_eq!(outcome.status, TransactionStatus::Completed);
    ctx.storage.health_check().expect("healthy");
}

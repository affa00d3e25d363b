use crate::fixtures::{placeholder_signature, signer_list, test_signers, TestSigner, TEST_CHAIN_RID, TEST_NETWORK};
use cosign_core::domain::account::lifecycle::{self, NewAccount};
use cosign_core::domain::transaction::aggregator::{self, OpenTransaction};
use cosign_core::domain::{AccountStatus, LedgerStatus, MultiSigAccount, Transaction, TransactionDetails, TransactionKind, TransactionStatus};
use cosign_core::foundation::{LedgerTxId, Network, RecordId};
use cosign_core::infrastructure::storage::{paginate, AccountFilter, ListQuery, RocksStorage, SortDirection, SortField, Storage, TransactionFilter};
use cosign_core::CosignError;
use tempfile::TempDir;

fn open_storage() -> (RocksStorage, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let storage = RocksStorage::open_in_dir(dir.path()).expect("open");
    (storage, dir)
}

fn account(signers: &[TestSigner], network: Network, now: u64) -> MultiSigAccount {
    lifecycle::create(
        NewAccount {
            name: "vault".to_string(),
            signers: signer_list(signers),
            signatures_required: 2,
            initiator: signers[0].key.clone(),
            network,
            chain_identity: TEST_CHAIN_RID.to_string(),
        },
        &[],
        now,
    )
    .expect("account")
}

fn register_tx(account: &MultiSigAccount, now: u64) -> Transaction {
    aggregator::open(
        OpenTransaction {
            account: account.id.clone(),
            account_id: account.account_id,
            details: TransactionDetails::Register,
            payload: b"register".to_vec(),
            signers: account.signers.clone(),
            signatures_required: account.signers.len() as u16,
            initiator: account.created_by.clone(),
            initiator_signature: placeholder_signature(1),
        },
        now,
    )
    .expect("tx")
}

#[test]
fn test_account_crud_round_trip() {
    let (storage, _dir) = open_storage();
    let signers = test_signers(3);
    let mut acct = account(&signers, TEST_NETWORK, 10);

    storage.insert_account(&acct).expect("insert");
    assert!(matches!(storage.insert_account(&acct), Err(CosignError::StorageError { .. })));
    assert_eq!(storage.get_account(&acct.id).expect("get"), Some(acct.clone()));

    acct.name = "renamed".to_string();
    storage.update_account(&acct).expect("update");
    assert_eq!(storage.get_account(&acct.id).expect("get").map(|a| a.name), Some("renamed".to_string()));

    assert!(storage.delete_account(&acct.id).expect("delete"));
    assert!(!storage.delete_account(&acct.id).expect("second delete"));
    assert_eq!(storage.get_account(&acct.id).expect("get"), None);
    assert!(matches!(storage.update_account(&acct), Err(CosignError::AccountNotFound(_))));
}

#[test]
fn test_account_filters_match_signer_network_and_status() {
    let (storage, _dir) = open_storage();
    let signers = test_signers(4);
    let testnet = account(&signers[..2], Network::Testnet, 10);
    let mut mainnet = account(&signers[1..3], Network::Mainnet, 20);
    mainnet.status = AccountStatus::TransferFee;
    storage.insert_account(&testnet).expect("insert");
    storage.insert_account(&mainnet).expect("insert");

    let by_signer = |idx: usize| AccountFilter { signer: Some(signers[idx].key.clone()), ..AccountFilter::default() };
    assert_eq!(storage.count_accounts(&by_signer(0)).expect("count"), 1);
    assert_eq!(storage.count_accounts(&by_signer(1)).expect("count"), 2);
    assert_eq!(storage.count_accounts(&by_signer(3)).expect("count"), 0);

    let filter = AccountFilter { network: Some(Network::Mainnet), status: Some(AccountStatus::TransferFee), ..by_signer(1) };
    let found = storage.list_accounts(&filter).expect("list");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, mainnet.id);

    let other_chain = AccountFilter { chain_identity: Some("elsewhere".to_string()), ..by_signer(1) };
    assert!(storage.list_accounts(&other_chain).expect("list").is_empty());
}

#[test]
fn test_transaction_filters_and_pagination() {
    let (storage, _dir) = open_storage();
    let signers = test_signers(3);
    let acct = account(&signers, TEST_NETWORK, 10);
    storage.insert_account(&acct).expect("insert");

    let mut ids = Vec::new();
    for step in 0..5u64 {
        let mut tx = register_tx(&acct, 100 + step);
        if step % 2 == 0 {
            aggregator::record_ledger_outcome(&mut tx, LedgerStatus::Waiting, Some(LedgerTxId::from([step as u8; 32])), None, 100 + step);
        }
        storage.insert_transaction(&tx).expect("insert tx");
        ids.push(tx.id);
    }

    let signer_filter = TransactionFilter { signer: Some(signers[2].key.clone()), ..TransactionFilter::default() };
    assert_eq!(storage.count_transactions(&signer_filter).expect("count"), 5);
    let waiting = TransactionFilter { ledger_status_in: vec![LedgerStatus::Waiting], ..signer_filter.clone() };
    assert_eq!(storage.count_transactions(&waiting).expect("count"), 3);
    let transfers = TransactionFilter { kind: Some(TransactionKind::TransferFund), ..signer_filter.clone() };
    assert_eq!(storage.count_transactions(&transfers).expect("count"), 0);
    let other_account = TransactionFilter { account: Some(RecordId::from("missing")), ..signer_filter.clone() };
    assert_eq!(storage.count_transactions(&other_account).expect("count"), 0);

    let all = storage.list_transactions(&signer_filter).expect("list");
    let query = ListQuery::new(Some(1), Some(2)).expect("query").with_sort(SortField::CreatedAt, SortDirection::Asc);
    let page = paginate(all, &query);
    assert_eq!(page.total, 5);
    assert_eq!(page.items.iter().map(|tx| tx.id.clone()).collect::<Vec<_>>(), ids[..2].to_vec());
}

#[test]
fn test_write_transaction_with_account_is_atomic_on_missing_account() {
    let (storage, _dir) = open_storage();
    let signers = test_signers(2);
    let acct = account(&signers, TEST_NETWORK, 10);
    let tx = register_tx(&acct, 11);

    let err = storage.write_transaction_with_account(&tx, Some(&acct)).expect_err("account missing");
    assert!(matches!(err, CosignError::AccountNotFound(_)));
    assert_eq!(storage.get_transaction(&tx.id).expect("get"), None);

    storage.insert_account(&acct).expect("insert account");
    let mut registering = acct.clone();
    registering.status = AccountStatus::Registering;
    storage.write_transaction_with_account(&tx, Some(&registering)).expect("paired write");
    assert_eq!(storage.get_transaction(&tx.id).expect("get").map(|t| t.status), Some(TransactionStatus::Pending));
    assert_eq!(storage.get_account(&acct.id).expect("get").map(|a| a.status), Some(AccountStatus::Registering));
}

#[test]
fn test_update_transaction_requires_existing_record() {
    let (storage, _dir) = open_storage();
    let signers = test_signers(2);
    let tx = register_tx(&account(&signers, TEST_NETWORK, 10), 11);
    assert!(matches!(storage.update_transaction(&tx), Err(CosignError::TransactionNotFound(_))));
    storage.insert_transaction(&tx).expect("insert");
    assert!(matches!(storage.insert_transaction(&tx), Err(CosignError::StorageError { .. })));
    storage.update_transaction(&tx).expect("update");
    storage.health_check().expect("healthy");
}

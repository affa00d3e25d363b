use crate::domain::transaction::{Transaction, TransactionStatus};
use crate::domain::transition::{ensure_against, validate_against, StateTransitionResult};
use crate::foundation::CosignError;
use log::{info, warn};

const VALID_TRANSITIONS: &[(TransactionStatus, TransactionStatus)] = &[
    (TransactionStatus::Pending, TransactionStatus::Ready),
    (TransactionStatus::Pending, TransactionStatus::Rejected),
    (TransactionStatus::Ready, TransactionStatus::Completed),
    (TransactionStatus::Ready, TransactionStatus::Rejected),
];

pub fn validate_transition(from: TransactionStatus, to: TransactionStatus) -> StateTransitionResult {
    validate_against(VALID_TRANSITIONS, from, to)
}

pub fn ensure_valid_transition(from: TransactionStatus, to: TransactionStatus) -> Result<(), CosignError> {
    ensure_against("transaction", VALID_TRANSITIONS, from, to)
}

pub fn is_terminal(status: TransactionStatus) -> bool {
    matches!(status, TransactionStatus::Completed | TransactionStatus::Rejected)
}

pub(crate) fn transition(tx: &mut Transaction, next: TransactionStatus, now: u64) -> Result<(), CosignError> {
    let from = tx.status;
    if let Err(err) = ensure_valid_transition(from, next) {
        warn!(
            "invalid transaction state transition tx_id={} kind={} from_state={} to_state={} error={}",
            tx.id,
            tx.kind(),
            from,
            next,
            err
        );
        return Err(err);
    }
    if from == next {
        return Ok(());
    }
    tx.status = next;
    tx.updated_at_nanos = now;
    info!("transaction state transition tx_id={} kind={} from_state={} to_state={}", tx.id, tx.kind(), from, next);
    Ok(())
}

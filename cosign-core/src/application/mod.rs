//! Application layer: orchestration across domain logic and infrastructure I/O.

pub mod accounts;
pub mod context;
pub mod dispatcher;
pub mod lifecycle;
pub mod locks;
pub mod transactions;

pub use accounts::{CreateAccountParams, RegisterParams, UpdateAccountOutcome, UpdateAccountParams};
pub use context::CoordinatorContext;
pub use dispatcher::{execute, reconcile_pending, ExecutionOutcome, ReconcileReport};
pub use lifecycle::{CompositeObserver, LifecycleObserver, NoopObserver};
pub use locks::{EntityGuard, EntityLocks, CREATE_ACCOUNT_LOCK};
pub use transactions::CreateTransferParams;

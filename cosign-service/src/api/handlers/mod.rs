pub mod accounts;
pub mod blockchains;
pub mod health;
pub mod transactions;
pub mod types;

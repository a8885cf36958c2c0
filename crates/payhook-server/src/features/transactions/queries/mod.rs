//! Transaction queries

pub mod get_transaction;
pub mod list_transactions;

pub use get_transaction::{GetTransactionError, GetTransactionQuery};
pub use list_transactions::{ListTransactionsError, ListTransactionsQuery, ListTransactionsResponse};

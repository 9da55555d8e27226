pub mod in_memory;
pub mod postgres_transaction_repository;

pub use in_memory::InMemoryTransactionRepository;
pub use postgres_transaction_repository::PostgresTransactionRepository;

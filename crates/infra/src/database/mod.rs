//! SQLite persistence for the inventory cache

pub mod inventory_repository;
pub mod manager;

pub use inventory_repository::SqliteInventoryRepository;
pub use manager::DbManager;

//! Repository layer: one struct of static async query functions per table.

pub mod item_repo;

pub use item_repo::ItemRepo;

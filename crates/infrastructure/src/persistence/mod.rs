//! Persistence adapters

mod json_entry_store;

pub use json_entry_store::JsonEntryStore;

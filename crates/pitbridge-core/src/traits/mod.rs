mod raw_store;

pub use raw_store::IRawStore;

pub use licwatch_types::prelude::*;
pub use licwatch_types::store_adapter::StoreAdapter;

// vim: ts=4

pub use licwatch_types::prelude::*;

// vim: ts=4

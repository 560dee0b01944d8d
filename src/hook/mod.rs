//! The `use_store` entry point.
//!
//! Lets any number of independent call sites name the same piece of shared
//! state by pointer without knowing which of them runs first.

mod use_store;

pub use use_store::{use_store, use_store_with, ErrorHandling, UseStoreOptions};

//! # Islet
//!
//! Shared observable state for independently rendered UI islands.
//!
//! Islet provides two layers:
//!
//! ## Stores
//!
//! - `Store<T>` - A state container that hands out copies and notifies its
//!   observers synchronously, in attachment order, after every change
//! - `Observer<T>` - The callback interface stores notify
//!
//! ## Store stack
//!
//! - `StoreStack` - A registry of stores of any type, keyed by `Pointer`,
//!   with explicit policies for collisions, upserts and removal
//! - `use_store` / `use_store_with` - One call that creates or joins the
//!   store behind a pointer, safe to make from every island that needs it
//!
//! ```
//! use islet::{use_store_with, StoreStack, UseStoreOptions};
//!
//! StoreStack::scope(|| {
//!     // Two islands asking for the same cart.
//!     let header = use_store_with(Vec::<String>::new(), UseStoreOptions::new().pointer("cart"))?;
//!     let sidebar = use_store_with(Vec::<String>::new(), UseStoreOptions::new().pointer("cart"))?;
//!     assert_eq!(header, sidebar);
//!
//!     let cart = StoreStack::current().get::<Vec<String>>(&header).unwrap();
//!     cart.modify(|items| items.push("tea".to_string()))?;
//!     assert_eq!(cart.get(), vec!["tea"]);
//!     Ok::<_, islet::StoreError>(())
//! })
//! .unwrap();
//! ```

mod error;
mod lock;

pub mod hook;
pub mod stack;
pub mod store;

// Re-export main types for convenience
pub use error::{ErrorKind, ObserverError, Result, StoreError};
pub use hook::{use_store, use_store_with, ErrorHandling, UseStoreOptions};
pub use stack::{AllocOptions, Pointer, RemoveOptions, StoreStack};
pub use store::{observer_fn, Observer, ObserverRef, Store};

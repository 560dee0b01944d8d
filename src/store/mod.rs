//! Observable state containers.
//!
//! A [`Store`] holds one value and a list of [`Observer`]s. Reads hand out
//! copies, writes take ownership, and every write notifies the observers
//! synchronously, in attachment order.

mod observer;
mod store;

pub use observer::{observer_fn, Observer, ObserverRef};
pub use store::Store;

//! The pointer-keyed store registry.
//!
//! This module provides [`StoreStack`], the keys it hands out, and the
//! options that pick its collision and removal policies.

mod options;
mod pointer;
mod stack;

pub use options::{AllocOptions, RemoveOptions};
pub use pointer::Pointer;
pub use stack::StoreStack;

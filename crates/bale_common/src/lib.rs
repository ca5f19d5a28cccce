//! Shared foundational types used across the bale asset bundler.
//!
//! This crate provides content hashing, the path-addressed [`SourceFile`],
//! and the [`Dependency`] edge produced by import graph discovery.

#![warn(missing_docs)]

pub mod dependency;
pub mod file;
pub mod hash;

pub use dependency::Dependency;
pub use file::{is_absolute_path, join_path, SourceFile};
pub use hash::ContentHash;

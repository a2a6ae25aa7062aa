//! Merge two directory trees of static libraries and Mach-O binaries into a
//! single tree of universal binaries.
//!
//! The walk is driven by the primary tree: binary artifacts present in both
//! trees are combined with an external architecture-merge tool (`lipo` by
//! default), everything else is copied from the primary tree verbatim.

pub mod classify;
pub mod cli;
pub mod merge;
pub mod tool;

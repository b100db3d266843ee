//! Path algebra and tree-delta engine for a versioned-filesystem client.
//!
//! # Overview
//!
//! Two independent subsystems, sharing one design philosophy: canonical
//! form is an invariant, not a convenience.
//!
//! - [`path`]: canonicalization, composition, decomposition, and ancestor
//!   tests over three disjoint path flavors — [`path::relpath::Relpath`]
//!   (repository-relative, no root), [`path::dirent::Dirent`] (local
//!   filesystem, platform-aware), and [`path::uri::Uri`] (scheme-qualified,
//!   percent-encoded). Every operation is pure and reentrant; mixing
//!   flavors is a type error rather than a runtime assertion.
//! - [`delta`]: given two [`delta::snapshot::NodeSnapshot`] directory
//!   handles, drives a [`delta::editor::Editor`] sink through the minimal
//!   structural diff (add/delete/replace) that transforms one into the
//!   other.
//!
//! [`externals`] parses the `svn:externals` property format that sits on
//! top of both. [`error`] is the shared failure-kind enum. [`cancel`] is
//! the cooperative cancellation hook `delta::diff` polls.
//!
//! Paths are always zero or more `/`-separated components. Absoluteness,
//! drive letters, and UNC hosts are a [`path::dirent`] concept only —
//! [`path::relpath::Relpath`] and [`path::uri::Uri`] have no platform fork.

pub mod cancel;
pub mod delta;
pub mod error;
pub mod externals;
pub mod path;
mod util;

/// Validates a repository-relative path literal at compile time. See
/// [`path::relpath::RelpathBuf::from_str`] for the runtime equivalent.
///
/// ```rust
/// # use revtree_core::{path::relpath::Relpath, relpath};
/// const TRUNK: &Relpath = relpath!("trunk/src");
/// ```
pub use revtree_core_pathmacro::relpath;

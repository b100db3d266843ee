//! The `ErrorModel` (spec §7): structured failure kinds shared by the path
//! and delta subsystems. Both subsystems are mostly total/infallible (see
//! the module docs on `path` and `delta`); this enum covers the specific
//! operations the spec calls out as able to fail.
//!
//! Follows the teacher crate's hand-rolled `Display`/`Error` style
//! (`path::PathFromStrError`/`PathJoinError` in `psilo-vfs`) rather than
//! pulling in `thiserror`.
use std::{
    error::Error,
    fmt::{Display, Formatter},
};

#[derive(Debug, PartialEq, Eq)]
pub enum CoreError {
    /// A `svn:externals` line didn't match `TARGET_DIR URL`,
    /// `TARGET_DIR -rN URL`, or `TARGET_DIR -r N URL`.
    InvalidExternalsDescription {
        line: String,
        parent: String,
    },
    /// A `file://` conversion was given a URI it couldn't parse, or a host
    /// it doesn't know how to map to a dirent.
    IllegalUrl {
        input: String,
        reason: &'static str,
    },
    /// The platform rejected resolving a path to an absolute one.
    BadFilename {
        path: String,
        reason: &'static str,
    },
    /// `TreeDelta` was handed a snapshot with no base revision to diff
    /// against.
    NoSuchRevision,
    /// A text-delta or property stream was truncated before its declared
    /// end.
    Incomplete {
        context: &'static str,
    },
    /// The cancellation query fired.
    Cancelled,
    /// The working copy has local modifications; the externals driver
    /// tolerates (suppresses) this, everyone else re-raises it.
    WorkingCopyHasLocalModifications {
        path: String,
    },
}

impl Display for CoreError {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CoreError::InvalidExternalsDescription { line, parent } => write!(
                fmt,
                "invalid svn:externals line {:?} (property on {:?})",
                line, parent
            ),
            CoreError::IllegalUrl { input, reason } => {
                write!(fmt, "illegal URL {:?}: {}", input, reason)
            }
            CoreError::BadFilename { path, reason } => {
                write!(fmt, "bad filename {:?}: {}", path, reason)
            }
            CoreError::NoSuchRevision => write!(fmt, "no such revision"),
            CoreError::Incomplete { context } => write!(fmt, "incomplete: {}", context),
            CoreError::Cancelled => write!(fmt, "operation cancelled"),
            CoreError::WorkingCopyHasLocalModifications { path } => write!(
                fmt,
                "working copy has local modifications: {:?}",
                path
            ),
        }
    }
}

impl Error for CoreError {}

pub type CoreResult<T> = Result<T, CoreError>;

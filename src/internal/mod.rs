//! Internal implementation details.

pub(crate) mod path;
pub(crate) mod sync;

pub(crate) use path::ResolutionPath;

//! Domain logic - pure release rules independent of git and subprocesses

pub mod tag;
pub mod trigger;
pub mod version;

pub use tag::{latest_release_tag, TagPattern};
pub use trigger::{EventKind, Trigger};
pub use version::{Version, VersionBump};

pub mod artifacts;
pub mod boundary;
pub mod bump;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod github;
pub mod lint;
pub mod notes;
pub mod pipeline;
pub mod runner;
pub mod ui;

pub use error::{ReleaseError, Result};

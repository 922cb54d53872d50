//! User interface module.
//!
//! Releases run unattended in CI, so there are no prompts: this module only
//! reports progress. `formatter` holds the display functions.

pub mod formatter;

pub use formatter::{
    display_boundary_warning, display_error, display_report, display_status,
    display_step_skipped, display_step_started, display_success, display_version_plan,
    format_report, send_progress_to_stderr,
};

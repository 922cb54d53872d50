pub mod orchestration;

pub use orchestration::{run_release_workflow, run_release_workflow_reporting, ReleaseWorkflowArgs};

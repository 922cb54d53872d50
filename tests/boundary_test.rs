use pyrelease::boundary::BoundaryWarning;
use pyrelease::ui;
use std::path::PathBuf;

// ============================================================================
// BoundaryWarning Display Tests
// ============================================================================

#[test]
fn test_boundary_warning_no_previous_tag_display() {
    let warning = BoundaryWarning::NoPreviousTag {
        new_tag: "v0.1.0".to_string(),
    };

    let display_msg = warning.to_string();
    assert!(
        display_msg.contains("No previous release tag"),
        "Message should mention the missing tag, got: {}",
        display_msg
    );
    assert!(
        display_msg.contains("v0.1.0"),
        "Message should contain the new tag, got: {}",
        display_msg
    );
}

#[test]
fn test_boundary_warning_dirty_worktree_display() {
    let display_msg = BoundaryWarning::DirtyWorktree.to_string();
    assert!(
        display_msg.contains("uncommitted changes"),
        "Message should mention uncommitted changes, got: {}",
        display_msg
    );
}

#[test]
fn test_boundary_warning_empty_notes_display() {
    let warning = BoundaryWarning::EmptyReleaseNotes {
        path: PathBuf::from("docs/releases/v1.2.4.md"),
    };

    let display_msg = warning.to_string();
    assert!(display_msg.contains("docs/releases/v1.2.4.md"));
    assert!(display_msg.contains("empty"));
}

#[test]
fn test_boundary_warning_lint_retried_display() {
    let warning = BoundaryWarning::LintRetried { passes: 2 };
    assert!(warning.to_string().contains("pass 2"));
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn test_boundary_warning_json_is_tagged() {
    let warning = BoundaryWarning::NoPreviousTag {
        new_tag: "v1.0.0".to_string(),
    };
    let json = serde_json::to_value(&warning).unwrap();
    assert_eq!(json["kind"], "no_previous_tag");
    assert_eq!(json["new_tag"], "v1.0.0");

    let json = serde_json::to_value(BoundaryWarning::DirtyWorktree).unwrap();
    assert_eq!(json["kind"], "dirty_worktree");
}

#[test]
fn test_display_boundary_warning_does_not_panic() {
    // Visual verification test - output is printed to stderr
    ui::display_boundary_warning(&BoundaryWarning::LintRetried { passes: 2 });
}

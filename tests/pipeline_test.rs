// tests/pipeline_test.rs
use pyrelease::bump::VersionMarker;
use pyrelease::config::Config;
use pyrelease::domain::{Trigger, VersionBump};
use pyrelease::error::ReleaseError;
use pyrelease::git::{MockRepository, Repository};
use pyrelease::github::MockReleaseHost;
use pyrelease::pipeline::{Credentials, Pipeline, Stage, Step};
use pyrelease::runner::MockRunner;
use git2::Oid;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;

const MARKER: &str = "[bumpversion]\ncurrent_version = 1.2.3\ncommit = True\ntag = True\n\n[bumpversion:file:pyproject.toml]\n";

fn work_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".bumpversion.cfg"), MARKER).unwrap();
    fs::write(
        dir.path().join("pyproject.toml"),
        "[project]\nname = \"pkg\"\nversion = \"1.2.3\"\n",
    )
    .unwrap();
    dir
}

fn repository(dir: &Path) -> MockRepository {
    let mut repo = MockRepository::new(dir);
    repo.add_remote("origin", "https://github.com/owner/pkg.git");
    repo.add_tag("v1.2.3", Oid::from_bytes(&[1; 20]).unwrap());
    repo
}

/// Runner whose notes and build commands write the files the real tools would
fn runner() -> MockRunner {
    let mut runner = MockRunner::new();
    runner.on_run("llamabot", |cmd| {
        let path = PathBuf::from(&cmd.env["RELEASE_NOTES_PATH"]);
        fs::write(path, "## What's new\n\n- Faster queries\n")
    });
    runner.on_run("python", |cmd| {
        let marker = VersionMarker::load(&cmd.cwd.join(".bumpversion.cfg"))
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
        let version = marker.current_version;
        let dist = cmd.cwd.join("dist");
        fs::create_dir_all(&dist)?;
        fs::write(dist.join(format!("pkg-{}.tar.gz", version)), "sdist")?;
        fs::write(dist.join(format!("pkg-{}-py3-none-any.whl", version)), "wheel")
    });
    runner
}

fn credentials() -> Credentials {
    Credentials {
        index_token: Some("pypi-token".to_string()),
        github_token: Some("gh-token".to_string()),
    }
}

fn dispatch(bump: VersionBump) -> Trigger {
    Trigger::Dispatch {
        bump,
        dry_run: false,
    }
}

#[test]
fn test_dispatch_releases_patch_version() {
    let dir = work_tree();
    let config = Config::default();
    let repo = repository(dir.path());
    let runner = runner();
    let host = MockReleaseHost::new();

    let report = Pipeline::new(&config, &repo, &runner, &host, credentials())
        .run(dispatch(VersionBump::Patch))
        .unwrap();

    assert_eq!(report.stage, Stage::Done);
    assert_eq!(report.version.unwrap().to_string(), "1.2.4");
    assert_eq!(report.tag.as_deref(), Some("v1.2.4"));
    assert_eq!(report.previous_tag.as_deref(), Some("v1.2.3"));
    assert_eq!(
        report.notes_path,
        Some(dir.path().join("docs/releases/v1.2.4.md"))
    );
    assert_eq!(report.executed, Step::ALL.to_vec());
    assert!(report.skipped.is_empty());

    // One new tag, on the bump commit
    let tags = repo.tags();
    assert_eq!(tags.len(), 2);
    let commits = repo.commits();
    assert_eq!(commits.len(), 2);
    assert_eq!(commits[0].message, "Bump version: 1.2.3 → 1.2.4");
    assert_eq!(tags["v1.2.4"], commits[0].oid);
    assert_eq!(commits[1].message, "Add release notes for v1.2.4");
    assert_eq!(
        commits[1].paths,
        vec![PathBuf::from("docs/releases/v1.2.4.md")]
    );

    let marker = fs::read_to_string(dir.path().join(".bumpversion.cfg")).unwrap();
    assert!(marker.contains("current_version = 1.2.4"));
    let pyproject = fs::read_to_string(dir.path().join("pyproject.toml")).unwrap();
    assert!(pyproject.contains("version = \"1.2.4\""));

    // One artifact pair published with the index token
    let publishes = runner.calls_to("twine");
    assert_eq!(publishes.len(), 1);
    assert_eq!(publishes[0].args.len(), 3);
    assert_eq!(publishes[0].args[0], "upload");
    assert!(publishes[0].args[1].ends_with("pkg-1.2.4.tar.gz"));
    assert!(publishes[0].args[2].ends_with("pkg-1.2.4-py3-none-any.whl"));
    assert_eq!(publishes[0].env["TWINE_USERNAME"], "__token__");
    assert_eq!(publishes[0].env["TWINE_PASSWORD"], "pypi-token");

    let pushes = repo.pushes();
    assert_eq!(pushes.len(), 1);
    assert_eq!(
        pushes[0].1,
        vec![
            "refs/heads/main:refs/heads/main".to_string(),
            "refs/tags/v1.2.4:refs/tags/v1.2.4".to_string()
        ]
    );

    let releases = host.releases();
    assert_eq!(releases.len(), 1);
    assert_eq!(releases[0].0.to_string(), "owner/pkg");
    assert_eq!(releases[0].1.tag_name, "v1.2.4");
    assert!(releases[0].1.body.contains("Faster queries"));
    assert_eq!(
        report.release_url.as_deref(),
        Some("https://github.com/owner/pkg/releases/tag/v1.2.4")
    );
}

#[test]
fn test_pull_request_changes_nothing() {
    let dir = work_tree();
    let config = Config::default();
    let repo = repository(dir.path());
    let runner = runner();
    let host = MockReleaseHost::new();

    let report = Pipeline::new(&config, &repo, &runner, &host, Credentials::default())
        .run(Trigger::PullRequest {
            bump: VersionBump::Minor,
        })
        .unwrap();

    assert!(report.dry_run);
    assert_eq!(report.stage, Stage::Done);
    assert_eq!(report.version.unwrap().to_string(), "1.3.0");
    assert_eq!(report.skipped.len(), 6);

    assert_eq!(repo.tags().len(), 1);
    assert!(repo.commits().is_empty());
    assert!(repo.pushes().is_empty());
    assert!(host.releases().is_empty());
    assert!(runner.calls_to("twine").is_empty());
    assert!(runner.calls_to("llamabot").is_empty());

    // The unbumped tree is what gets built
    let dists = report.artifacts.unwrap();
    assert!(dists.sdist.ends_with("pkg-1.2.3.tar.gz"));
    let marker = fs::read_to_string(dir.path().join(".bumpversion.cfg")).unwrap();
    assert!(marker.contains("current_version = 1.2.3"));
}

#[test]
fn test_dry_run_version_equals_released_version() {
    for bump in [VersionBump::Major, VersionBump::Minor, VersionBump::Patch] {
        let dir = work_tree();
        let config = Config::default();
        let runner = runner();
        let host = MockReleaseHost::new();

        let preview_repo = repository(dir.path());
        let preview = Pipeline::new(&config, &preview_repo, &runner, &host, credentials())
            .run(Trigger::Dispatch { bump, dry_run: true })
            .unwrap();

        let repo = repository(dir.path());
        let released = Pipeline::new(&config, &repo, &runner, &host, credentials())
            .run(dispatch(bump))
            .unwrap();

        assert_eq!(preview.version, released.version);
        assert_eq!(preview.tag, released.tag);
    }
}

#[test]
fn test_major_bump() {
    let dir = work_tree();
    let config = Config::default();
    let repo = repository(dir.path());
    let runner = runner();
    let host = MockReleaseHost::new();

    let report = Pipeline::new(&config, &repo, &runner, &host, credentials())
        .run(dispatch(VersionBump::Major))
        .unwrap();

    assert_eq!(report.version.unwrap().to_string(), "2.0.0");
    assert!(repo.find_tag_oid("v2.0.0").unwrap().is_some());
}

#[test]
fn test_notes_failure_stops_after_version_commit() {
    let dir = work_tree();
    let config = Config::default();
    let repo = repository(dir.path());
    let runner = runner();
    runner.fail("llamabot", 1);
    let host = MockReleaseHost::new();

    let err = Pipeline::new(&config, &repo, &runner, &host, credentials())
        .run(dispatch(VersionBump::Patch))
        .unwrap_err();

    match err {
        ReleaseError::Step { step, stage, .. } => {
            assert_eq!(step, "release-notes");
            assert_eq!(stage, Stage::VersionCommitted);
        }
        other => panic!("unexpected error: {}", other),
    }

    // The bump commit and tag stay local; nothing left the machine
    assert_eq!(repo.commits().len(), 1);
    assert!(repo.find_tag_oid("v1.2.4").unwrap().is_some());
    assert!(repo.pushes().is_empty());
    assert!(runner.calls_to("twine").is_empty());
    assert!(host.releases().is_empty());
}

#[test]
fn test_lint_is_retried_once() {
    let dir = work_tree();
    let config = Config::default();
    let repo = repository(dir.path());
    let runner = runner();
    runner.fail("pre-commit", 1);
    let host = MockReleaseHost::new();

    let report = Pipeline::new(&config, &repo, &runner, &host, credentials())
        .run(dispatch(VersionBump::Patch))
        .unwrap();

    assert_eq!(runner.calls_to("pre-commit").len(), 2);
    assert_eq!(report.stage, Stage::Done);
    assert_eq!(report.warnings.len(), 1);
}

#[test]
fn test_lint_sees_staged_notes_and_its_fixes_are_committed() {
    let dir = work_tree();
    let config = Config::default();
    let repo = Rc::new(repository(dir.path()));
    let mut runner = runner();
    let seen = Rc::new(RefCell::new(Vec::new()));
    {
        let repo = Rc::clone(&repo);
        let seen = Rc::clone(&seen);
        runner.on_run("pre-commit", move |cmd| {
            seen.borrow_mut().extend(repo.staged());
            // end-of-file-fixer style rewrite of a tracked file
            repo.touch(cmd.cwd.join("pyproject.toml"));
            Ok(())
        });
    }
    let host = MockReleaseHost::new();

    Pipeline::new(&config, &*repo, &runner, &host, credentials())
        .run(dispatch(VersionBump::Patch))
        .unwrap();

    assert_eq!(*seen.borrow(), vec![PathBuf::from("docs/releases/v1.2.4.md")]);
    let commits = repo.commits();
    assert_eq!(
        commits[1].paths,
        vec![
            PathBuf::from("docs/releases/v1.2.4.md"),
            PathBuf::from("pyproject.toml"),
        ]
    );
    assert!(repo.is_worktree_clean().unwrap());
}

#[test]
fn test_lint_failing_twice_fails_commit_notes() {
    let dir = work_tree();
    let config = Config::default();
    let repo = repository(dir.path());
    let runner = runner();
    runner.fail("pre-commit", 2);
    let host = MockReleaseHost::new();

    let err = Pipeline::new(&config, &repo, &runner, &host, credentials())
        .run(dispatch(VersionBump::Patch))
        .unwrap_err();

    assert!(err.to_string().contains("commit-notes"));
    assert_eq!(runner.calls_to("pre-commit").len(), 2);
    assert_eq!(repo.commits().len(), 1);
}

#[test]
fn test_rejected_push_fails_before_release() {
    let dir = work_tree();
    let config = Config::default();
    let repo = repository(dir.path());
    repo.reject_pushes();
    let runner = runner();
    let host = MockReleaseHost::new();

    let err = Pipeline::new(&config, &repo, &runner, &host, credentials())
        .run(dispatch(VersionBump::Patch))
        .unwrap_err();

    match err {
        ReleaseError::Step { step, stage, .. } => {
            assert_eq!(step, "push");
            assert_eq!(stage, Stage::Published);
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(host.releases().is_empty());
}

#[test]
fn test_missing_token_fails_before_any_mutation() {
    let dir = work_tree();
    let config = Config::default();
    let repo = repository(dir.path());
    let runner = runner();
    let host = MockReleaseHost::new();
    let credentials = Credentials {
        index_token: None,
        github_token: Some("gh-token".to_string()),
    };

    let err = Pipeline::new(&config, &repo, &runner, &host, credentials)
        .run(dispatch(VersionBump::Patch))
        .unwrap_err();

    assert!(err.to_string().contains("PYPI_API_TOKEN"));
    assert!(repo.commits().is_empty());
    assert_eq!(repo.tags().len(), 1);
}

#[test]
fn test_existing_tag_is_rejected() {
    let dir = work_tree();
    let config = Config::default();
    let repo = repository(dir.path());
    repo.add_tag("v1.2.4", Oid::from_bytes(&[4; 20]).unwrap());
    let runner = runner();
    let host = MockReleaseHost::new();

    let err = Pipeline::new(&config, &repo, &runner, &host, credentials())
        .run(dispatch(VersionBump::Patch))
        .unwrap_err();

    assert!(err.to_string().contains("already exists"));
    assert!(repo.commits().is_empty());
}

#[test]
fn test_dirty_worktree_is_rejected_unless_allowed() {
    let dir = work_tree();
    let mut config = Config::default();
    let repo = repository(dir.path());
    repo.set_clean(false);
    let runner = runner();
    let host = MockReleaseHost::new();

    let err = Pipeline::new(&config, &repo, &runner, &host, credentials())
        .run(Trigger::PullRequest {
            bump: VersionBump::Patch,
        })
        .unwrap_err();
    assert!(err.to_string().contains("uncommitted changes"));

    config.version.allow_dirty = true;
    let report = Pipeline::new(&config, &repo, &runner, &host, credentials())
        .run(Trigger::PullRequest {
            bump: VersionBump::Patch,
        })
        .unwrap();
    assert_eq!(report.warnings.len(), 1);
}

#[test]
fn test_first_release_warns_about_missing_previous_tag() {
    let dir = work_tree();
    let config = Config::default();
    let mut repo = MockRepository::new(dir.path());
    repo.add_remote("origin", "git@github.com:owner/pkg.git");
    let runner = runner();
    let host = MockReleaseHost::new();

    let report = Pipeline::new(&config, &repo, &runner, &host, credentials())
        .run(dispatch(VersionBump::Patch))
        .unwrap();

    assert!(report.previous_tag.is_none());
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(host.releases()[0].0.to_string(), "owner/pkg");
}

#[test]
fn test_env_file_receives_version() {
    let dir = work_tree();
    let env_file = dir.path().join("github_env");
    let config = Config::default();
    let repo = repository(dir.path());
    let runner = runner();
    let host = MockReleaseHost::new();

    Pipeline::new(&config, &repo, &runner, &host, Credentials::default())
        .with_env_file(Some(env_file.clone()))
        .run(Trigger::PullRequest {
            bump: VersionBump::Minor,
        })
        .unwrap();

    let exported = fs::read_to_string(env_file).unwrap();
    assert!(exported.contains("VERSION_NAME=minor\n"));
    assert!(exported.contains("version_number=1.3.0\n"));
}

#[test]
fn test_failed_run_report_marks_failed_stage() {
    let dir = work_tree();
    let config = Config::default();
    let repo = repository(dir.path());
    let runner = runner();
    runner.fail("python", 1);
    let host = MockReleaseHost::new();

    let (report, outcome) = Pipeline::new(&config, &repo, &runner, &host, credentials())
        .run_reporting(dispatch(VersionBump::Patch));

    assert!(outcome.is_err());
    assert_eq!(report.stage, Stage::Failed);
    assert_eq!(report.failed_step, Some(Step::Build));
    assert_eq!(report.executed.last(), Some(&Step::CommitNotes));
    assert!(runner.calls_to("twine").is_empty());
    assert!(repo.pushes().is_empty());
}

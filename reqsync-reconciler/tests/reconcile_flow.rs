//! End-to-end state-machine tests against real temporary git repositories.
//!
//! A bare "remote" plus one or two working clones stand in for the hosting
//! platform; fake generators control the `changed` outcome deterministically.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use reqsync_core::{Config, EventType, PullRequestContext, SourceRef};
use reqsync_reconciler::{Git, ReconcileError, ReconcileOutcome, Reconciler};
use reqsync_tools::{ManifestGenerator, ToolError};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Writes fixed content, overwriting whatever is there.
struct FakeGenerator {
    content: String,
}

impl FakeGenerator {
    fn new(content: &str) -> Self {
        Self {
            content: content.to_owned(),
        }
    }
}

impl ManifestGenerator for FakeGenerator {
    fn generate(&self, _tree_root: &Path, manifest_path: &Path) -> Result<(), ToolError> {
        fs::write(manifest_path, &self.content).expect("fake generator write");
        Ok(())
    }
}

/// Appends to an existing manifest instead of overwriting — models an
/// incremental tool. The pipeline's delete-first step must neutralize it.
struct AppendingGenerator {
    content: String,
}

impl ManifestGenerator for AppendingGenerator {
    fn generate(&self, _tree_root: &Path, manifest_path: &Path) -> Result<(), ToolError> {
        let mut existing = fs::read_to_string(manifest_path).unwrap_or_default();
        existing.push_str(&self.content);
        fs::write(manifest_path, existing).expect("append write");
        Ok(())
    }
}

/// Always fails, like pipreqs on unparsable source.
struct FailingGenerator;

impl ManifestGenerator for FailingGenerator {
    fn generate(&self, _tree_root: &Path, _manifest_path: &Path) -> Result<(), ToolError> {
        Err(ToolError::Spawn {
            program: "pipreqs".to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "unparsable source"),
        })
    }
}

// ---------------------------------------------------------------------------
// Git fixture helpers
// ---------------------------------------------------------------------------

fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("spawn git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim_end().to_owned()
}

fn configure_user(dir: &Path) {
    git(dir, &["config", "user.name", "Test Author"]);
    git(dir, &["config", "user.email", "test@example.com"]);
}

/// Bare remote + one working clone on branch `feature/x`, with an initial
/// commit containing `app.py` and (optionally) a committed manifest.
fn fixture(initial_manifest: Option<&str>) -> (TempDir, TempDir) {
    let _ = env_logger::builder().is_test(true).try_init();

    let remote = TempDir::new().expect("remote dir");
    git(remote.path(), &["init", "--quiet", "--bare"]);

    let work = TempDir::new().expect("work dir");
    git(
        work.path(),
        &["clone", "--quiet", remote.path().to_str().unwrap(), "."],
    );
    configure_user(work.path());
    git(work.path(), &["checkout", "--quiet", "-b", "feature/x"]);

    fs::write(work.path().join("app.py"), "import requests\n").expect("write app.py");
    if let Some(manifest) = initial_manifest {
        fs::write(work.path().join("requirements.txt"), manifest).expect("write manifest");
    }
    git(work.path(), &["add", "."]);
    git(work.path(), &["commit", "--quiet", "-m", "initial"]);
    git(work.path(), &["push", "--quiet", "-u", "origin", "feature/x"]);

    (remote, work)
}

/// A second clone of the remote, checked out on `feature/x`.
fn second_clone(remote: &Path) -> TempDir {
    let work = TempDir::new().expect("second clone dir");
    let output = Command::new("git")
        .args(["clone", "--quiet", remote.to_str().unwrap(), "."])
        .current_dir(work.path())
        .output()
        .expect("spawn git clone");
    assert!(output.status.success(), "clone failed");
    configure_user(work.path());
    git(work.path(), &["checkout", "--quiet", "feature/x"]);
    work
}

fn ctx() -> PullRequestContext {
    PullRequestContext {
        event: EventType::Synchronize,
        source_ref: SourceRef::from("feature/x"),
        is_fork: false,
    }
}

fn reconciler<G: ManifestGenerator>(work: &Path, generator: G) -> Reconciler<G> {
    Reconciler::new(work, Config::default(), generator)
}

fn remote_ref(remote: &Path) -> String {
    git(remote, &["rev-parse", "refs/heads/feature/x"])
}

fn head(work: &Path) -> String {
    git(work, &["rev-parse", "HEAD"])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn no_prior_manifest_commits_exactly_one_new_file() {
    let (remote, work) = fixture(None);
    let run = reconciler(work.path(), FakeGenerator::new("requests==2.31.0\n"))
        .run(&ctx(), false)
        .expect("run");

    let ReconcileOutcome::Pushed { commit } = &run.outcome else {
        panic!("expected Pushed, got {:?}", run.outcome);
    };
    assert!(run.change.changed);
    assert!(run.change.prior_digest.is_none(), "no committed manifest before");

    let files = Git::new(work.path(), "origin")
        .head_commit_files()
        .expect("head files");
    assert_eq!(files, vec![PathBuf::from("requirements.txt")]);
    assert_eq!(&remote_ref(remote.path()), commit);
}

#[test]
fn identical_content_is_noop_with_no_commit_or_push() {
    let (remote, work) = fixture(Some("requests==2.31.0\n"));
    let before_local = head(work.path());
    let before_remote = remote_ref(remote.path());

    let run = reconciler(work.path(), FakeGenerator::new("requests==2.31.0\n"))
        .run(&ctx(), false)
        .expect("run");

    assert_eq!(run.outcome, ReconcileOutcome::NoOp);
    assert!(!run.change.changed);
    assert_eq!(head(work.path()), before_local, "NoOp must not commit");
    assert_eq!(remote_ref(remote.path()), before_remote, "NoOp must not push");
}

#[test]
fn second_run_with_no_source_change_is_noop() {
    let (_remote, work) = fixture(None);
    let gen = FakeGenerator::new("requests==2.31.0\npyyaml==6.0\n");
    let r = reconciler(work.path(), gen);

    let first = r.run(&ctx(), false).expect("first run");
    assert!(matches!(first.outcome, ReconcileOutcome::Pushed { .. }));

    let second = r.run(&ctx(), false).expect("second run");
    assert_eq!(second.outcome, ReconcileOutcome::NoOp);
}

#[test]
fn unrelated_dirty_files_are_never_staged() {
    let (_remote, work) = fixture(Some("requests==2.30.0\n"));
    fs::write(work.path().join("app.py"), "import requests, yaml\n").expect("dirty app.py");

    let run = reconciler(work.path(), FakeGenerator::new("requests==2.31.0\n"))
        .run(&ctx(), false)
        .expect("run");
    assert!(matches!(run.outcome, ReconcileOutcome::Pushed { .. }));

    let files = git(work.path(), &["show", "--name-only", "--format=", "HEAD"]);
    assert_eq!(files, "requirements.txt", "commit must own exactly one file");

    let status = git(work.path(), &["status", "--porcelain"]);
    assert!(
        status.contains(" M app.py"),
        "app.py must stay dirty and unstaged, got: {status}"
    );
}

#[test]
fn detached_head_checkout_is_refused_before_committing() {
    let (remote, work) = fixture(Some("requests==2.30.0\n"));
    let before_local = head(work.path());
    let before_remote = remote_ref(remote.path());
    git(work.path(), &["checkout", "--quiet", "--detach"]);

    let err = reconciler(work.path(), FakeGenerator::new("requests==2.31.0\n"))
        .run(&ctx(), false)
        .unwrap_err();
    assert!(matches!(err, ReconcileError::WrongCheckout { .. }), "got: {err}");

    assert_eq!(head(work.path()), before_local, "must not commit from a detached HEAD");
    assert_eq!(remote_ref(remote.path()), before_remote, "must not push");
}

#[test]
fn wrong_branch_checkout_is_refused() {
    let (_remote, work) = fixture(Some("requests==2.30.0\n"));
    git(work.path(), &["checkout", "--quiet", "-b", "hotfix/unrelated"]);

    let err = reconciler(work.path(), FakeGenerator::new("requests==2.31.0\n"))
        .run(&ctx(), false)
        .unwrap_err();
    match err {
        ReconcileError::WrongCheckout { expected, found } => {
            assert_eq!(expected, "feature/x");
            assert!(found.contains("hotfix/unrelated"), "found: {found}");
        }
        other => panic!("expected WrongCheckout, got: {other}"),
    }
}

#[test]
fn synthetic_merge_ref_cannot_leak_base_content_onto_source_ref() {
    let (remote, work) = fixture(Some("requests==2.30.0\n"));

    // Diverge a base branch, put the PR head one commit ahead, then build
    // the platform-style merge commit and detach onto it.
    git(work.path(), &["checkout", "--quiet", "-b", "main"]);
    fs::write(work.path().join("base_only.py"), "import yaml\n").expect("write base file");
    git(work.path(), &["add", "base_only.py"]);
    git(work.path(), &["commit", "--quiet", "-m", "base change"]);

    git(work.path(), &["checkout", "--quiet", "feature/x"]);
    fs::write(work.path().join("app.py"), "import requests, json\n").expect("edit app.py");
    git(work.path(), &["add", "app.py"]);
    git(work.path(), &["commit", "--quiet", "-m", "pr change"]);
    git(work.path(), &["push", "--quiet", "origin", "feature/x"]);
    let pr_tip = remote_ref(remote.path());

    git(work.path(), &["checkout", "--quiet", "--detach", "main"]);
    git(work.path(), &["merge", "--quiet", "--no-ff", "-m", "synthetic merge", "feature/x"]);

    let err = reconciler(work.path(), FakeGenerator::new("requests==2.31.0\n"))
        .run(&ctx(), false)
        .unwrap_err();
    assert!(matches!(err, ReconcileError::WrongCheckout { .. }), "got: {err}");

    assert_eq!(
        remote_ref(remote.path()),
        pr_tip,
        "source ref must not move from a merge-ref checkout"
    );
    let tree = git(work.path(), &["ls-tree", "--name-only", "-r", &pr_tip]);
    assert!(
        !tree.contains("base_only.py"),
        "base-branch content must never reach the PR branch"
    );
}

#[test]
fn concurrent_second_push_fails_with_conflict_not_overwrite() {
    let (remote, first_work) = fixture(None);
    let second_work = second_clone(remote.path());

    let first = reconciler(first_work.path(), FakeGenerator::new("requests==2.31.0\n"))
        .run(&ctx(), false)
        .expect("first run");
    assert!(matches!(first.outcome, ReconcileOutcome::Pushed { .. }));
    let winner = remote_ref(remote.path());

    let err = reconciler(second_work.path(), FakeGenerator::new("pyyaml==6.0\n"))
        .run(&ctx(), false)
        .unwrap_err();
    assert!(
        matches!(err, ReconcileError::PushConflict { .. }),
        "expected PushConflict, got: {err}"
    );
    assert_eq!(
        remote_ref(remote.path()),
        winner,
        "losing run must not overwrite the remote ref"
    );
}

#[test]
fn dry_run_reports_would_commit_without_side_effects() {
    let (remote, work) = fixture(Some("requests==2.30.0\n"));
    let before_local = head(work.path());
    let before_remote = remote_ref(remote.path());

    let run = reconciler(work.path(), FakeGenerator::new("requests==2.31.0\n"))
        .run(&ctx(), true)
        .expect("run");

    assert_eq!(run.outcome, ReconcileOutcome::WouldCommit);
    assert!(run.change.changed);
    assert!(run.change.unified_diff.contains("+requests==2.31.0"));
    assert_eq!(head(work.path()), before_local);
    assert_eq!(remote_ref(remote.path()), before_remote);
}

#[test]
fn stale_entries_do_not_survive_an_appending_generator() {
    let (_remote, work) = fixture(Some("leftover==0.1\n"));
    let run = reconciler(
        work.path(),
        AppendingGenerator {
            content: "requests==2.31.0\n".to_owned(),
        },
    )
    .run(&ctx(), false)
    .expect("run");

    assert!(matches!(run.outcome, ReconcileOutcome::Pushed { .. }));
    let manifest = fs::read_to_string(work.path().join("requirements.txt")).expect("read");
    assert_eq!(
        manifest, "requests==2.31.0\n",
        "delete-before-regenerate must drop stale entries"
    );
}

#[test]
fn generator_failure_aborts_the_run() {
    let (remote, work) = fixture(Some("requests==2.30.0\n"));
    let before_remote = remote_ref(remote.path());

    let err = reconciler(work.path(), FailingGenerator)
        .run(&ctx(), false)
        .unwrap_err();
    assert!(matches!(err, ReconcileError::Generation(_)), "got: {err}");
    assert_eq!(remote_ref(remote.path()), before_remote);
}

#[test]
fn generator_that_produces_nothing_is_an_error() {
    struct NoopGenerator;
    impl ManifestGenerator for NoopGenerator {
        fn generate(&self, _t: &Path, _m: &Path) -> Result<(), ToolError> {
            Ok(())
        }
    }

    let (_remote, work) = fixture(Some("requests==2.30.0\n"));
    let err = reconciler(work.path(), NoopGenerator)
        .run(&ctx(), false)
        .unwrap_err();
    assert!(matches!(err, ReconcileError::MissingManifest { .. }), "got: {err}");
}

#[test]
fn custom_manifest_path_is_respected() {
    let (remote, work) = fixture(None);
    fs::create_dir_all(work.path().join("deps")).expect("mkdir");
    let mut config = Config::default();
    config.manifest_path = PathBuf::from("deps/requirements.txt");

    let r = Reconciler::new(work.path(), config, FakeGenerator::new("requests==2.31.0\n"));
    let run = r.run(&ctx(), false).expect("run");
    assert!(matches!(run.outcome, ReconcileOutcome::Pushed { .. }));

    let files = git(work.path(), &["show", "--name-only", "--format=", "HEAD"]);
    assert_eq!(files, "deps/requirements.txt");
    assert_eq!(remote_ref(remote.path()), head(work.path()));
}

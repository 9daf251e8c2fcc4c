//! Integration test for the clone registry lifecycle
//!
//! Drives `CloneService` end to end against a scripted git executable
//! that replays the stderr phases of a real clone, and verifies the
//! push-to-pull contract: notifications carry nothing, and re-reading
//! the service after each one always yields a consistent snapshot.

#![cfg(unix)]

use std::path::{Path, PathBuf};

use remora::CloneService;
use tempfile::TempDir;
use tokio::sync::broadcast::error::TryRecvError;

/// Write a fake `git` that replays canned clone output.
fn fake_git(dir: &TempDir, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.path().join("git");
    std::fs::write(&script, format!("#!/bin/sh\n{body}")).expect("Failed to write script");
    let mut perms = std::fs::metadata(&script)
        .expect("Failed to stat script")
        .permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&script, perms).expect("Failed to chmod script");
    script
}

const CLONE_SCRIPT: &str = "\
echo \"Cloning into 'repo'...\" >&2
echo 'remote: Enumerating objects: 40, done.' >&2
echo 'remote: Compressing objects: 100% (20/20), done.' >&2
echo 'Receiving objects:  50% (20/40)' >&2
echo 'Receiving objects: 100% (40/40), done.' >&2
echo 'Resolving deltas: 100% (10/10), done.' >&2
echo 'Checking out files: 100% (30/30), done.' >&2
";

#[tokio::test]
async fn clone_lifecycle_tracks_progress_and_removes_on_completion() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let git = fake_git(&dir, CLONE_SCRIPT);
    let service = CloneService::new().with_git_executable(&git);
    let mut notifications = service.subscribe();

    let target = dir.path().join("repo");
    let handle = service.start("https://example.com/repo.git", &target);

    // Tracked immediately, seeded with the synthetic first line.
    let ops = service.list();
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].id, handle.operation.id);
    assert_eq!(ops[0].display_name(), "repo");
    let seeded = service.state_of(handle.operation.id).expect("seeded state");
    assert!(seeded.output.starts_with("Cloning into '"));
    assert!(seeded.value.is_none());

    handle.task.await.expect("task panicked").expect("clone failed");

    // Terminal transition: gone from both list and state map.
    assert!(service.list().is_empty());
    assert!(service.state_of(handle.operation.id).is_none());

    // Every notification is payload-free and the snapshot read after
    // each one is internally consistent.
    let mut count = 0;
    loop {
        match notifications.try_recv() {
            Ok(()) => {
                count += 1;
                for op in service.list() {
                    assert!(service.state_of(op.id).is_some());
                }
            }
            Err(TryRecvError::Empty) => break,
            Err(other) => panic!("notification stream broke: {other:?}"),
        }
    }
    // start + 7 output lines + removal
    assert_eq!(count, 9);
}

#[tokio::test]
async fn clone_progress_values_stay_bounded_and_reach_one() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    // Hold the process open after the last line so its final snapshot
    // can be observed before removal.
    let git = fake_git(&dir, &format!("{CLONE_SCRIPT}sleep 2\n"));
    let service = CloneService::new().with_git_executable(&git);

    let handle = service.start("https://example.com/repo.git", &dir.path().join("repo"));
    let id = handle.operation.id;

    // Poll snapshots until the checkout phase lands the bar at 1.0;
    // every numeric value seen on the way must be bounded and
    // non-decreasing (phase weights are cumulative).
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
    let mut last_seen: Option<f64> = None;
    loop {
        if let Some(value) = service.state_of(id).and_then(|state| state.value) {
            assert!((0.0..=1.0).contains(&value), "out of range: {value}");
            if let Some(previous) = last_seen {
                assert!(value >= previous, "went backwards: {previous} -> {value}");
            }
            last_seen = Some(value);
            if (value - 1.0).abs() < 1e-9 {
                break;
            }
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "never reached 1.0, last seen {last_seen:?}"
        );
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    handle.task.await.expect("task panicked").expect("clone failed");
    assert!(service.state_of(id).is_none());
}

#[tokio::test]
async fn concurrent_clones_are_tracked_independently() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let git = fake_git(
        &dir,
        "case \"$*\" in *alpha*) echo 'Receiving objects:  25% (1/4)' >&2;; \
         *) echo 'Receiving objects:  75% (3/4)' >&2;; esac\nsleep 1\n",
    );
    let service = CloneService::new().with_git_executable(&git);

    let a = service.start("https://example.com/alpha.git", &dir.path().join("alpha"));
    let b = service.start("https://example.com/beta.git", &dir.path().join("beta"));
    assert_ne!(a.operation.id, b.operation.id);

    // Both visible right away, in start order.
    let names: Vec<String> = service.list().iter().map(|op| op.display_name()).collect();
    assert_eq!(names, vec!["alpha", "beta"]);

    // Wait until both progress lines have been absorbed.
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
    loop {
        let a_state = service.state_of(a.operation.id);
        let b_state = service.state_of(b.operation.id);
        if let (Some(a_state), Some(b_state)) = (&a_state, &b_state) {
            if a_state.value.is_some() && b_state.value.is_some() {
                assert_ne!(a_state.value, b_state.value);
                break;
            }
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "progress never arrived: {a_state:?} {b_state:?}"
        );
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    a.task.await.expect("task panicked").expect("clone failed");
    b.task.await.expect("task panicked").expect("clone failed");
    assert!(service.list().is_empty());
}

#[tokio::test]
async fn removal_is_not_abort_and_final_failure_still_cleans_up() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let git = fake_git(&dir, "echo 'fatal: early EOF' >&2\nsleep 0.2\nexit 128\n");
    let service = CloneService::new().with_git_executable(&git);

    let handle = service.start("https://example.com/repo.git", &dir.path().join("repo"));

    // Forgetting the operation early stops tracking but not the process.
    service.remove(handle.operation.id);
    assert!(service.list().is_empty());
    assert!(service.state_of(handle.operation.id).is_none());

    // The process still ran to completion and its failure still comes
    // back through the awaitable.
    let err = handle.task.await.expect("task panicked").unwrap_err();
    assert_eq!(err.exit_code(), Some(128));
    assert!(service.list().is_empty());
}

#[tokio::test]
async fn clone_runs_relative_to_the_target_parent() {
    // The fake git records its working directory; the runner must start
    // it from the clone target's parent, where git would create `repo`.
    let dir = TempDir::new().expect("Failed to create temp dir");
    let marker = dir.path().join("cwd.txt");
    let git = fake_git(&dir, &format!("pwd > '{}'\n", marker.display()));
    let service = CloneService::new().with_git_executable(&git);

    let parent = dir.path().join("workspace");
    std::fs::create_dir(&parent).expect("Failed to create workspace");
    let handle = service.start("https://example.com/repo.git", &parent.join("repo"));
    handle.task.await.expect("task panicked").expect("clone failed");

    let recorded = std::fs::read_to_string(&marker).expect("marker missing");
    assert_eq!(
        Path::new(recorded.trim()).file_name(),
        parent.file_name(),
    );
}

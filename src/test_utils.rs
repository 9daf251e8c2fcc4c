//! Test utilities for scripting a fake git executable

#![cfg(test)]

use std::path::{Path, PathBuf};
use std::sync::Once;

use tempfile::TempDir;

static TRACING: Once = Once::new();

/// Initialize tracing output for tests. Safe to call from every test;
/// only the first call installs the subscriber.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "remora=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

/// A scripted stand-in for the git executable.
///
/// Real network operations are neither fast nor deterministic, so tests
/// exercise the process plumbing against a shell script that replays
/// canned git output and exit codes.
pub struct FakeGit {
    dir: TempDir,
    script: PathBuf,
}

impl FakeGit {
    /// Write `body` as an executable `sh` script named `git`.
    #[cfg(unix)]
    pub fn new(body: &str) -> Self {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().expect("Failed to create temp dir");
        let script = dir.path().join("git");
        std::fs::write(&script, format!("#!/bin/sh\n{body}")).expect("Failed to write script");

        let mut perms = std::fs::metadata(&script)
            .expect("Failed to stat script")
            .permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&script, perms).expect("Failed to chmod script");

        Self { dir, script }
    }

    /// Path to pass as the git executable.
    pub fn path(&self) -> &Path {
        &self.script
    }

    /// Scratch directory the script lives in, usable as a working
    /// directory or clone target parent.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

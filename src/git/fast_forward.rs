//! Batch fast-forward of local branches from their upstreams
//!
//! Runs `git fetch .` with `<upstream>:<local>` refspecs so git updates
//! every eligible branch in one invocation, then parses the verbose
//! ref-update report to find out which of the requested branches
//! actually moved. Like the progress parser, all knowledge of the output
//! format is confined to this file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::git::args::fast_forward_args;
use crate::git::runner::GitCommand;

/// A branch the caller wants fast-forwarded.
#[derive(Debug, Clone)]
pub struct FastForwardRequest {
    /// Short branch name, matching the last column of git's report.
    pub branch_name: String,
    /// Upstream ref to fast-forward from, e.g. `refs/remotes/origin/main`.
    pub upstream_ref: String,
    /// Local ref to update, e.g. `refs/heads/main`.
    pub local_ref: String,
}

/// One branch that was actually updated by the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchUpdate {
    pub branch_name: String,
    pub new_oid: String,
}

/// Fast-forward the requested branches and report the subset that moved.
///
/// Exit code 1 means some refs could not be fast-forwarded, which is an
/// expected partial outcome, so both 0 and 1 resolve successfully and
/// the parsed report is the source of truth for what happened.
pub async fn fast_forward_branches(
    repo_path: &Path,
    requests: &[FastForwardRequest],
    git_executable: Option<&Path>,
) -> Result<Vec<BranchUpdate>> {
    if requests.is_empty() {
        return Ok(Vec::new());
    }

    let ref_pairs: Vec<String> = requests
        .iter()
        .map(|r| format!("{}:{}", r.upstream_ref, r.local_ref))
        .collect();

    let mut command = GitCommand::new(repo_path, fast_forward_args(&ref_pairs));
    if let Some(program) = git_executable {
        command = command.program(program);
    }

    let output = command.allowed_exit_codes(&[0, 1]).run().await?;

    let requested: Vec<&str> = requests.iter().map(|r| r.branch_name.as_str()).collect();
    Ok(parse_updated_branches(&output.combined(), &requested))
}

/// Parse git's verbose ref-update report into the requested branches
/// that were updated, preserving the caller's ordering.
///
/// The first line is the `From .` header and the output ends with a
/// trailing newline, so both are dropped. Each remaining line is
/// whitespace-tokenized; a leading single-character status flag (`+`,
/// `-`, `*`, `!`, `=`, `t`) is skipped, and the line counts as an update
/// iff the next token is an `<old>..<new>` range. The branch name is the
/// line's last token.
pub fn parse_updated_branches(output: &str, requested_branches: &[&str]) -> Vec<BranchUpdate> {
    let mut lines: Vec<&str> = output.split('\n').collect();
    if !lines.is_empty() {
        lines.remove(0);
    }
    if lines.last() == Some(&"") {
        lines.pop();
    }

    let mut updated: Vec<(String, String)> = Vec::new();
    for line in lines {
        let mut tokens = line.split_whitespace().peekable();
        if tokens
            .peek()
            .is_some_and(|t| matches!(*t, "+" | "-" | "*" | "!" | "=" | "t"))
        {
            tokens.next();
        }

        let tokens: Vec<&str> = tokens.collect();
        let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
            continue;
        };
        let Some(separator) = first.find("..") else {
            continue;
        };
        let new_oid = first[separator..].trim_start_matches('.');
        if new_oid.is_empty() {
            continue;
        }
        updated.push((last.to_string(), new_oid.to_string()));
    }

    requested_branches
        .iter()
        .filter_map(|name| {
            updated
                .iter()
                .find(|(branch, _)| branch == name)
                .map(|(branch, oid)| BranchUpdate {
                    branch_name: branch.clone(),
                    new_oid: oid.clone(),
                })
        })
        .collect()
}

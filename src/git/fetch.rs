//! Fetch operations

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::git::args::{fetch_args, fetch_refspec_args};
use crate::git::progress::{ParsedLine, ProgressParser, FETCH_STEPS};
use crate::git::runner::{GitCommand, GitOutput};
use crate::models::ProgressState;

/// Refspec fetches treat "couldn't find remote ref" (128) as an
/// expected, recoverable outcome; callers inspect the result to tell
/// "nothing fetched" from "something fetched".
const REFSPEC_EXIT_CODES: &[i32] = &[0, 128];

/// Context lines git prints during a fetch that are worth surfacing.
/// Everything else of that kind is noise and is dropped from the
/// progress stream.
const COUNTING_OBJECTS_PREFIX: &str = "remote: Counting objects";

/// Options for a fetch, beyond the repository and remote name.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Network-related base arguments from the collaborator that owns
    /// authentication, spliced in front of the subcommand.
    pub network_args: Vec<String>,
    pub recurse_submodules: bool,
    /// Specific git executable to run; `None` resolves `git` on PATH.
    pub git_executable: Option<PathBuf>,
}

/// Fetch (with prune) from a named remote, reporting progress per line.
///
/// Unlike clone, unrecognized context lines are suppressed unless they
/// are the object-counting notice, so the sink is not flooded with
/// chatter between percentage updates.
pub async fn fetch(
    repo_path: &Path,
    remote: &str,
    options: &FetchOptions,
    mut progress: Option<&mut (dyn FnMut(ProgressState) + Send)>,
) -> Result<()> {
    let args = fetch_args(
        &options.network_args,
        remote,
        progress.is_some(),
        options.recurse_submodules,
    );

    let mut command = GitCommand::new(repo_path, args);
    if let Some(program) = &options.git_executable {
        command = command.program(program);
    }

    let mut parser = ProgressParser::new(FETCH_STEPS);
    command
        .run_with_progress(|line| {
            if let Some(sink) = progress.as_mut() {
                match parser.parse(line) {
                    ParsedLine::Progress(value) => sink(ProgressState::with_value(line, value)),
                    ParsedLine::Context if line.starts_with(COUNTING_OBJECTS_PREFIX) => {
                        sink(ProgressState::indeterminate(line))
                    }
                    ParsedLine::Context => {}
                }
            }
        })
        .await?;

    Ok(())
}

/// Fetch a single explicit refspec from a remote. Resolves successfully
/// even when the remote does not have the ref (exit code 128); the
/// returned output tells the caller which case occurred.
pub async fn fetch_refspec(
    repo_path: &Path,
    remote: &str,
    refspec: &str,
    options: &FetchOptions,
) -> Result<GitOutput> {
    let args = fetch_refspec_args(&options.network_args, remote, refspec);

    let mut command = GitCommand::new(repo_path, args);
    if let Some(program) = &options.git_executable {
        command = command.program(program);
    }

    command.allowed_exit_codes(REFSPEC_EXIT_CODES).run().await
}

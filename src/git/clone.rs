//! Clone operation

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::git::args::clone_args;
use crate::git::progress::{ParsedLine, ProgressParser, CLONE_STEPS};
use crate::git::runner::GitCommand;
use crate::models::ProgressState;

/// Options for a clone, beyond the url and target path.
#[derive(Debug, Clone, Default)]
pub struct CloneOptions {
    /// Network-related base arguments from the collaborator that owns
    /// authentication, spliced in front of the subcommand.
    pub network_args: Vec<String>,
    pub recurse_submodules: bool,
    /// Specific git executable to run; `None` resolves `git` on PATH.
    pub git_executable: Option<PathBuf>,
}

/// Clone `url` into `target_path`, reporting progress per output line.
///
/// Each stderr line becomes one `ProgressState`: phase percentages map
/// into `[0, 1]`, everything else surfaces as indeterminate with the raw
/// text kept for display. The sink is invoked synchronously per line, in
/// emission order.
pub async fn clone(
    url: &str,
    target_path: &Path,
    options: &CloneOptions,
    mut progress: Option<&mut (dyn FnMut(ProgressState) + Send)>,
) -> Result<()> {
    let args = clone_args(
        &options.network_args,
        url,
        &target_path.to_string_lossy(),
        progress.is_some(),
        options.recurse_submodules,
    );

    // The target directory does not exist until git creates it, so the
    // process runs from its parent.
    let cwd = target_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut command = GitCommand::new(cwd, args);
    if let Some(program) = &options.git_executable {
        command = command.program(program);
    }

    let mut parser = ProgressParser::new(CLONE_STEPS);
    command
        .run_with_progress(|line| {
            if let Some(sink) = progress.as_mut() {
                let state = match parser.parse(line) {
                    ParsedLine::Progress(value) => ProgressState::with_value(line, value),
                    ParsedLine::Context => ProgressState::indeterminate(line),
                };
                sink(state);
            }
        })
        .await?;

    Ok(())
}

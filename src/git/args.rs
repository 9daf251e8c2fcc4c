//! Argument construction for git network operations
//!
//! Git is positional-argument sensitive, so each builder returns the
//! exact token order and nothing else. Network-related base arguments
//! (credential wiring, protocol tweaks) are supplied by the caller that
//! owns authentication; the builders only splice them in front.

/// Arguments for `git clone`.
///
/// `--progress` is only requested when someone is listening: git
/// suppresses progress output when stderr is not a terminal unless the
/// flag is present.
pub fn clone_args(
    network_args: &[String],
    url: &str,
    path: &str,
    progress: bool,
    recurse_submodules: bool,
) -> Vec<String> {
    let mut args: Vec<String> = network_args.to_vec();
    args.push("clone".to_string());
    if recurse_submodules {
        args.push("--recursive".to_string());
    }
    if progress {
        args.push("--progress".to_string());
    }
    args.push("--".to_string());
    args.push(url.to_string());
    args.push(path.to_string());
    args
}

/// Arguments for a full `git fetch` from a named remote. Always prunes.
/// The remote name is the last token.
pub fn fetch_args(
    network_args: &[String],
    remote: &str,
    progress: bool,
    recurse_submodules: bool,
) -> Vec<String> {
    let mut args: Vec<String> = network_args.to_vec();
    args.push("fetch".to_string());
    args.push("--prune".to_string());
    if progress {
        args.push("--progress".to_string());
    }
    if recurse_submodules {
        args.push("--recurse-submodules=on-demand".to_string());
    }
    args.push(remote.to_string());
    args
}

/// Arguments for fetching one explicit refspec. No prune and no
/// progress: this variant is used for targeted lookups where a missing
/// refspec is an expected outcome, not a transfer worth reporting.
pub fn fetch_refspec_args(network_args: &[String], remote: &str, refspec: &str) -> Vec<String> {
    let mut args: Vec<String> = network_args.to_vec();
    args.push("fetch".to_string());
    args.push(remote.to_string());
    args.push(refspec.to_string());
    args
}

/// Arguments for fast-forwarding a batch of local branches from their
/// already-fetched upstreams, by fetching from the repository itself.
///
/// `--verbose` makes git report every ref update on stderr and
/// `core.abbrev=no` keeps the object ids in that report unabbreviated so
/// the output parser gets full ids. Each pair is `<upstream>:<local>`.
pub fn fast_forward_args(ref_pairs: &[String]) -> Vec<String> {
    let mut args = vec![
        "-c".to_string(),
        "core.abbrev=no".to_string(),
        "fetch".to_string(),
        ".".to_string(),
        "--verbose".to_string(),
    ];
    args.extend(ref_pairs.iter().cloned());
    args
}

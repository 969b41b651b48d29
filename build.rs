// SPDX-License-Identifier: GPL-3.0-only

use std::process::Command;

fn main() {
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-changed=.git/refs/tags");

    // Packagers (flatpak, distro builds) can pin the version without a git checkout
    let version = std::env::var("VISIONSNAP_VERSION").unwrap_or_else(|_| git_version());

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

/// Version string derived from `git describe`.
///
/// - exactly on tag `v0.1.0` gives `0.1.0-<hash>`
/// - five commits after it gives `0.1.0-dirty-<hash>`
/// - no tags at all gives the short hash, or `unknown` outside a checkout
fn git_version() -> String {
    let described = run_git(&["describe", "--tags", "--always", "--match", "v*"]);
    let hash = run_git(&["rev-parse", "--short", "HEAD"]);

    let Some(described) = described else {
        return hash.unwrap_or_else(|| "unknown".to_string());
    };
    let described = described.strip_prefix('v').unwrap_or(&described);
    let hash = hash.unwrap_or_else(|| "unknown".to_string());

    let parts: Vec<&str> = described.rsplitn(3, '-').collect();
    match parts.as_slice() {
        [commit, _count, base] => {
            let commit = commit.strip_prefix('g').unwrap_or(commit);
            format!("{}-dirty-{}", base, commit)
        }
        _ if described == hash => hash,
        _ => format!("{}-{}", described, hash),
    }
}

fn run_git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

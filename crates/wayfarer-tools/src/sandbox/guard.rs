//! Path validation
//!
//! [`PathSandbox`] checks every path a tool is about to read or write against
//! an [`AccessPolicy`]. Validation is pure: it never creates, opens or
//! modifies anything, and it resolves the path afresh on every call.

use super::policy::{AccessPolicy, FileOperation};
use path_clean::PathClean;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use wayfarer_core::{Error, Result};

/// Immutable path guard built from an [`AccessPolicy`]
#[derive(Debug, Clone)]
pub struct PathSandbox {
    policy: AccessPolicy,
    allowed: Vec<PathBuf>,
    denied: Vec<PathBuf>,
    temp_dir: PathBuf,
}

impl PathSandbox {
    /// Build a sandbox, normalizing every configured prefix
    pub fn new(policy: AccessPolicy) -> Result<Self> {
        let allowed = normalize_prefixes(&policy.allowed_paths)?;
        let denied = normalize_prefixes(&policy.denied_paths)?;
        let temp_dir = resolve_best_effort(&std::env::temp_dir().clean());

        debug!(
            allowed = allowed.len(),
            denied = denied.len(),
            restrict_to_working_dir = policy.restrict_to_working_dir,
            allow_temp_dir = policy.allow_temp_dir,
            max_file_size = policy.max_file_size,
            "Path sandbox configured"
        );

        Ok(Self {
            policy,
            allowed,
            denied,
            temp_dir,
        })
    }

    /// Get the policy
    #[must_use]
    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Validate `path` for `operation` and return the resolved path
    ///
    /// Callers must perform the I/O on the returned path, not on the input.
    pub fn validate(&self, path: &str, operation: FileOperation) -> Result<PathBuf> {
        if path.trim().is_empty() {
            return Err(self.deny(path, operation, None, "empty path"));
        }

        let absolute = match absolutize(Path::new(path)) {
            Ok(p) => p,
            Err(_) => {
                return Err(self.deny(
                    path,
                    operation,
                    None,
                    "cannot determine the working directory",
                ))
            }
        };
        let Some(resolved) = resolve_links(&absolute, MAX_LINK_HOPS) else {
            return Err(self.deny(
                path,
                operation,
                None,
                "too many levels of symbolic links",
            ));
        };

        // The link's own location is checked as well as its destination
        if let Some(prefix) = self
            .denied
            .iter()
            .find(|d| is_within(&resolved, d) || is_within(&absolute, d))
        {
            let reason = format!("'{}' is a denied location", prefix.display());
            return Err(self.deny(path, operation, Some(&resolved), &reason));
        }

        if self.policy.restrict_to_working_dir {
            let cwd = match std::env::current_dir() {
                Ok(cwd) => resolve_best_effort(&cwd.clean()),
                Err(_) => {
                    return Err(self.deny(
                        path,
                        operation,
                        Some(&resolved),
                        "cannot determine the working directory",
                    ))
                }
            };
            if !is_within(&resolved, &cwd) {
                return Err(self.deny(
                    path,
                    operation,
                    Some(&resolved),
                    "outside the working directory",
                ));
            }
        } else if self.policy.has_allow_rules() {
            let in_temp = self.policy.allow_temp_dir && is_within(&resolved, &self.temp_dir);
            let in_allowed = self.allowed.iter().any(|a| is_within(&resolved, a));
            if !in_temp && !in_allowed {
                return Err(self.deny(
                    path,
                    operation,
                    Some(&resolved),
                    "not under any allowed location",
                ));
            }
        }

        debug!(
            original = %path,
            resolved = %resolved.display(),
            operation = %operation,
            "Path validated"
        );
        Ok(resolved)
    }

    /// Reject write payloads above the configured maximum (0 = unlimited)
    pub fn validate_size(&self, size: u64) -> Result<()> {
        let limit = self.policy.max_file_size;
        if limit > 0 && size > limit {
            warn!(size, limit, "Write payload exceeds size limit");
            return Err(Error::SizeExceeded { size, limit });
        }
        Ok(())
    }

    fn deny(
        &self,
        path: &str,
        operation: FileOperation,
        resolved: Option<&Path>,
        reason: &str,
    ) -> Error {
        warn!(
            original = %path,
            resolved = %resolved.map(|p| p.display().to_string()).unwrap_or_default(),
            operation = %operation,
            reason = %reason,
            "Path access denied"
        );
        Error::access_denied(path, reason)
    }
}

/// Clean `path` and anchor it at the current working directory
pub fn absolutize(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.clean())
    } else {
        Ok(std::env::current_dir()?.join(path).clean())
    }
}

/// Symlink hops followed before a path is treated as unresolvable
const MAX_LINK_HOPS: u32 = 40;

/// Resolve symlinks as far as the filesystem allows
///
/// Canonicalizes the full path when it exists. Otherwise walks up to the
/// nearest existing ancestor and re-appends the missing components, so a file
/// about to be created still resolves through symlinked parents. A missing
/// component that is itself a dangling symlink is replaced by its
/// destination, which is then resolved the same way. Falls back to the input
/// when nothing resolves. `path` must be absolute and clean.
pub fn resolve_best_effort(path: &Path) -> PathBuf {
    resolve_links(path, MAX_LINK_HOPS).unwrap_or_else(|| path.to_path_buf())
}

/// `None` when more than `hops` dangling links had to be followed
fn resolve_links(path: &Path, hops: u32) -> Option<PathBuf> {
    if let Ok(resolved) = std::fs::canonicalize(path) {
        return Some(resolved);
    }

    let mut missing = Vec::new();
    let mut current = path;
    while let Some(parent) = current.parent() {
        let Some(name) = current.file_name() else {
            break;
        };

        if let Some(destination) = dangling_link(current, parent, hops)? {
            return Some(rejoin(destination, &missing));
        }

        missing.push(name);
        current = parent;
        if let Ok(base) = std::fs::canonicalize(current) {
            return Some(rejoin(base, &missing));
        }
    }

    Some(path.to_path_buf())
}

/// Resolve `link` when it is a symlink that `canonicalize` could not follow
fn dangling_link(link: &Path, parent: &Path, hops: u32) -> Option<Option<PathBuf>> {
    let is_link = std::fs::symlink_metadata(link)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false);
    if !is_link {
        return Some(None);
    }
    if hops == 0 {
        return None;
    }
    let Ok(target) = std::fs::read_link(link) else {
        return Some(None);
    };

    let destination = if target.is_absolute() {
        target.clean()
    } else {
        resolve_links(parent, hops - 1)?.join(target).clean()
    };
    resolve_links(&destination, hops - 1).map(Some)
}

fn rejoin(base: PathBuf, missing: &[&std::ffi::OsStr]) -> PathBuf {
    missing
        .iter()
        .rev()
        .fold(base, |acc, component| acc.join(component))
}

/// Component-wise containment: `/var/foo` contains `/var/foo/x` but not `/var/foobar`
fn is_within(candidate: &Path, base: &Path) -> bool {
    candidate.starts_with(base)
}

fn normalize_prefixes(prefixes: &[String]) -> Result<Vec<PathBuf>> {
    prefixes
        .iter()
        .map(|prefix| {
            if prefix.trim().is_empty() {
                return Err(Error::InvalidInput(
                    "sandbox path prefixes must not be empty".to_string(),
                ));
            }
            let absolute = absolutize(Path::new(prefix))?;
            Ok(resolve_best_effort(&absolute))
        })
        .collect()
}

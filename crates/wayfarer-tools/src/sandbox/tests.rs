//! Tests for sandbox module

use super::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wayfarer_core::Error;

fn prefix(dir: &TempDir) -> String {
    dir.path().to_string_lossy().into_owned()
}

fn sandbox(policy: AccessPolicy) -> PathSandbox {
    PathSandbox::new(policy).unwrap()
}

#[test]
fn test_empty_path_rejected() {
    let sandbox = sandbox(AccessPolicy::unrestricted());
    assert!(matches!(
        sandbox.validate("", FileOperation::Read),
        Err(Error::AccessDenied { .. })
    ));
    assert!(sandbox.validate("   ", FileOperation::Write).is_err());
}

#[test]
fn test_traversal_resolves_before_matching() {
    let sandbox = sandbox(AccessPolicy::unrestricted().allow("/home/user/project"));

    let err = sandbox
        .validate("/home/user/project/../../etc/passwd", FileOperation::Read)
        .unwrap_err();
    assert!(matches!(err, Error::AccessDenied { .. }));

    #[cfg(target_os = "linux")]
    assert_eq!(
        resolve_best_effort(&absolutize(Path::new("/home/user/project/../../etc/passwd")).unwrap()),
        PathBuf::from("/etc/passwd")
    );
}

#[test]
fn test_prefix_matching_respects_directory_boundaries() {
    let sandbox = sandbox(AccessPolicy::unrestricted().allow("/home/user/project"));

    assert!(sandbox
        .validate("/home/user/project/data.txt", FileOperation::Write)
        .is_ok());
    assert!(sandbox
        .validate("/home/user/project", FileOperation::Read)
        .is_ok());
    assert!(sandbox
        .validate("/home/user/project2/data.txt", FileOperation::Write)
        .is_err());
}

#[test]
fn test_deny_wins_over_allow() {
    let dir = TempDir::new().unwrap();
    let secret = dir.path().join("secret");
    std::fs::create_dir(&secret).unwrap();

    let sandbox = sandbox(
        AccessPolicy::unrestricted()
            .allow(prefix(&dir))
            .deny(secret.to_string_lossy()),
    );

    let public = dir.path().join("public.txt");
    assert!(sandbox
        .validate(&public.to_string_lossy(), FileOperation::Write)
        .is_ok());

    let hidden = secret.join("keys.txt");
    let err = sandbox
        .validate(&hidden.to_string_lossy(), FileOperation::Read)
        .unwrap_err();
    assert!(err.to_string().contains("denied location"));
}

#[cfg(unix)]
#[test]
fn test_dangling_symlink_into_denied_location_is_rejected() {
    let allowed = TempDir::new().unwrap();
    let denied = TempDir::new().unwrap();
    let planted = denied.path().join("planted.txt");
    let link = allowed.path().join("evil.txt");
    std::os::unix::fs::symlink(&planted, &link).unwrap();

    let sandbox = sandbox(
        AccessPolicy::unrestricted()
            .allow(prefix(&allowed))
            .deny(prefix(&denied)),
    );

    let err = sandbox
        .validate(&link.to_string_lossy(), FileOperation::Write)
        .unwrap_err();
    assert!(err.to_string().contains("denied location"));
    assert!(!planted.exists());

    let canonical_denied = std::fs::canonicalize(denied.path()).unwrap();
    assert_eq!(
        resolve_best_effort(&link),
        canonical_denied.join("planted.txt")
    );
}

#[cfg(unix)]
#[test]
fn test_relative_dangling_symlink_resolves_to_destination() {
    let allowed = TempDir::new().unwrap();
    let outside = TempDir::new().unwrap();
    let link = allowed.path().join("out.txt");
    let outside_name = outside
        .path()
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned();
    let relative = PathBuf::from("..").join(outside_name).join("missing.txt");
    std::os::unix::fs::symlink(&relative, &link).unwrap();

    let sandbox = sandbox(AccessPolicy::unrestricted().allow(prefix(&allowed)));

    let err = sandbox
        .validate(&link.to_string_lossy(), FileOperation::Write)
        .unwrap_err();
    assert!(err.to_string().contains("not under any allowed location"));
}

#[cfg(unix)]
#[test]
fn test_symlink_loop_is_rejected() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    std::os::unix::fs::symlink(&b, &a).unwrap();
    std::os::unix::fs::symlink(&a, &b).unwrap();

    let sandbox = sandbox(AccessPolicy::unrestricted().allow(prefix(&dir)));

    let err = sandbox
        .validate(&a.to_string_lossy(), FileOperation::Write)
        .unwrap_err();
    assert!(err.to_string().contains("symbolic links"));
}

#[test]
fn test_deny_list_applies_without_allow_rules() {
    let sandbox = sandbox(AccessPolicy::unrestricted().deny("/etc"));

    assert!(sandbox.validate("/etc/hosts", FileOperation::Read).is_err());
    assert!(sandbox
        .validate("/etc/not-yet-created.conf", FileOperation::Write)
        .is_err());
}

#[test]
fn test_no_rules_allows_everything_not_denied() {
    let dir = TempDir::new().unwrap();
    let sandbox = sandbox(AccessPolicy::unrestricted());

    let target = dir.path().join("anything.bin");
    let resolved = sandbox
        .validate(&target.to_string_lossy(), FileOperation::Write)
        .unwrap();
    assert!(resolved.ends_with("anything.bin"));
}

#[test]
fn test_missing_target_falls_back_without_failing() {
    let dir = TempDir::new().unwrap();
    let sandbox = sandbox(AccessPolicy::unrestricted().allow(prefix(&dir)));

    let target = dir.path().join("new").join("nested").join("page.html");
    let resolved = sandbox
        .validate(&target.to_string_lossy(), FileOperation::Write)
        .unwrap();

    let canonical_dir = std::fs::canonicalize(dir.path()).unwrap();
    assert_eq!(resolved, canonical_dir.join("new/nested/page.html"));
    assert!(!target.exists());
}

#[cfg(unix)]
#[test]
fn test_symlink_escape_is_rejected() {
    let allowed = TempDir::new().unwrap();
    let outside = TempDir::new().unwrap();
    let link = allowed.path().join("escape");
    std::os::unix::fs::symlink(outside.path(), &link).unwrap();

    let sandbox = sandbox(AccessPolicy::unrestricted().allow(prefix(&allowed)));

    let through_link = link.join("loot.txt");
    assert!(sandbox
        .validate(&through_link.to_string_lossy(), FileOperation::Write)
        .is_err());
}

#[cfg(unix)]
#[test]
fn test_symlink_into_denied_location_is_rejected() {
    let dir = TempDir::new().unwrap();
    let denied = TempDir::new().unwrap();
    let link = dir.path().join("innocent");
    std::os::unix::fs::symlink(denied.path(), &link).unwrap();

    let sandbox = sandbox(
        AccessPolicy::unrestricted()
            .allow(prefix(&dir))
            .deny(prefix(&denied)),
    );

    let target = link.join("file.txt");
    let err = sandbox
        .validate(&target.to_string_lossy(), FileOperation::Write)
        .unwrap_err();
    assert!(err.to_string().contains("denied location"));
}

#[test]
fn test_working_dir_restriction() {
    let sandbox = sandbox(AccessPolicy::unrestricted().with_working_dir_only(true));

    assert!(sandbox.validate("Cargo.toml", FileOperation::Read).is_ok());
    assert!(sandbox
        .validate("./target/screenshots/shot.png", FileOperation::Write)
        .is_ok());
    assert!(sandbox
        .validate("../../../../../../outside.txt", FileOperation::Write)
        .is_err());
}

#[test]
fn test_working_dir_restriction_ignores_other_allow_rules() {
    let dir = TempDir::new().unwrap();
    let sandbox = sandbox(
        AccessPolicy::unrestricted()
            .with_working_dir_only(true)
            .with_temp_dir(true)
            .allow(prefix(&dir)),
    );

    let cwd = std::env::current_dir().unwrap();
    if !cwd.starts_with(dir.path()) {
        let target = dir.path().join("file.txt");
        assert!(sandbox
            .validate(&target.to_string_lossy(), FileOperation::Write)
            .is_err());
    }
}

#[test]
fn test_temp_dir_rule() {
    let dir = tempfile::Builder::new().tempdir_in(std::env::temp_dir()).unwrap();
    let target = dir.path().join("capture.png");

    let with_temp = sandbox(
        AccessPolicy::unrestricted()
            .with_temp_dir(true)
            .allow("/nonexistent/exports"),
    );
    assert!(with_temp
        .validate(&target.to_string_lossy(), FileOperation::Write)
        .is_ok());

    let without_temp = sandbox(AccessPolicy::unrestricted().allow("/nonexistent/exports"));
    assert!(without_temp
        .validate(&target.to_string_lossy(), FileOperation::Write)
        .is_err());
}

#[test]
fn test_validation_has_no_side_effects() {
    let dir = TempDir::new().unwrap();
    let sandbox = sandbox(AccessPolicy::unrestricted().allow(prefix(&dir)));

    let target = dir.path().join("dir").join("file.txt");
    sandbox
        .validate(&target.to_string_lossy(), FileOperation::Write)
        .unwrap();
    assert!(!dir.path().join("dir").exists());
}

#[test]
fn test_validate_size() {
    let limited = sandbox(AccessPolicy::unrestricted().with_max_file_size(1024));
    assert!(limited.validate_size(1024).is_ok());
    assert!(matches!(
        limited.validate_size(1025),
        Err(Error::SizeExceeded {
            size: 1025,
            limit: 1024
        })
    ));

    let unlimited = sandbox(AccessPolicy::unrestricted());
    assert!(unlimited.validate_size(u64::MAX).is_ok());
}

#[test]
fn test_empty_prefix_rejected_at_construction() {
    assert!(PathSandbox::new(AccessPolicy::unrestricted().allow("")).is_err());
}

mod common;

use std::path::Path;

use common::{MANIFEST, ZipBuilder, course_package};
use scormpack::{
    ExtractErrorKind, InstallError, InstallOptions, ResolveErrorKind, install, resolve_entry_point,
};

fn scratch() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("scormpack-install-")
        .tempdir()
        .expect("failed to create temp dir")
}

fn package_dirs(root: &Path) -> Vec<std::path::PathBuf> {
    match std::fs::read_dir(root) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

#[tokio::test]
async fn installs_into_a_fresh_directory() {
    let tmp = scratch();
    let zip = tmp.path().join("course.zip");
    course_package().write_to(&zip);
    let root = tmp.path().join("packages");

    let mut seen = Vec::new();
    let package = install(&zip, &root, &InstallOptions::default(), |entry| {
        seen.push(entry.file_name.clone())
    })
    .await
    .unwrap();

    assert_eq!(package.entry, "index.html");
    assert_eq!(package.dir, root.join(&package.id));
    assert!(package.dir.join("index.html").is_file());
    assert!(package.dir.join("assets/app.js").is_file());
    assert_eq!(
        seen,
        ["imsmanifest.xml", "index.html", "assets/", "assets/app.js"]
    );
}

#[tokio::test]
async fn each_install_gets_its_own_directory() {
    let tmp = scratch();
    let zip = tmp.path().join("course.zip");
    course_package().write_to(&zip);
    let root = tmp.path().join("packages");

    let first = install(&zip, &root, &InstallOptions::default(), |_| {})
        .await
        .unwrap();
    let second = install(&zip, &root, &InstallOptions::default(), |_| {})
        .await
        .unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(package_dirs(&root).len(), 2);
}

#[tokio::test]
async fn result_serializes_id_and_entry() {
    let tmp = scratch();
    let zip = tmp.path().join("course.zip");
    course_package().write_to(&zip);

    let package = install(&zip, &tmp.path().join("packages"), &InstallOptions::default(), |_| {})
        .await
        .unwrap();
    let json = serde_json::to_value(&package).unwrap();

    assert_eq!(json["id"], package.id.as_str());
    assert_eq!(json["entry"], "index.html");
    assert!(json.get("dir").is_none());
}

#[tokio::test]
async fn extracted_package_resolves_again() {
    let tmp = scratch();
    let zip = tmp.path().join("course.zip");
    course_package().write_to(&zip);

    let package = install(&zip, &tmp.path().join("packages"), &InstallOptions::default(), |_| {})
        .await
        .unwrap();

    assert_eq!(resolve_entry_point(&package.dir).await.unwrap(), "index.html");
}

#[tokio::test]
async fn traversal_fails_and_leaves_nothing_behind() {
    let tmp = scratch();
    let zip = tmp.path().join("evil.zip");
    course_package()
        .file("../../escaped.html", b"gotcha")
        .write_to(&zip);
    let root = tmp.path().join("packages");

    let err = install(&zip, &root, &InstallOptions::default(), |_| {})
        .await
        .unwrap_err();

    match err {
        InstallError::Extract(inner) => assert_eq!(inner.kind(), ExtractErrorKind::PathTraversal),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(package_dirs(&root).is_empty());
    assert!(!tmp.path().join("escaped.html").exists());
}

#[tokio::test]
async fn missing_manifest_removes_the_package_directory() {
    let tmp = scratch();
    let zip = tmp.path().join("bare.zip");
    ZipBuilder::new().file("index.html", b"<html/>").write_to(&zip);
    let root = tmp.path().join("packages");

    let err = install(&zip, &root, &InstallOptions::default(), |_| {})
        .await
        .unwrap_err();

    match err {
        InstallError::Resolve(inner) => {
            assert_eq!(inner.kind(), ResolveErrorKind::ManifestUnreadable)
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(package_dirs(&root).is_empty());
}

#[tokio::test]
async fn keep_failed_leaves_the_directory_for_inspection() {
    let tmp = scratch();
    let zip = tmp.path().join("no-entry.zip");
    ZipBuilder::new()
        .file("imsmanifest.xml", MANIFEST.as_bytes())
        .write_to(&zip);
    let root = tmp.path().join("packages");
    let options = InstallOptions { keep_failed: true };

    let err = install(&zip, &root, &options, |_| {}).await.unwrap_err();

    match err {
        InstallError::Resolve(inner) => {
            assert_eq!(inner.kind(), ResolveErrorKind::EntryPointMissing)
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let dirs = package_dirs(&root);
    assert_eq!(dirs.len(), 1);
    assert!(dirs[0].join("imsmanifest.xml").is_file());
}

#[tokio::test]
async fn unreadable_archive_creates_no_directory() {
    let tmp = scratch();
    let root = tmp.path().join("packages");

    let err = install(&tmp.path().join("missing.zip"), &root, &InstallOptions::default(), |_| {})
        .await
        .unwrap_err();

    match err {
        InstallError::Extract(inner) => assert_eq!(inner.kind(), ExtractErrorKind::OpenFailed),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!root.exists());
}

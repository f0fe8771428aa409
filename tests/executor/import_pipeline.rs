//! Import Pipeline Tests
//!
//! Imports real PNG files through the file-system image loader.

use crate::common::*;
use tropy::{Action, ImportReport, Output, TITLE};

async fn import(project: &TestProject, files: Vec<std::path::PathBuf>) -> ImportReport {
    match project
        .session
        .dispatch(Action::ItemImport { files, list: None })
        .await
        .unwrap()
    {
        Output::Imported(report) => report,
        other => panic!("Expected Imported output, got {:?}", other),
    }
}

// ============================================================================
// Decoding
// ============================================================================

#[tokio::test]
async fn imported_photo_carries_image_properties() {
    let project = TestProject::new();
    let path = project.scan("letter-1901.png", 10);

    let report = import(&project, vec![path.clone()]).await;
    assert_eq!(report.created.len(), 1);

    let item = project.item(report.created[0]);
    assert_eq!(item.photos.len(), 1);
    let photo = project.db().sequence(|view| view.photo(item.photos[0])).unwrap();
    assert_eq!(photo.path, path);
    assert_eq!(photo.mimetype, "image/png");
    assert_eq!((photo.width, photo.height), (8, 6));
    assert_eq!(photo.checksum.len(), 64);
    assert_eq!(photo.data[TITLE].text, "letter-1901");
    assert_eq!(item.template, project.session.context().config().default_template);
}

#[tokio::test]
async fn thumbnails_are_written_for_each_size() {
    let project = TestProject::new();
    let report = import(&project, vec![project.scan("a.png", 1)]).await;

    let photo = project.item(report.created[0]).photos[0];
    for size in &project.session.context().config().import.thumbnail_sizes {
        let thumb = project
            .cache_dir()
            .join(format!("{}_{}.jpg", photo.get(), size));
        assert!(thumb.exists(), "missing {}", thumb.display());
    }
}

#[tokio::test]
async fn undecodable_file_is_reported_and_batch_continues() {
    let project = TestProject::new();
    let bogus = project.dir.path().join("notes.png");
    std::fs::write(&bogus, b"not an image").unwrap();
    let missing = project.dir.path().join("missing.png");

    let report = import(
        &project,
        vec![bogus.clone(), project.scan("b.png", 2), missing.clone()],
    )
    .await;

    assert_eq!(report.created.len(), 1);
    let failed: Vec<_> = report.failures.iter().map(|f| f.path.clone()).collect();
    assert_eq!(failed, vec![bogus, missing]);
}

// ============================================================================
// Duplicates
// ============================================================================

#[tokio::test]
async fn reimporting_the_same_content_is_skipped() {
    let project = TestProject::new();
    let first = project.scan("a.png", 3);
    import(&project, vec![first.clone()]).await;

    // Same pixels under another name
    let copy = write_png(&project.dir.path().join("copies"), "a-copy.png", 3);
    let report = import(&project, vec![copy.clone(), project.scan("c.png", 4)]).await;

    assert_eq!(report.duplicates, vec![copy]);
    assert_eq!(report.created.len(), 1);
    assert_eq!(project.db().sequence(|view| view.item_ids().len()), 2);
}

#[tokio::test]
async fn import_undo_trashes_and_redo_restores() {
    let project = TestProject::new();
    let report = import(&project, vec![project.scan("a.png", 5), project.scan("b.png", 6)]).await;

    project.session.undo().await.unwrap();
    for id in &report.created {
        assert!(project.item(*id).is_deleted());
    }

    project.session.redo().await.unwrap();
    for id in &report.created {
        assert!(!project.item(*id).is_deleted());
    }
}

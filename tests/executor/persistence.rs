//! Persistence Tests
//!
//! Committed state survives a reopen; history and the projection do not.

use crate::common::*;
use tropy::{
    Action, Context, Database, DuplicatePolicy, MetadataValue, Output, ProjectConfig, SavePayload,
    Session, TITLE,
};

async fn import_one(project: &TestProject, name: &str, shade: u8) -> tropy::ItemId {
    match project
        .session
        .dispatch(Action::ItemImport {
            files: vec![project.scan(name, shade)],
            list: None,
        })
        .await
        .unwrap()
    {
        Output::Imported(report) => report.created[0],
        other => panic!("Expected Imported output, got {:?}", other),
    }
}

#[tokio::test]
async fn committed_changes_survive_reopen() {
    let project = TestProject::new();
    let id = import_one(&project, "a.png", 1).await;
    let tag = project.tag("correspondence");
    project
        .session
        .dispatch(Action::TagAdd {
            ids: vec![id],
            tags: vec![tag],
        })
        .await
        .unwrap();
    project
        .session
        .dispatch(Action::ItemSave {
            payload: SavePayload::Property {
                id: id.into(),
                property: TITLE.to_string(),
                value: Some(MetadataValue::text("Letter to Anna")),
            },
        })
        .await
        .unwrap();
    let version = project.db().version();
    let before = project.item(id);

    let project = project.reopen();

    assert_eq!(project.db().version(), version);
    let after = project.item(id);
    assert_eq!(after.photos, before.photos);
    assert_eq!(after.tags, before.tags);
    assert_eq!(after.data[TITLE].text, "Letter to Anna");
}

#[tokio::test]
async fn history_starts_empty_after_reopen() {
    let project = TestProject::new();
    import_one(&project, "a.png", 1).await;
    assert!(project.session.can_undo());

    let project = project.reopen();

    assert!(!project.session.can_undo());
    assert_eq!(project.session.undo().await.unwrap(), None);
    assert!(project.session.bus().select(|s| s.items.is_empty()));
}

#[tokio::test]
async fn load_fills_projection_without_history() {
    let project = TestProject::new();
    let id = import_one(&project, "a.png", 1).await;
    let project = project.reopen();

    let output = project
        .session
        .dispatch(Action::ItemLoad { ids: vec![id] })
        .await
        .unwrap();

    assert!(matches!(output, Output::Items(ref items) if items.len() == 1));
    assert!(project.session.bus().select(|s| s.items.contains_key(&id)));
    assert!(!project.session.can_undo());
}

#[tokio::test]
async fn ids_keep_counting_after_reopen() {
    let project = TestProject::new();
    let first = import_one(&project, "a.png", 1).await;

    let project = project.reopen();
    let second = import_one(&project, "b.png", 2).await;

    assert!(second > first);
}

#[tokio::test]
async fn duplicate_detection_sees_previous_sessions() {
    let project = TestProject::new();
    import_one(&project, "a.png", 9).await;
    let project = project.reopen();

    let report = match project
        .session
        .dispatch(Action::ItemImport {
            files: vec![project.scan("a.png", 9)],
            list: None,
        })
        .await
        .unwrap()
    {
        Output::Imported(report) => report,
        other => panic!("Expected Imported output, got {:?}", other),
    };
    assert_eq!(report.duplicates.len(), 1);
    assert!(report.created.is_empty());
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn default_config_file_is_created_on_first_open() {
    let dir = tempfile::TempDir::new().unwrap();
    let db = Database::open(dir.path()).unwrap();

    let path = dir.path().join(tropy::CONFIG_FILE_NAME);
    assert!(path.exists());
    assert_eq!(db.config(), &ProjectConfig::default());
}

#[tokio::test]
async fn edited_config_is_picked_up_on_reopen() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = ProjectConfig {
        history: tropy::HistoryConfig { depth: 2 },
        import: tropy::ImportConfig {
            duplicates: DuplicatePolicy::Import,
            ..Default::default()
        },
        ..ProjectConfig::default()
    };
    drop(Database::open_with_config(dir.path(), config.clone()).unwrap());

    let db = Database::open(dir.path()).unwrap();
    assert_eq!(db.config(), &config);

    let session = Session::new(Context::new(db));
    for _ in 0..4 {
        session
            .dispatch(Action::ItemCreate {
                template: None,
                list: None,
            })
            .await
            .unwrap();
    }
    assert_eq!(session.history_summary().past, 2);
}

#[test]
fn invalid_config_refuses_to_open() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(tropy::CONFIG_FILE_NAME),
        "[history]\ndepth = 0\n",
    )
    .unwrap();

    assert!(Database::open(dir.path()).is_err());
}

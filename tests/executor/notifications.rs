//! Notification Stream Tests
//!
//! What a subscriber attached to the bus sees while commands run.

use crate::common::*;
use tokio::sync::broadcast::Receiver;
use tropy::{Action, ActionType, ImportStatus, Notification};

fn drain(rx: &mut Receiver<Notification>) -> Vec<Notification> {
    let mut seen = Vec::new();
    while let Ok(n) = rx.try_recv() {
        seen.push(n);
    }
    seen
}

#[tokio::test]
async fn import_reports_progress_for_every_file_then_history() {
    let project = TestProject::new();
    let a = project.scan("a.png", 1);
    let dup = write_png(&project.dir.path().join("copies"), "a.png", 1);
    let mut rx = project.session.bus().subscribe();

    project
        .session
        .dispatch(Action::ItemImport {
            files: vec![a, dup],
            list: None,
        })
        .await
        .unwrap();

    let seen = drain(&mut rx);
    let progress: Vec<(usize, usize, &ImportStatus)> = seen
        .iter()
        .filter_map(|n| match n {
            Notification::ImportProgress {
                index,
                total,
                status,
                ..
            } => Some((*index, *total, status)),
            _ => None,
        })
        .collect();
    assert_eq!(progress.len(), 2);
    assert!(matches!(progress[0], (0, 2, ImportStatus::Imported { .. })));
    assert!(matches!(progress[1], (1, 2, ImportStatus::Duplicate { .. })));

    // Inserted before the first progress report
    let inserted = seen
        .iter()
        .position(|n| matches!(n, Notification::ItemsInserted(_)))
        .unwrap();
    let first_progress = seen
        .iter()
        .position(|n| matches!(n, Notification::ImportProgress { .. }))
        .unwrap();
    assert!(inserted < first_progress);

    match seen.last() {
        Some(Notification::HistoryChanged(summary)) => assert_eq!(summary.past, 1),
        other => panic!("Expected HistoryChanged last, got {:?}", other),
    }
}

#[tokio::test]
async fn failed_command_is_announced_without_state_changes() {
    let project = TestProject::new();
    let mut rx = project.session.bus().subscribe();

    let err = project
        .session
        .dispatch(Action::ItemMerge {
            ids: vec![tropy::ItemId(404), tropy::ItemId(405)],
        })
        .await
        .unwrap_err();

    let seen = drain(&mut rx);
    assert_eq!(seen.len(), 1);
    match &seen[0] {
        Notification::CommandFailed { action, reason } => {
            assert_eq!(*action, ActionType::ItemMerge);
            assert_eq!(reason, &err.to_string());
        }
        other => panic!("Expected CommandFailed, got {:?}", other),
    }
    assert!(project.session.bus().select(|s| s.items.is_empty()));
}

#[tokio::test]
async fn projection_follows_undo() {
    let project = TestProject::new();
    let created = project
        .session
        .dispatch(Action::ItemCreate {
            template: None,
            list: None,
        })
        .await
        .unwrap();
    let id = match created {
        tropy::Output::Item(item) => item.id,
        other => panic!("Expected Item output, got {:?}", other),
    };
    assert!(project
        .session
        .bus()
        .select(|s| !s.items[&id].is_deleted()));

    project.session.undo().await.unwrap();
    assert!(project.session.bus().select(|s| s.items[&id].is_deleted()));
    assert_eq!(project.session.bus().select(|s| s.history.future), 1);
}

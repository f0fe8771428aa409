//! Workflow Tests
//!
//! A cataloguing session: import scans, combine them into one item,
//! describe it, then walk the history back and forth.

use crate::common::*;
use tropy::{Action, Item, ItemId, MetadataValue, Output, SavePayload, TITLE};

async fn import_scans(project: &TestProject, count: u8) -> Vec<ItemId> {
    let files = (0..count)
        .map(|i| project.scan(&format!("page-{}.png", i), i * 20))
        .collect();
    match project
        .session
        .dispatch(Action::ItemImport { files, list: None })
        .await
        .unwrap()
    {
        Output::Imported(report) => report.created,
        other => panic!("Expected Imported output, got {:?}", other),
    }
}

fn snapshot(project: &TestProject, ids: &[ItemId]) -> Vec<Item> {
    project.db().sequence(|view| view.items(ids)).unwrap()
}

#[tokio::test]
async fn describe_merged_letter_then_undo_everything() {
    let project = TestProject::new();
    let pages = import_scans(&project, 3).await;
    let tag = project.tag("letters");
    let list = project.list("Box 12");
    let imported = snapshot(&project, &pages);

    let merged = match project
        .session
        .dispatch(Action::ItemMerge { ids: pages.clone() })
        .await
        .unwrap()
    {
        Output::Item(item) => item,
        other => panic!("Expected Item output, got {:?}", other),
    };
    assert_eq!(merged.id, pages[0]);
    assert_eq!(merged.photos.len(), 3);

    let commands = vec![
        Action::TagToggle {
            id: merged.id,
            tags: vec![tag],
        },
        Action::ListItemsAdd {
            list,
            items: vec![merged.id],
        },
        Action::ItemSave {
            payload: SavePayload::Property {
                id: merged.id.into(),
                property: TITLE.to_string(),
                value: Some(MetadataValue::text("Letter, 3 pages")),
            },
        },
        Action::NoteCreate {
            photo: merged.photos[1],
            text: "Postmark illegible".to_string(),
        },
    ];
    for action in commands {
        project.session.dispatch(action).await.unwrap();
    }

    let described = project.item(merged.id);
    assert!(described.tags.contains(&tag));
    assert!(described.lists.contains(&list));
    assert_eq!(described.data[TITLE].text, "Letter, 3 pages");
    assert_eq!(project.session.history_summary().past, 6);

    // Back to right after the import
    for _ in 0..5 {
        assert!(project.session.undo().await.unwrap().is_some());
    }
    let restored = snapshot(&project, &pages);
    for (before, after) in imported.iter().zip(&restored) {
        assert_eq!(after.photos, before.photos);
        assert_eq!(after.tags, before.tags);
        assert_eq!(after.lists, before.lists);
        assert_eq!(after.data, before.data);
        assert_eq!(after.deleted, None);
    }
    assert!(project
        .db()
        .sequence(|view| view.notes_of(merged.photos[1]))
        .is_empty());

    // And forward again
    for _ in 0..5 {
        project.session.redo().await.unwrap();
    }
    let redone = project.item(merged.id);
    assert_eq!(redone.photos, merged.photos);
    assert_eq!(redone.data[TITLE].text, "Letter, 3 pages");
    assert!(!project.session.can_redo());
}

#[tokio::test]
async fn explode_and_implode_pages() {
    let project = TestProject::new();
    let pages = import_scans(&project, 3).await;
    project
        .session
        .dispatch(Action::ItemMerge { ids: pages.clone() })
        .await
        .unwrap();
    let letter = project.item(pages[0]);

    let created = match project
        .session
        .dispatch(Action::ItemExplode {
            id: letter.id,
            photos: None,
            items: None,
        })
        .await
        .unwrap()
    {
        Output::Items(items) => items,
        other => panic!("Expected Items output, got {:?}", other),
    };
    assert_eq!(created.len(), 2);
    assert_eq!(project.item(letter.id).photos, vec![letter.photos[0]]);
    for (item, photo) in created.iter().zip(&letter.photos[1..]) {
        assert_eq!(item.photos, vec![*photo]);
        assert_eq!(item.template, letter.template);
    }

    project.session.undo().await.unwrap();
    assert_eq!(project.item(letter.id).photos, letter.photos);
    for item in &created {
        assert!(project.item(item.id).is_deleted());
    }
}

#[tokio::test]
async fn new_command_after_undo_discards_redo() {
    let project = TestProject::new();
    let pages = import_scans(&project, 2).await;
    let tag = project.tag("draft");

    project
        .session
        .dispatch(Action::TagAdd {
            ids: pages.clone(),
            tags: vec![tag],
        })
        .await
        .unwrap();
    project.session.undo().await.unwrap();
    assert!(project.session.can_redo());

    project
        .session
        .dispatch(Action::TagToggle {
            id: pages[0],
            tags: vec![tag],
        })
        .await
        .unwrap();
    assert!(!project.session.can_redo());
}

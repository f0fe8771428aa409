//! Atomicity Tests
//!
//! A transaction that returns an error leaves no trace, in memory or in
//! `project.json`.

use proptest::prelude::*;
use tempfile::TempDir;
use tropy::{Database, Error, ItemId, Metadata, TagId, TemplateId, DEFAULT_TEMPLATE};

fn generic() -> TemplateId {
    TemplateId::new(DEFAULT_TEMPLATE)
}

fn create_items(db: &Database, n: usize) -> Vec<ItemId> {
    db.transaction::<_, _, Error>(|tx| {
        (0..n)
            .map(|_| tx.create_item(&generic(), Metadata::new()).map_err(Error::from))
            .collect()
    })
    .unwrap()
}

#[test]
fn failed_transaction_writes_nothing() {
    let db = Database::cache();
    let items = create_items(&db, 2);
    let version = db.version();

    let err = db
        .transaction::<_, (), Error>(|tx| {
            let tag = tx.create_tag("partial")?;
            tx.add_tags(items[0], &[tag])?;
            tx.add_tags(items[1], &[TagId(999)])?;
            Ok(())
        })
        .unwrap_err();

    assert!(matches!(err, Error::NotFound { .. }));
    assert_eq!(db.version(), version);
    db.sequence(|view| {
        assert!(view.all_tags().is_empty());
        assert!(view.tags_of(items[0]).is_empty());
    });
    let stats = db.stats();
    assert_eq!(stats.total_committed, 1);
    assert_eq!(stats.total_aborted, 1);
}

#[test]
fn failed_transaction_leaves_snapshot_file_untouched() {
    let dir = TempDir::new().unwrap();
    let db = Database::open(dir.path()).unwrap();
    create_items(&db, 1);
    let snapshot = dir.path().join(tropy::SNAPSHOT_FILE_NAME);
    let on_disk = std::fs::read(&snapshot).unwrap();

    let _ = db.transaction::<_, (), Error>(|tx| {
        tx.create_item(&generic(), Metadata::new())?;
        Err(Error::invalid_input("changed my mind"))
    });

    assert_eq!(std::fs::read(&snapshot).unwrap(), on_disk);
    drop(db);
    let db = Database::open(dir.path()).unwrap();
    assert_eq!(db.sequence(|view| view.item_ids().len()), 1);
}

#[test]
fn unknown_template_is_rejected() {
    let db = Database::cache();
    let result = db.transaction::<_, _, Error>(|tx| {
        Ok(tx.create_item(&TemplateId::new("https://example.org/unknown"), Metadata::new())?)
    });
    assert!(result.is_err());
    assert!(db.sequence(|view| view.item_ids().is_empty()));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_aborted_batches_never_change_committed_items(
        batches in proptest::collection::vec((1usize..4, any::<bool>()), 1..10),
    ) {
        let db = Database::cache();
        let mut expected = 0;

        for (count, fail) in batches {
            let _ = db.transaction::<_, (), Error>(|tx| {
                for _ in 0..count {
                    tx.create_item(&generic(), Metadata::new())?;
                }
                if fail {
                    return Err(Error::invalid_input("abort"));
                }
                Ok(())
            });
            if !fail {
                expected += count;
            }
            prop_assert_eq!(db.sequence(|view| view.item_ids().len()), expected);
        }
    }
}

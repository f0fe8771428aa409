//! Snapshot Isolation Tests
//!
//! A view keeps showing the state it was taken at.

use std::sync::Arc;
use std::thread;

use tropy::{Database, Error, Metadata, TemplateId, DEFAULT_TEMPLATE};

fn create_item(db: &Database) -> tropy::ItemId {
    db.transaction::<_, _, Error>(|tx| {
        Ok(tx.create_item(&TemplateId::new(DEFAULT_TEMPLATE), Metadata::new())?)
    })
    .unwrap()
}

#[test]
fn view_does_not_see_later_commits() {
    let db = Database::cache();
    let first = create_item(&db);
    let view = db.view();

    create_item(&db);

    assert_eq!(view.item_ids(), vec![first]);
    assert_eq!(view.version(), 1);
    assert_eq!(db.view().item_ids().len(), 2);
    assert_eq!(db.version(), 2);
}

#[test]
fn readers_never_see_half_a_transaction() {
    let db = Database::cache();
    let writer = {
        let db = Arc::clone(&db);
        thread::spawn(move || {
            for _ in 0..50 {
                db.transaction::<_, _, Error>(|tx| {
                    let template = TemplateId::new(DEFAULT_TEMPLATE);
                    tx.create_item(&template, Metadata::new())?;
                    tx.create_item(&template, Metadata::new())?;
                    Ok(())
                })
                .unwrap();
            }
        })
    };

    for _ in 0..200 {
        let count = db.sequence(|view| view.item_ids().len());
        assert_eq!(count % 2, 0, "observed a partial commit");
    }
    writer.join().unwrap();
    assert_eq!(db.sequence(|view| view.item_ids().len()), 100);
}

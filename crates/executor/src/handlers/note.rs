//! Note handlers.

use tropy_core::{NoteId, PhotoId};

use crate::action::Action;
use crate::command::Outcome;
use crate::context::Context;
use crate::handlers::require_ids;
use crate::notification::Notification;
use crate::output::Output;
use crate::{Error, Result};

/// Handle NoteCreate.
pub async fn create(ctx: &Context, photo: PhotoId, text: String) -> Result<Outcome> {
    if text.trim().is_empty() {
        return Err(Error::invalid_input("note text must not be empty"));
    }

    let note = ctx.db.transaction(|tx| -> Result<_> {
        let id = tx.create_note(photo, text.as_str())?;
        Ok(tx.note(id)?)
    })?;

    let ids = vec![note.id];
    ctx.bus.emit(Notification::NotesUpdated(vec![note.clone()]));
    Ok(Outcome::new(Output::Note(note))
        .with_undo(Action::NoteDelete { ids: ids.clone() })
        .with_redo(Action::NoteRestore { ids }))
}

/// Handle NoteDelete.
pub async fn delete(ctx: &Context, ids: Vec<NoteId>) -> Result<Outcome> {
    require_ids(&ids, "notes")?;

    let (changed, notes) = ctx.db.transaction(|tx| -> Result<_> {
        let changed = tx.delete_notes(&ids)?;
        let notes = ids.iter().map(|id| tx.note(*id)).collect::<tropy_core::Result<Vec<_>>>()?;
        Ok((changed, notes))
    })?;

    ctx.bus.emit(Notification::NotesUpdated(notes.clone()));
    let undo = (!changed.is_empty()).then(|| Action::NoteRestore { ids: changed });
    Ok(Outcome::new(Output::Notes(notes)).with_undo_opt(undo))
}

/// Handle NoteRestore.
pub async fn restore(ctx: &Context, ids: Vec<NoteId>) -> Result<Outcome> {
    require_ids(&ids, "notes")?;

    let (changed, notes) = ctx.db.transaction(|tx| -> Result<_> {
        let changed = tx.restore_notes(&ids)?;
        let notes = ids.iter().map(|id| tx.note(*id)).collect::<tropy_core::Result<Vec<_>>>()?;
        Ok((changed, notes))
    })?;

    ctx.bus.emit(Notification::NotesUpdated(notes.clone()));
    let undo = (!changed.is_empty()).then(|| Action::NoteDelete { ids: changed });
    Ok(Outcome::new(Output::Notes(notes)).with_undo_opt(undo))
}

//! Import handler.
//!
//! Files are processed strictly in order, one transaction each:
//!
//! ```text
//! for each file:
//!   decode         (suspends on the image loader)
//!   duplicate?     checksum lookup in the committed tables
//!   transaction    item + photo (+ list membership)
//!   thumbnails     (suspends; failures are logged only)
//!   notify         ItemsInserted, PhotosUpdated
//!   progress       ImportProgress, also for duplicates and failures
//! ```
//!
//! A failing file never aborts the batch. The undo removes exactly the
//! items that were created.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use tropy_core::{ItemId, ListId, PhotoId};
use tropy_storage::{DuplicatePolicy, NewPhoto};

use crate::action::Action;
use crate::collaborators::DecodedImage;
use crate::command::Outcome;
use crate::context::Context;
use crate::handlers::require_ids;
use crate::notification::{ImportStatus, Notification};
use crate::output::{ImportFailure, ImportReport, Output};
use crate::{Error, Result};

/// Handle ItemImport.
pub async fn import(ctx: &Context, files: Vec<PathBuf>, list: Option<ListId>) -> Result<Outcome> {
    require_ids(&files, "files")?;
    if let Some(list) = list {
        ctx.db.sequence(|view| view.list(list))?;
    }

    let total = files.len();
    let mut report = ImportReport::default();

    for (index, path) in files.into_iter().enumerate() {
        let status = match import_file(ctx, &path, list).await {
            Ok((item, photo)) => {
                report.created.push(item);
                debug!(target: "tropy::import", path = %path.display(), %item, %photo, "Imported");
                ImportStatus::Imported { item }
            }
            Err(Error::Duplicate { photo, .. }) => {
                info!(target: "tropy::import", path = %path.display(), %photo, "Skipping duplicate");
                report.duplicates.push(path.clone());
                ImportStatus::Duplicate { photo }
            }
            Err(e) => {
                warn!(target: "tropy::import", path = %path.display(), error = %e, "Import failed");
                let reason = e.to_string();
                report.failures.push(ImportFailure {
                    path: path.clone(),
                    reason: reason.clone(),
                });
                ImportStatus::Failed { reason }
            }
        };
        ctx.bus.emit(Notification::ImportProgress {
            index,
            total,
            path,
            status,
        });
    }

    info!(
        target: "tropy::import",
        created = report.created.len(),
        duplicates = report.duplicates.len(),
        failures = report.failures.len(),
        "Import finished"
    );

    let created = report.created.clone();
    let mut outcome = Outcome::new(Output::Imported(report));
    if !created.is_empty() {
        outcome = outcome
            .with_undo(Action::ItemDelete {
                ids: created.clone(),
            })
            .with_redo(Action::ItemRestore { ids: created });
    }
    Ok(outcome)
}

/// Import one file; fails with `Error::Duplicate` when its content is
/// already in the project and duplicates are skipped
async fn import_file(
    ctx: &Context,
    path: &Path,
    list: Option<ListId>,
) -> Result<(ItemId, PhotoId)> {
    let image = ctx.images.load(path).await?;
    let policy = ctx.config().import.duplicates;
    let template = ctx.config().default_template.clone();

    if policy == DuplicatePolicy::Skip {
        let existing = ctx
            .db
            .sequence(|view| view.find_photo_by_checksum(&image.checksum));
        if let Some(photo) = existing {
            return Err(Error::Duplicate {
                path: path.to_path_buf(),
                photo,
            });
        }
    }

    let (item, photo) = ctx.db.transaction(|tx| -> Result<_> {
        let defaults = tx.template(&template)?.defaults();
        let item = tx.create_item(&template, defaults)?;
        let photo = tx.create_photo(new_photo(item, &image))?;
        if let Some(list) = list {
            tx.add_to_list(list, &[item])?;
        }
        Ok((tx.item(item)?, tx.photo(photo)?))
    })?;

    match ctx.images.thumbnails(photo.id, &image).await {
        Ok(written) => {
            debug!(target: "tropy::import", photo = %photo.id, count = written.len(), "Thumbnails written")
        }
        Err(e) => {
            warn!(target: "tropy::import", photo = %photo.id, error = %e, "Thumbnail generation failed")
        }
    }

    let ids = (item.id, photo.id);
    ctx.bus.emit(Notification::ItemsInserted(vec![item]));
    ctx.bus.emit(Notification::PhotosUpdated(vec![photo]));
    Ok(ids)
}

fn new_photo(item: ItemId, image: &DecodedImage) -> NewPhoto {
    NewPhoto {
        item,
        path: image.path.clone(),
        checksum: image.checksum.clone(),
        mimetype: image.mimetype.clone(),
        width: image.width,
        height: image.height,
        data: image.data.clone(),
    }
}

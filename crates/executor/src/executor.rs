//! The Executor - single entry point to the command handlers.
//!
//! The Executor is a stateless dispatcher that routes actions to the
//! appropriate handler and returns its [`Outcome`]. History and failure
//! reporting live one level up, in the [`Session`](crate::Session).

use tracing::debug;

use crate::action::{Action, Meta};
use crate::command::Outcome;
use crate::context::Context;
use crate::handlers;
use crate::Result;

/// The command executor.
///
/// The Executor is **stateless**: it holds the execution context but
/// maintains no state of its own. All state lives in the store and the bus.
///
/// # Thread Safety
///
/// Executor is `Send + Sync` and can be shared across tasks.
///
/// # Example
///
/// ```ignore
/// use tropy_executor::{Action, Context, Database, Executor, Meta};
///
/// let executor = Executor::new(Context::new(Database::cache()));
/// let outcome = executor
///     .execute(Action::ItemCreate { template: None, list: None }, &Meta::default())
///     .await?;
/// assert!(outcome.undo.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct Executor {
    ctx: Context,
}

impl Executor {
    /// Create a new executor over an execution context.
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    /// The execution context.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Execute a single action.
    ///
    /// Returns the handler's outcome or an error. A failed action has
    /// committed nothing.
    pub async fn execute(&self, action: Action, meta: &Meta) -> Result<Outcome> {
        let ctx = &self.ctx;
        debug!(target: "tropy::dispatch", action = %action.action_type(), "Executing");

        match action {
            // Item lifecycle
            Action::ItemCreate { template, list } => {
                handlers::item::create(ctx, template, list).await
            }
            Action::ItemDelete { ids } => handlers::item::delete(ctx, ids).await,
            Action::ItemRestore { ids } => handlers::item::restore(ctx, ids).await,
            Action::ItemDestroy { ids } => handlers::item::destroy(ctx, ids, meta).await,
            Action::ItemLoad { ids } => handlers::item::load(ctx, ids).await,

            // Merge / split
            Action::ItemMerge { ids } => handlers::merge::merge(ctx, ids).await,
            Action::ItemSplit {
                item,
                items,
                data,
                lists,
                tags,
            } => handlers::merge::split(ctx, item, items, data, lists, tags).await,

            // Explode / implode
            Action::ItemExplode { id, photos, items } => {
                handlers::explode::explode(ctx, id, photos, items).await
            }
            Action::ItemImplode { item, items, order } => {
                handlers::explode::implode(ctx, item, items, order).await
            }

            // Import and save
            Action::ItemImport { files, list } => handlers::import::import(ctx, files, list).await,
            Action::ItemSave { payload } => handlers::save::save(ctx, payload).await,

            // Photos
            Action::PhotoDelete { ids } => handlers::photo::delete(ctx, ids).await,
            Action::PhotoRestore { ids } => handlers::photo::restore(ctx, ids).await,

            // Tags
            Action::TagAdd { ids, tags } => handlers::tag::add(ctx, ids, tags).await,
            Action::TagRemove { ids, tags } => handlers::tag::remove(ctx, ids, tags).await,
            Action::TagSet { items } => handlers::tag::set(ctx, items).await,
            Action::TagToggle { id, tags } => handlers::tag::toggle(ctx, id, tags).await,
            Action::TagClear { id } => handlers::tag::clear(ctx, id).await,

            // Lists
            Action::ListItemsAdd { list, items } => handlers::list::add(ctx, list, items).await,
            Action::ListItemsRemove { list, items } => {
                handlers::list::remove(ctx, list, items).await
            }

            // Notes
            Action::NoteCreate { photo, text } => handlers::note::create(ctx, photo, text).await,
            Action::NoteDelete { ids } => handlers::note::delete(ctx, ids).await,
            Action::NoteRestore { ids } => handlers::note::restore(ctx, ids).await,
        }
    }
}

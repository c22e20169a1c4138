//! # Organize Module
//!
//! Moves files into folders without ever overwriting anything, and keeps
//! a short history so recent moves can be reversed.
//!
//! - [`conflict`]: picks a free destination name (`photo_1.jpg`, ...)
//! - [`mover`]: moves one file, falling back to copy + verify + remove
//! - [`ledger`]: bounded undo stack of recorded moves
//! - [`shortcuts`]: key to folder bindings stored as JSON
//! - [`Classifier`]: ties the above together for interactive sorting
//!
//! ## Example
//! ```rust,ignore
//! use media_tidy::core::organize::{Classifier, ShortcutStore};
//!
//! let classifier = Classifier::new(ShortcutStore::default_location()?);
//! classifier.move_by_shortcut(Path::new("/photos/IMG_0001.jpg"), 's')?;
//! classifier.undo_last_move()?;
//! ```

pub mod conflict;
pub mod ledger;
pub mod mover;
pub mod shortcuts;

mod classifier;

pub use classifier::{Classifier, ClassifierConfig};
pub use conflict::{resolve, ConflictPolicy};
pub use ledger::{MoveRecord, UndoLedger};
pub use mover::{move_file, relocate, soft_delete, DELETE_DIR};
pub use shortcuts::{default_shortcuts, resolve_target_dir, ShortcutConfig, ShortcutStore};

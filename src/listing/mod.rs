//! Unpublished entries board: columns per status with draggable cards

pub mod board;
pub mod dnd;

pub use board::{Confirm, ListingCard, ListingColumn, ListingIntent, UnpublishedListing};
pub use dnd::{DragSource, DropTarget, DND_NAMESPACE};

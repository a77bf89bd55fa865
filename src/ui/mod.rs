//! Framework-independent view-models for shared UI pieces

pub mod card;
pub mod toolbar;

pub use card::Card;
pub use toolbar::{EditorComponent, MenuItem, ToolbarButton, ToolbarComponentsMenu, ToolbarMenuView};

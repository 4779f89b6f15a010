//! Page and card model

pub mod card_actions;
pub mod card_id;
mod page_manager;

pub use card_actions::{AddCardRequest, AddedCards, EntityCardType};
pub use page_manager::PageManager;
pub(crate) use page_manager::{usable_grid_gap, usable_header_scale};

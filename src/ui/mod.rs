//! Layout resolution for the dashboard grid

pub mod responsive;
pub mod viewport;

pub use responsive::{resolve, GridLayout};
pub use viewport::{ResizeSubscription, ResponsiveGrid, Viewport};

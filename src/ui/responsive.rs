//! Responsive grid layout.
//!
//! Maps the viewport width and the user's column preference to the column
//! count and the mobile/compact flags used by the dashboard grid.

use tunet_core::constants::{
    COMPACT_MAX_WIDTH, COMPACT_MIN_WIDTH, DESKTOP_MIN_WIDTH, DYNAMIC_MAX_COLUMNS,
    MOBILE_BREAKPOINT, SMALL_MIN_WIDTH, TABLET_MIN_WIDTH, TABLET_PORTRAIT_MAX_WIDTH,
};

/// Resolved grid layout for one viewport width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub column_count: u32,
    pub is_mobile: bool,
    pub is_compact_cards: bool,
}

/// Resolve the grid layout for `width` pixels.
///
/// `max_columns` is the user's preferred column count. Dynamic mode caps
/// wide screens at 4 columns and drops a 4-column preference to 3 on
/// tablets in portrait.
pub fn resolve(width: u32, max_columns: u32, dynamic: bool) -> GridLayout {
    let max_columns = max_columns.max(1);
    let mut column_count = if width >= DESKTOP_MIN_WIDTH {
        max_columns
    } else if width >= TABLET_MIN_WIDTH {
        max_columns.min(4)
    } else if width >= SMALL_MIN_WIDTH {
        max_columns.min(3)
    } else {
        max_columns.min(2)
    };

    if dynamic {
        if max_columns == 4 && (TABLET_MIN_WIDTH..TABLET_PORTRAIT_MAX_WIDTH).contains(&width) {
            column_count = column_count.min(3);
        }
        column_count = column_count.min(DYNAMIC_MAX_COLUMNS);
    }

    GridLayout {
        column_count,
        is_mobile: width < MOBILE_BREAKPOINT,
        is_compact_cards: (COMPACT_MIN_WIDTH..COMPACT_MAX_WIDTH).contains(&width),
    }
}

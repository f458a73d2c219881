//! Configuration constants for the picture battle engine
//!
//! This module contains the default timings of a round and the limits
//! used to validate host supplied options and category catalogs.

/// Round timing defaults and limits
pub mod round {
    /// Seconds each player starts a round with
    pub const INITIAL_TIME: u64 = 45;
    /// Smallest allowed starting time in seconds
    pub const MIN_INITIAL_TIME: u64 = 1;
    /// Largest allowed starting time in seconds
    pub const MAX_INITIAL_TIME: u64 = 3600;

    /// Milliseconds between two clock ticks
    pub const TICK_INTERVAL_MS: u64 = 1000;
    /// Smallest allowed tick interval in milliseconds
    pub const MIN_TICK_INTERVAL_MS: u64 = 100;
    /// Largest allowed tick interval in milliseconds
    pub const MAX_TICK_INTERVAL_MS: u64 = 10_000;

    /// Milliseconds during which scoring is frozen after a skip
    pub const SKIP_COOLDOWN_MS: u64 = 3000;
    /// Largest allowed skip cooldown in milliseconds
    pub const MAX_SKIP_COOLDOWN_MS: u64 = 60_000;
}

/// Category catalog limits
pub mod catalog {
    /// Maximum number of categories in one catalog
    pub const MAX_CATEGORY_COUNT: usize = 200;
    /// Maximum length of a category name
    pub const MAX_NAME_LENGTH: usize = 100;
    /// Maximum number of items in one category
    pub const MAX_ITEM_COUNT: usize = 500;
    /// Maximum length of an item identifier
    pub const MAX_ITEM_LENGTH: usize = 2048;
}

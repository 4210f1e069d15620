//! Ordering tiers for extensions and listeners
//!
//! Pipelines sort extensions and listeners ascending by order. Ties keep
//! registration order.

/// Runs before everything else
pub const EARLY: i32 = -10_000;

/// Runs after `EARLY`, before the default tier
pub const MID_EARLY: i32 = -5_000;

/// Default order for extensions and listeners
pub const MIDDLE: i32 = 0;

/// Runs after the default tier, before `LATE`
pub const MID_LATE: i32 = 5_000;

/// Runs after everything else
pub const LATE: i32 = 10_000;

/// Get all named ordering tiers, ascending
pub fn all_tiers() -> [(&'static str, i32); 5] {
    [
        ("EARLY", EARLY),
        ("MID_EARLY", MID_EARLY),
        ("MIDDLE", MIDDLE),
        ("MID_LATE", MID_LATE),
        ("LATE", LATE),
    ]
}

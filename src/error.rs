/*
Davenstein - by David Petnick
*/
use thiserror::Error;

use crate::style::ObjectCategory;

/// Failures Raised by Automap Setup + Lookups
/// None of These are Transient, They Point at Authoring / Logic Bugs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutomapError {
    /// Style Rule Table Full, New Key Could Not be Inserted
    #[error("style rule table is full ({capacity} entries), cannot register special {special}")]
    Capacity { capacity: usize, special: i32 },

    /// Category Has no Line Style (Things, Player Arrows)
    #[error("no line style for object category {0:?}")]
    UnknownCategory(ObjectCategory),

    /// Marked Point Index Outside Store
    #[error("marked point index {index} out of range (have {len})")]
    UnknownIndex { index: usize, len: usize },
}

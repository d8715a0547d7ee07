//! Top-coding rules for ACS contract rent estimates.
//!
//! The ACS caps imputed contract rent. Through the 2014 data year the top
//! bin is "$2000 or more" and a capped tract is reported as 2001; from 2015
//! on the cap moved to "$3500 or more", reported as 3501. A value equal to a
//! sentinel means the true figure is above the cap, so it is displayed as
//! "not available" rather than as an exact amount.
//!
//! [`sanitize`] is a pure function of `(raw value, year)`. It never touches
//! the raw number, which stays available for the map's colour scale.

use crate::types::Year;

/// Display string for a missing estimate.
pub const NOT_AVAILABLE: &str = "Not Available!";

/// Last data year that used the $2000 cap.
pub const LAST_LEGACY_CAP_YEAR: Year = 2014;

/// A top-coding sentinel and the cap it stands for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopCode {
    /// Value the survey reports for a capped tract.
    pub sentinel: f64,
    /// Published cap, in dollars.
    pub cap: u32,
}

const LEGACY_CAPS: &[TopCode] = &[
    TopCode {
        sentinel: 2001.0,
        cap: 2000,
    },
    TopCode {
        sentinel: 3501.0,
        cap: 3500,
    },
];

const CURRENT_CAPS: &[TopCode] = &[TopCode {
    sentinel: 3501.0,
    cap: 3500,
}];

/// Top-coding sentinels in force for `year`.
pub fn caps_for(year: Year) -> &'static [TopCode] {
    if year <= LAST_LEGACY_CAP_YEAR {
        LEGACY_CAPS
    } else {
        CURRENT_CAPS
    }
}

/// Convert a raw estimate into its display string.
///
/// - `None` (or a non-finite value) → `"Not Available!"`
/// - a sentinel for `year` → `"Not available. Exceeds $<cap>!"`
/// - anything else → `"$"` followed by the value rounded to an integer
///
/// # Examples
///
/// ```
/// use rentmap_core::sanitize;
///
/// assert_eq!(sanitize(None, 2020), "Not Available!");
/// assert_eq!(sanitize(Some(3501.0), 2020), "Not available. Exceeds $3500!");
/// assert_eq!(sanitize(Some(2001.0), 2012), "Not available. Exceeds $2000!");
/// assert_eq!(sanitize(Some(2001.0), 2020), "$2001");
/// assert_eq!(sanitize(Some(1500.0), 2020), "$1500");
/// ```
pub fn sanitize(raw: Option<f64>, year: Year) -> String {
    let Some(value) = raw.filter(|v| v.is_finite()) else {
        return NOT_AVAILABLE.to_string();
    };

    if let Some(code) = caps_for(year).iter().find(|code| code.sentinel == value) {
        return format!("Not available. Exceeds ${}!", code.cap);
    }

    // Adding 0.0 turns -0.0 into 0.0 so small negatives print "$0".
    format!("${:.0}", value.round() + 0.0)
}

// ============================================================================
// Tests
// ============================================================================

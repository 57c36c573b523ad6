//! Layout geometry for screen groups.
//!
//! A screen group is measured in *geometry units*: a `single` device counts as
//! one unit, a `double` device as two.  A *layout* splits those units into
//! content slots, e.g. `[1, 2]` on a three-unit group means one slot covering
//! the first screen and one slot spanning the remaining two.
//!
//! The table below is not the full set of integer compositions of `n`.  It is
//! a hand-picked subset that looks sensible on a row of landscape screens.
//! Groups are capped at [`MAX_UNITS`]; larger sizes are rejected rather than
//! extrapolated.

use thiserror::Error;

/// Largest group size (in geometry units) the layout table covers.
pub const MAX_UNITS: u32 = 4;

/// Height budget, in pixels, shared by all slots of one playlist row.
const ROW_HEIGHT_BUDGET: f64 = 730.0;

/// Base aspect ratio of an unrotated screen (16:9).
pub const LANDSCAPE_RATIO: f64 = 16.0 / 9.0;

/// Curated layouts indexed by group size.
const LAYOUTS: [&[&[u32]]; (MAX_UNITS + 1) as usize] = [
    &[],
    &[&[1]],
    &[&[1, 1], &[2]],
    &[&[1, 1, 1], &[2, 1], &[1, 2], &[3]],
    &[&[1, 1, 1, 1], &[1, 2, 1], &[2, 1, 1], &[1, 1, 2], &[2, 2], &[4]],
];

/// Errors raised by geometry lookups.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    /// The group is larger than the layout table supports.
    #[error("screen group of {0} units exceeds the supported maximum of {max}", max = MAX_UNITS)]
    TooManyUnits(u32),

    /// A layout string could not be parsed.
    #[error("invalid layout {0:?}: expected spreads separated by ':' (e.g. \"1:2\")")]
    InvalidLayout(String),
}

/// Returns the curated layouts usable on a group of `units` geometry units.
///
/// `units == 0` yields an empty set (nothing to lay out).
///
/// # Errors
///
/// Returns [`GeometryError::TooManyUnits`] when `units > MAX_UNITS`.
pub fn layouts(units: u32) -> Result<&'static [&'static [u32]], GeometryError> {
    LAYOUTS
        .get(units as usize)
        .copied()
        .ok_or(GeometryError::TooManyUnits(units))
}

/// Pixel height of one playlist row: `730 / size / ratio`.
///
/// Returns `None` for an empty group.
pub fn row_height(size: u32, ratio: f64) -> Option<f64> {
    if size == 0 {
        return None;
    }
    Some(ROW_HEIGHT_BUDGET / f64::from(size) / ratio)
}

/// Width of a slot spanning `spread` units, as a percentage of the row.
///
/// The same proportion is used for content slots inside a playlist item and
/// for devices inside a screen group.  Returns `None` for an empty group.
pub fn slot_width_percent(size: u32, spread: u32) -> Option<f64> {
    if size == 0 {
        return None;
    }
    Some(100.0 / f64::from(size) * f64::from(spread))
}

/// Renders a layout the way the editor labels it: `[1, 2]` → `"1:2"`.
pub fn format_layout(layout: &[u32]) -> String {
    layout
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(":")
}

/// Parses a `"1:2"`-style layout string.
///
/// Only the syntax is checked here; whether the spreads fit the current group
/// is decided by the caller.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidLayout`] for empty input or non-numeric parts.
pub fn parse_layout(text: &str) -> Result<Vec<u32>, GeometryError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(GeometryError::InvalidLayout(text.to_string()));
    }
    trimmed
        .split(':')
        .map(|part| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| GeometryError::InvalidLayout(text.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── layouts ───────────────────────────────────────────────────────────────

    #[test]
    fn test_every_layout_sums_to_its_group_size() {
        for units in 0..=MAX_UNITS {
            for layout in layouts(units).unwrap() {
                assert_eq!(
                    layout.iter().sum::<u32>(),
                    units,
                    "layout {layout:?} must cover exactly {units} units"
                );
            }
        }
    }

    #[test]
    fn test_layouts_for_zero_units_is_empty() {
        assert!(layouts(0).unwrap().is_empty());
    }

    #[test]
    fn test_layouts_for_three_units_keeps_curated_order() {
        let expected: &[&[u32]] = &[&[1, 1, 1], &[2, 1], &[1, 2], &[3]];
        assert_eq!(layouts(3).unwrap(), expected);
    }

    #[test]
    fn test_layouts_for_four_units_is_not_the_full_partition_set() {
        // [1, 3] and [3, 1] are valid compositions of 4 but not offered.
        let four = layouts(4).unwrap();
        assert_eq!(four.len(), 6);
        assert!(!four.contains(&&[1u32, 3][..]));
        assert!(!four.contains(&&[3u32, 1][..]));
    }

    #[test]
    fn test_layouts_above_max_units_is_rejected() {
        assert_eq!(layouts(5), Err(GeometryError::TooManyUnits(5)));
    }

    // ── row_height / slot_width_percent ───────────────────────────────────────

    #[test]
    fn test_row_height_divides_budget_by_size_and_ratio() {
        let h = row_height(2, LANDSCAPE_RATIO).unwrap();
        // 730 / 2 / (16/9) = 205.3125
        assert!((h - 205.3125).abs() < 1e-9);
    }

    #[test]
    fn test_row_height_is_taller_for_portrait_ratio() {
        let landscape = row_height(3, LANDSCAPE_RATIO).unwrap();
        let portrait = row_height(3, 1.0 / LANDSCAPE_RATIO).unwrap();
        assert!(portrait > landscape);
    }

    #[test]
    fn test_row_height_for_empty_group_is_none() {
        assert_eq!(row_height(0, LANDSCAPE_RATIO), None);
    }

    #[test]
    fn test_slot_width_percent_scales_with_spread() {
        assert_eq!(slot_width_percent(4, 1), Some(25.0));
        assert_eq!(slot_width_percent(4, 2), Some(50.0));
        assert_eq!(slot_width_percent(0, 1), None);
    }

    // ── format / parse ────────────────────────────────────────────────────────

    #[test]
    fn test_format_layout_joins_with_colon() {
        assert_eq!(format_layout(&[1, 2, 1]), "1:2:1");
        assert_eq!(format_layout(&[4]), "4");
    }

    #[test]
    fn test_parse_layout_accepts_formatted_layout() {
        assert_eq!(parse_layout("2:1:1").unwrap(), vec![2, 1, 1]);
        assert_eq!(parse_layout(" 3 ").unwrap(), vec![3]);
    }

    #[test]
    fn test_parse_layout_rejects_garbage() {
        assert!(matches!(
            parse_layout("1:x"),
            Err(GeometryError::InvalidLayout(_))
        ));
        assert!(matches!(parse_layout(""), Err(GeometryError::InvalidLayout(_))));
        assert!(matches!(parse_layout("1::2"), Err(GeometryError::InvalidLayout(_))));
    }
}

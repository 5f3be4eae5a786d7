//! Physical-to-pixel unit conversion.
//!
//! Every physical size that ends up rasterized (tile boxes, crop export
//! dimensions, page size, margins and gaps) goes through [`mm_to_px`] so that
//! the preview and the exported sheet agree on relative proportions.

/// Millimeters per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// Print resolution used for crop export and sheet export.
pub const PRINT_DPI: f64 = 300.0;

/// Typical CSS screen resolution, used for on-screen sheet previews.
pub const SCREEN_DPI: f64 = 96.0;

/// Highest resolution a sheet may be laid out at.
pub const MAX_DPI: f64 = 1200.0;

/// True for a finite resolution in `(0, MAX_DPI]`.
pub fn is_supported_dpi(dpi: f64) -> bool {
    dpi.is_finite() && dpi > 0.0 && dpi <= MAX_DPI
}

/// Convert millimeters to whole pixels at the given resolution.
///
/// Computed as `round(mm * dpi / 25.4)`.
///
/// # Behavior
///
/// - Zero, negative or non-finite input yields 0
/// - A positive length never collapses to 0 pixels; the minimum is 1
///
/// # Example
///
/// ```
/// use quickpassport_core::units::{mm_to_px, PRINT_DPI};
///
/// assert_eq!(mm_to_px(210.0, PRINT_DPI), 2480);
/// assert_eq!(mm_to_px(297.0, PRINT_DPI), 3508);
/// ```
pub fn mm_to_px(mm: f64, dpi: f64) -> u32 {
    if !mm.is_finite() || !dpi.is_finite() || mm <= 0.0 || dpi <= 0.0 {
        return 0;
    }
    let px = (mm * dpi / MM_PER_INCH).round();
    if px >= u32::MAX as f64 {
        return u32::MAX;
    }
    (px as u32).max(1)
}

/// Pixels per millimeter at the given resolution (11.811 at 300 DPI).
#[inline]
pub fn px_per_mm(dpi: f64) -> f64 {
    dpi / MM_PER_INCH
}

/// Convert millimeters to inches.
#[inline]
pub fn mm_to_inches(mm: f64) -> f64 {
    mm / MM_PER_INCH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_dpi_range() {
        assert!(is_supported_dpi(SCREEN_DPI));
        assert!(is_supported_dpi(PRINT_DPI));
        assert!(is_supported_dpi(MAX_DPI));
        for bad in [0.0, -96.0, 1200.5, 1e9, f64::NAN, f64::INFINITY] {
            assert!(!is_supported_dpi(bad), "{bad}");
        }
    }

    #[test]
    fn test_zero_is_zero() {
        assert_eq!(mm_to_px(0.0, PRINT_DPI), 0);
    }

    #[test]
    fn test_a4_at_300_dpi() {
        assert_eq!(mm_to_px(210.0, PRINT_DPI), 2480);
        assert_eq!(mm_to_px(297.0, PRINT_DPI), 3508);
    }

    #[test]
    fn test_margin_and_gap() {
        assert_eq!(mm_to_px(7.0, PRINT_DPI), 83);
        assert_eq!(mm_to_px(2.0, PRINT_DPI), 24);
    }

    #[test]
    fn test_matches_simplified_constant_for_catalog() {
        // 11.81 px/mm and 300/25.4 px/mm agree on every catalog dimension
        for mm in [20.0, 25.0, 35.0, 45.0, 51.0, 89.0, 102.0, 127.0, 152.0, 178.0] {
            let simplified = (mm * 11.81_f64).round() as u32;
            assert_eq!(mm_to_px(mm, PRINT_DPI), simplified, "mismatch at {mm}mm");
        }
    }

    #[test]
    fn test_tiny_positive_length_is_one_pixel() {
        assert_eq!(mm_to_px(0.001, PRINT_DPI), 1);
    }

    #[test]
    fn test_invalid_input_is_zero() {
        assert_eq!(mm_to_px(-5.0, PRINT_DPI), 0);
        assert_eq!(mm_to_px(10.0, 0.0), 0);
        assert_eq!(mm_to_px(f64::NAN, PRINT_DPI), 0);
        assert_eq!(mm_to_px(10.0, f64::INFINITY), 0);
    }

    #[test]
    fn test_screen_dpi() {
        // 1 inch at 96 DPI
        assert_eq!(mm_to_px(25.4, SCREEN_DPI), 96);
    }

    #[test]
    fn test_px_per_mm() {
        assert!((px_per_mm(PRINT_DPI) - 11.811).abs() < 0.001);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

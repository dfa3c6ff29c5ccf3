//! The comparison engine: bps and percent-change, scaled (box totals) and
//! raw (per-week/month chart and table data).

use crate::model::ComparisonMethod;

/// Compute a comparison value. `scaled` applies the method's final
/// multiplier (bps: ×10,000, pct_change: ×100); unscaled gives the raw
/// `cy - py` or `cy / py - 1`. Either side being null, or the result being
/// ±∞/NaN, yields `None` — callers render that as "N/A" in box totals and
/// `null` in chart/table frames.
pub fn compare(cy: Option<f64>, py: Option<f64>, method: ComparisonMethod, scaled: bool) -> Option<f64> {
    let cy = cy?;
    let py = py?;
    let raw = match method {
        ComparisonMethod::Bps => cy - py,
        ComparisonMethod::PctChange => cy / py - 1.0,
    };
    let result = if scaled {
        match method {
            ComparisonMethod::Bps => raw * 10_000.0,
            ComparisonMethod::PctChange => raw * 100.0,
        }
    } else {
        raw
    };
    if result.is_finite() {
        Some(result)
    } else {
        None
    }
}

//! Per-source weight factors.

use super::config::AggregationConfig;

/// 1.0 inside the freshness window, then halves every `half_life_days`, never below `floor`.
pub fn recency_factor(recency_days: u32, freshness_window_days: u32, half_life_days: f64, floor: f64) -> f64 {
    let overdue = recency_days.saturating_sub(freshness_window_days) as f64;
    if overdue == 0.0 {
        return 1.0;
    }
    (0.5f64).powf(overdue / half_life_days).max(floor)
}

/// `sqrt(n / saturation)` up to saturation, then `1 + damping * ln(n / saturation)`, capped.
pub fn sample_factor(sample_size: u64, saturation: f64, damping: f64, cap: f64) -> f64 {
    let ratio = sample_size as f64 / saturation;
    let factor = if ratio <= 1.0 {
        ratio.sqrt()
    } else {
        1.0 + damping * ratio.ln()
    };
    factor.min(cap)
}

/// `priority * recency_factor * sample_factor`.
pub fn raw_weight(
    priority: f64,
    recency_days: u32,
    freshness_window_days: u32,
    sample_size: u64,
    config: &AggregationConfig,
) -> f64 {
    priority
        * recency_factor(
            recency_days,
            freshness_window_days,
            config.recency_half_life_days,
            config.recency_floor,
        )
        * sample_factor(
            sample_size,
            config.sample_saturation,
            config.sample_damping,
            config.sample_cap,
        )
}

/// Scales weights to sum to 1. Falls back to uniform weights when the sum is not positive.
pub fn normalize(weights: &mut [f64]) {
    if weights.is_empty() {
        return;
    }
    let total: f64 = weights.iter().filter(|w| w.is_finite()).sum();
    if total > 0.0 {
        for w in weights.iter_mut() {
            *w = if w.is_finite() { (*w / total).clamp(0.0, 1.0) } else { 0.0 };
        }
    } else {
        let uniform = 1.0 / weights.len() as f64;
        weights.iter_mut().for_each(|w| *w = uniform);
    }
}

use std::fmt;

use pm_core::History;

/// Linear-interpolated percentile of `values`, `p` in `[0, 100]`.
///
/// Returns `None` for an empty slice. Non-finite `p` is treated as 100.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let p = if p.is_finite() { p.clamp(0.0, 100.0) } else { 100.0 };
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// What the downstream renderer needs to fix its colour scale.
#[derive(Debug, PartialEq)]
pub struct Summary {
    pub steps: usize,
    pub particles: usize,
    pub percentile: f64,
    pub speed_at_percentile: f64,
    pub final_kinetic_energy: f64,
}

impl Summary {
    pub fn from_history(history: &History, percentile_rank: f64) -> Self {
        let speeds = history.speeds();
        Self {
            steps: history.len(),
            particles: history.last().map_or(0, |s| s.positions.len()),
            percentile: percentile_rank,
            speed_at_percentile: percentile(&speeds, percentile_rank).unwrap_or(0.0),
            final_kinetic_energy: history.last().map_or(0.0, |s| s.kinetic_energy()),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} steps x {} particles, p{} speed {:.6e}, final kinetic energy {:.6e}",
            self.steps,
            self.particles,
            self.percentile,
            self.speed_at_percentile,
            self.final_kinetic_energy
        )
    }
}

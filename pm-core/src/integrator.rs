use glam::DVec2;
use rayon::prelude::*;

use crate::particles::ParticleSet;

/// Maps a coordinate onto `[0, domain_size)`.
///
/// `rem_euclid` can round a tiny negative input up to exactly
/// `domain_size`; that case folds back to `0.0`.
#[inline]
pub fn wrap_coordinate(x: f64, domain_size: f64) -> f64 {
    let w = x.rem_euclid(domain_size);
    if w >= domain_size { 0.0 } else { w }
}

/// Semi-implicit Euler step: kick, drift, then periodic wrap.
///
/// ### Parameters
/// - `particles` - Bodies to update in place.
/// - `forces` - Force per particle, aligned with `particles.points`.
/// - `dt` - Time step shared by the kick and the drift.
/// - `domain_size` - Side length of the periodic domain.
///
/// ### Panics
/// Panics if `forces` and `particles` differ in length.
pub fn kick_drift(particles: &mut ParticleSet, forces: &[DVec2], dt: f64, domain_size: f64) {
    assert_eq!(particles.len(), forces.len());
    particles
        .points
        .par_iter_mut()
        .zip(forces.par_iter())
        .for_each(|(p, f)| {
            p.vel += *f * dt;
            p.pos += p.vel * dt;
            p.pos = DVec2::new(
                wrap_coordinate(p.pos.x, domain_size),
                wrap_coordinate(p.pos.y, domain_size),
            );
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn wrap_coordinate_stays_in_half_open_range() {
        assert_eq!(wrap_coordinate(3.0, 10.0), 3.0);
        assert_eq!(wrap_coordinate(10.0, 10.0), 0.0);
        assert_eq!(wrap_coordinate(-2.5, 10.0), 7.5);
        assert_eq!(wrap_coordinate(25.0, 10.0), 5.0);
        let tiny = wrap_coordinate(-1e-20, 10.0);
        assert!((0.0..10.0).contains(&tiny));
    }

    #[test]
    fn kick_happens_before_drift() {
        let mut set = ParticleSet::from_positions(vec![DVec2::new(1.0, 1.0)]);
        kick_drift(&mut set, &[DVec2::new(2.0, -1.0)], 0.5, 100.0);
        let p = set.points[0];
        assert_eq!(p.vel, DVec2::new(1.0, -0.5));
        // drift uses the updated velocity
        assert_abs_diff_eq!(p.pos.x, 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(p.pos.y, 0.75, epsilon = 1e-12);
    }

    #[test]
    fn positions_wrap_around_the_torus() {
        let mut set = ParticleSet::from_positions(vec![DVec2::new(9.5, 0.2)]);
        set.points[0].vel = DVec2::new(1.0, -1.0);
        kick_drift(&mut set, &[DVec2::ZERO], 1.0, 10.0);
        let p = set.points[0].pos;
        assert_abs_diff_eq!(p.x, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 9.2, epsilon = 1e-12);
        // velocity is untouched by the wrap
        assert_eq!(set.points[0].vel, DVec2::new(1.0, -1.0));
    }

    #[test]
    #[should_panic]
    fn mismatched_force_count_panics() {
        let mut set = ParticleSet::from_positions(vec![DVec2::ZERO; 2]);
        kick_drift(&mut set, &[DVec2::ZERO], 1.0, 1.0);
    }
}

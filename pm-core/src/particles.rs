use glam::DVec2;
use rand::Rng;

/// A unit-mass body on the periodic domain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub pos: DVec2,
    pub vel: DVec2,
}

/// Ordered set of bodies; index `i` names the same body for the whole run.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleSet {
    pub points: Vec<Particle>,
}

impl ParticleSet {
    /// Bodies at rest at the given positions.
    pub fn from_positions(positions: Vec<DVec2>) -> Self {
        let points = positions
            .into_iter()
            .map(|pos| Particle {
                pos,
                vel: DVec2::ZERO,
            })
            .collect();

        Self { points }
    }

    /// `count` bodies at rest, uniformly distributed over `[0, domain_size)²`.
    ///
    /// The caller owns the generator, so seeding it fixes the placement.
    pub fn random_in_domain(count: usize, domain_size: f64, rng: &mut impl Rng) -> Self {
        let positions = (0..count)
            .map(|_| {
                let x = rng.random_range(0.0..domain_size);
                let y = rng.random_range(0.0..domain_size);
                DVec2::new(x, y)
            })
            .collect();

        Self::from_positions(positions)
    }

    /// Number of bodies `N`.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Copies every position, in particle order.
    ///
    /// ### Returns
    /// A fresh vector; later updates to the set do not affect it.
    pub fn positions(&self) -> Vec<DVec2> {
        self.points.iter().map(|p| p.pos).collect()
    }

    /// Copies every velocity, aligned index-for-index with
    /// [`ParticleSet::positions`].
    pub fn velocities(&self) -> Vec<DVec2> {
        self.points.iter().map(|p| p.vel).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn from_positions_starts_at_rest() {
        let set = ParticleSet::from_positions(vec![DVec2::new(1.0, 2.0), DVec2::new(3.0, 4.0)]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.positions(), vec![DVec2::new(1.0, 2.0), DVec2::new(3.0, 4.0)]);
        assert!(set.velocities().iter().all(|v| *v == DVec2::ZERO));
    }

    #[test]
    fn random_in_domain_stays_inside_domain() {
        let mut rng = StdRng::seed_from_u64(7);
        let set = ParticleSet::random_in_domain(1000, 5.0, &mut rng);
        assert_eq!(set.len(), 1000);
        for p in &set.points {
            assert!((0.0..5.0).contains(&p.pos.x));
            assert!((0.0..5.0).contains(&p.pos.y));
            assert_eq!(p.vel, DVec2::ZERO);
        }
    }

    #[test]
    fn same_seed_gives_same_placement() {
        let a = ParticleSet::random_in_domain(64, 10.0, &mut StdRng::seed_from_u64(42));
        let b = ParticleSet::random_in_domain(64, 10.0, &mut StdRng::seed_from_u64(42));
        let c = ParticleSet::random_in_domain(64, 10.0, &mut StdRng::seed_from_u64(43));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}

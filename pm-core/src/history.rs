use glam::DVec2;

use crate::particles::ParticleSet;

/// Copy of every body's state at the end of one step.
///
/// `positions[i]` and `velocities[i]` always describe particle `i`.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub positions: Vec<DVec2>,
    pub velocities: Vec<DVec2>,
}

impl Snapshot {
    /// Copies the current positions and velocities of `particles`.
    ///
    /// ### Parameters
    /// - `particles` - Set to copy; the snapshot does not borrow it.
    pub fn capture(particles: &ParticleSet) -> Self {
        Self {
            positions: particles.positions(),
            velocities: particles.velocities(),
        }
    }

    /// `½ Σ |v|²` under the unit-mass convention.
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.velocities.iter().map(|v| v.length_squared()).sum::<f64>()
    }

    /// Largest `|v|` in the snapshot, or `0.0` if it is empty.
    pub fn max_speed(&self) -> f64 {
        self.velocities
            .iter()
            .map(|v| v.length())
            .fold(0.0, f64::max)
    }
}

/// Append-only record of per-step snapshots.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct History {
    snapshots: Vec<Snapshot>,
}

impl History {
    /// Creates an empty history with room for `steps` snapshots.
    pub fn with_capacity(steps: usize) -> Self {
        Self {
            snapshots: Vec::with_capacity(steps),
        }
    }

    pub(crate) fn push(&mut self, snapshot: Snapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn get(&self, step: usize) -> Option<&Snapshot> {
        self.snapshots.get(step)
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.iter()
    }

    /// Every speed of every particle in every snapshot, in step order.
    pub fn speeds(&self) -> Vec<f64> {
        self.snapshots
            .iter()
            .flat_map(|s| s.velocities.iter().map(|v| v.length()))
            .collect()
    }
}

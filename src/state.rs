// Copyright (c) 2022 Mikael Lund
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

use indicatif::ProgressBar;
use log::info;
use nalgebra::Vector3;
use rand::Rng;

use crate::energy::EnergyTerm;
use crate::environment::Environment;
use crate::geometry::Geometry;
use crate::particle::Particle;
use crate::particles::Particles;

/// Relative drift above which `control` aborts
const DRIFT_TOLERANCE: f64 = 1e-10;
/// Total energies above this magnitude are treated as diverged
const ENERGY_CEILING: f64 = 1e30;
/// Below this magnitude the drift is reported as an absolute difference
const DRIFT_FLOOR: f64 = 1e-9;

///
/// One entry in the change journal of a pending proposal. `flip` exchanges
/// the stored data with the live configuration, so replaying the journal
/// backwards unwinds the proposal and replaying it forwards restores it.
///
#[derive(Clone, Debug)]
enum Change {
    Touched { index: usize, image: Particle },
    Inserted { index: usize, stash: Option<Particle> },
    Removed { index: usize, stash: Option<Particle> },
    Rescaled { lengths: Vector3<f64> },
}

///
/// Journal of per-particle before-images and structural deltas for the
/// proposal in flight. Empty between proposals.
///
#[derive(Debug, Default)]
struct Journal {
    changes: Vec<Change>,
    unwound: bool,
}

impl Journal {
    fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    fn clear(&mut self) {
        self.changes.clear();
        self.unwound = false;
    }

    fn has_rescale(&self) -> bool {
        self.changes
            .iter()
            .any(|change| matches!(change, Change::Rescaled { .. }))
    }

    fn is_touched(&self, index: usize) -> bool {
        self.changes.iter().any(|change| match change {
            Change::Touched { index: touched, .. }
            | Change::Inserted { index: touched, .. } => *touched == index,
            _ => false,
        })
    }

    /// Indices of the moved subset in the unwound (old) configuration.
    fn old_indices(&self) -> Vec<usize> {
        self.changes
            .iter()
            .filter_map(|change| match change {
                Change::Touched { index, .. } | Change::Removed { index, .. } => Some(*index),
                _ => None,
            })
            .collect()
    }

    /// Indices of the moved subset in the current (new) configuration.
    fn new_indices(&self) -> Vec<usize> {
        self.changes
            .iter()
            .filter_map(|change| match change {
                Change::Touched { index, .. } | Change::Inserted { index, .. } => Some(*index),
                _ => None,
            })
            .collect()
    }

    /// Before-images of the moved subset; valid while the journal is replayed.
    fn old_images(&self) -> Vec<Particle> {
        self.changes
            .iter()
            .filter_map(|change| match change {
                Change::Touched { image, .. } => Some(image.clone()),
                Change::Removed { stash, .. } => stash.clone(),
                _ => None,
            })
            .collect()
    }

    /// After-images of the moved subset; valid while the journal is replayed.
    fn new_images(&self, particles: &Particles) -> Vec<Particle> {
        self.changes
            .iter()
            .filter_map(|change| match change {
                Change::Touched { index, .. } | Change::Inserted { index, .. } => {
                    Some(particles[*index].clone())
                }
                _ => None,
            })
            .collect()
    }

    fn flip(change: &mut Change, particles: &mut Particles, geometry: &mut Geometry) {
        match change {
            Change::Touched { index, image } => {
                std::mem::swap(particles.get_mut(*index), image);
            }
            Change::Inserted { index, stash } | Change::Removed { index, stash } => {
                match stash.take() {
                    Some(particle) => {
                        particles.add(particle, Some(*index));
                    }
                    None => {
                        *stash = Some(particles.remove(*index));
                    }
                }
            }
            Change::Rescaled { lengths } => geometry.swap_lengths(lengths),
        }
    }

    fn undo(&mut self, particles: &mut Particles, geometry: &mut Geometry) {
        debug_assert!(!self.unwound);
        for change in self.changes.iter_mut().rev() {
            Self::flip(change, particles, geometry);
        }
        self.unwound = true;
    }

    fn redo(&mut self, particles: &mut Particles, geometry: &mut Geometry) {
        debug_assert!(self.unwound);
        for change in self.changes.iter_mut() {
            Self::flip(change, particles, geometry);
        }
        self.unwound = false;
    }
}

///
/// The simulation state: particle set, geometry and energy terms, plus the
/// change journal that gives proposals atomic propose / accept / revert
/// semantics. Between `energy_change` and `save`/`revert` the state is in
/// flight and must not be observed.
///
#[derive(Debug)]
pub struct State {
    pub particles: Particles,
    pub geometry: Geometry,
    pub terms: Vec<EnergyTerm>,
    /// last fully recomputed total energy (kT)
    pub energy: f64,
    /// running total of accepted energy changes (kT)
    pub cumulative_energy: f64,
    /// energy change of the last proposal (kT)
    pub de: f64,
    /// drift measured by the last `control`
    pub error: f64,
    /// macro-step counter, ticked by `advance`
    pub step: usize,
    journal: Journal,
}

impl State {
    pub fn new(geometry: Geometry) -> Self {
        State {
            particles: Particles::default(),
            geometry,
            terms: Vec::new(),
            energy: 0.0,
            cumulative_energy: 0.0,
            de: 0.0,
            error: 0.0,
            step: 0,
            journal: Journal::default(),
        }
    }

    pub fn push_term(&mut self, term: EnergyTerm) {
        self.terms.push(term);
    }

    /// Whether a proposal is pending (between `energy_change` and commit).
    pub fn in_flight(&self) -> bool {
        !self.journal.is_empty()
    }

    /// Populate the set from the species models at random positions.
    pub fn create_particles<R: Rng>(&mut self, n_plus: usize, n_minus: usize, rng: &mut R) {
        for i in 0..n_plus + n_minus {
            let model = if i < n_plus {
                self.particles.cation_model.clone()
            } else {
                self.particles.anion_model.clone()
            };
            let particle = model.instantiate(self.geometry.random_pos(rng), 0);
            self.particles.add(particle, None);
        }
        info!("created {} cations and {} anions", n_plus, n_minus);
    }

    /// Replace the particle set, e.g. from a checkpoint, keeping the models.
    pub fn load_particles(&mut self, list: Vec<Particle>) {
        let cation_model = self.particles.cation_model.clone();
        let anion_model = self.particles.anion_model.clone();
        self.particles = Particles::from_vec(list);
        self.particles.cation_model = cation_model;
        self.particles.anion_model = anion_model;
    }

    ///
    /// Append a charge-negated mirror particle per real particle, for
    /// charged-wall boundaries.
    ///
    pub fn add_images(&mut self) {
        for index in 0..self.particles.real() {
            let source = self.particles[index].clone();
            let mut image = source.clone();
            image.image = true;
            image.charge = -source.charge;
            image.name = format!("{}I", source.name);
            image.com = self.geometry.mirror(&source.pos);
            image.q_disp = Vector3::zeros();
            image.b = 0.0;
            image.update_pos();
            self.particles.add(image, None);
        }
    }

    // ----- proposal operators ------------------------------------------------

    /// Journal a before-image of `index` once per proposal.
    fn touch(&mut self, index: usize) {
        if !self.journal.is_touched(index) {
            self.journal.changes.push(Change::Touched {
                index,
                image: self.particles[index].clone(),
            });
        }
    }

    pub fn displace_particle<R: Rng>(&mut self, index: usize, step: f64, rng: &mut R) {
        self.touch(index);
        let State {
            particles, geometry, ..
        } = self;
        let particle = particles.get_mut(index);
        particle.translate(step, rng);
        geometry.wrap(&mut particle.com);
        particle.update_pos();
    }

    pub fn rotate_particle<R: Rng>(&mut self, index: usize, step: f64, rng: &mut R) {
        self.touch(index);
        self.particles.get_mut(index).rotate(step, rng);
    }

    pub fn displace_charge<R: Rng>(&mut self, index: usize, step: f64, rng: &mut R) {
        self.touch(index);
        self.particles.get_mut(index).displace_charge(step, rng);
    }

    pub fn randomize_charge<R: Rng>(&mut self, index: usize, rng: &mut R) {
        self.touch(index);
        self.particles.get_mut(index).randomize_charge(rng);
    }

    /// Exchange the centers of mass of two particles.
    pub fn swap_positions(&mut self, first: usize, second: usize) {
        self.touch(first);
        self.touch(second);
        let com_first = self.particles[first].com;
        let com_second = self.particles[second].com;
        let particle = self.particles.get_mut(first);
        particle.com = com_second;
        particle.update_pos();
        let particle = self.particles.get_mut(second);
        particle.com = com_first;
        particle.update_pos();
    }

    /// Exchange everything but the centers of mass and slot numbers.
    pub fn swap_properties(&mut self, first: usize, second: usize) {
        self.touch(first);
        self.touch(second);
        let a = self.particles[first].clone();
        let b = self.particles[second].clone();
        let particle = self.particles.get_mut(first);
        particle.charge = b.charge;
        particle.radius = b.radius;
        particle.rf = b.rf;
        particle.q_disp = b.q_disp;
        particle.b = b.b;
        particle.b_min = b.b_min;
        particle.b_max = b.b_max;
        particle.name = b.name;
        particle.update_pos();
        let particle = self.particles.get_mut(second);
        particle.charge = a.charge;
        particle.radius = a.radius;
        particle.rf = a.rf;
        particle.q_disp = a.q_disp;
        particle.b = a.b;
        particle.b_min = a.b_min;
        particle.b_max = a.b_max;
        particle.name = a.name;
        particle.update_pos();
    }

    /// Insert a fresh particle from a species model at a random position.
    pub fn insert_from_model<R: Rng>(&mut self, positive: bool, rng: &mut R) -> usize {
        let model = if positive {
            self.particles.cation_model.clone()
        } else {
            self.particles.anion_model.clone()
        };
        let mut particle = model.instantiate(self.geometry.random_pos(rng), 0);
        if particle.b_max > 0.0 {
            particle.randomize_charge(rng);
        }
        let index = self.particles.add(particle, None);
        self.journal
            .changes
            .push(Change::Inserted { index, stash: None });
        index
    }

    pub fn remove_particle(&mut self, index: usize) {
        let particle = self.particles.remove(index);
        self.journal.changes.push(Change::Removed {
            index,
            stash: Some(particle),
        });
    }

    /// Isotropic box rescale by a linear factor; touches every particle.
    pub fn rescale_volume(&mut self, factor: f64) {
        let old_lengths = self.geometry.bounding_box();
        for index in 0..self.particles.len() {
            self.touch(index);
            let particle = self.particles.get_mut(index);
            particle.com *= factor;
            particle.update_pos();
        }
        self.geometry.rescale(factor);
        self.journal.changes.push(Change::Rescaled {
            lengths: old_lengths,
        });
    }

    // ----- energy ------------------------------------------------------------

    /// Hard-core test of `index` against all other particles.
    pub fn overlaps(&self, index: usize) -> bool {
        let particle = &self.particles[index];
        self.particles.iter().any(|other| {
            other.index != index
                && self.geometry.distance(&other.pos, &particle.pos)
                    <= other.radius + particle.radius
        })
    }

    pub fn count_overlaps(&self) -> usize {
        (0..self.particles.len())
            .filter(|&index| self.overlaps(index))
            .count()
    }

    /// Roll term caches from the old to the new subset (re-initialize after
    /// a box rescale, where cached k-grids are stale).
    fn roll_caches_forward(&mut self) {
        let State {
            journal,
            particles,
            geometry,
            terms,
            ..
        } = self;
        if journal.has_rescale() {
            for term in terms.iter_mut() {
                term.initialize(particles.as_slice(), geometry);
            }
        } else {
            let old_images = journal.old_images();
            let new_images = journal.new_images(particles);
            for term in terms.iter_mut() {
                term.apply(&old_images, &new_images);
            }
        }
    }

    ///
    /// Energy difference of the pending proposal, new minus old (kT).
    ///
    /// A touched particle outside the geometry or overlapping another makes
    /// the proposal infeasible: caches are still rolled forward so a
    /// subsequent `revert` finds them in the expected place, and +∞ is
    /// returned for certain rejection.
    ///
    pub fn energy_change(&mut self, environment: &Environment) -> f64 {
        let new_indices = self.journal.new_indices();
        for &index in &new_indices {
            if !self.geometry.is_inside(&self.particles[index].pos) || self.overlaps(index) {
                self.roll_caches_forward();
                self.de = f64::INFINITY;
                return self.de;
            }
        }
        let old_indices = self.journal.old_indices();
        let mut before = 0.0;
        {
            let State {
                journal,
                particles,
                geometry,
                terms,
                ..
            } = self;
            journal.undo(particles, geometry);
            for term in terms.iter() {
                before += term.partial(&old_indices, particles.as_slice(), geometry, environment);
            }
            journal.redo(particles, geometry);
        }
        self.roll_caches_forward();
        let mut after = 0.0;
        for term in &self.terms {
            after += term.partial(
                &new_indices,
                self.particles.as_slice(),
                &self.geometry,
                environment,
            );
        }
        self.de = after - before;
        self.de
    }

    /// Commit the pending proposal.
    pub fn save(&mut self) {
        self.journal.clear();
        self.cumulative_energy += self.de;
        self.de = 0.0;
    }

    ///
    /// Discard the pending proposal: roll term caches back, unwind the
    /// journal. `cumulative_energy` is unchanged.
    ///
    pub fn revert(&mut self) {
        if self.journal.is_empty() {
            self.de = 0.0;
            return;
        }
        let State {
            journal,
            particles,
            geometry,
            terms,
            ..
        } = self;
        if journal.has_rescale() {
            journal.undo(particles, geometry);
            for term in terms.iter_mut() {
                term.initialize(particles.as_slice(), geometry);
            }
        } else {
            let old_images = journal.old_images();
            let new_images = journal.new_images(particles);
            for term in terms.iter_mut() {
                term.apply(&new_images, &old_images);
            }
            journal.undo(particles, geometry);
        }
        journal.clear();
        self.de = 0.0;
    }

    ///
    /// Recompute the total energy exactly, measure the drift of the running
    /// total and verify the structural invariants. Violations abort the run.
    ///
    pub fn control(&mut self, environment: &Environment) {
        assert!(
            self.journal.is_empty(),
            "control called with a proposal in flight"
        );
        let State {
            particles,
            geometry,
            terms,
            ..
        } = self;
        let total: f64 = terms
            .iter_mut()
            .map(|term| term.total(particles.as_slice(), geometry, environment))
            .sum();
        self.energy = total;
        let deviation = (self.energy - self.cumulative_energy).abs();
        self.error = if self.energy.abs() > DRIFT_FLOOR {
            deviation / self.energy.abs()
        } else {
            deviation
        };
        for (position, particle) in self.particles.iter().enumerate() {
            assert!(
                particle.index == position,
                "identity invariant violated: particle {} ({}) carries index {}",
                position,
                particle.name,
                particle.index
            );
        }
        assert!(
            self.particles.cations() + self.particles.anions() == self.particles.len(),
            "count invariant violated: {} cations + {} anions != {} total",
            self.particles.cations(),
            self.particles.anions(),
            self.particles.len()
        );
        assert!(
            self.error <= DRIFT_TOLERANCE && self.energy.abs() <= ENERGY_CEILING,
            "energy drift too large: {:e} (total {}, accumulated {})",
            self.error,
            self.energy,
            self.cumulative_energy
        );
    }

    /// Macro-step tick.
    pub fn advance(&mut self) {
        self.step += 1;
    }

    /// Seed term caches and the energy bookkeeping; call once after loading.
    pub fn finalize(&mut self, environment: &Environment) {
        let State {
            particles,
            geometry,
            terms,
            ..
        } = self;
        for term in terms.iter_mut() {
            term.initialize(particles.as_slice(), geometry);
        }
        let total: f64 = terms
            .iter_mut()
            .map(|term| term.total(particles.as_slice(), geometry, environment))
            .sum();
        self.energy = total;
        self.cumulative_energy = self.energy;
    }

    ///
    /// Scatter particles at random positions, then jiggle until no hard-core
    /// overlaps remain.
    ///
    pub fn equilibrate<R: Rng>(&mut self, step: f64, rng: &mut R) {
        if self.particles.is_empty() {
            return;
        }
        info!("equilibrating {} particles", self.particles.real());
        for index in 0..self.particles.real() {
            let State {
                particles, geometry, ..
            } = self;
            let particle = particles.get_mut(index);
            particle.com = geometry.random_pos(rng);
            particle.update_pos();
        }
        let bar = ProgressBar::new_spinner();
        let mut iterations: u64 = 0;
        let mut overlaps = self.count_overlaps();
        while overlaps > 0 {
            if let Some(index) = self.particles.random(rng) {
                let backup = self.particles[index].com;
                let State {
                    particles, geometry, ..
                } = self;
                let particle = particles.get_mut(index);
                particle.translate(step, rng);
                geometry.wrap(&mut particle.com);
                particle.update_pos();
                if self.overlaps(index) || !self.geometry.is_inside(&self.particles[index].pos) {
                    let particle = self.particles.get_mut(index);
                    particle.com = backup;
                    particle.update_pos();
                }
            }
            iterations += 1;
            if iterations % 1000 == 0 {
                overlaps = self.count_overlaps();
                bar.set_message(format!("overlaps: {}", overlaps));
                bar.tick();
            }
            assert!(
                iterations < 1_000_000_000,
                "equilibration failed to remove overlaps"
            );
        }
        bar.finish_and_clear();
        info!("equilibration done after {} kicks", iterations);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn bulk_state(n_plus: usize, n_minus: usize, side: f64, seed: u64) -> (State, Environment) {
        let mut rng = Pcg64::seed_from_u64(seed);
        let mut state = State::new(Geometry::cuboid(Vector3::repeat(side)));
        state.push_term(EnergyTerm::coulomb());
        state.create_particles(n_plus, n_minus, &mut rng);
        state.equilibrate(5.0, &mut rng);
        let environment = Environment::new(2.0, 1000.0);
        state.finalize(&environment);
        (state, environment)
    }

    #[test]
    fn revert_restores_positions_and_energy() {
        let mut rng = Pcg64::seed_from_u64(1);
        let (mut state, environment) = bulk_state(4, 4, 40.0, 1);
        let snapshot: Vec<Particle> = state.particles.iter().cloned().collect();
        let energy = state.energy;

        state.displace_particle(3, 2.0, &mut rng);
        state.energy_change(&environment);
        state.revert();

        for (particle, reference) in state.particles.iter().zip(&snapshot) {
            assert_eq!(particle, reference);
        }
        state.control(&environment);
        assert_relative_eq!(state.energy, energy, epsilon = 1e-12);
    }

    #[test]
    fn save_accumulates_the_energy_change() {
        let mut rng = Pcg64::seed_from_u64(2);
        let (mut state, environment) = bulk_state(4, 4, 40.0, 2);
        for _ in 0..50 {
            let index = state.particles.random(&mut rng).unwrap();
            state.displace_particle(index, 0.8, &mut rng);
            let de = state.energy_change(&environment);
            if de.is_finite() && de < 5.0 {
                state.save();
            } else {
                state.revert();
            }
        }
        // control verifies drift of the running total against the full sum
        state.control(&environment);
        assert!(!state.in_flight());
    }

    #[test]
    fn insertion_revert_shrinks_back() {
        let mut rng = Pcg64::seed_from_u64(3);
        let (mut state, environment) = bulk_state(3, 3, 40.0, 3);
        let total = state.particles.len();
        let cations = state.particles.cations();

        state.insert_from_model(true, &mut rng);
        assert_eq!(state.particles.len(), total + 1);
        state.energy_change(&environment);
        state.revert();

        assert_eq!(state.particles.len(), total);
        assert_eq!(state.particles.cations(), cations);
        state.control(&environment);
    }

    #[test]
    fn removal_revert_reinserts_at_the_same_slot() {
        let mut rng = Pcg64::seed_from_u64(4);
        let (mut state, environment) = bulk_state(3, 3, 40.0, 4);
        let snapshot: Vec<Particle> = state.particles.iter().cloned().collect();

        state.remove_particle(1);
        state.energy_change(&environment);
        state.revert();

        for (particle, reference) in state.particles.iter().zip(&snapshot) {
            assert_eq!(particle, reference);
        }
        state.control(&environment);
    }

    #[test]
    fn removal_save_commits_the_shrink() {
        let mut rng = Pcg64::seed_from_u64(5);
        let (mut state, environment) = bulk_state(3, 3, 40.0, 5);

        state.remove_particle(2);
        let de = state.energy_change(&environment);
        assert!(de.is_finite());
        state.save();

        assert_eq!(state.particles.len(), 5);
        state.control(&environment);
    }

    #[test]
    fn overlap_means_certain_rejection() {
        let (mut state, environment) = bulk_state(2, 2, 60.0, 6);
        let target = state.particles[1].com;
        state.touch(0);
        let particle = state.particles.get_mut(0);
        particle.com = target;
        particle.update_pos();

        assert!(state.energy_change(&environment).is_infinite());
        state.revert();
        state.control(&environment);
    }

    #[test]
    fn leaving_the_container_means_certain_rejection() {
        let mut rng = Pcg64::seed_from_u64(7);
        let mut state = State::new(Geometry::sphere(10.0));
        state.push_term(EnergyTerm::coulomb());
        state.create_particles(1, 1, &mut rng);
        let environment = Environment::new(2.0, 1000.0);
        state.finalize(&environment);

        state.touch(0);
        let particle = state.particles.get_mut(0);
        particle.com = Vector3::new(25.0, 0.0, 0.0);
        particle.update_pos();

        assert!(state.energy_change(&environment).is_infinite());
        state.revert();
        state.control(&environment);
    }

    #[test]
    fn volume_round_trip_restores_the_running_total() {
        let (mut state, environment) = bulk_state(4, 4, 40.0, 8);
        let reference = state.cumulative_energy;
        let factor: f64 = 0.9;

        state.rescale_volume(factor);
        let shrink = state.energy_change(&environment);
        assert!(shrink.is_finite());
        state.save();

        state.rescale_volume(1.0 / factor);
        state.energy_change(&environment);
        state.save();

        assert_relative_eq!(state.cumulative_energy, reference, epsilon = 1e-9);
        state.control(&environment);
    }

    #[test]
    fn volume_revert_restores_box_and_positions() {
        let (mut state, environment) = bulk_state(4, 4, 40.0, 9);
        let snapshot: Vec<Particle> = state.particles.iter().cloned().collect();
        let volume = state.geometry.volume();

        state.rescale_volume(0.8);
        state.energy_change(&environment);
        state.revert();

        assert_relative_eq!(state.geometry.volume(), volume, epsilon = 1e-9);
        for (particle, reference) in state.particles.iter().zip(&snapshot) {
            assert_eq!(particle, reference);
        }
        state.control(&environment);
    }

    #[test]
    #[should_panic(expected = "identity invariant")]
    fn control_catches_identity_corruption() {
        let (mut state, environment) = bulk_state(2, 2, 40.0, 10);
        state.particles.get_mut(1).index = 3;
        state.control(&environment);
    }

    #[test]
    fn images_mirror_and_negate() {
        let mut rng = Pcg64::seed_from_u64(11);
        let mut state = State::new(Geometry::slab(Vector3::new(20.0, 20.0, 10.0)));
        state.create_particles(1, 0, &mut rng);
        state.add_images();
        assert_eq!(state.particles.len(), 2);
        assert_eq!(state.particles.real(), 1);
        assert_relative_eq!(state.particles[1].charge, -state.particles[0].charge);
    }
}

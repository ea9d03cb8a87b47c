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

use itertools::iproduct;
use nalgebra::{Complex, Vector3};
use std::f64::consts::PI;

use crate::environment::Environment;
use crate::geometry::Geometry;
use crate::particle::Particle;

///
/// Complementary error function, Abramowitz & Stegun 7.1.26
/// (absolute error below 1.5e-7). The standard library has no `erfc`.
///
pub(crate) fn erfc(x: f64) -> f64 {
    let t = 1.0 / (1.0 + 0.327_591_1 * x.abs());
    let poly = t
        * (0.254_829_592
            + t * (-0.284_496_736
                + t * (1.421_413_741 + t * (-1.453_152_027 + t * 1.061_405_429))));
    let value = poly * (-x * x).exp();
    if x >= 0.0 {
        value
    } else {
        2.0 - value
    }
}

/// Trait for pair energy between two particles (kT)
pub trait PairPotential {
    fn pair(
        &self,
        particle_1: &Particle,
        particle_2: &Particle,
        geometry: &Geometry,
        environment: &Environment,
    ) -> f64;
}

/// Bare Coulomb interaction between the point charges
#[derive(Clone, Debug, Default)]
pub struct Coulomb;

impl PairPotential for Coulomb {
    fn pair(
        &self,
        particle_1: &Particle,
        particle_2: &Particle,
        geometry: &Geometry,
        environment: &Environment,
    ) -> f64 {
        let distance = geometry.distance(&particle_1.pos, &particle_2.pos);
        environment.bjerrum_length() * particle_1.charge * particle_2.charge / distance
    }
}

/// Short-range, damped part of the Ewald split, truncated at `cutoff`
#[derive(Clone, Debug)]
pub struct RealSpaceEwald {
    pub cutoff: f64,
    pub alpha: f64,
}

impl PairPotential for RealSpaceEwald {
    fn pair(
        &self,
        particle_1: &Particle,
        particle_2: &Particle,
        geometry: &Geometry,
        environment: &Environment,
    ) -> f64 {
        let distance = geometry.distance(&particle_1.pos, &particle_2.pos);
        if distance > self.cutoff {
            return 0.0;
        }
        environment.bjerrum_length() * particle_1.charge * particle_2.charge
            * erfc(self.alpha * distance)
            / distance
    }
}

///
/// Pair-wise additive energy term. The partial sum counts interactions of
/// the indexed subset with everything else, plus each distinct pair inside
/// the subset once.
///
#[derive(Clone, Debug)]
pub struct PairEnergy<T: PairPotential> {
    potential: T,
}

impl<T: PairPotential> PairEnergy<T> {
    pub fn new(potential: T) -> Self {
        Self { potential }
    }

    /// Sum all pair interactions in the set (kT)
    fn total(
        &self,
        particles: &[Particle],
        geometry: &Geometry,
        environment: &Environment,
    ) -> f64 {
        let mut energy = 0.0;
        for (i, particle_1) in particles.iter().enumerate() {
            for particle_2 in particles.iter().skip(i + 1) {
                energy += self.potential.pair(particle_1, particle_2, geometry, environment);
            }
        }
        energy
    }

    fn partial(
        &self,
        indices: &[usize],
        particles: &[Particle],
        geometry: &Geometry,
        environment: &Environment,
    ) -> f64 {
        let mut in_subset = vec![false; particles.len()];
        for &index in indices {
            in_subset[index] = true;
        }
        let mut energy = 0.0;
        for &i in indices {
            for (j, other) in particles.iter().enumerate() {
                if j == i || (in_subset[j] && j < i) {
                    continue;
                }
                energy += self.potential.pair(&particles[i], other, geometry, environment);
            }
        }
        energy
    }
}

///
/// Long-range reciprocal-space part of the Ewald split, including the
/// self-energy correction. Structure factors `S(k) = Σ qⱼ exp(ik·rⱼ)` are
/// cached and rolled by `apply`; a box rescale invalidates the k-grid and
/// requires `initialize`.
///
#[derive(Clone, Debug)]
pub struct ReciprocalEwald {
    pub alpha: f64,
    pub k_max: [i32; 3],
    k_vectors: Vec<Vector3<f64>>,
    prefactors: Vec<f64>,
    structure_factors: Vec<Complex<f64>>,
    charge_square_sum: f64,
}

impl ReciprocalEwald {
    pub fn new(alpha: f64, k_max: [i32; 3]) -> Self {
        Self {
            alpha,
            k_max,
            k_vectors: Vec::new(),
            prefactors: Vec::new(),
            structure_factors: Vec::new(),
            charge_square_sum: 0.0,
        }
    }

    fn initialize(&mut self, particles: &[Particle], geometry: &Geometry) {
        let lengths = geometry.bounding_box();
        self.k_vectors.clear();
        self.prefactors.clear();
        let four_alpha_sq = 4.0 * self.alpha * self.alpha;
        for (nx, ny, nz) in iproduct!(
            -self.k_max[0]..=self.k_max[0],
            -self.k_max[1]..=self.k_max[1],
            -self.k_max[2]..=self.k_max[2]
        ) {
            if nx == 0 && ny == 0 && nz == 0 {
                continue;
            }
            let k = 2.0 * PI
                * Vector3::new(
                    f64::from(nx) / lengths[0],
                    f64::from(ny) / lengths[1],
                    f64::from(nz) / lengths[2],
                );
            let k_squared = k.norm_squared();
            self.k_vectors.push(k);
            self.prefactors.push((-k_squared / four_alpha_sq).exp() / k_squared);
        }
        self.structure_factors = self
            .k_vectors
            .iter()
            .map(|k| {
                particles
                    .iter()
                    .map(|particle| {
                        let phase = k.dot(&particle.pos);
                        Complex::new(phase.cos(), phase.sin()) * particle.charge
                    })
                    .sum()
            })
            .collect();
        self.charge_square_sum = particles
            .iter()
            .map(|particle| particle.charge * particle.charge)
            .sum();
    }

    /// Reciprocal sum plus self-energy correction from the cache (kT)
    fn energy(&self, geometry: &Geometry, environment: &Environment) -> f64 {
        let reciprocal: f64 = self
            .prefactors
            .iter()
            .zip(&self.structure_factors)
            .map(|(prefactor, s)| prefactor * s.norm_sqr())
            .sum();
        environment.bjerrum_length()
            * (2.0 * PI / geometry.volume() * reciprocal
                - self.alpha / PI.sqrt() * self.charge_square_sum)
    }

    fn apply(&mut self, before: &[Particle], after: &[Particle]) {
        for particle in before {
            for (k, s) in self.k_vectors.iter().zip(&mut self.structure_factors) {
                let phase = k.dot(&particle.pos);
                *s -= Complex::new(phase.cos(), phase.sin()) * particle.charge;
            }
            self.charge_square_sum -= particle.charge * particle.charge;
        }
        for particle in after {
            for (k, s) in self.k_vectors.iter().zip(&mut self.structure_factors) {
                let phase = k.dot(&particle.pos);
                *s += Complex::new(phase.cos(), phase.sin()) * particle.charge;
            }
            self.charge_square_sum += particle.charge * particle.charge;
        }
    }
}

///
/// A contribution to the total energy. Tagged over the concrete terms so the
/// move loop dispatches without virtual calls; the geometry is passed by
/// reference at every call and never cached.
///
#[derive(Clone, Debug)]
pub enum EnergyTerm {
    Coulomb(PairEnergy<Coulomb>),
    EwaldReal(PairEnergy<RealSpaceEwald>),
    EwaldReciprocal(ReciprocalEwald),
}

impl EnergyTerm {
    pub fn coulomb() -> Self {
        EnergyTerm::Coulomb(PairEnergy::new(Coulomb))
    }

    pub fn ewald_real(cutoff: f64, alpha: f64) -> Self {
        EnergyTerm::EwaldReal(PairEnergy::new(RealSpaceEwald { cutoff, alpha }))
    }

    pub fn ewald_reciprocal(alpha: f64, k_max: [i32; 3]) -> Self {
        EnergyTerm::EwaldReciprocal(ReciprocalEwald::new(alpha, k_max))
    }

    pub fn label(&self) -> &'static str {
        match self {
            EnergyTerm::Coulomb(_) => "coulomb",
            EnergyTerm::EwaldReal(_) => "ewald-real",
            EnergyTerm::EwaldReciprocal(_) => "ewald-reciprocal",
        }
    }

    /// Seed internal caches; must be called again after a box rescale.
    pub fn initialize(&mut self, particles: &[Particle], geometry: &Geometry) {
        if let EnergyTerm::EwaldReciprocal(term) = self {
            term.initialize(particles, geometry);
        }
    }

    /// Authoritative full-system sum; rebuilds caches.
    pub fn total(
        &mut self,
        particles: &[Particle],
        geometry: &Geometry,
        environment: &Environment,
    ) -> f64 {
        match self {
            EnergyTerm::Coulomb(term) => term.total(particles, geometry, environment),
            EnergyTerm::EwaldReal(term) => term.total(particles, geometry, environment),
            EnergyTerm::EwaldReciprocal(term) => {
                term.initialize(particles, geometry);
                term.energy(geometry, environment)
            }
        }
    }

    ///
    /// Energy restricted to the indexed subset. For the reciprocal term this
    /// is the cached total: its contribution to an energy difference is the
    /// cache delta produced by `apply`.
    ///
    pub fn partial(
        &self,
        indices: &[usize],
        particles: &[Particle],
        geometry: &Geometry,
        environment: &Environment,
    ) -> f64 {
        match self {
            EnergyTerm::Coulomb(term) => term.partial(indices, particles, geometry, environment),
            EnergyTerm::EwaldReal(term) => term.partial(indices, particles, geometry, environment),
            EnergyTerm::EwaldReciprocal(term) => term.energy(geometry, environment),
        }
    }

    ///
    /// Roll cached contributions from the `before` subset to the `after`
    /// subset. Calling again with the arguments reversed restores the cache.
    ///
    pub fn apply(&mut self, before: &[Particle], after: &[Particle]) {
        if let EnergyTerm::EwaldReciprocal(term) = self {
            term.apply(before, after);
        }
    }
}

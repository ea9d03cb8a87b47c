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

use rand::prelude::IteratorRandom;
use rand::Rng;

use crate::particle::{Particle, ParticleModel, ParticleModelBuilder};

///
/// Ordered particle store with identity indices and species counters.
///
/// The invariant `particles[i].index == i` holds after every operation;
/// insertions and removals shift the tail and renumber it. `cations` counts
/// particles with positive charge, `anions` negative, `real` excludes mirror
/// images.
///
#[derive(Clone, Debug)]
pub struct Particles {
    particles: Vec<Particle>,
    pub cation_model: ParticleModel,
    pub anion_model: ParticleModel,
    cations: usize,
    anions: usize,
    real: usize,
}

impl Default for Particles {
    fn default() -> Self {
        Particles {
            particles: Vec::new(),
            cation_model: ParticleModelBuilder::default()
                .charge(1.0)
                .name("PP".to_string())
                .build()
                .unwrap(),
            anion_model: ParticleModelBuilder::default()
                .charge(-1.0)
                .name("MP".to_string())
                .build()
                .unwrap(),
            cations: 0,
            anions: 0,
            real: 0,
        }
    }
}

impl Particles {
    /// Take ownership of a particle list, renumbering and recounting it.
    pub fn from_vec(particles: Vec<Particle>) -> Self {
        let mut set = Particles::default();
        for particle in particles {
            set.add(particle, None);
        }
        set
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn cations(&self) -> usize {
        self.cations
    }

    pub fn anions(&self) -> usize {
        self.anions
    }

    /// Number of non-image particles.
    pub fn real(&self) -> usize {
        self.real
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    pub fn get_mut(&mut self, index: usize) -> &mut Particle {
        &mut self.particles[index]
    }

    ///
    /// Insert a particle at `at` (or append), shifting and renumbering the
    /// tail so that every `index` field equals its position.
    ///
    pub fn add(&mut self, mut particle: Particle, at: Option<usize>) -> usize {
        let position = at.unwrap_or(self.particles.len());
        if particle.charge > 0.0 {
            self.cations += 1;
        } else if particle.charge < 0.0 {
            self.anions += 1;
        }
        if !particle.image {
            self.real += 1;
        }
        particle.index = position;
        self.particles.insert(position, particle);
        for index in position + 1..self.particles.len() {
            self.particles[index].index = index;
        }
        position
    }

    ///
    /// Remove and return the particle at `index`, shifting and renumbering
    /// the tail.
    ///
    pub fn remove(&mut self, index: usize) -> Particle {
        let particle = self.particles.remove(index);
        if particle.charge > 0.0 {
            self.cations -= 1;
        } else if particle.charge < 0.0 {
            self.anions -= 1;
        }
        if !particle.image {
            self.real -= 1;
        }
        for tail in index..self.particles.len() {
            self.particles[tail].index = tail;
        }
        particle
    }

    /// Uniformly drawn particle index, or `None` when the set is empty.
    pub fn random<R: Rng>(&self, rng: &mut R) -> Option<usize> {
        if self.particles.is_empty() {
            return None;
        }
        Some(rng.gen_range(0..self.particles.len()))
    }

    /// Uniformly drawn index among particles of the given charge sign.
    pub fn random_of_sign<R: Rng>(&self, positive: bool, rng: &mut R) -> Option<usize> {
        self.particles
            .iter()
            .filter(|particle| {
                if positive {
                    particle.charge > 0.0
                } else {
                    particle.charge < 0.0
                }
            })
            .map(|particle| particle.index)
            .choose(rng)
    }

    pub fn subset(&self, indices: &[usize]) -> Vec<Particle> {
        indices
            .iter()
            .map(|&index| self.particles[index].clone())
            .collect()
    }
}

impl std::ops::Index<usize> for Particles {
    type Output = Particle;

    fn index(&self, index: usize) -> &Particle {
        &self.particles[index]
    }
}

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

#[cfg(test)]
use num_traits::Float;

use itertools::Itertools;
use log::warn;
use rand::prelude::IteratorRandom;
use rand::Rng;

use crate::geometry::Geometry;
use crate::state::State;

///
/// Use the Metropolis-Hastings criterion to determine if a move should be
/// accepted or rejected based on the energy difference and a kind-specific
/// prefactor.
///
/// # Arguments
///
/// * `energy_change` - New energy minus old energy in units of kT
/// * `bias` - Ensemble prefactor of the proposing move (1 for symmetric moves)
///
fn accept_move<R: Rng>(energy_change: f64, bias: f64, rng: &mut R) -> bool {
    if energy_change.is_infinite() && energy_change > 0.0 {
        return false;
    }
    let acceptance_probability = f64::min(1.0, bias * f64::exp(-energy_change));
    rng.gen::<f64>() < acceptance_probability
}

///
/// The proposal kinds known to the dispatcher, with their per-kind data.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MoveKind {
    /// displace one center of mass by up to `dp`
    Translate { dp: f64 },
    /// reorient one charge vector
    Rotate { dp: f64 },
    /// exchange the positions of a random cation and a random anion
    Swap,
    /// exchange the properties of two particles of the same species
    SingleSwap,
    /// grand-canonical insertion at chemical potential `cp` (kT)
    Insert { cp: f64 },
    /// grand-canonical deletion at chemical potential `cp` (kT)
    Delete { cp: f64 },
    /// isotropic volume change, `ΔV` uniform in `±dv`
    Volume { dv: f64, pressure: f64 },
    /// displace one point charge within its hard core
    ChargeTranslate { dp: f64 },
    /// redraw one charge vector from its allowed range
    ChargeRandomize,
}

impl MoveKind {
    pub fn label(&self) -> &'static str {
        match self {
            MoveKind::Translate { .. } => "translate",
            MoveKind::Rotate { .. } => "rotate",
            MoveKind::Swap => "swap",
            MoveKind::SingleSwap => "single-swap",
            MoveKind::Insert { .. } => "gc-insert",
            MoveKind::Delete { .. } => "gc-delete",
            MoveKind::Volume { .. } => "volume",
            MoveKind::ChargeTranslate { .. } => "charge-trans",
            MoveKind::ChargeRandomize => "charge-rand",
        }
    }
}

///
/// A weighted proposal operator with acceptance bookkeeping. `execute`
/// mutates the state through its journal and records the ensemble prefactor
/// used by the following `accept`.
///
#[derive(Clone, Debug)]
pub struct Move {
    pub kind: MoveKind,
    pub weight: f64,
    bias: f64,
    attempted: u64,
    accepted: u64,
}

impl Move {
    pub fn new(kind: MoveKind, weight: f64) -> Self {
        assert!(
            weight > 0.0 && weight <= 1.0,
            "move weight must lie in (0, 1]"
        );
        Move {
            kind,
            weight,
            bias: 1.0,
            attempted: 0,
            accepted: 0,
        }
    }

    pub fn execute<R: Rng>(&mut self, state: &mut State, rng: &mut R) {
        self.bias = 1.0;
        match self.kind {
            MoveKind::Translate { dp } => {
                if let Some(index) = state.particles.random(rng) {
                    state.displace_particle(index, dp, rng);
                }
            }
            MoveKind::Rotate { dp } => {
                if let Some(index) = state.particles.random(rng) {
                    state.rotate_particle(index, dp, rng);
                }
            }
            MoveKind::ChargeTranslate { dp } => {
                if let Some(index) = state.particles.random(rng) {
                    state.displace_charge(index, dp, rng);
                }
            }
            MoveKind::ChargeRandomize => {
                if let Some(index) = state.particles.random(rng) {
                    state.randomize_charge(index, rng);
                }
            }
            MoveKind::Swap => {
                let cation = state.particles.random_of_sign(true, rng);
                let anion = state.particles.random_of_sign(false, rng);
                if let (Some(first), Some(second)) = (cation, anion) {
                    state.swap_positions(first, second);
                }
            }
            MoveKind::SingleSwap => {
                let positive = rng.gen::<bool>();
                let candidates: Vec<usize> = state
                    .particles
                    .iter()
                    .filter(|particle| {
                        if positive {
                            particle.charge > 0.0
                        } else {
                            particle.charge < 0.0
                        }
                    })
                    .map(|particle| particle.index)
                    .collect();
                if candidates.len() >= 2 {
                    let (first, second) = candidates
                        .into_iter()
                        .choose_multiple(rng, 2)
                        .into_iter()
                        .collect_tuple()
                        .unwrap();
                    state.swap_properties(first, second);
                }
            }
            MoveKind::Insert { cp } => {
                let positive = rng.gen::<bool>();
                let count = if positive {
                    state.particles.cations()
                } else {
                    state.particles.anions()
                };
                let volume = state.geometry.volume();
                state.insert_from_model(positive, rng);
                self.bias = volume * cp.exp() / (count as f64 + 1.0);
            }
            MoveKind::Delete { cp } => {
                let positive = rng.gen::<bool>();
                let count = if positive {
                    state.particles.cations()
                } else {
                    state.particles.anions()
                };
                match state.particles.random_of_sign(positive, rng) {
                    Some(index) => {
                        let volume = state.geometry.volume();
                        state.remove_particle(index);
                        self.bias = count as f64 * (-cp).exp() / volume;
                    }
                    None => self.bias = 0.0,
                }
            }
            MoveKind::Volume { dv, pressure } => match state.geometry {
                Geometry::Cuboid { .. } => {
                    let volume = state.geometry.volume();
                    let delta = rng.gen_range(-dv..=dv);
                    let target = volume + delta;
                    if target <= 0.0 {
                        self.bias = 0.0;
                    } else {
                        let count = state.particles.len() as i32;
                        state.rescale_volume((target / volume).cbrt());
                        self.bias = (target / volume).powi(count) * (-pressure * delta).exp();
                    }
                }
                Geometry::Sphere { .. } => {
                    warn!("volume moves require a cuboid geometry; skipping");
                    self.bias = 0.0;
                }
            },
        }
    }

    /// Metropolis verdict for the proposal just executed; updates statistics.
    pub fn accept<R: Rng>(&mut self, energy_change: f64, rng: &mut R) -> bool {
        let verdict = accept_move(energy_change, self.bias, rng);
        self.attempted += 1;
        if verdict {
            self.accepted += 1;
        }
        verdict
    }

    pub fn attempted(&self) -> u64 {
        self.attempted
    }

    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Ratio of accepted vs. attempted proposals
    pub fn acceptance_ratio(&self) -> f64 {
        if self.attempted == 0 {
            return 0.0;
        }
        self.accepted as f64 / self.attempted as f64
    }

    pub fn report(&self) -> String {
        format!(
            "{:<14} {:5.1}% ({}/{}) w={:.3}",
            self.kind.label(),
            100.0 * self.acceptance_ratio(),
            self.accepted,
            self.attempted,
            self.weight
        )
    }
}

///
/// Weighted collection of moves. `finalize` freezes the selection
/// probabilities into a cumulative distribution; `choose_mut` draws from it.
///
#[derive(Clone, Debug, Default)]
pub struct MoveSet {
    moves: Vec<Move>,
    cumulative: Vec<f64>,
}

impl MoveSet {
    pub fn push(&mut self, mv: Move) {
        self.moves.push(mv);
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.moves.iter()
    }

    ///
    /// Sort moves by ascending weight and normalize the weights into a
    /// cumulative distribution whose last entry is exactly 1.
    ///
    pub fn finalize(&mut self) {
        assert!(!self.moves.is_empty(), "no moves registered");
        self.moves
            .sort_by(|a, b| a.weight.partial_cmp(&b.weight).unwrap());
        let total: f64 = self.moves.iter().map(|mv| mv.weight).sum();
        let mut running = 0.0;
        self.cumulative = self
            .moves
            .iter()
            .map(|mv| {
                running += mv.weight / total;
                running
            })
            .collect();
        *self.cumulative.last_mut().unwrap() = 1.0;
        assert_eq!(*self.cumulative.last().unwrap(), 1.0);
    }

    /// Draw a move from the cumulative weight distribution.
    pub fn choose_mut<R: Rng>(&mut self, rng: &mut R) -> &mut Move {
        let u = rng.gen::<f64>();
        let index = self
            .cumulative
            .partition_point(|&weight| weight < u)
            .min(self.moves.len() - 1);
        &mut self.moves[index]
    }
}

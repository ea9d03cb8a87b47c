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

use log::{info, warn};
use nalgebra::Vector3;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::time::Instant;

use crate::energy::EnergyTerm;
use crate::environment::Environment;
use crate::geometry::Geometry;
use crate::montecarlo::{Move, MoveKind, MoveSet};
use crate::output::{self, OutputError};
use crate::sampler::{
    ChargeDisplacement, DensityProfile, EnergyTrace, IonCount, Sampler, XyzTrajectory,
};
use crate::state::State;

///
/// Owner of the state, moves and samplers; runs the macro/micro step loop.
///
/// Construction order matters: geometry and energy terms before particles,
/// everything before `finalize`, `finalize` before `run`.
///
pub struct Simulator {
    name: String,
    pub environment: Environment,
    pub state: State,
    moves: MoveSet,
    samplers: Vec<Box<dyn Sampler>>,
    rng: SmallRng,
}

impl Simulator {
    pub fn new(dielectric: f64, temperature: f64, name: &str, seed: Option<u64>) -> Self {
        let environment = Environment::new(dielectric, temperature);
        info!(
            "Bjerrum length is {:.6} Å at {} K, dielectric {}",
            environment.bjerrum_length(),
            temperature,
            dielectric
        );
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Simulator {
            name: name.to_string(),
            environment,
            state: State::new(Geometry::cuboid(Vector3::repeat(50.0))),
            moves: MoveSet::default(),
            samplers: Vec::new(),
            rng,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn moves(&self) -> &MoveSet {
        &self.moves
    }

    /// Select the container: 0 periodic cuboid, 1 sphere, 2 slab cuboid.
    pub fn set_geometry(&mut self, tag: u32, params: &[f64]) {
        match tag {
            0 if params.len() >= 3 => {
                info!("creating periodic cuboid {:?}", &params[..3]);
                self.state.geometry =
                    Geometry::cuboid(Vector3::new(params[0], params[1], params[2]));
            }
            1 if !params.is_empty() => {
                info!("creating sphere of radius {}", params[0]);
                self.state.geometry = Geometry::sphere(params[0]);
            }
            2 if params.len() >= 3 => {
                info!("creating slab cuboid {:?} with walls in z", &params[..3]);
                self.state.geometry = Geometry::slab(Vector3::new(params[0], params[1], params[2]));
            }
            _ => warn!("could not find geometry {} for {:?}; skipping", tag, params),
        }
    }

    ///
    /// Register energy terms: 0 bare Coulomb, 1 reciprocal Ewald, 2 real plus
    /// reciprocal Ewald. Ewald parameters are `(cutoff, kx, ky, kz, alpha)`.
    ///
    pub fn set_energy(&mut self, tag: u32, params: &[f64]) {
        match tag {
            0 => {
                info!("adding Coulomb potential");
                self.state.push_term(EnergyTerm::coulomb());
            }
            1 | 2 if params.len() >= 5 => {
                let cutoff = params[0];
                let k_max = [params[1] as i32, params[2] as i32, params[3] as i32];
                let alpha = params[4];
                if tag == 2 {
                    info!("adding Ewald potential, real space (cutoff {})", cutoff);
                    self.state.push_term(EnergyTerm::ewald_real(cutoff, alpha));
                }
                info!(
                    "adding Ewald potential, reciprocal space (alpha {}, k {:?})",
                    alpha, k_max
                );
                self.state
                    .push_term(EnergyTerm::ewald_reciprocal(alpha, k_max));
            }
            _ => warn!("could not find energy {} for {:?}; skipping", tag, params),
        }
    }

    ///
    /// Register a move by tag: 0 translate, 1 insert, 2 delete, 3 rotate,
    /// 4 swap, 5 single-swap, 6 volume, 7 charge-translate,
    /// 8 charge-randomize. A missing chemical potential falls back on the
    /// environment's.
    ///
    pub fn add_move(&mut self, tag: u32, dp: f64, weight: f64, cp: Option<f64>, extra: f64) {
        let cp = cp.unwrap_or(self.environment.chemical_potential);
        let kind = match tag {
            0 => MoveKind::Translate { dp },
            1 => MoveKind::Insert { cp },
            2 => MoveKind::Delete { cp },
            3 => MoveKind::Rotate { dp },
            4 => MoveKind::Swap,
            5 => MoveKind::SingleSwap,
            6 => MoveKind::Volume {
                dv: dp,
                pressure: extra,
            },
            7 => MoveKind::ChargeTranslate { dp },
            8 => MoveKind::ChargeRandomize,
            _ => {
                warn!("could not find move {}; skipping", tag);
                return;
            }
        };
        info!("adding move: {} (weight {})", kind.label(), weight);
        self.moves.push(Move::new(kind, weight));
    }

    ///
    /// Register a sampler by tag: 0 density profile, 2 energy trace,
    /// 3 charge-displacement histogram, 4 XYZ trajectory, 5 ion counts.
    ///
    pub fn add_sampler(&mut self, tag: u32, interval: usize) {
        if interval == 0 {
            warn!("sampler interval must be positive; skipping");
            return;
        }
        let lengths = self.state.geometry.bounding_box();
        match tag {
            0 => {
                info!("adding density sampler");
                self.samplers.push(Box::new(DensityProfile::new(
                    interval,
                    0.05,
                    0.5 * lengths[2],
                    lengths[0] * lengths[1],
                    &self.name,
                )));
            }
            2 => {
                info!("adding energy sampler");
                self.samplers
                    .push(Box::new(EnergyTrace::new(interval, &self.name)));
            }
            3 => {
                info!("adding charge distribution sampler");
                self.samplers
                    .push(Box::new(ChargeDisplacement::new(interval, 0.05, &self.name)));
            }
            4 => {
                info!("adding trajectory sampler");
                self.samplers
                    .push(Box::new(XyzTrajectory::new(interval, &self.name)));
            }
            5 => {
                info!("adding number of ions sampler");
                self.samplers
                    .push(Box::new(IonCount::new(interval, &self.name)));
            }
            _ => warn!("could not find sampler {}; skipping", tag),
        }
    }

    pub fn create_particles(&mut self, n_plus: usize, n_minus: usize) {
        let Simulator { state, rng, .. } = self;
        state.create_particles(n_plus, n_minus, rng);
    }

    /// Resume from a checkpoint, adopting its box lengths for cuboids.
    pub fn load_checkpoint(&mut self, path: &str) -> Result<(), OutputError> {
        let (particles, lengths) = output::load_checkpoint(path)?;
        info!("read {} particles from {}", particles.len(), path);
        if let Geometry::Cuboid {
            lengths: current, ..
        } = &mut self.state.geometry
        {
            *current = lengths;
        }
        self.state.load_particles(particles);
        Ok(())
    }

    /// Remove hard-core overlaps by random kicks of the given step length.
    pub fn equilibrate(&mut self, step: f64) {
        let Simulator { state, rng, .. } = self;
        state.equilibrate(step, rng);
    }

    ///
    /// Append a charge-negated wall image per real particle; call after
    /// particle placement and before `finalize`.
    ///
    pub fn add_images(&mut self) {
        self.state.add_images();
        info!(
            "added {} image particles",
            self.state.particles.len() - self.state.particles.real()
        );
    }

    /// Freeze move selection probabilities and the energy bookkeeping.
    pub fn finalize(&mut self) {
        self.moves.finalize();
        self.state.finalize(&self.environment);
        info!("initial energy: {:.6} kT", self.state.energy);
    }

    ///
    /// Run `macro_steps` rounds of `micro_steps + 1` proposals each. After
    /// each round the state is audited (`control`), acceptance ratios and
    /// energies are reported and samplers flush. Sampling starts once the
    /// macro counter reaches `eq_steps`.
    ///
    pub fn run(
        &mut self,
        macro_steps: usize,
        micro_steps: usize,
        eq_steps: usize,
    ) -> Result<(), OutputError> {
        info!(
            "running at {} K with {} particles ({} cations, {} anions)",
            self.environment.temperature(),
            self.state.particles.len(),
            self.state.particles.cations(),
            self.state.particles.anions()
        );
        for macro_step in 0..macro_steps {
            let start = Instant::now();
            for micro in 0..=micro_steps {
                let mv = self.moves.choose_mut(&mut self.rng);
                mv.execute(&mut self.state, &mut self.rng);
                let energy_change = self.state.energy_change(&self.environment);
                if mv.accept(energy_change, &mut self.rng) {
                    self.state.save();
                } else {
                    self.state.revert();
                }
                if macro_step >= eq_steps {
                    for sampler in &mut self.samplers {
                        if micro % sampler.interval() == 0 {
                            sampler.sample(&self.state);
                        }
                    }
                }
            }
            self.state.control(&self.environment);
            self.state.advance();

            info!("macro step {}", macro_step);
            for mv in self.moves.iter() {
                info!("  {}", mv.report());
            }
            let lengths = self.state.geometry.bounding_box();
            info!(
                "  energy {:.6} kT, drift {:e}, cations {}, anions {}, total {}",
                self.state.energy,
                self.state.error,
                self.state.particles.cations(),
                self.state.particles.anions(),
                self.state.particles.len()
            );
            info!(
                "  box {:.3} x {:.3} x {:.3} ({:.3} Å³), {:.2?} per macro step",
                lengths[0],
                lengths[1],
                lengths[2],
                self.state.geometry.volume(),
                start.elapsed()
            );
            for sampler in &mut self.samplers {
                sampler.flush()?;
            }
        }
        for sampler in &mut self.samplers {
            sampler.close()?;
        }
        let lengths = self.state.geometry.bounding_box();
        output::save_xyz(&format!("{}.xyz", self.name), &self.state.particles, &lengths)?;
        output::save_checkpoint(&format!("{}.cpt", self.name), &self.state.particles, &lengths)?;
        output::save_gro(&format!("{}.gro", self.name), &self.state.particles, &lengths)?;
        info!("energy of last frame: {:.6} kT", self.state.cumulative_energy);
        info!("simulation done");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_name(stem: &str) -> String {
        std::env::temp_dir()
            .join(format!("ionmc_{}_{}", std::process::id(), stem))
            .to_string_lossy()
            .into_owned()
    }

    #[test]
    fn unknown_tags_are_skipped() {
        let mut simulator = Simulator::new(2.0, 1000.0, &scratch_name("tags"), Some(1));
        simulator.add_move(42, 0.5, 1.0, None, 0.0);
        assert!(simulator.moves().is_empty());
        simulator.add_sampler(42, 100);
        simulator.set_energy(42, &[]);
        assert!(simulator.state.terms.is_empty());
    }

    #[test]
    fn short_run_completes_and_writes_structures() {
        let name = scratch_name("short_run");
        let mut simulator = Simulator::new(2.0, 1000.0, &name, Some(7));
        simulator.set_geometry(0, &[30.0, 30.0, 30.0]);
        simulator.set_energy(0, &[]);
        simulator.create_particles(5, 5);
        simulator.add_move(0, 0.5, 1.0, None, 0.0);
        simulator.equilibrate(5.0);
        simulator.finalize();
        simulator.run(2, 50, 0).unwrap();

        let translate = simulator.moves().iter().next().unwrap();
        assert_eq!(translate.attempted(), 2 * 51);
        for suffix in ["xyz", "cpt", "gro"] {
            let path = format!("{}.{}", name, suffix);
            assert!(std::path::Path::new(&path).exists());
            std::fs::remove_file(&path).unwrap();
        }
    }
}

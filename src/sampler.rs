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

use average::{Estimate, Mean};
use log::info;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};

use crate::state::State;

///
/// Consumer of accepted states at a fixed micro-step interval. `flush` is
/// called once per macro step, `close` at the end of the run; both may write
/// files keyed by the simulation name.
///
pub trait Sampler {
    fn interval(&self) -> usize;
    fn sample(&mut self, state: &State);
    fn flush(&mut self) -> io::Result<()>;
    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

///
/// z-resolved number density per species, normalized by bin volume and
/// sample count.
///
pub struct DensityProfile {
    interval: usize,
    dz: f64,
    half_z: f64,
    area: f64,
    cations: Vec<f64>,
    anions: Vec<f64>,
    samples: u64,
    path: String,
}

impl DensityProfile {
    pub fn new(interval: usize, dz: f64, half_z: f64, area: f64, name: &str) -> Self {
        let bins = (2.0 * half_z / dz).ceil() as usize;
        DensityProfile {
            interval,
            dz,
            half_z,
            area,
            cations: vec![0.0; bins],
            anions: vec![0.0; bins],
            samples: 0,
            path: format!("{}_density.dat", name),
        }
    }
}

impl Sampler for DensityProfile {
    fn interval(&self) -> usize {
        self.interval
    }

    fn sample(&mut self, state: &State) {
        self.samples += 1;
        for particle in state.particles.iter() {
            let z = particle.pos[2] + self.half_z;
            if z < 0.0 || z >= 2.0 * self.half_z {
                continue;
            }
            let bin = ((z / self.dz) as usize).min(self.cations.len() - 1);
            if particle.charge > 0.0 {
                self.cations[bin] += 1.0;
            } else {
                self.anions[bin] += 1.0;
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.samples == 0 {
            return Ok(());
        }
        let mut file = BufWriter::new(File::create(&self.path)?);
        let norm = self.samples as f64 * self.dz * self.area;
        for (bin, (cations, anions)) in self.cations.iter().zip(&self.anions).enumerate() {
            writeln!(
                file,
                "{:10.4} {:12.6e} {:12.6e}",
                -self.half_z + (bin as f64 + 0.5) * self.dz,
                cations / norm,
                anions / norm
            )?;
        }
        Ok(())
    }
}

/// Trace of the running total energy (kT).
pub struct EnergyTrace {
    interval: usize,
    trace: Vec<f64>,
    mean: Mean,
    path: String,
}

impl EnergyTrace {
    pub fn new(interval: usize, name: &str) -> Self {
        EnergyTrace {
            interval,
            trace: Vec::new(),
            mean: Mean::new(),
            path: format!("{}_energy.dat", name),
        }
    }

    pub fn mean_energy(&self) -> f64 {
        self.mean.mean()
    }
}

impl Sampler for EnergyTrace {
    fn interval(&self) -> usize {
        self.interval
    }

    fn sample(&mut self, state: &State) {
        self.trace.push(state.cumulative_energy);
        self.mean.add(state.cumulative_energy);
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut file = BufWriter::new(File::create(&self.path)?);
        for (sample, energy) in self.trace.iter().enumerate() {
            writeln!(file, "{:8} {:16.8}", sample, energy)?;
        }
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.flush()?;
        info!("mean sampled energy: {:.6} kT", self.mean_energy());
        Ok(())
    }
}

/// Histogram of the charge-displacement length `b`.
pub struct ChargeDisplacement {
    interval: usize,
    db: f64,
    counts: Vec<u64>,
    total: u64,
    path: String,
}

impl ChargeDisplacement {
    pub fn new(interval: usize, db: f64, name: &str) -> Self {
        ChargeDisplacement {
            interval,
            db,
            counts: Vec::new(),
            total: 0,
            path: format!("{}_qdist.dat", name),
        }
    }
}

impl Sampler for ChargeDisplacement {
    fn interval(&self) -> usize {
        self.interval
    }

    fn sample(&mut self, state: &State) {
        for particle in state.particles.iter() {
            let bin = (particle.b / self.db) as usize;
            if bin >= self.counts.len() {
                self.counts.resize(bin + 1, 0);
            }
            self.counts[bin] += 1;
            self.total += 1;
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.total == 0 {
            return Ok(());
        }
        let mut file = BufWriter::new(File::create(&self.path)?);
        for (bin, count) in self.counts.iter().enumerate() {
            writeln!(
                file,
                "{:10.4} {:12.6e}",
                (bin as f64 + 0.5) * self.db,
                *count as f64 / self.total as f64
            )?;
        }
        Ok(())
    }
}

/// Cation and anion counts per sample, for grand-canonical runs.
pub struct IonCount {
    interval: usize,
    rows: Vec<(usize, usize)>,
    path: String,
}

impl IonCount {
    pub fn new(interval: usize, name: &str) -> Self {
        IonCount {
            interval,
            rows: Vec::new(),
            path: format!("{}_ions.dat", name),
        }
    }
}

impl Sampler for IonCount {
    fn interval(&self) -> usize {
        self.interval
    }

    fn sample(&mut self, state: &State) {
        self.rows
            .push((state.particles.cations(), state.particles.anions()));
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut file = BufWriter::new(File::create(&self.path)?);
        for (sample, (cations, anions)) in self.rows.iter().enumerate() {
            writeln!(file, "{:8} {:6} {:6}", sample, cations, anions)?;
        }
        Ok(())
    }
}

/// Appended XYZ trajectory frames, buffered per macro step.
pub struct XyzTrajectory {
    interval: usize,
    frames: Vec<String>,
    path: String,
    truncated: bool,
}

impl XyzTrajectory {
    pub fn new(interval: usize, name: &str) -> Self {
        XyzTrajectory {
            interval,
            frames: Vec::new(),
            path: format!("{}_traj.xyz", name),
            truncated: false,
        }
    }
}

impl Sampler for XyzTrajectory {
    fn interval(&self) -> usize {
        self.interval
    }

    fn sample(&mut self, state: &State) {
        let lengths = state.geometry.bounding_box();
        let mut frame = format!(
            "{}\nbox {} {} {}\n",
            state.particles.len(),
            lengths[0],
            lengths[1],
            lengths[2]
        );
        for particle in state.particles.iter() {
            frame.push_str(&format!(
                "{} {} {} {}\n",
                particle.name, particle.pos[0], particle.pos[1], particle.pos[2]
            ));
        }
        self.frames.push(frame);
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.frames.is_empty() {
            return Ok(());
        }
        if !self.truncated {
            File::create(&self.path)?;
            self.truncated = true;
        }
        let mut file = BufWriter::new(OpenOptions::new().append(true).open(&self.path)?);
        for frame in self.frames.drain(..) {
            file.write_all(frame.as_bytes())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use nalgebra::Vector3;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn tiny_state() -> State {
        let mut rng = Pcg64::seed_from_u64(42);
        let mut state = State::new(Geometry::cuboid(Vector3::repeat(10.0)));
        state.create_particles(2, 2, &mut rng);
        state
    }

    #[test]
    fn density_profile_counts_every_particle() {
        let state = tiny_state();
        let mut sampler = DensityProfile::new(10, 0.5, 5.0, 100.0, "test");
        sampler.sample(&state);
        let total: f64 = sampler.cations.iter().sum::<f64>() + sampler.anions.iter().sum::<f64>();
        assert_eq!(total as usize, state.particles.len());
    }

    #[test]
    fn energy_trace_records_the_running_total() {
        let mut state = tiny_state();
        state.cumulative_energy = -3.5;
        let mut sampler = EnergyTrace::new(10, "test");
        sampler.sample(&state);
        sampler.sample(&state);
        assert_eq!(sampler.trace.len(), 2);
        assert_eq!(sampler.mean_energy(), -3.5);
    }

    #[test]
    fn ion_count_tracks_species() {
        let state = tiny_state();
        let mut sampler = IonCount::new(10, "test");
        sampler.sample(&state);
        assert_eq!(sampler.rows, vec![(2, 2)]);
    }

    #[test]
    fn trajectory_frames_have_a_header_per_sample() {
        let state = tiny_state();
        let mut sampler = XyzTrajectory::new(10, "test");
        sampler.sample(&state);
        assert!(sampler.frames[0].starts_with("4\nbox 10 10 10\n"));
        assert_eq!(sampler.frames[0].lines().count(), 2 + 4);
    }
}

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

//!
//! Metropolis Monte Carlo engine for charged, finite-size particles in
//! periodic and bounded geometries. Proposals mutate the configuration
//! through a change journal; energy differences are evaluated incrementally
//! per energy term and accepted or rejected under the Metropolis criterion.
//!

pub mod energy;
pub mod environment;
pub mod geometry;
pub mod input;
pub mod montecarlo;
pub mod output;
pub mod particle;
pub mod particles;
pub mod sampler;
pub mod simulator;
pub mod state;

pub use energy::EnergyTerm;
pub use environment::Environment;
pub use geometry::Geometry;
pub use montecarlo::{Move, MoveKind, MoveSet};
pub use particle::{Particle, ParticleModel};
pub use particles::Particles;
pub use simulator::Simulator;
pub use state::State;

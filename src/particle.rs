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

use derive_builder::Builder;
use nalgebra::Vector3;
use rand::Rng;
use rand_distr::{Distribution, UnitBall, UnitSphere};

///
/// Particle data incl. positions, charge etc.
///
/// The point charge sits at `pos = com + q_disp`, displaced from the center
/// of mass by the charge vector `q_disp` with `|q_disp| = b`. Every mutator
/// keeps `pos` up to date.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    /// center of mass
    pub com: Vector3<f64>,
    /// displacement of the point charge from the center of mass
    pub q_disp: Vector3<f64>,
    /// charge position, `com + q_disp` (automatically updated)
    pub pos: Vector3<f64>,
    pub charge: f64,
    /// hard-core radius
    pub radius: f64,
    /// effective interaction radius
    pub rf: f64,
    /// length of the charge vector and its allowed range
    pub b: f64,
    pub b_min: f64,
    pub b_max: f64,
    pub name: String,
    /// mirror particle built by `State::add_images`
    pub image: bool,
    /// position in the owning set; equals the storage index at all times
    pub index: usize,
}

impl Particle {
    pub(crate) fn update_pos(&mut self) {
        self.pos = self.com + self.q_disp;
    }

    ///
    /// Displace the center of mass by `step` times a uniform draw from the
    /// unit ball.
    ///
    pub fn translate<R: Rng>(&mut self, step: f64, rng: &mut R) {
        let v: [f64; 3] = UnitBall.sample(rng);
        self.com += step * Vector3::new(v[0], v[1], v[2]);
        self.update_pos();
    }

    pub fn translate_by(&mut self, displacement: &Vector3<f64>) {
        self.com += displacement;
        self.update_pos();
    }

    ///
    /// Reorient the charge vector: perturb by `step` times a random unit
    /// vector, then restore its length to `b`.
    ///
    pub fn rotate<R: Rng>(&mut self, step: f64, rng: &mut R) {
        let v: [f64; 3] = UnitSphere.sample(rng);
        let perturbed = self.q_disp + step * Vector3::new(v[0], v[1], v[2]);
        if let Some(direction) = perturbed.try_normalize(f64::EPSILON) {
            self.q_disp = direction * self.b;
        }
        self.update_pos();
    }

    ///
    /// Displace the point charge, clipping `|q_disp|` to the hard-core
    /// radius.
    ///
    pub fn displace_charge<R: Rng>(&mut self, step: f64, rng: &mut R) {
        let v: [f64; 3] = UnitSphere.sample(rng);
        self.q_disp += step * Vector3::new(v[0], v[1], v[2]);
        if self.q_disp.norm() > self.radius {
            self.q_disp = self.q_disp.normalize() * self.radius;
        }
        self.b = self.q_disp.norm();
        self.update_pos();
    }

    ///
    /// Redraw the charge vector: random direction, length uniform in
    /// `[b_min, b_max]`.
    ///
    pub fn randomize_charge<R: Rng>(&mut self, rng: &mut R) {
        let v: [f64; 3] = UnitSphere.sample(rng);
        self.b = self.b_min + (self.b_max - self.b_min) * rng.gen::<f64>();
        self.q_disp = self.b * Vector3::new(v[0], v[1], v[2]);
        self.update_pos();
    }
}

///
/// Template carrying the default properties of a particle species, used for
/// bulk creation and grand-canonical insertions.
///
#[derive(Clone, Debug, Builder)]
pub struct ParticleModel {
    pub charge: f64,
    #[builder(default = "2.5")]
    pub radius: f64,
    #[builder(default = "2.5")]
    pub rf: f64,
    #[builder(default = "0.0")]
    pub b_min: f64,
    #[builder(default = "0.0")]
    pub b_max: f64,
    pub name: String,
}

impl ParticleModel {
    /// Stamp out a particle at `com` with the charge vector along z at its
    /// minimum length.
    pub fn instantiate(&self, com: Vector3<f64>, index: usize) -> Particle {
        let mut particle = Particle {
            com,
            q_disp: Vector3::new(0.0, 0.0, self.b_min),
            pos: Vector3::zeros(),
            charge: self.charge,
            radius: self.radius,
            rf: self.rf,
            b: self.b_min,
            b_min: self.b_min,
            b_max: self.b_max,
            name: self.name.clone(),
            image: false,
            index,
        };
        particle.update_pos();
        particle
    }
}

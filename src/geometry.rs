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

use nalgebra::Vector3;
use rand::Rng;
use rand_distr::{Distribution, UnitBall};

///
/// Simulation container centered on the origin.
///
/// Distances on periodic axes use the minimum-image convention; walls are
/// enforced through `is_inside`.
///
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Cuboid {
        lengths: Vector3<f64>,
        periodic: [bool; 3],
    },
    Sphere {
        radius: f64,
    },
}

impl Geometry {
    /// Fully periodic cuboid.
    pub fn cuboid(lengths: Vector3<f64>) -> Self {
        Geometry::Cuboid {
            lengths,
            periodic: [true, true, true],
        }
    }

    /// Cuboid periodic in x and y with hard walls in z.
    pub fn slab(lengths: Vector3<f64>) -> Self {
        Geometry::Cuboid {
            lengths,
            periodic: [true, true, false],
        }
    }

    pub fn sphere(radius: f64) -> Self {
        Geometry::Sphere { radius }
    }

    /// Minimum-image displacement vector `a - b`.
    pub fn displacement(&self, a: &Vector3<f64>, b: &Vector3<f64>) -> Vector3<f64> {
        let mut d = a - b;
        if let Geometry::Cuboid { lengths, periodic } = self {
            for axis in 0..3 {
                if periodic[axis] {
                    d[axis] -= lengths[axis] * (d[axis] / lengths[axis]).round();
                }
            }
        }
        d
    }

    pub fn distance(&self, a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
        self.displacement(a, b).norm()
    }

    /// Whether a position lies within the container; periodic axes always do.
    pub fn is_inside(&self, pos: &Vector3<f64>) -> bool {
        match self {
            Geometry::Cuboid { lengths, periodic } => (0..3).all(|axis| {
                periodic[axis] || pos[axis].abs() <= 0.5 * lengths[axis]
            }),
            Geometry::Sphere { radius } => pos.norm() <= *radius,
        }
    }

    /// Fold periodic coordinates back into the primary cell.
    pub fn wrap(&self, pos: &mut Vector3<f64>) {
        if let Geometry::Cuboid { lengths, periodic } = self {
            for axis in 0..3 {
                if periodic[axis] {
                    pos[axis] -= lengths[axis] * (pos[axis] / lengths[axis]).round();
                }
            }
        }
    }

    pub fn random_pos<R: Rng>(&self, rng: &mut R) -> Vector3<f64> {
        match self {
            Geometry::Cuboid { lengths, .. } => Vector3::new(
                lengths[0] * (rng.gen::<f64>() - 0.5),
                lengths[1] * (rng.gen::<f64>() - 0.5),
                lengths[2] * (rng.gen::<f64>() - 0.5),
            ),
            Geometry::Sphere { radius } => {
                let v: [f64; 3] = UnitBall.sample(rng);
                *radius * Vector3::new(v[0], v[1], v[2])
            }
        }
    }

    ///
    /// Image position used when building charged-wall mirror particles:
    /// reflection through the nearest z wall for cuboids, the Kelvin image
    /// point for spheres.
    ///
    pub fn mirror(&self, pos: &Vector3<f64>) -> Vector3<f64> {
        match self {
            Geometry::Cuboid { lengths, .. } => {
                let z = if pos[2] >= 0.0 {
                    lengths[2] - pos[2]
                } else {
                    -lengths[2] - pos[2]
                };
                Vector3::new(pos[0], pos[1], z)
            }
            Geometry::Sphere { radius } => pos * (radius * radius / pos.norm_squared()),
        }
    }

    pub fn volume(&self) -> f64 {
        match self {
            Geometry::Cuboid { lengths, .. } => lengths[0] * lengths[1] * lengths[2],
            Geometry::Sphere { radius } => 4.0 / 3.0 * std::f64::consts::PI * radius.powi(3),
        }
    }

    /// Side lengths (diameter for spheres), e.g. for structure file headers.
    pub fn bounding_box(&self) -> Vector3<f64> {
        match self {
            Geometry::Cuboid { lengths, .. } => *lengths,
            Geometry::Sphere { radius } => Vector3::repeat(2.0 * radius),
        }
    }

    pub fn half_lengths(&self) -> Vector3<f64> {
        0.5 * self.bounding_box()
    }

    /// Isotropic rescale by a linear factor (volume scales with its cube).
    pub fn rescale(&mut self, factor: f64) {
        match self {
            Geometry::Cuboid { lengths, .. } => *lengths *= factor,
            Geometry::Sphere { radius } => *radius *= factor,
        }
    }

    /// Exchange side lengths with `stored`; used to flip a journaled rescale.
    pub(crate) fn swap_lengths(&mut self, stored: &mut Vector3<f64>) {
        match self {
            Geometry::Cuboid { lengths, .. } => std::mem::swap(lengths, stored),
            Geometry::Sphere { radius } => std::mem::swap(radius, &mut stored[0]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    #[test]
    fn minimum_image_across_the_boundary() {
        let geometry = Geometry::cuboid(Vector3::new(10.0, 10.0, 10.0));
        let a = Vector3::new(4.9, 0.0, 0.0);
        let b = Vector3::new(-4.9, 0.0, 0.0);
        assert_relative_eq!(geometry.distance(&a, &b), 0.2, epsilon = 1e-12);
    }

    #[test]
    fn slab_keeps_plain_distance_along_z() {
        let geometry = Geometry::slab(Vector3::new(10.0, 10.0, 10.0));
        let a = Vector3::new(0.0, 0.0, 4.9);
        let b = Vector3::new(0.0, 0.0, -4.9);
        assert_relative_eq!(geometry.distance(&a, &b), 9.8, epsilon = 1e-12);
        assert!(!geometry.is_inside(&Vector3::new(0.0, 0.0, 5.1)));
        assert!(geometry.is_inside(&Vector3::new(99.0, 0.0, 0.0)));
    }

    #[test]
    fn wrap_folds_into_the_primary_cell() {
        let geometry = Geometry::cuboid(Vector3::new(10.0, 10.0, 10.0));
        let mut pos = Vector3::new(7.0, -12.0, 3.0);
        geometry.wrap(&mut pos);
        assert_relative_eq!(pos[0], -3.0, epsilon = 1e-12);
        assert_relative_eq!(pos[1], -2.0, epsilon = 1e-12);
        assert_relative_eq!(pos[2], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn random_positions_fall_inside() {
        let mut rng = Pcg64::seed_from_u64(3);
        for geometry in [
            Geometry::cuboid(Vector3::new(8.0, 4.0, 2.0)),
            Geometry::sphere(5.0),
        ] {
            for _ in 0..100 {
                let pos = geometry.random_pos(&mut rng);
                assert!(geometry.is_inside(&pos));
            }
        }
    }

    #[test]
    fn kelvin_image_lies_on_the_inverse_radius() {
        let geometry = Geometry::sphere(10.0);
        let pos = Vector3::new(0.0, 5.0, 0.0);
        let image = geometry.mirror(&pos);
        assert_relative_eq!(image.norm(), 100.0 / 5.0, epsilon = 1e-12);
    }

    #[test]
    fn rescale_scales_the_volume_cubically() {
        let mut geometry = Geometry::cuboid(Vector3::new(10.0, 10.0, 10.0));
        let volume = geometry.volume();
        geometry.rescale(2.0);
        assert_relative_eq!(geometry.volume(), 8.0 * volume, epsilon = 1e-9);
    }
}

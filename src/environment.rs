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

/// e²/(4πε₀k_B) in units of Å·K
pub const COULOMB_ANGSTROM_KELVIN: f64 = 167_100.95;

///
/// Global physical parameters threaded through the simulation.
///
/// Pair energies are expressed in units of kT through the Bjerrum length,
/// `lB = e²/(4πε₀ε_r k_B T)`, so temperature and dielectric constant enter
/// the Metropolis exponent via `lB` rather than as an explicit 1/kT factor.
///
#[derive(Clone, Debug)]
pub struct Environment {
    temperature: f64,
    dielectric: f64,
    bjerrum_length: f64,
    /// default chemical potential (kT) for grand-canonical moves
    pub chemical_potential: f64,
}

impl Environment {
    pub fn new(dielectric: f64, temperature: f64) -> Self {
        let mut environment = Environment {
            temperature,
            dielectric,
            bjerrum_length: 0.0,
            chemical_potential: 0.0,
        };
        environment.update_bjerrum_length();
        environment
    }

    fn update_bjerrum_length(&mut self) {
        self.bjerrum_length =
            COULOMB_ANGSTROM_KELVIN / (self.dielectric * self.temperature);
    }

    pub fn set_temperature(&mut self, temperature: f64) {
        self.temperature = temperature;
        self.update_bjerrum_length();
    }

    pub fn set_dielectric(&mut self, dielectric: f64) {
        self.dielectric = dielectric;
        self.update_bjerrum_length();
    }

    pub fn set_chemical_potential(&mut self, chemical_potential: f64) {
        self.chemical_potential = chemical_potential;
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn dielectric(&self) -> f64 {
        self.dielectric
    }

    /// Bjerrum length (Å)
    pub fn bjerrum_length(&self) -> f64 {
        self.bjerrum_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn bjerrum_length_in_water() {
        let environment = Environment::new(78.3, 298.0);
        assert_relative_eq!(environment.bjerrum_length(), 7.16, epsilon = 0.01);
    }

    #[test]
    fn setters_refresh_bjerrum_length() {
        let mut environment = Environment::new(2.0, 1000.0);
        let coarse = environment.bjerrum_length();
        environment.set_temperature(500.0);
        assert_relative_eq!(environment.bjerrum_length(), 2.0 * coarse);
        environment.set_dielectric(4.0);
        assert_relative_eq!(environment.bjerrum_length(), coarse);
    }
}

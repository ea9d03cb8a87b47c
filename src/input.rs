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

use clap::Parser;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Output prefix for structure and sampler files
    #[clap(short = 'o', long, default_value = "ionmc")]
    pub name: String,

    /// Checkpoint to resume from
    #[clap(short = 'c', long)]
    pub checkpoint: Option<String>,

    /// Geometry tag (0 periodic cuboid, 1 sphere, 2 slab cuboid)
    #[clap(short = 'g', long, default_value_t = 0)]
    pub geometry: u32,

    /// Cell parameters: side lengths (Å) or sphere radius
    #[clap(long, num_args = 1..=3, default_values_t = [50.0, 50.0, 50.0])]
    pub cell: Vec<f64>,

    /// Energy tag (0 Coulomb, 1 reciprocal Ewald, 2 real + reciprocal Ewald)
    #[clap(short = 'e', long, default_value_t = 0)]
    pub energy: u32,

    /// Ewald parameters: cutoff, kx, ky, kz, alpha
    #[clap(long, num_args = 0..=5)]
    pub energy_params: Vec<f64>,

    /// Number of cations (+1e) to create
    #[clap(short = 'p', long = "plus", default_value_t = 100)]
    pub num_plus: usize,

    /// Number of anions (-1e) to create
    #[clap(short = 'm', long = "minus", default_value_t = 100)]
    pub num_minus: usize,

    /// Hard-core radius of created particles (Å)
    #[clap(short = 'r', long, default_value_t = 2.5)]
    pub radius: f64,

    /// Temperature (K)
    #[clap(short = 't', long, default_value_t = 298.0)]
    pub temperature: f64,

    /// Relative dielectric constant
    #[clap(short = 'd', long, default_value_t = 78.3)]
    pub dielectric: f64,

    /// Default chemical potential (kT) for grand-canonical moves
    #[clap(long, default_value_t = 0.0)]
    pub chemical_potential: f64,

    /// Add a charge-negated mirror particle per real particle for
    /// charged-wall boundaries
    #[clap(long)]
    pub images: bool,

    /// Move registrations as tag:dp:weight[:cp[:extra]]
    #[clap(short = 'M', long = "move")]
    pub moves: Vec<String>,

    /// Sampler registrations as tag:interval
    #[clap(short = 'S', long = "sampler")]
    pub samplers: Vec<String>,

    /// Number of macro steps (audit and report cadence)
    #[clap(long, default_value_t = 10)]
    pub macro_steps: usize,

    /// Number of micro steps (proposals) per macro step
    #[clap(long, default_value_t = 10000)]
    pub micro_steps: usize,

    /// Macro steps to discard before sampling starts
    #[clap(long, default_value_t = 0)]
    pub eq_steps: usize,

    /// Kick length for overlap removal before the run (Å)
    #[clap(long, default_value_t = 10.0)]
    pub eq_displacement: f64,

    /// RNG seed; entropy-seeded when omitted
    #[clap(short = 's', long)]
    pub seed: Option<u64>,
}

/// One `--move` registration, e.g. `0:0.12:0.49` or `1:0:0.25:-16`.
#[derive(Clone, Debug, PartialEq)]
pub struct MoveSpec {
    pub tag: u32,
    pub dp: f64,
    pub weight: f64,
    pub cp: Option<f64>,
    pub extra: f64,
}

pub fn parse_move_spec(spec: &str) -> Result<MoveSpec, String> {
    let fields: Vec<&str> = spec.split(':').collect();
    if fields.len() < 3 || fields.len() > 5 {
        return Err(format!("expected tag:dp:weight[:cp[:extra]], got '{}'", spec));
    }
    let number = |what: &str, field: &str| {
        field
            .parse::<f64>()
            .map_err(|_| format!("malformed {} in '{}'", what, spec))
    };
    Ok(MoveSpec {
        tag: fields[0]
            .parse()
            .map_err(|_| format!("malformed move tag in '{}'", spec))?,
        dp: number("displacement", fields[1])?,
        weight: number("weight", fields[2])?,
        cp: fields
            .get(3)
            .map(|field| number("chemical potential", field))
            .transpose()?,
        extra: fields
            .get(4)
            .map(|field| number("extra parameter", field))
            .transpose()?
            .unwrap_or(0.0),
    })
}

pub fn parse_sampler_spec(spec: &str) -> Result<(u32, usize), String> {
    let fields: Vec<&str> = spec.split(':').collect();
    if fields.len() != 2 {
        return Err(format!("expected tag:interval, got '{}'", spec));
    }
    let tag = fields[0]
        .parse()
        .map_err(|_| format!("malformed sampler tag in '{}'", spec))?;
    let interval = fields[1]
        .parse()
        .map_err(|_| format!("malformed sampler interval in '{}'", spec))?;
    Ok((tag, interval))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_specs_parse_with_optional_fields() {
        assert_eq!(
            parse_move_spec("0:0.12:0.49").unwrap(),
            MoveSpec {
                tag: 0,
                dp: 0.12,
                weight: 0.49,
                cp: None,
                extra: 0.0
            }
        );
        assert_eq!(
            parse_move_spec("1:0:0.25:-16").unwrap(),
            MoveSpec {
                tag: 1,
                dp: 0.0,
                weight: 0.25,
                cp: Some(-16.0),
                extra: 0.0
            }
        );
        assert!(parse_move_spec("0:0.12").is_err());
        assert!(parse_move_spec("zero:0.12:0.5").is_err());
    }

    #[test]
    fn sampler_specs_parse() {
        assert_eq!(parse_sampler_spec("2:100").unwrap(), (2, 100));
        assert!(parse_sampler_spec("2").is_err());
        assert!(parse_sampler_spec("2:many").is_err());
    }
}

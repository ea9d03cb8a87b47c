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
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::str::FromStr;
use thiserror::Error;

use crate::particle::Particle;
use crate::particles::Particles;

const CHECKPOINT_HEADER: &str = "ionmc checkpoint";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("checkpoint parse failure at line {line}: {reason}")]
    Checkpoint { line: usize, reason: String },
}

fn parse_field<T: FromStr>(field: Option<&str>, line: usize, what: &str) -> Result<T, OutputError> {
    field
        .ok_or_else(|| OutputError::Checkpoint {
            line,
            reason: format!("missing {}", what),
        })?
        .parse()
        .map_err(|_| OutputError::Checkpoint {
            line,
            reason: format!("malformed {}", what),
        })
}

///
/// Deduces an atom name from the particle record, falling back on the
/// charge sign.
///
fn atom_name(particle: &Particle) -> &str {
    if !particle.name.is_empty() {
        return &particle.name;
    }
    if particle.charge > 0.0 {
        return "PP"; // "Plus" Particle
    }
    if particle.charge < 0.0 {
        return "MP"; // "Minus" Particle
    }
    "NP" // "Neutral" Particle
}

///
/// Save in XYZ molecular file format (atom names and charge positions)
///
pub fn save_xyz(
    filename: &str,
    particles: &Particles,
    lengths: &Vector3<f64>,
) -> Result<(), OutputError> {
    let mut xyzfile = BufWriter::new(File::create(filename)?);
    writeln!(
        xyzfile,
        "{}\nbox {} {} {}",
        particles.len(),
        lengths[0],
        lengths[1],
        lengths[2]
    )?;
    for particle in particles.iter() {
        writeln!(
            xyzfile,
            "{} {} {} {}",
            atom_name(particle),
            particle.pos[0],
            particle.pos[1],
            particle.pos[2]
        )?;
    }
    Ok(())
}

///
/// Save in GRO molecular file format (positions and box in nm)
///
pub fn save_gro(
    filename: &str,
    particles: &Particles,
    lengths: &Vector3<f64>,
) -> Result<(), OutputError> {
    let mut grofile = BufWriter::new(File::create(filename)?);
    writeln!(grofile, "generated by ionmc\n{:5}", particles.len())?;
    for (index, particle) in particles.iter().enumerate() {
        writeln!(
            grofile,
            "{:>5}{:<5}{:>5}{:>5}{:8.3}{:8.3}{:8.3}",
            1,
            "ION",
            atom_name(particle),
            (index + 1) % 100_000,
            particle.pos[0] / 10.0,
            particle.pos[1] / 10.0,
            particle.pos[2] / 10.0
        )?;
    }
    writeln!(
        grofile,
        "{:10.5}{:10.5}{:10.5}",
        lengths[0] / 10.0,
        lengths[1] / 10.0,
        lengths[2] / 10.0
    )?;
    Ok(())
}

///
/// Save a textual checkpoint: box lengths, particle count and one full
/// particle record per line.
///
pub fn save_checkpoint(
    filename: &str,
    particles: &Particles,
    lengths: &Vector3<f64>,
) -> Result<(), OutputError> {
    let mut file = BufWriter::new(File::create(filename)?);
    writeln!(file, "{}", CHECKPOINT_HEADER)?;
    writeln!(file, "{} {} {}", lengths[0], lengths[1], lengths[2])?;
    writeln!(file, "{}", particles.len())?;
    for particle in particles.iter() {
        writeln!(
            file,
            "{} {} {} {} {} {} {} {} {} {} {} {} {}",
            atom_name(particle),
            particle.charge,
            particle.radius,
            particle.rf,
            particle.b,
            particle.b_min,
            particle.b_max,
            particle.com[0],
            particle.com[1],
            particle.com[2],
            particle.q_disp[0],
            particle.q_disp[1],
            particle.q_disp[2]
        )?;
    }
    Ok(())
}

///
/// Load a checkpoint written by `save_checkpoint`, returning the particle
/// records and the box side lengths.
///
pub fn load_checkpoint(filename: &str) -> Result<(Vec<Particle>, Vector3<f64>), OutputError> {
    let reader = BufReader::new(File::open(filename)?);
    let mut lines = reader.lines().enumerate();

    let (_, header) = lines.next().ok_or(OutputError::Checkpoint {
        line: 1,
        reason: "empty file".to_string(),
    })?;
    if header? != CHECKPOINT_HEADER {
        return Err(OutputError::Checkpoint {
            line: 1,
            reason: format!("expected header '{}'", CHECKPOINT_HEADER),
        });
    }

    let (_, lengths_line) = lines.next().ok_or(OutputError::Checkpoint {
        line: 2,
        reason: "missing box lengths".to_string(),
    })?;
    let lengths_line = lengths_line?;
    let mut fields = lengths_line.split_whitespace();
    let lengths = Vector3::new(
        parse_field(fields.next(), 2, "box length")?,
        parse_field(fields.next(), 2, "box length")?,
        parse_field(fields.next(), 2, "box length")?,
    );

    let (_, count_line) = lines.next().ok_or(OutputError::Checkpoint {
        line: 3,
        reason: "missing particle count".to_string(),
    })?;
    let count: usize = parse_field(count_line?.split_whitespace().next(), 3, "particle count")?;

    let mut particles = Vec::with_capacity(count);
    for _ in 0..count {
        let (number, line) = lines.next().ok_or(OutputError::Checkpoint {
            line: 4 + particles.len(),
            reason: "fewer particle records than announced".to_string(),
        })?;
        let line = line?;
        let lineno = number + 1;
        let mut fields = line.split_whitespace();
        let name: String = parse_field(fields.next(), lineno, "name")?;
        let charge = parse_field(fields.next(), lineno, "charge")?;
        let radius = parse_field(fields.next(), lineno, "radius")?;
        let rf = parse_field(fields.next(), lineno, "rf")?;
        let b = parse_field(fields.next(), lineno, "b")?;
        let b_min = parse_field(fields.next(), lineno, "b_min")?;
        let b_max = parse_field(fields.next(), lineno, "b_max")?;
        let com = Vector3::new(
            parse_field(fields.next(), lineno, "com")?,
            parse_field(fields.next(), lineno, "com")?,
            parse_field(fields.next(), lineno, "com")?,
        );
        let q_disp = Vector3::new(
            parse_field(fields.next(), lineno, "q_disp")?,
            parse_field(fields.next(), lineno, "q_disp")?,
            parse_field(fields.next(), lineno, "q_disp")?,
        );
        particles.push(Particle {
            com,
            q_disp,
            pos: com + q_disp,
            charge,
            radius,
            rf,
            b,
            b_min,
            b_max,
            name,
            image: false,
            index: particles.len(),
        });
    }
    Ok((particles, lengths))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn scratch_path(stem: &str) -> String {
        std::env::temp_dir()
            .join(format!("ionmc_{}_{}", std::process::id(), stem))
            .to_string_lossy()
            .into_owned()
    }

    fn two_ions() -> Particles {
        let mut set = Particles::default();
        let cation = set
            .cation_model
            .instantiate(Vector3::new(1.0, -2.0, 3.25), 0);
        let anion = set
            .anion_model
            .instantiate(Vector3::new(-4.0, 5.5, -6.0), 0);
        set.add(cation, None);
        set.add(anion, None);
        set
    }

    #[test]
    fn checkpoint_round_trip_preserves_records() {
        let path = scratch_path("roundtrip.cpt");
        let set = two_ions();
        let lengths = Vector3::new(50.0, 50.0, 25.0);
        save_checkpoint(&path, &set, &lengths).unwrap();

        let (loaded, loaded_lengths) = load_checkpoint(&path).unwrap();
        assert_relative_eq!((loaded_lengths - lengths).norm(), 0.0);
        assert_eq!(loaded.len(), 2);
        for (original, loaded) in set.iter().zip(&loaded) {
            assert_relative_eq!((original.com - loaded.com).norm(), 0.0);
            assert_relative_eq!(original.charge, loaded.charge);
            assert_relative_eq!(original.radius, loaded.radius);
            assert_eq!(loaded.index, original.index);
        }
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn truncated_checkpoint_is_reported_with_a_line_number() {
        let path = scratch_path("truncated.cpt");
        std::fs::write(&path, format!("{}\n10 10 10\n3\n", CHECKPOINT_HEADER)).unwrap();
        match load_checkpoint(&path) {
            Err(OutputError::Checkpoint { line, .. }) => assert_eq!(line, 4),
            other => panic!("expected a checkpoint error, got {:?}", other),
        }
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn foreign_files_are_rejected() {
        let path = scratch_path("foreign.cpt");
        std::fs::write(&path, "not a checkpoint\n").unwrap();
        assert!(load_checkpoint(&path).is_err());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn xyz_has_one_line_per_particle_plus_header() {
        let path = scratch_path("structure.xyz");
        let set = two_ions();
        save_xyz(&path, &set, &Vector3::repeat(50.0)).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2 + 2);
        assert!(content.starts_with("2\n"));
        std::fs::remove_file(&path).unwrap();
    }
}

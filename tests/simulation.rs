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

use approx::assert_relative_eq;
use nalgebra::Vector3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use ionmc::environment::COULOMB_ANGSTROM_KELVIN;
use ionmc::{Environment, EnergyTerm, Geometry, Move, MoveKind, Simulator, State};

fn scratch_name(stem: &str) -> String {
    std::env::temp_dir()
        .join(format!("ionmc_e2e_{}_{}", std::process::id(), stem))
        .to_string_lossy()
        .into_owned()
}

fn remove_outputs(name: &str) {
    for suffix in ["xyz", "cpt", "gro"] {
        let _ = std::fs::remove_file(format!("{}.{}", name, suffix));
    }
}

#[test]
fn empty_box_runs_to_completion() {
    let name = scratch_name("empty");
    let mut simulator = Simulator::new(2.0, 1000.0, &name, Some(1));
    simulator.set_geometry(0, &[50.0, 50.0, 50.0]);
    simulator.set_energy(0, &[]);
    simulator.add_move(0, 0.5, 1.0, None, 0.0);
    simulator.finalize();
    simulator.run(1, 1, 0).unwrap();

    assert_eq!(simulator.state.particles.len(), 0);
    assert_eq!(simulator.state.energy, 0.0);
    assert_eq!(simulator.state.error, 0.0);
    remove_outputs(&name);
}

#[test]
fn lone_cation_keeps_count_and_energy() {
    let name = scratch_name("lone");
    let mut simulator = Simulator::new(2.0, 1000.0, &name, Some(2));
    simulator.set_geometry(0, &[50.0, 50.0, 50.0]);
    simulator.set_energy(0, &[]);
    simulator.create_particles(1, 0);
    simulator.add_move(0, 0.12, 1.0, None, 0.0);
    simulator.finalize();
    simulator.run(1, 999, 0).unwrap();

    assert_eq!(simulator.state.particles.len(), 1);
    assert_eq!(simulator.state.count_overlaps(), 0);
    assert!(simulator.state.error < 1e-12);
    remove_outputs(&name);
}

#[test]
fn opposite_charges_reproduce_the_coulomb_law() {
    // Bjerrum length of exactly 7 Å
    let environment = Environment::new(1.0, COULOMB_ANGSTROM_KELVIN / 7.0);
    let mut state = State::new(Geometry::sphere(50.0));
    state.push_term(EnergyTerm::coulomb());

    let cation = state
        .particles
        .cation_model
        .instantiate(Vector3::new(-3.0, 0.0, 0.0), 0);
    let anion = state
        .particles
        .anion_model
        .instantiate(Vector3::new(9.5, 0.0, 0.0), 0);
    state.particles.add(cation, None);
    state.particles.add(anion, None);
    state.finalize(&environment);

    let expected = 7.0 * 1.0 * (-1.0) / 12.5;
    assert_relative_eq!(state.energy, expected, max_relative = 1e-10);
}

#[test]
fn electrolyte_mix_keeps_invariants_and_moves() {
    let name = scratch_name("mix");
    let mut simulator = Simulator::new(2.0, 1000.0, &name, Some(3));
    simulator.set_geometry(0, &[50.0, 50.0, 50.0]);
    simulator.set_energy(0, &[]);
    simulator.create_particles(100, 100);
    simulator.add_move(0, 0.12, 0.99, None, 0.0);
    simulator.add_move(4, 0.0, 0.01, None, 0.0);
    simulator.equilibrate(5.0);
    simulator.finalize();
    // control() aborts on any identity, count or drift violation
    simulator.run(10, 1000, 0).unwrap();

    assert_eq!(simulator.state.particles.cations(), 100);
    assert_eq!(simulator.state.particles.anions(), 100);
    let translate = simulator
        .moves()
        .iter()
        .find(|mv| matches!(mv.kind, MoveKind::Translate { .. }))
        .unwrap();
    assert!(translate.attempted() > 9000);
    let ratio = translate.acceptance_ratio();
    assert!(ratio > 0.05 && ratio < 0.95, "acceptance ratio {}", ratio);
    remove_outputs(&name);
}

#[test]
fn grand_canonical_pair_matches_the_ideal_gas() {
    let mut rng = Pcg64::seed_from_u64(4);
    let mut state = State::new(Geometry::cuboid(Vector3::repeat(8.0)));
    state.particles.cation_model.radius = 0.0;
    state.particles.anion_model.radius = 0.0;
    let environment = Environment::new(2.0, 1000.0);
    state.finalize(&environment);

    let cp = -3.0;
    let mut insert = Move::new(MoveKind::Insert { cp }, 0.5);
    let mut delete = Move::new(MoveKind::Delete { cp }, 0.5);

    let mut accumulated = 0u64;
    let mut samples = 0u64;
    for step in 0..150_000u32 {
        let mv = if rng.gen::<bool>() {
            &mut insert
        } else {
            &mut delete
        };
        mv.execute(&mut state, &mut rng);
        let energy_change = state.energy_change(&environment);
        if mv.accept(energy_change, &mut rng) {
            state.save();
        } else {
            state.revert();
        }
        if step >= 15_000 {
            accumulated += state.particles.len() as u64;
            samples += 1;
        }
    }
    state.control(&environment);

    let mean = accumulated as f64 / samples as f64;
    let expected = 2.0 * 512.0 * cp.exp(); // one ideal gas per species
    assert_relative_eq!(mean, expected, max_relative = 0.05);
}

#[test]
fn volume_round_trip_restores_the_running_total() {
    let mut rng = Pcg64::seed_from_u64(5);
    let mut state = State::new(Geometry::cuboid(Vector3::repeat(40.0)));
    state.push_term(EnergyTerm::coulomb());
    state.create_particles(5, 5, &mut rng);
    state.equilibrate(5.0, &mut rng);
    let environment = Environment::new(2.0, 1000.0);
    state.finalize(&environment);
    let reference = state.cumulative_energy;

    let factor: f64 = 0.85;
    state.rescale_volume(factor);
    assert!(state.energy_change(&environment).is_finite());
    state.save();

    state.rescale_volume(1.0 / factor);
    state.energy_change(&environment);
    state.save();

    assert_relative_eq!(state.cumulative_energy, reference, epsilon = 1e-9);
    state.control(&environment);
}

#[test]
fn charged_wall_images_ride_along_through_a_run() {
    let name = scratch_name("images");
    let mut simulator = Simulator::new(2.0, 1000.0, &name, Some(8));
    simulator.set_geometry(2, &[20.0, 20.0, 10.0]);
    simulator.set_energy(0, &[]);
    simulator.create_particles(3, 3);
    simulator.add_move(0, 0.3, 1.0, None, 0.0);
    simulator.equilibrate(3.0);
    simulator.add_images();
    simulator.finalize();
    // control() audits counts and identities with the images present
    simulator.run(1, 100, 0).unwrap();

    assert_eq!(simulator.state.particles.real(), 6);
    assert_eq!(simulator.state.particles.len(), 12);
    for index in 0..6 {
        let image = &simulator.state.particles[6 + index];
        assert!(image.image);
        assert_relative_eq!(
            image.charge,
            -simulator.state.particles[index].charge
        );
        assert!(image.name.ends_with('I'));
    }
    remove_outputs(&name);
}

#[test]
fn ewald_bookkeeping_survives_a_run() {
    let name = scratch_name("ewald");
    let cutoff = 9.0;
    let mut simulator = Simulator::new(2.0, 1000.0, &name, Some(6));
    simulator.set_geometry(0, &[20.0, 20.0, 20.0]);
    simulator.set_energy(
        2,
        &[cutoff, 3.0, 3.0, 3.0, std::f64::consts::PI / cutoff],
    );
    simulator.create_particles(10, 10);
    simulator.add_move(0, 0.4, 0.9, None, 0.0);
    simulator.add_move(4, 0.0, 0.1, None, 0.0);
    simulator.equilibrate(5.0);
    simulator.finalize();
    // control() verifies the incrementally updated structure factors
    // against a full recompute after every macro step
    simulator.run(2, 100, 0).unwrap();

    assert!(simulator.state.error < 1e-10);
    remove_outputs(&name);
}

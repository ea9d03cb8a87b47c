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
use log::warn;
use std::error::Error;

use ionmc::input::{parse_move_spec, parse_sampler_spec, Args};
use ionmc::Simulator;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut simulator = Simulator::new(args.dielectric, args.temperature, &args.name, args.seed);
    simulator
        .environment
        .set_chemical_potential(args.chemical_potential);
    simulator.set_geometry(args.geometry, &args.cell);
    simulator.set_energy(args.energy, &args.energy_params);

    simulator.state.particles.cation_model.radius = args.radius;
    simulator.state.particles.anion_model.radius = args.radius;

    match &args.checkpoint {
        Some(path) => simulator.load_checkpoint(path)?,
        None => simulator.create_particles(args.num_plus, args.num_minus),
    }

    if args.moves.is_empty() {
        simulator.add_move(0, 0.5, 1.0, None, 0.0);
    }
    for spec in &args.moves {
        match parse_move_spec(spec) {
            Ok(mv) => simulator.add_move(mv.tag, mv.dp, mv.weight, mv.cp, mv.extra),
            Err(reason) => warn!("{}; skipping", reason),
        }
    }
    for spec in &args.samplers {
        match parse_sampler_spec(spec) {
            Ok((tag, interval)) => simulator.add_sampler(tag, interval),
            Err(reason) => warn!("{}; skipping", reason),
        }
    }

    simulator.equilibrate(args.eq_displacement);
    if args.images {
        simulator.add_images();
    }
    simulator.finalize();
    simulator.run(args.macro_steps, args.micro_steps, args.eq_steps)?;
    Ok(())
}

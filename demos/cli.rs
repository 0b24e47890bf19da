//! Read a market from stdin and print its equilibrium.
//!
//! ```text
//! $ printf 'demand: Q = 100 - 2P\nsupply: Q = -20 + 3P\n' | cargo run --example cli
//! ```

use oikos::{
    display::{self, Report},
    equilibrium, surplus, Demand, Supply,
};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::io::{BufRead, BufReader};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    TermLogger::init(
        LevelFilter::Warn,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let mut demand = None;
    let mut supply = None;
    let stdin = std::io::stdin();

    for line in BufReader::new(stdin.lock()).lines() {
        let line = line?;
        let line = line.trim();

        if let Some(equation) = line.strip_prefix("demand:") {
            demand = Some(Demand::new(equation.trim())?);
        } else if let Some(equation) = line.strip_prefix("supply:") {
            supply = Some(Supply::new(equation.trim())?);
        } else if !line.is_empty() {
            eprintln!(
                "Ignoring \"{}\", lines should start with \"demand:\" or \"supply:\"",
                line
            );
        }
    }

    let (demand, supply) = match (demand, supply) {
        (Some(demand), Some(supply)) => (demand, supply),
        _ => return Err("both a demand and a supply curve are needed".into()),
    };

    let eq = equilibrium(&supply, &demand)?;
    display::write(&eq.results(), Some("Market equilibrium"));

    let s = surplus(&supply, &demand, None, None)?;
    display::write(&s.results(), Some("Surplus"));

    for interpretation in &[
        demand.interpret_elasticity(eq.price, eq.quantity),
        supply.interpret_elasticity(eq.price, eq.quantity),
    ] {
        match interpretation {
            Ok(sentence) => println!("{}", sentence),
            Err(e) => eprintln!("Unable to calculate the elasticity: {}", e),
        }
    }

    Ok(())
}

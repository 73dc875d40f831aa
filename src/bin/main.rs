//! CLI entry point: parse options, read input, run the solver pipeline, write output.
//!
//! Grounded on this codebase's own `main.rs` `Cli::parse()`/`match` dispatch shape, cut down to a
//! single pipeline instead of a `Solve`/`Generate` subcommand split, since this system has only one
//! mode of operation.

use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use prefsolve::cli::Cli;
use prefsolve::critical_set_analysis::CriticalSetAnalysis;
use prefsolve::error::SolverError;
use prefsolve::input_data::InputDataBuilder;
use prefsolve::io::{read_inputs, write_solution};
use prefsolve::logging;
use prefsolve::mip_flow_static::MipFlowStaticData;
use prefsolve::scip_backend::ScipFlowSolver;
use prefsolve::score::Scoring;
use prefsolve::shotgun::ShotgunSolverThreaded;

fn run() -> Result<(), SolverError> {
    let cli = Cli::parse();
    let options = cli.into_options()?;
    logging::init(options.verbosity);

    let raw = read_inputs(&options.input_paths)?;
    let input = InputDataBuilder::build(raw)?;

    let analysis = if options.no_cs {
        CriticalSetAnalysis::disabled()
    } else {
        CriticalSetAnalysis::analyze(&input, !options.no_cs_simp)
    };
    let static_data = MipFlowStaticData::new(&input);
    let scoring = Scoring::new(&input, &options);
    let backend = ScipFlowSolver;

    let driver = ShotgunSolverThreaded::new(&input, &analysis, &static_data, &scoring, &options, &backend);
    let Some(solution) = driver.run() else {
        info!("no solution found");
        return Ok(());
    };

    write_solution(&input, &solution, options.output_prefix.as_deref())?;
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err @ SolverError::Input(_)) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
        Err(err @ SolverError::Internal(_)) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

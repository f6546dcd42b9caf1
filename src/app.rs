use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cli::{CutVarArgs, InvMassArgs};
use crate::config::AnalysisConfig;
use crate::cutvar::{CutVarParticle, CutVarPlot};
use crate::data::loader;
use crate::error::PlotError;
use crate::invmass::{InvMassOptions, InvMassPlot};
use crate::particle::Particle;
use crate::render;

// ---------------------------------------------------------------------------
// Invariant-mass plot
// ---------------------------------------------------------------------------

/// Load configuration and results, draw the plot for the selected bin and
/// write it in every requested format.
pub fn run_invmass(args: &InvMassArgs) -> Result<Vec<PathBuf>> {
    let config = AnalysisConfig::load(&args.config)?;
    let binning = config.binning(&args.section)?;
    log::info!("Loading analysis configuration: Done!");

    let bin = binning.bin(args.pt_bin)?;
    log::info!(
        "{}: pT bin {} ({} - {} GeV/c), mass window [{}, {}], rebin {}",
        args.particle.label(),
        bin.index,
        bin.pt_min,
        bin.pt_max,
        bin.mass_min,
        bin.mass_max,
        bin.rebin
    );

    let input = invmass_input(args.particle, args.input.as_deref())?;
    let results = loader::load_file(&input)?;

    let options = InvMassOptions {
        show_fit_parameters: args.show_params,
    };
    let plot = InvMassPlot::build(&results, args.particle, bin, &options)
        .with_context(|| format!("building the {} plot from {}", args.particle.label(), input.display()))?;

    let written = render::save(&plot, &args.out_dir, &args.formats)?;
    if !args.batch {
        wait_for_enter()?;
    }
    Ok(written)
}

/// `--input` if given, otherwise the species default.
pub fn invmass_input(particle: Particle, input: Option<&Path>) -> Result<PathBuf, PlotError> {
    match (input, particle.default_input()) {
        (Some(path), _) => Ok(path.to_path_buf()),
        (None, Some(default)) => Ok(PathBuf::from(default)),
        (None, None) => Err(PlotError::NoInputFile(particle.label())),
    }
}

// ---------------------------------------------------------------------------
// Cut-variation plot
// ---------------------------------------------------------------------------

pub fn run_cutvar(args: &CutVarArgs) -> Result<Vec<PathBuf>> {
    let input = cutvar_input(args.particle, args.input.as_deref());
    let results = loader::load_file(&input)?;

    let plot = CutVarPlot::build(&results, args.particle)
        .with_context(|| format!("building the cut-variation plot from {}", input.display()))?;

    let written = render::save(&plot, &args.out_dir, &args.formats)?;
    if !args.batch {
        wait_for_enter()?;
    }
    Ok(written)
}

pub fn cutvar_input(particle: CutVarParticle, input: Option<&Path>) -> PathBuf {
    input
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(particle.default_input()))
}

/// Keep the terminal open until the user presses enter.
fn wait_for_enter() -> Result<()> {
    print!("Press enter to exit");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(())
}

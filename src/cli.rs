use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueHint};

use crate::config::DEFAULT_SECTION;
use crate::cutvar::CutVarParticle;
use crate::particle::Particle;
use crate::render::ImageFormat;

/// Draw the invariant-mass fit of one pT bin.
#[derive(Parser, Debug, Clone)]
#[command(name = "invmass-plot", version, about = "Plot the invariant-mass fit of one pT bin", long_about = None)]
pub struct InvMassArgs {
    /// Analysis configuration (YAML or JSON).
    #[arg(default_value = "config.yml", value_hint = ValueHint::FilePath)]
    pub config: PathBuf,

    /// Do not wait for enter before exiting.
    #[arg(long, action = ArgAction::SetTrue)]
    pub batch: bool,

    #[arg(long, value_enum, default_value_t = Particle::Dzero)]
    pub particle: Particle,

    /// Index of the pT bin in the configuration.
    #[arg(long, default_value_t = 0)]
    pub pt_bin: usize,

    /// Configuration section holding the binning.
    #[arg(long, default_value = DEFAULT_SECTION)]
    pub section: String,

    /// Results file; overrides the species default.
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub input: Option<PathBuf>,

    #[arg(long, default_value = ".", value_hint = ValueHint::DirPath)]
    pub out_dir: PathBuf,

    /// Comma-separated list of output formats.
    #[arg(long, value_enum, value_delimiter = ',', default_values_t = ImageFormat::ALL)]
    pub formats: Vec<ImageFormat>,

    /// Also print the fitted mean and width.
    #[arg(long, action = ArgAction::SetTrue)]
    pub show_params: bool,
}

/// Draw the cut-variation fit.
#[derive(Parser, Debug, Clone)]
#[command(name = "cutvar-plot", version, about = "Plot the prompt / non-prompt cut-variation fit", long_about = None)]
pub struct CutVarArgs {
    #[arg(long, value_enum, default_value_t = CutVarParticle::Dzero)]
    pub particle: CutVarParticle,

    /// Results file; overrides the species default.
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub input: Option<PathBuf>,

    #[arg(long, default_value = ".", value_hint = ValueHint::DirPath)]
    pub out_dir: PathBuf,

    #[arg(long, value_enum, value_delimiter = ',', default_values_t = ImageFormat::ALL)]
    pub formats: Vec<ImageFormat>,

    #[arg(long, action = ArgAction::SetTrue)]
    pub batch: bool,
}

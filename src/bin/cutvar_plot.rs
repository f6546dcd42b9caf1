use std::process::ExitCode;

use clap::Parser;
use hf_plots::app;
use hf_plots::cli::CutVarArgs;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CutVarArgs::parse();
    match app::run_cutvar(&args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

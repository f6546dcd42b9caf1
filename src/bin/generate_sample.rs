use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueHint};
use hf_plots::sample;

/// Write a synthetic results file, a cut-variation file and a matching
/// configuration.
#[derive(Parser, Debug)]
#[command(name = "generate-sample", version, about, long_about = None)]
struct Args {
    #[arg(long, default_value = ".", value_hint = ValueHint::DirPath)]
    out_dir: PathBuf,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match sample::write_sample(&args.out_dir, args.seed) {
        Ok(files) => {
            println!(
                "Wrote {}, {} and {}",
                files.results.display(),
                files.cutvar.display(),
                files.config.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

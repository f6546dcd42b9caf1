use std::path::{Path, PathBuf};

use hf_plots::app;
use hf_plots::cli::{CutVarArgs, InvMassArgs};
use hf_plots::cutvar::CutVarParticle;
use hf_plots::particle::Particle;
use hf_plots::render::ImageFormat;
use hf_plots::sample;

fn invmass_args(dir: &Path, files: &sample::SampleFiles, pt_bin: usize) -> InvMassArgs {
    InvMassArgs {
        config: files.config.clone(),
        batch: true,
        particle: Particle::Dzero,
        pt_bin,
        section: "pPb5TeVFD".to_string(),
        input: Some(files.results.clone()),
        out_dir: dir.join("plots"),
        formats: ImageFormat::ALL.to_vec(),
        show_params: true,
    }
}

fn assert_non_empty(paths: &[PathBuf]) {
    for path in paths {
        let len = std::fs::metadata(path)
            .unwrap_or_else(|e| panic!("{}: {e}", path.display()))
            .len();
        assert!(len > 0, "{} is empty", path.display());
    }
}

#[test]
fn invmass_pipeline_writes_three_images() {
    let dir = tempfile::tempdir().unwrap();
    let files = sample::write_sample(dir.path(), 42).unwrap();

    let written = app::run_invmass(&invmass_args(dir.path(), &files, 0)).unwrap();

    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "InvMassFitDzeroPt_1_2.png",
            "InvMassFitDzeroPt_1_2.jpg",
            "InvMassFitDzeroPt_1_2.svg"
        ]
    );
    assert_non_empty(&written);

    let png = image::open(&written[0]).unwrap();
    assert_eq!((png.width(), png.height()), (1040, 1000));
}

#[test]
fn invmass_pipeline_for_last_bin() {
    let dir = tempfile::tempdir().unwrap();
    let files = sample::write_sample(dir.path(), 7).unwrap();

    let mut args = invmass_args(dir.path(), &files, 2);
    args.formats = vec![ImageFormat::Svg];
    let written = app::run_invmass(&args).unwrap();
    assert_eq!(written.len(), 1);
    assert!(written[0].ends_with("InvMassFitDzeroPt_4_8.svg"));
    assert_non_empty(&written);
}

#[test]
fn invmass_pipeline_reports_bad_bin() {
    let dir = tempfile::tempdir().unwrap();
    let files = sample::write_sample(dir.path(), 42).unwrap();

    let err = app::run_invmass(&invmass_args(dir.path(), &files, 5)).unwrap_err();
    assert!(format!("{err:#}").contains('5'));
    assert!(!dir.path().join("plots").exists());
}

#[test]
fn invmass_pipeline_for_dplus() {
    let dir = tempfile::tempdir().unwrap();
    let files = sample::write_sample(dir.path(), 42).unwrap();
    let results = sample::invmass_results(
        Particle::Dplus,
        &sample::sample_binning(),
        &mut sample::SimpleRng::new(11),
    )
    .unwrap();
    let dplus_input = dir.path().join("dplus_results.parquet");
    hf_plots::data::writer::write_parquet(&results, &dplus_input).unwrap();

    let mut args = invmass_args(dir.path(), &files, 0);
    args.particle = Particle::Dplus;
    args.input = Some(dplus_input);
    args.formats = vec![ImageFormat::Png, ImageFormat::Svg];
    let written = app::run_invmass(&args).unwrap();

    assert_eq!(written.len(), 2);
    assert!(written[0].ends_with("InvMassFitDplusPt_1_2.png"));
    assert!(written[1].ends_with("InvMassFitDplusPt_1_2.svg"));
    assert_non_empty(&written);

    let svg = std::fs::read_to_string(&written[1]).unwrap();
    assert!(svg.contains("Total fit function"));
    assert!(!svg.contains("reflected"));
}

#[test]
fn cutvar_pipeline_writes_images() {
    let dir = tempfile::tempdir().unwrap();
    let files = sample::write_sample(dir.path(), 42).unwrap();

    let args = CutVarArgs {
        particle: CutVarParticle::Dzero,
        input: Some(files.cutvar.clone()),
        out_dir: dir.path().to_path_buf(),
        formats: vec![ImageFormat::Png, ImageFormat::Svg],
        batch: true,
    };
    let written = app::run_cutvar(&args).unwrap();
    assert_eq!(written.len(), 2);
    assert!(written[0].ends_with("CutVarFitDzeroFD.png"));
    assert_non_empty(&written);
}

//! Synthetic fit output, so the plots can be produced without the upstream
//! analysis. Used by the `generate-sample` binary and the tests.

use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::{BinningSection, DEFAULT_SECTION};
use crate::cutvar::CutVarParticle;
use crate::data::model::{Curve, Histogram, ResultsFile, ResultsObject};
use crate::data::writer::write_parquet;
use crate::invmass::{mass_histogram_name, MEAN_HISTOGRAM, SIGMA_HISTOGRAM};
use crate::particle::Particle;

pub const RESULTS_FILE: &str = "sample_results.parquet";
pub const CUTVAR_FILE: &str = "sample_cutvar.parquet";
pub const CONFIG_FILE: &str = "sample_config.yml";

/// Minimal deterministic PRNG (xoshiro256**)
pub struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    pub fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    pub fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        mean + std_dev * z
    }

    /// Counts fluctuated around `expected` (Gaussian approximation of Poisson).
    pub fn counts(&mut self, expected: f64) -> f64 {
        if expected <= 0.0 {
            return 0.0;
        }
        self.gauss(expected, expected.sqrt()).round().max(0.0)
    }
}

fn gaussian_pdf(x: f64, mean: f64, sigma: f64) -> f64 {
    (-(x - mean).powi(2) / (2.0 * sigma * sigma)).exp() / (sigma * (2.0 * PI).sqrt())
}

/// Three pT bins with the usual D-meson mass window.
pub fn sample_binning() -> BinningSection {
    BinningSection {
        pt_min: vec![1.0, 2.0, 4.0],
        pt_max: vec![2.0, 4.0, 8.0],
        mass_min: vec![1.72, 1.72, 1.72],
        mass_max: vec![2.01, 2.01, 2.01],
        rebin: vec![2, 2, 4],
    }
}

/// Mass model of one pT bin: Gaussian signal, exponential background and
/// a broad reflection template.
#[derive(Debug, Clone, Copy)]
struct MassModel {
    signal: f64,
    mean: f64,
    sigma: f64,
    /// Background counts per MeV at 1.70 GeV/c².
    background: f64,
    slope: f64,
    reflection: f64,
}

impl MassModel {
    const REFLECTION_SIGMA: f64 = 0.05;

    fn for_bin(index: usize) -> Self {
        let i = index as f64;
        MassModel {
            signal: 12_000.0 / (1.0 + 0.6 * i),
            mean: 1.8650 + 0.0004 * i,
            sigma: 0.007 + 0.002 * i,
            background: 400.0 / (1.0 + 1.5 * i),
            slope: 2.5,
            reflection: 0.08 * 12_000.0 / (1.0 + 0.6 * i),
        }
    }

    fn background_density(&self, m: f64) -> f64 {
        // per GeV
        1000.0 * self.background * (-self.slope * (m - 1.70)).exp()
    }

    fn reflection_density(&self, m: f64) -> f64 {
        self.reflection * gaussian_pdf(m, self.mean, Self::REFLECTION_SIGMA)
    }

    fn total_density(&self, m: f64, with_reflection: bool) -> f64 {
        let reflection = if with_reflection {
            self.reflection_density(m)
        } else {
            0.0
        };
        self.background_density(m) + self.signal * gaussian_pdf(m, self.mean, self.sigma) + reflection
    }
}

const MASS_LOW: f64 = 1.60;
const MASS_HIGH: f64 = 2.20;
/// 1 MeV bins before rebinning.
const MASS_BINS: usize = 600;

/// Curve of `density` expressed as counts per bin of `width`.
fn sampled_curve(width: f64, density: impl Fn(f64) -> f64) -> Result<Curve> {
    let x: Vec<f64> = (0..=MASS_BINS)
        .map(|i| MASS_LOW + i as f64 * (MASS_HIGH - MASS_LOW) / MASS_BINS as f64)
        .collect();
    let y = x.iter().map(|&m| width * density(m)).collect();
    Curve::new(x, y).map_err(|reason| anyhow::anyhow!("sample curve: {reason}"))
}

/// Mass histograms, fit curves and summary histograms for every bin of
/// `binning`, named the way `particle` expects them.
pub fn invmass_results(
    particle: Particle,
    binning: &BinningSection,
    rng: &mut SimpleRng,
) -> Result<ResultsFile> {
    binning.validate()?;
    let mut file = ResultsFile::new();

    let mut summary_edges = vec![binning.pt_min[0]];
    summary_edges.extend(binning.pt_max.iter().copied());
    let mut means = Vec::with_capacity(binning.len());
    let mut sigmas = Vec::with_capacity(binning.len());
    let mut yields = Vec::with_capacity(binning.len());

    let with_reflection = particle.has_reflection();
    for index in 0..binning.len() {
        let bin = binning.bin(index)?;
        let model = MassModel::for_bin(index);

        let mut mass = Histogram::uniform(MASS_BINS, MASS_LOW, MASS_HIGH)?;
        let fine_width = (MASS_HIGH - MASS_LOW) / MASS_BINS as f64;
        for (i, (content, error)) in mass.contents.iter_mut().zip(mass.errors.iter_mut()).enumerate() {
            let centre = MASS_LOW + (i as f64 + 0.5) * fine_width;
            *content = rng.counts(fine_width * model.total_density(centre, with_reflection));
            *error = content.sqrt();
        }
        file.insert(mass_histogram_name(bin.pt_min, bin.pt_max), ResultsObject::Histogram(mass))?;

        let width = fine_width * bin.rebin as f64;
        let names = particle.fit_names(bin.pt_min, bin.pt_max);
        file.insert(
            names.total,
            ResultsObject::Curve(sampled_curve(width, |m| model.total_density(m, with_reflection))?),
        )?;
        file.insert(
            names.background,
            ResultsObject::Curve(sampled_curve(width, |m| model.background_density(m))?),
        )?;
        // A single reflection template is stored; keep the first bin's.
        if let (Some(name), 0) = (names.reflection, index) {
            file.insert(
                name,
                ResultsObject::Curve(sampled_curve(width, |m| model.reflection_density(m))?),
            )?;
        }

        means.push((model.mean, model.sigma / model.signal.sqrt()));
        sigmas.push((model.sigma, 0.05 * model.sigma));
        yields.push((model.signal, model.signal.sqrt() * 1.8));
    }

    let summary = |values: &[(f64, f64)]| -> Result<ResultsObject> {
        Ok(ResultsObject::Histogram(Histogram::new(
            summary_edges.clone(),
            values.iter().map(|v| v.0).collect(),
            values.iter().map(|v| v.1).collect(),
        )?))
    };
    file.insert(MEAN_HISTOGRAM, summary(&means)?)?;
    file.insert(SIGMA_HISTOGRAM, summary(&sigmas)?)?;
    file.insert(particle.signal_histogram(), summary(&yields)?)?;
    Ok(file)
}

/// Raw yield versus selection threshold with its prompt / non-prompt split.
pub fn cutvar_results(particle: CutVarParticle, rng: &mut SimpleRng) -> Result<ResultsFile> {
    const CUTS: usize = 20;
    let (prompt_yield, non_prompt_yield) = match particle {
        CutVarParticle::Dzero => (100_000.0, 30_000.0),
        CutVarParticle::Dplus => (2_500.0, 900.0),
    };

    let fraction = |k: usize| k as f64 / CUTS as f64;
    let prompt: Vec<f64> = (0..CUTS).map(|k| prompt_yield * (1.0 - fraction(k)).powi(2)).collect();
    let non_prompt: Vec<f64> = (0..CUTS)
        .map(|k| non_prompt_yield * (1.0 - 0.5 * fraction(k)))
        .collect();
    let sum: Vec<f64> = prompt.iter().zip(&non_prompt).map(|(p, n)| p + n).collect();
    let measured: Vec<f64> = sum.iter().map(|&s| rng.counts(s)).collect();

    let hist = |contents: Vec<f64>| -> Result<ResultsObject> {
        let mut h = Histogram::uniform(CUTS, 0.0, 1.0)?;
        h.errors = contents.iter().map(|c| c.sqrt()).collect();
        h.contents = contents;
        h.validate()?;
        Ok(ResultsObject::Histogram(h))
    };

    let names = particle.names();
    let mut file = ResultsFile::new();
    file.insert(names.raw_yield, hist(measured)?)?;
    file.insert(names.prompt, hist(prompt)?)?;
    file.insert(names.non_prompt, hist(non_prompt)?)?;
    file.insert(names.sum, hist(sum)?)?;
    Ok(file)
}

/// Files written by [`write_sample`].
#[derive(Debug, Clone)]
pub struct SampleFiles {
    pub results: PathBuf,
    pub cutvar: PathBuf,
    pub config: PathBuf,
}

/// Write a D0 results file, a D0 cut-variation file and a matching
/// configuration into `out_dir`.
pub fn write_sample(out_dir: &Path, seed: u64) -> Result<SampleFiles> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;
    let mut rng = SimpleRng::new(seed);
    let binning = sample_binning();

    let files = SampleFiles {
        results: out_dir.join(RESULTS_FILE),
        cutvar: out_dir.join(CUTVAR_FILE),
        config: out_dir.join(CONFIG_FILE),
    };

    let results = invmass_results(Particle::Dzero, &binning, &mut rng)?;
    write_parquet(&results, &files.results)?;
    log::info!("Wrote {} objects to {}", results.len(), files.results.display());

    let cutvar = cutvar_results(CutVarParticle::Dzero, &mut rng)?;
    write_parquet(&cutvar, &files.cutvar)?;
    log::info!("Wrote {} objects to {}", cutvar.len(), files.cutvar.display());

    let sections = BTreeMap::from([(DEFAULT_SECTION, binning)]);
    let yaml = serde_yaml::to_string(&sections)?;
    std::fs::write(&files.config, yaml)
        .with_context(|| format!("Failed to write {}", files.config.display()))?;
    log::info!("Wrote configuration to {}", files.config.display());

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::cutvar::CutVarPlot;
    use crate::invmass::{InvMassOptions, InvMassPlot};

    #[test]
    fn rng_is_deterministic() {
        let mut a = SimpleRng::new(7);
        let mut b = SimpleRng::new(7);
        for _ in 0..10 {
            assert_eq!(a.gauss(0.0, 1.0), b.gauss(0.0, 1.0));
        }
        assert_eq!(a.counts(0.0), 0.0);
        assert!(a.counts(100.0) >= 0.0);
    }

    #[test]
    fn every_sample_bin_builds_a_plot() {
        let binning = sample_binning();
        let results = invmass_results(Particle::Dzero, &binning, &mut SimpleRng::new(1)).unwrap();
        for index in 0..binning.len() {
            let plot = InvMassPlot::build(
                &results,
                Particle::Dzero,
                binning.bin(index).unwrap(),
                &InvMassOptions::default(),
            )
            .unwrap();
            assert!(plot.y_range.1 > 0.0);
            // peak of the rebinned histogram sits near the D0 mass
            let peak = plot.mass.bin_center(plot.mass.maximum_bin()).unwrap();
            assert!((peak - 1.865).abs() < 0.03, "bin {index}: peak at {peak}");
        }
    }

    #[test]
    fn dplus_sample_has_no_reflection() {
        let results = invmass_results(Particle::Dplus, &sample_binning(), &mut SimpleRng::new(1)).unwrap();
        assert!(results.get("freflect").is_err());
        assert!(results.histogram("hRawYieldsSignal").is_ok());
        assert!(results.curve("fTot_1_2").is_ok());
    }

    #[test]
    fn cutvar_sample_fits_frame() {
        for particle in [CutVarParticle::Dzero, CutVarParticle::Dplus] {
            let results = cutvar_results(particle, &mut SimpleRng::new(3)).unwrap();
            let plot = CutVarPlot::build(&results, particle).unwrap();
            assert!(plot.sum.maximum() < particle.y_max());
        }
    }

    #[test]
    fn writes_readable_files() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_sample(dir.path(), 42).unwrap();
        let config = AnalysisConfig::load(&files.config).unwrap();
        assert_eq!(config.binning(DEFAULT_SECTION).unwrap(), sample_binning());
        let results = crate::data::loader::load_file(&files.results).unwrap();
        assert!(results.histogram("hMass_10_20").is_ok());
        let cutvar = crate::data::loader::load_file(&files.cutvar).unwrap();
        assert_eq!(cutvar.len(), 4);
    }
}

//! Invariant-mass fit plot for one pT bin of one species.
//!
//! [`InvMassPlot::build`] pulls the fit output for the bin from a
//! [`ResultsFile`] and derives everything the renderer needs: the rebinned
//! mass histogram, the frame range, axis titles and the annotation strings.

use anyhow::{Context, Result};

use crate::config::PtBin;
use crate::data::model::{Curve, Histogram, ResultsFile};
use crate::error::PlotError;
use crate::layout::{
    self, Annotation, Component, Legend, TextRole, COLLISION_SYSTEM, EXPERIMENT, RAPIDITY,
};
use crate::particle::Particle;

pub const GEV_TO_MEV: f64 = 1000.0;

pub const MEAN_HISTOGRAM: &str = "hRawYieldsMean";
pub const SIGMA_HISTOGRAM: &str = "hRawYieldsSigma";

/// Options that change the plot content.
#[derive(Debug, Clone, Default)]
pub struct InvMassOptions {
    /// Also print the fitted mean and width.
    pub show_fit_parameters: bool,
}

/// Name of the invariant-mass histogram of a pT bin (edges in units of 100 MeV/c).
pub fn mass_histogram_name(pt_min: f64, pt_max: f64) -> String {
    format!("hMass_{:.0}_{:.0}", 10.0 * pt_min, 10.0 * pt_max)
}

/// Everything needed to draw one invariant-mass plot.
#[derive(Debug, Clone)]
pub struct InvMassPlot {
    pub particle: Particle,
    pub bin: PtBin,
    /// Mass histogram after rebinning.
    pub mass: Histogram,
    pub total: Curve,
    pub background: Curve,
    pub reflection: Option<Curve>,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    /// Mass bin width in GeV/c².
    pub bin_width: f64,
    pub mean_mev: (f64, f64),
    pub sigma_mev: f64,
    pub signal: (f64, f64),
    pub annotations: Vec<Annotation>,
    pub legend: Legend,
}

impl InvMassPlot {
    pub fn build(
        results: &ResultsFile,
        particle: Particle,
        bin: PtBin,
        options: &InvMassOptions,
    ) -> Result<Self> {
        // Per-pT-bin summary histograms have one bin per pT bin.
        let summary_bin = bin.index + 1;

        let mean = results.histogram(MEAN_HISTOGRAM)?;
        let sigma = results.histogram(SIGMA_HISTOGRAM)?;
        let signal = results.histogram(particle.signal_histogram())?;

        let mass_name = mass_histogram_name(bin.pt_min, bin.pt_max);
        let mass = results
            .histogram(&mass_name)?
            .rebin(bin.rebin)
            .with_context(|| format!("rebinning {mass_name} by {}", bin.rebin))?;

        let fits = particle.fit_names(bin.pt_min, bin.pt_max);
        let total = results.curve(&fits.total)?.clone();
        let background = results.curve(&fits.background)?.clone();
        let reflection = match &fits.reflection {
            Some(name) => Some(results.curve(name)?.clone()),
            None => None,
        };

        let bin_width = mass.bin_width(summary_bin)?;
        let max_bin = mass.maximum_bin();
        let y_range = particle.y_range(mass.maximum(), mass.bin_error(max_bin)?);
        // Species with a fixed floor of 40 counts can end up with nothing above it.
        if !(y_range.1 > y_range.0) {
            return Err(PlotError::EmptyFrame {
                ymin: y_range.0,
                ymax: y_range.1,
            })
            .with_context(|| format!("{} pT bin {}", particle.label(), bin.index));
        }

        let mean_mev = (
            mean.bin_content(summary_bin)? * GEV_TO_MEV,
            mean.bin_error(summary_bin)? * GEV_TO_MEV,
        );
        let sigma_mev = sigma.bin_content(summary_bin)? * GEV_TO_MEV;
        let signal = (
            signal.bin_content(summary_bin)?,
            signal.bin_error(summary_bin)?,
        );

        let pt_label = layout::pt_range_label(bin.pt_min, bin.pt_max);
        let y_title = format!("Counts per {:.0} MeV/#it{{c}}^{{2}}", bin_width * GEV_TO_MEV);

        let mut annotations = vec![
            Annotation::new(0.19, 0.85, EXPERIMENT, TextRole::Experiment),
            Annotation::new(0.19, 0.79, COLLISION_SYSTEM, TextRole::System),
            Annotation::new(0.19, 0.72, particle.decay(), TextRole::Label),
            Annotation::new(0.19, 0.16, particle.nonprompt_fraction(), TextRole::Label),
            Annotation::new(0.19, 0.66, pt_label.clone(), TextRole::Label),
            Annotation::new(0.7, 0.85, RAPIDITY, TextRole::Label),
            Annotation::new(
                0.19,
                0.6,
                format!("#it{{S}} = {:.0} #pm {:.0}", signal.0, signal.1),
                TextRole::Label,
            ),
        ];
        if options.show_fit_parameters {
            annotations.push(Annotation::new(
                0.19,
                0.54,
                format!(
                    "#it{{#mu}} = ({:.0} #pm {:.0}) MeV/#it{{c}}^{{2}}",
                    mean_mev.0, mean_mev.1
                ),
                TextRole::Label,
            ));
            annotations.push(Annotation::new(
                0.19,
                0.48,
                format!("#it{{#sigma}} = {sigma_mev:.0} MeV/#it{{c}}^{{2}}"),
                TextRole::Label,
            ));
        }

        let mut legend = Legend::new(particle.legend_box());
        legend.add(Component::TotalFit, "Total fit function");
        legend.add(Component::Background, "#splitline{Combinatorial}{background}");
        if reflection.is_some() {
            legend.add(Component::Reflection, "K#minus#pi reflected");
        }

        log::debug!(
            "{} pT bin {}: width {:.4} GeV, y in [{:.1}, {:.1}], S = {:.0} ± {:.0}",
            particle.label(),
            bin.index,
            bin_width,
            y_range.0,
            y_range.1,
            signal.0,
            signal.1
        );

        Ok(InvMassPlot {
            particle,
            bin,
            mass,
            total,
            background,
            reflection,
            x_range: (bin.mass_min, bin.mass_max),
            y_range,
            title: pt_label,
            x_title: particle.x_title().to_string(),
            y_title,
            bin_width,
            mean_mev,
            sigma_mev,
            signal,
            annotations,
            legend,
        })
    }

    /// Output file name without extension.
    pub fn file_stem(&self) -> String {
        format!(
            "InvMassFit{}Pt_{:.0}_{:.0}",
            self.particle.tag(),
            self.bin.pt_min,
            self.bin.pt_max
        )
    }
}

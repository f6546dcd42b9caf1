//! Cut-variation fit plot: raw yield as a function of the ML selection
//! threshold, decomposed into prompt and non-prompt contributions.

use anyhow::Result;
use clap::ValueEnum;

use crate::data::model::{Histogram, ResultsFile};
use crate::layout::{
    self, Annotation, Component, Legend, TextRole, COLLISION_SYSTEM, EXPERIMENT, RAPIDITY,
};

/// Species for which a cut-variation result exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CutVarParticle {
    Dzero,
    Dplus,
}

/// Histogram names of one cut-variation result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutVarNames {
    pub raw_yield: &'static str,
    pub prompt: &'static str,
    pub non_prompt: &'static str,
    pub sum: &'static str,
}

impl CutVarParticle {
    pub fn tag(self) -> &'static str {
        match self {
            CutVarParticle::Dzero => "Dzero",
            CutVarParticle::Dplus => "Dplus",
        }
    }

    pub fn default_input(self) -> &'static str {
        match self {
            CutVarParticle::Dzero => "./CutVarD0_pp136TeV_full.parquet",
            CutVarParticle::Dplus => "./cutvar_output.parquet",
        }
    }

    pub fn names(self) -> CutVarNames {
        match self {
            CutVarParticle::Dzero => CutVarNames {
                raw_yield: "hRawYieldVsCut_pt0_1",
                prompt: "hRawYieldPromptVsCut_pt0_1",
                non_prompt: "hRawYieldNonPromptVsCut_pt0_1",
                sum: "hRawYieldSumVsCut_pt0_1",
            },
            CutVarParticle::Dplus => CutVarNames {
                raw_yield: "hRawYieldsVsCutPt_pT4_5",
                prompt: "hRawYieldPromptVsCut_pT4_5",
                non_prompt: "hRawYieldFDVsCut_pT4_5",
                sum: "hRawYieldsVsCutReSum_pT4_5",
            },
        }
    }

    /// The pT interval the stored result belongs to.
    pub fn pt_range(self) -> (f64, f64) {
        match self {
            CutVarParticle::Dzero => (0.0, 1.0),
            CutVarParticle::Dplus => (4.0, 5.0),
        }
    }

    pub fn y_max(self) -> f64 {
        match self {
            CutVarParticle::Dzero => 160_000.0,
            CutVarParticle::Dplus => 4_000.0,
        }
    }

    /// Hadron name in markup, for the legend.
    pub fn hadron(self) -> &'static str {
        match self {
            CutVarParticle::Dzero => "D^{0}",
            CutVarParticle::Dplus => "D^{+}",
        }
    }
}

pub const Y_MIN: f64 = 0.1;
pub const X_TITLE: &str = "ML based selection";
pub const Y_TITLE: &str = "Raw yield";

#[derive(Debug, Clone)]
pub struct CutVarPlot {
    pub particle: CutVarParticle,
    pub raw_yield: Histogram,
    pub prompt: Histogram,
    pub non_prompt: Histogram,
    pub sum: Histogram,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub annotations: Vec<Annotation>,
    pub legend: Legend,
}

impl CutVarPlot {
    pub fn build(results: &ResultsFile, particle: CutVarParticle) -> Result<Self> {
        let names = particle.names();
        let raw_yield = results.histogram(names.raw_yield)?.clone();
        let prompt = results.histogram(names.prompt)?.clone();
        let non_prompt = results.histogram(names.non_prompt)?.clone();
        let sum = results.histogram(names.sum)?.clone();

        if prompt.nbins() != raw_yield.nbins() || non_prompt.nbins() != raw_yield.nbins() {
            log::warn!(
                "cut-variation components have {} / {} bins, raw yield has {}",
                prompt.nbins(),
                non_prompt.nbins(),
                raw_yield.nbins()
            );
        }

        let (pt_min, pt_max) = particle.pt_range();
        let annotations = vec![
            Annotation::new(0.20, 0.88, EXPERIMENT, TextRole::Experiment),
            Annotation::new(0.20, 0.83, COLLISION_SYSTEM, TextRole::System),
            Annotation::new(0.65, 0.88, RAPIDITY, TextRole::System),
            Annotation::new(
                0.55,
                0.72,
                layout::pt_range_label(pt_min, pt_max),
                TextRole::Experiment,
            ),
        ];

        let hadron = particle.hadron();
        let mut legend = Legend::new((0.55, 0.5, 0.7, 0.7));
        legend.add(Component::Data, "Data");
        legend.add(Component::Prompt, format!("Prompt {hadron}"));
        legend.add(Component::NonPrompt, format!("Non-prompt {hadron}"));
        legend.add(Component::Sum, "Total");

        Ok(CutVarPlot {
            particle,
            x_range: (raw_yield.x_min(), raw_yield.x_max()),
            y_range: (Y_MIN, particle.y_max()),
            raw_yield,
            prompt,
            non_prompt,
            sum,
            annotations,
            legend,
        })
    }

    pub fn file_stem(&self) -> String {
        format!("CutVarFit{}FD", self.particle.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ResultsObject;

    fn cutvar_results(names: CutVarNames) -> ResultsFile {
        let hist = |scale: f64| {
            let contents: Vec<f64> = (0..10).map(|i| scale * (10 - i) as f64).collect();
            let errors = contents.iter().map(|c| c.sqrt()).collect();
            ResultsObject::Histogram(
                Histogram::new((0..=10).map(|i| i as f64).collect(), contents, errors).unwrap(),
            )
        };
        let mut file = ResultsFile::new();
        file.insert(names.raw_yield, hist(100.0)).unwrap();
        file.insert(names.prompt, hist(60.0)).unwrap();
        file.insert(names.non_prompt, hist(40.0)).unwrap();
        file.insert(names.sum, hist(100.0)).unwrap();
        file
    }

    #[test]
    fn builds_dplus_plot() {
        let particle = CutVarParticle::Dplus;
        let plot = CutVarPlot::build(&cutvar_results(particle.names()), particle).unwrap();
        assert_eq!(plot.x_range, (0.0, 10.0));
        assert_eq!(plot.y_range, (0.1, 4000.0));
        assert_eq!(plot.file_stem(), "CutVarFitDplusFD");
        assert_eq!(plot.legend.entries[1].text, "Prompt D^{+}");
        assert!(plot
            .annotations
            .iter()
            .any(|a| a.text == "4 < #it{p}_{T} < 5 GeV/#it{c}"));
    }

    #[test]
    fn d0_names_do_not_match_dplus_file() {
        let results = cutvar_results(CutVarParticle::Dplus.names());
        assert!(CutVarPlot::build(&results, CutVarParticle::Dzero).is_err());
    }

    #[test]
    fn d0_layout() {
        let particle = CutVarParticle::Dzero;
        let plot = CutVarPlot::build(&cutvar_results(particle.names()), particle).unwrap();
        assert_eq!(plot.y_range.1, 160_000.0);
        assert_eq!(plot.file_stem(), "CutVarFitDzeroFD");
        assert_eq!(plot.legend.entries.len(), 4);
    }
}

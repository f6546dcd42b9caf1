use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Section read by default, the one the mass fit was run with.
pub const DEFAULT_SECTION: &str = "pPb5TeVFD";

// ---------------------------------------------------------------------------
// BinningSection – per-analysis pT / mass binning
// ---------------------------------------------------------------------------

/// Binning of one analysis section of the fit configuration.
///
/// Only the keys needed for plotting are read; the fit settings that share
/// the same section are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinningSection {
    #[serde(rename = "PtMin")]
    pub pt_min: Vec<f64>,
    #[serde(rename = "PtMax")]
    pub pt_max: Vec<f64>,
    #[serde(rename = "MassMin")]
    pub mass_min: Vec<f64>,
    #[serde(rename = "MassMax")]
    pub mass_max: Vec<f64>,
    #[serde(rename = "Rebin")]
    pub rebin: Vec<u32>,
}

/// One pT bin with its display window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtBin {
    pub index: usize,
    pub pt_min: f64,
    pub pt_max: f64,
    pub mass_min: f64,
    pub mass_max: f64,
    pub rebin: u32,
}

impl BinningSection {
    pub fn len(&self) -> usize {
        self.pt_min.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pt_min.is_empty()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let expected = self.pt_min.len();
        if expected == 0 {
            return Err(ConfigError::NoBins);
        }
        let lengths = [
            ("PtMax", self.pt_max.len()),
            ("MassMin", self.mass_min.len()),
            ("MassMax", self.mass_max.len()),
            ("Rebin", self.rebin.len()),
        ];
        for (key, got) in lengths {
            if got != expected {
                return Err(ConfigError::LengthMismatch { key, expected, got });
            }
        }

        for index in 0..expected {
            let invalid = |reason: String| ConfigError::InvalidBin { index, reason };
            if !(self.pt_min[index] < self.pt_max[index]) {
                return Err(invalid(format!(
                    "PtMin {} is not below PtMax {}",
                    self.pt_min[index], self.pt_max[index]
                )));
            }
            if !(self.mass_min[index] < self.mass_max[index]) {
                return Err(invalid(format!(
                    "MassMin {} is not below MassMax {}",
                    self.mass_min[index], self.mass_max[index]
                )));
            }
            if self.rebin[index] == 0 {
                return Err(invalid("Rebin must be at least 1".to_string()));
            }
        }
        Ok(())
    }

    pub fn bin(&self, index: usize) -> Result<PtBin, ConfigError> {
        if index >= self.len() {
            return Err(ConfigError::BinOutOfRange {
                index,
                count: self.len(),
            });
        }
        Ok(PtBin {
            index,
            pt_min: self.pt_min[index],
            pt_max: self.pt_max[index],
            mass_min: self.mass_min[index],
            mass_max: self.mass_max[index],
            rebin: self.rebin[index],
        })
    }
}

// ---------------------------------------------------------------------------
// AnalysisConfig – the whole file
// ---------------------------------------------------------------------------

/// The analysis configuration: section name → binning.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct AnalysisConfig {
    sections: BTreeMap<String, serde_yaml::Value>,
}

impl AnalysisConfig {
    /// Load a configuration file.  Dispatch by extension (`.yml`/`.yaml`, `.json`).
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading configuration {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        let parsed = match ext.as_str() {
            "json" => Self::from_json(&text),
            "yml" | "yaml" | "" => Self::from_yaml(&text),
            other => bail!("Unsupported configuration extension: .{other}"),
        };
        parsed.with_context(|| format!("parsing configuration {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(|k| k.as_str())
    }

    /// Parse and validate the binning of section `name`.
    pub fn binning(&self, name: &str) -> Result<BinningSection> {
        let value = self
            .sections
            .get(name)
            .ok_or_else(|| ConfigError::MissingSection(name.to_string()))?;
        let section: BinningSection = serde_yaml::from_value(value.clone())
            .with_context(|| format!("reading binning of section '{name}'"))?;
        section.validate()?;
        Ok(section)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
pPb5TeVFD:
  PtMin: [1., 2., 4.]
  PtMax: [2., 4., 8.]
  MassMin: [1.72, 1.72, 1.70]
  MassMax: [2.01, 2.01, 2.05]
  Rebin: [2, 2, 4]
  SgnFunc: [kGaus, kGaus, kGaus]
  BkgFunc: [kExpo, kExpo, kPol2]
other:
  PtMin: [0.]
"#;

    #[test]
    fn reads_default_section_and_ignores_fit_settings() {
        let cfg = AnalysisConfig::from_yaml(YAML).unwrap();
        let binning = cfg.binning(DEFAULT_SECTION).unwrap();
        assert_eq!(binning.len(), 3);
        let bin = binning.bin(2).unwrap();
        assert_eq!(bin.pt_min, 4.0);
        assert_eq!(bin.pt_max, 8.0);
        assert_eq!(bin.mass_max, 2.05);
        assert_eq!(bin.rebin, 4);
    }

    #[test]
    fn missing_section_is_reported() {
        let cfg = AnalysisConfig::from_yaml(YAML).unwrap();
        let err = cfg.binning("pp13TeV").unwrap_err();
        assert!(err.to_string().contains("pp13TeV"));
    }

    #[test]
    fn incomplete_section_fails_to_parse() {
        let cfg = AnalysisConfig::from_yaml(YAML).unwrap();
        assert!(cfg.binning("other").is_err());
    }

    #[test]
    fn bin_out_of_range() {
        let binning = AnalysisConfig::from_yaml(YAML)
            .unwrap()
            .binning(DEFAULT_SECTION)
            .unwrap();
        assert!(matches!(
            binning.bin(3),
            Err(ConfigError::BinOutOfRange { index: 3, count: 3 })
        ));
    }

    #[test]
    fn validation_rejects_inconsistent_arrays() {
        let section = BinningSection {
            pt_min: vec![1.0, 2.0],
            pt_max: vec![2.0, 4.0],
            mass_min: vec![1.7],
            mass_max: vec![2.0, 2.0],
            rebin: vec![1, 1],
        };
        assert!(matches!(
            section.validate(),
            Err(ConfigError::LengthMismatch { key: "MassMin", expected: 2, got: 1 })
        ));
    }

    #[test]
    fn validation_rejects_bad_windows() {
        let mut section = BinningSection {
            pt_min: vec![2.0],
            pt_max: vec![1.0],
            mass_min: vec![1.7],
            mass_max: vec![2.0],
            rebin: vec![1],
        };
        assert!(matches!(section.validate(), Err(ConfigError::InvalidBin { index: 0, .. })));
        section.pt_max = vec![3.0];
        section.rebin = vec![0];
        assert!(matches!(section.validate(), Err(ConfigError::InvalidBin { index: 0, .. })));
        section.rebin = vec![3];
        assert!(section.validate().is_ok());
    }

    #[test]
    fn json_configuration_is_accepted() {
        let json = r#"{"pPb5TeVFD": {"PtMin": [1], "PtMax": [2], "MassMin": [1.7],
                       "MassMax": [2.0], "Rebin": [1]}}"#;
        let cfg = AnalysisConfig::from_json(json).unwrap();
        assert_eq!(cfg.section_names().collect::<Vec<_>>(), vec!["pPb5TeVFD"]);
        assert_eq!(cfg.binning(DEFAULT_SECTION).unwrap().bin(0).unwrap().pt_max, 2.0);
    }
}

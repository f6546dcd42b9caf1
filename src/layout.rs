//! Backend-independent description of what goes on a canvas: text labels at
//! normalized device coordinates and legend boxes. The `render` module maps
//! these onto plotters drawing areas.

use crate::particle::NdcBox;

/// Typographic role of a label; each role has a fixed pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    /// "ALICE Preliminary"
    Experiment,
    /// Collision system and energy.
    System,
    /// Everything else.
    Label,
}

/// A text label anchored at its bottom-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub x: f64,
    pub y: f64,
    /// Text in TLatex markup.
    pub text: String,
    pub role: TextRole,
}

impl Annotation {
    pub fn new(x: f64, y: f64, text: impl Into<String>, role: TextRole) -> Self {
        Annotation {
            x,
            y,
            text: text.into(),
            role,
        }
    }
}

/// Drawn element a legend entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    /// Measured distribution: markers with error bars.
    Data,
    TotalFit,
    Background,
    Reflection,
    /// Filled prompt contribution.
    Prompt,
    /// Filled non-prompt contribution.
    NonPrompt,
    /// Sum of the fitted contributions.
    Sum,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub component: Component,
    /// Text in TLatex markup; `#splitline` gives two lines.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub bbox: NdcBox,
    pub entries: Vec<LegendEntry>,
}

impl Legend {
    pub fn new(bbox: NdcBox) -> Self {
        Legend {
            bbox,
            entries: Vec::new(),
        }
    }

    pub fn add(&mut self, component: Component, text: impl Into<String>) {
        self.entries.push(LegendEntry {
            component,
            text: text.into(),
        });
    }
}

/// Common top-left labels of the preliminary-figure layout.
pub const EXPERIMENT: &str = "ALICE Preliminary";
pub const COLLISION_SYSTEM: &str = "pp, #sqrt{#it{s}} = 13.6 TeV";
pub const RAPIDITY: &str = "#font[122]{-}0.5 < #it{y} < 0.5";

/// `"{min} < pT < {max} GeV/c"` in markup.
pub fn pt_range_label(pt_min: f64, pt_max: f64) -> String {
    format!("{pt_min:.0} < #it{{p}}_{{T}} < {pt_max:.0} GeV/#it{{c}}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pt_label_rounds_edges() {
        assert_eq!(pt_range_label(1.0, 2.0), "1 < #it{p}_{T} < 2 GeV/#it{c}");
        assert_eq!(pt_range_label(12.0, 24.0), "12 < #it{p}_{T} < 24 GeV/#it{c}");
    }

    #[test]
    fn legend_keeps_insertion_order() {
        let mut legend = Legend::new((0.1, 0.1, 0.5, 0.5));
        legend.add(Component::TotalFit, "Total fit function");
        legend.add(Component::Background, "#splitline{Combinatorial}{background}");
        assert_eq!(legend.entries[0].component, Component::TotalFit);
        assert_eq!(legend.entries[1].component, Component::Background);
    }
}

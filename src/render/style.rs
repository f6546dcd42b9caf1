use palette::{Hsl, IntoColor, Srgb};
use plotters::prelude::*;

use crate::layout::{Component, TextRole};

// ---------------------------------------------------------------------------
// Colours
// ---------------------------------------------------------------------------

/// Colours of the ROOT palette the published figures use.
pub mod colors {
    use plotters::style::RGBColor;

    pub const BLACK: RGBColor = RGBColor(0, 0, 0);
    pub const BLUE: RGBColor = RGBColor(0, 0, 255);
    pub const RED: RGBColor = RGBColor(255, 0, 0);
    /// `kRed + 1`
    pub const DARK_RED: RGBColor = RGBColor(204, 0, 0);
    /// `kGreen + 2`
    pub const DARK_GREEN: RGBColor = RGBColor(0, 153, 0);
    /// `kAzure + 4`
    pub const AZURE: RGBColor = RGBColor(51, 102, 204);
}

/// A lighter, translucent shade of `color` for filled areas.
pub fn fill_shade(color: RGBColor, lighten: f32, alpha: f64) -> RGBAColor {
    let base = Srgb::new(
        color.0 as f32 / 255.0,
        color.1 as f32 / 255.0,
        color.2 as f32 / 255.0,
    );
    let hsl: Hsl = base.into_color();
    let lighter = Hsl::new(hsl.hue, hsl.saturation, (hsl.lightness + lighten).min(0.95));
    let rgb: Srgb = lighter.into_color();
    RGBColor(
        (rgb.red * 255.0).round() as u8,
        (rgb.green * 255.0).round() as u8,
        (rgb.blue * 255.0).round() as u8,
    )
    .mix(alpha)
}

// ---------------------------------------------------------------------------
// Line / marker styles per drawn component
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dash {
    Solid,
    /// ROOT line style 2.
    Dashed,
    /// ROOT line style 9.
    LongDashed,
}

impl Dash {
    /// `(dash length, gap)` in logical pixels.
    pub fn pattern(self) -> Option<(u32, u32)> {
        match self {
            Dash::Solid => None,
            Dash::Dashed => Some((8, 5)),
            Dash::LongDashed => Some((18, 6)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ComponentStyle {
    pub color: RGBColor,
    /// Line width in logical pixels.
    pub width: u32,
    pub dash: Dash,
    pub fill: Option<RGBAColor>,
    /// Marker radius in logical pixels, for point-like components.
    pub marker: Option<u32>,
}

impl ComponentStyle {
    fn line(color: RGBColor, width: u32, dash: Dash) -> Self {
        ComponentStyle {
            color,
            width,
            dash,
            fill: None,
            marker: None,
        }
    }

    fn points(color: RGBColor, width: u32, marker: u32) -> Self {
        ComponentStyle {
            marker: Some(marker),
            ..Self::line(color, width, Dash::Solid)
        }
    }

    fn filled(color: RGBColor, width: u32) -> Self {
        ComponentStyle {
            fill: Some(fill_shade(color, 0.25, 0.45)),
            ..Self::line(color, width, Dash::Solid)
        }
    }

    pub fn stroke(&self, scale: f64) -> ShapeStyle {
        self.color.stroke_width(scaled(self.width, scale))
    }
}

/// Scale a logical pixel size, never below one device pixel.
pub fn scaled(px: u32, scale: f64) -> u32 {
    ((px as f64 * scale).round() as u32).max(1)
}

// ---------------------------------------------------------------------------
// Canvas layout
// ---------------------------------------------------------------------------

/// Pad margins as fractions of the canvas size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

/// Pixel sizes of the text roles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextSizes {
    pub experiment: f64,
    pub system: f64,
    pub label: f64,
    pub legend: f64,
    pub axis_title: f64,
    pub axis_label: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotKind {
    InvMass,
    CutVar,
}

/// Geometry and typography of one kind of figure.
#[derive(Debug, Clone)]
pub struct PlotStyle {
    pub kind: PlotKind,
    /// Logical canvas size; SVG output uses it as is.
    pub width: u32,
    pub height: u32,
    /// Device pixels per logical pixel for raster output.
    pub raster_scale: f64,
    pub margins: Margins,
    pub text: TextSizes,
    pub font: &'static str,
    /// Largest number of digits on the y axis before switching to `×10^n`.
    pub max_digits: u32,
    /// Fraction of the legend box width reserved for the symbol.
    pub legend_margin: f64,
}

impl PlotStyle {
    pub fn invmass() -> Self {
        PlotStyle {
            kind: PlotKind::InvMass,
            width: 520,
            height: 500,
            raster_scale: 2.0,
            margins: Margins {
                top: 0.07,
                left: 0.14,
                bottom: 0.125,
                right: 0.035,
            },
            text: TextSizes {
                experiment: 26.0,
                system: 22.0,
                label: 18.0,
                legend: 18.0,
                axis_title: 20.0,
                axis_label: 17.0,
            },
            font: "sans-serif",
            max_digits: 3,
            legend_margin: 0.25,
        }
    }

    pub fn cutvar() -> Self {
        PlotStyle {
            kind: PlotKind::CutVar,
            width: 750,
            height: 750,
            raster_scale: 1.5,
            margins: Margins {
                top: 0.06,
                left: 0.17,
                bottom: 0.13,
                right: 0.03,
            },
            text: TextSizes {
                experiment: 30.0,
                system: 25.0,
                label: 25.0,
                legend: 28.0,
                axis_title: 30.0,
                axis_label: 25.0,
            },
            font: "sans-serif",
            max_digits: 3,
            legend_margin: 0.46,
        }
    }

    pub fn text_size(&self, role: TextRole) -> f64 {
        match role {
            TextRole::Experiment => self.text.experiment,
            TextRole::System => self.text.system,
            TextRole::Label => self.text.label,
        }
    }

    pub fn component(&self, component: Component) -> ComponentStyle {
        match (self.kind, component) {
            (PlotKind::InvMass, Component::Data) => ComponentStyle::points(colors::BLACK, 3, 3),
            (PlotKind::InvMass, Component::TotalFit) => {
                ComponentStyle::line(colors::BLUE, 3, Dash::Solid)
            }
            (PlotKind::InvMass, Component::Background) => {
                ComponentStyle::line(colors::RED, 3, Dash::Dashed)
            }
            (PlotKind::InvMass, Component::Reflection) => {
                ComponentStyle::line(colors::DARK_GREEN, 3, Dash::LongDashed)
            }
            (PlotKind::CutVar, Component::Data) => ComponentStyle::points(colors::BLACK, 2, 4),
            (_, Component::Prompt) => ComponentStyle::filled(colors::DARK_RED, 2),
            (_, Component::NonPrompt) => ComponentStyle::filled(colors::AZURE, 2),
            (_, Component::Sum) => ComponentStyle::line(colors::DARK_GREEN, 2, Dash::Solid),
            (PlotKind::CutVar, _) => ComponentStyle::line(colors::BLACK, 2, Dash::Solid),
        }
    }
}

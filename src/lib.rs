//! Publication plots for heavy-flavour invariant-mass and cut-variation fits.
//!
//! The fit output (histograms and sampled fit functions) is read from a
//! results file, turned into a backend-independent plot description
//! ([`invmass::InvMassPlot`], [`cutvar::CutVarPlot`]) and drawn with plotters.

pub mod app;
pub mod cli;
pub mod config;
pub mod cutvar;
pub mod data;
pub mod error;
pub mod invmass;
pub mod layout;
pub mod markup;
pub mod particle;
pub mod render;
pub mod sample;

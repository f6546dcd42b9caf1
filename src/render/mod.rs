//! Drawing with plotters.
//!
//! ```text
//!   InvMassPlot / CutVarPlot ──► Figure::draw(root, scale)
//!                                   │  canvas: frame, NDC labels, legend
//!                                   │  series: points, steps, curves
//!                                   ▼
//!   export::save ──► SVGBackend (scale 1)
//!                └─► BitMapBackend buffer (raster scale) ──► image (png / jpg)
//! ```

pub mod canvas;
pub mod cutvar;
pub mod export;
pub mod invmass;
pub mod series;
pub mod style;

pub use export::{save, Figure, ImageFormat};
pub use style::PlotStyle;

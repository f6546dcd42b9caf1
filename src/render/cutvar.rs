use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;

use super::canvas::{build_frame, draw_annotation, draw_legend};
use super::export::Figure;
use super::series::{draw_points, draw_steps, Window};
use super::style::PlotStyle;
use crate::cutvar::{CutVarPlot, X_TITLE, Y_TITLE};
use crate::layout::Component;

impl Figure for CutVarPlot {
    fn style(&self) -> PlotStyle {
        PlotStyle::cutvar()
    }

    fn file_stem(&self) -> String {
        CutVarPlot::file_stem(self)
    }

    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, scale: f64) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let style = Figure::style(self);
        let window = Window::new(self.x_range, self.y_range);
        let mut chart = build_frame(
            root,
            &style,
            self.x_range,
            self.y_range,
            (X_TITLE, Y_TITLE),
            scale,
        )?;

        for (hist, component) in [
            (&self.prompt, Component::Prompt),
            (&self.non_prompt, Component::NonPrompt),
            (&self.sum, Component::Sum),
        ] {
            draw_steps(&mut chart, hist, &style.component(component), window, scale)?;
        }
        draw_points(
            &mut chart,
            &self.raw_yield,
            &style.component(Component::Data),
            window,
            scale,
        )?;

        for annotation in &self.annotations {
            draw_annotation(root, annotation, &style, scale)?;
        }
        draw_legend(root, &self.legend, &style, scale)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cutvar::CutVarParticle;
    use crate::data::model::{Histogram, ResultsFile, ResultsObject};

    #[test]
    fn dplus_figure_renders() {
        let particle = CutVarParticle::Dplus;
        let names = particle.names();
        let mut results = ResultsFile::new();
        for (name, scale) in [
            (names.raw_yield, 300.0),
            (names.prompt, 180.0),
            (names.non_prompt, 120.0),
            (names.sum, 300.0),
        ] {
            let mut hist = Histogram::uniform(8, 0.0, 0.8).unwrap();
            hist.contents = (0..8).map(|i| scale * (8 - i) as f64).collect();
            hist.errors = hist.contents.iter().map(|c| c.sqrt()).collect();
            results.insert(name, ResultsObject::Histogram(hist)).unwrap();
        }
        let plot = CutVarPlot::build(&results, particle).unwrap();

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (750, 750)).into_drawing_area();
            root.fill(&WHITE).unwrap();
            plot.draw(&root, 1.0).unwrap();
            root.present().unwrap();
        }
        assert!(svg.contains("ML based selection"));
        assert!(svg.contains("Raw yield (×10³)"));
        assert!(svg.contains("Non-prompt D⁺"));
        assert!(svg.contains("ALICE Preliminary"));
    }
}

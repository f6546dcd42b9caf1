use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;

use super::canvas::{build_frame, draw_annotation, draw_legend};
use super::export::Figure;
use super::series::{draw_curve, draw_points, Window};
use super::style::PlotStyle;
use crate::invmass::InvMassPlot;
use crate::layout::Component;

impl Figure for InvMassPlot {
    fn style(&self) -> PlotStyle {
        PlotStyle::invmass()
    }

    fn file_stem(&self) -> String {
        InvMassPlot::file_stem(self)
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
            (&self.x_title, &self.y_title),
            scale,
        )?;

        // Data first, fit curves over it: background, total, reflection.
        let data = style.component(Component::Data);
        draw_points(&mut chart, &self.mass, &data, window, scale)?;

        let background = style.component(Component::Background);
        draw_curve(root, &mut chart, &self.background, &background, window, scale)?;
        let total = style.component(Component::TotalFit);
        draw_curve(root, &mut chart, &self.total, &total, window, scale)?;
        if let Some(reflection) = &self.reflection {
            let component = style.component(Component::Reflection);
            draw_curve(root, &mut chart, reflection, &component, window, scale)?;
        }

        for annotation in &self.annotations {
            draw_annotation(root, annotation, &style, scale)?;
        }
        draw_legend(root, &self.legend, &style, scale)?;
        Ok(())
    }
}

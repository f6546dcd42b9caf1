//! Histograms and sampled curves on a [`Chart`].

use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;

use super::canvas::{draw_pixel_line, Chart};
use super::style::{scaled, ComponentStyle};
use crate::data::model::{Curve, Histogram};

/// Visible window of a chart in data coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

impl Window {
    pub fn new(x: (f64, f64), y: (f64, f64)) -> Self {
        Window { x, y }
    }

    fn contains_x(&self, x: f64) -> bool {
        x >= self.x.0 && x <= self.x.1
    }

    // max/min rather than `f64::clamp`, which panics on an inverted range.
    fn clamp_x(&self, x: f64) -> f64 {
        x.max(self.x.0).min(self.x.1)
    }

    fn clamp_y(&self, y: f64) -> f64 {
        y.max(self.y.0).min(self.y.1)
    }
}

/// Splits a polyline into the runs that lie inside `lo <= y <= hi`. Segments
/// crossing the band edges are cut at the interpolated crossing point.
fn clip_to_band(points: &[(f64, f64)], lo: f64, hi: f64) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();
    let inside = |y: f64| y >= lo && y <= hi;

    if let Some(&first) = points.first() {
        if inside(first.1) {
            current.push(first);
        }
    }
    for pair in points.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        let dy = y1 - y0;
        // Parameter range of the segment that stays inside the band.
        let (enter, exit) = if dy == 0.0 {
            if inside(y0) {
                (0.0, 1.0)
            } else {
                (1.0, 0.0)
            }
        } else {
            let (a, b) = ((lo - y0) / dy, (hi - y0) / dy);
            (a.min(b).max(0.0), a.max(b).min(1.0))
        };
        if enter > exit {
            if current.len() >= 2 {
                runs.push(std::mem::take(&mut current));
            }
            current.clear();
            continue;
        }
        let at = |t: f64| (x0 + t * (x1 - x0), y0 + t * dy);
        if enter > 0.0 || current.is_empty() {
            if current.len() >= 2 {
                runs.push(std::mem::take(&mut current));
            }
            current.clear();
            current.push(at(enter));
        }
        current.push(if exit < 1.0 { at(exit) } else { (x1, y1) });
        if exit < 1.0 {
            runs.push(std::mem::take(&mut current));
        }
    }
    if current.len() >= 2 {
        runs.push(current);
    }
    runs
}

/// Histogram as markers with vertical error bars and a horizontal bar
/// spanning the bin. Bins whose centre falls outside the window are skipped.
pub fn draw_points<DB>(
    chart: &mut Chart<'_, DB>,
    hist: &Histogram,
    component: &ComponentStyle,
    window: Window,
    scale: f64,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let stroke = component.stroke(scale);
    let radius = scaled(component.marker.unwrap_or(2), scale);
    let visible: Vec<_> = hist
        .points()
        .filter(|&(x, _, content, _)| window.contains_x(x) && content.is_finite())
        .collect();

    chart.draw_series(visible.iter().map(|&(x, _, content, error)| {
        ErrorBar::new_vertical(
            x,
            window.clamp_y(content - error),
            window.clamp_y(content),
            window.clamp_y(content + error),
            stroke,
            0,
        )
    }))?;

    chart.draw_series(
        visible
            .iter()
            .filter(|&&(_, _, content, _)| content >= window.y.0 && content <= window.y.1)
            .map(|&(x, half_width, content, _)| {
                PathElement::new(
                    vec![
                        (window.clamp_x(x - half_width), content),
                        (window.clamp_x(x + half_width), content),
                    ],
                    stroke,
                )
            }),
    )?;

    chart.draw_series(
        visible
            .iter()
            .filter(|&&(_, _, content, _)| content >= window.y.0 && content <= window.y.1)
            .map(|&(x, _, content, _)| Circle::new((x, content), radius, component.color.filled())),
    )?;
    Ok(())
}

/// Histogram drawn as a step outline, filled down to the frame bottom when
/// the component has a fill colour.
pub fn draw_steps<DB>(
    chart: &mut Chart<'_, DB>,
    hist: &Histogram,
    component: &ComponentStyle,
    window: Window,
    scale: f64,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let bins: Vec<(f64, f64, f64)> = hist
        .edges
        .windows(2)
        .zip(hist.contents.iter())
        .filter(|(_, content)| content.is_finite())
        .map(|(edge, &content)| {
            (
                window.clamp_x(edge[0]),
                window.clamp_x(edge[1]),
                window.clamp_y(content),
            )
        })
        .filter(|(lo, hi, _)| hi > lo)
        .collect();
    if bins.is_empty() {
        return Ok(());
    }

    if let Some(fill) = component.fill {
        chart.draw_series(
            bins.iter()
                .map(|&(lo, hi, top)| Rectangle::new([(lo, window.y.0), (hi, top)], fill.filled())),
        )?;
    }

    let mut outline = Vec::with_capacity(2 * bins.len() + 2);
    outline.push((bins[0].0, window.y.0));
    for &(lo, hi, top) in &bins {
        outline.push((lo, top));
        outline.push((hi, top));
    }
    outline.push((bins[bins.len() - 1].1, window.y.0));
    chart.draw_series(LineSeries::new(outline, component.stroke(scale)))?;
    Ok(())
}

/// Sampled curve restricted to the window. Parts outside the y range are cut
/// away rather than flattened onto the frame edge. Dashed styles are drawn
/// segment by segment in pixel space.
pub fn draw_curve<DB>(
    root: &DrawingArea<DB, Shift>,
    chart: &mut Chart<'_, DB>,
    curve: &Curve,
    component: &ComponentStyle,
    window: Window,
    scale: f64,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let points: Vec<(f64, f64)> = curve
        .points_within(window.x.0, window.x.1)
        .into_iter()
        .filter(|(_, y)| y.is_finite())
        .collect();
    let runs = clip_to_band(&points, window.y.0, window.y.1);
    if runs.is_empty() {
        log::debug!("curve with {} samples never enters the frame, skipped", points.len());
        return Ok(());
    }

    for run in runs {
        match component.dash.pattern() {
            None => {
                chart.draw_series(LineSeries::new(run, component.stroke(scale)))?;
            }
            Some(_) => {
                let pixels: Vec<(i32, i32)> = run.iter().map(|p| chart.backend_coord(p)).collect();
                draw_pixel_line(root, &pixels, component, scale)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Component;
    use crate::render::canvas::build_frame;
    use crate::render::style::PlotStyle;

    #[test]
    fn window_clamps() {
        let window = Window::new((1.72, 2.01), (0.0, 100.0));
        assert!(window.contains_x(1.8));
        assert!(!window.contains_x(1.70));
        assert_eq!(window.clamp_y(-5.0), 0.0);
        assert_eq!(window.clamp_y(250.0), 100.0);
        assert_eq!(window.clamp_x(3.0), 2.01);
    }

    #[test]
    fn inverted_window_does_not_panic() {
        let window = Window::new((1.72, 2.01), (40.0, 18.0));
        assert_eq!(window.clamp_y(10.0), 18.0);
        assert_eq!(window.clamp_y(100.0), 18.0);
    }

    fn close_runs(runs: &[Vec<(f64, f64)>], expected: &[&[(f64, f64)]]) -> bool {
        runs.len() == expected.len()
            && runs.iter().zip(expected).all(|(run, want)| {
                run.len() == want.len()
                    && run
                        .iter()
                        .zip(want.iter())
                        .all(|(a, b)| (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9)
            })
    }

    #[test]
    fn clipping_splits_at_band_crossings() {
        let runs = clip_to_band(&[(0.0, 0.0), (1.0, 100.0), (2.0, 0.0)], 40.0, 60.0);
        assert!(
            close_runs(&runs, &[&[(0.4, 40.0), (0.6, 60.0)], &[(1.4, 60.0), (1.6, 40.0)]]),
            "{runs:?}"
        );
    }

    #[test]
    fn clipping_keeps_inside_and_drops_outside() {
        let inside = [(0.0, 45.0), (1.0, 50.0), (2.0, 55.0)];
        let runs = clip_to_band(&inside, 40.0, 60.0);
        assert!(close_runs(&runs, &[&inside]), "{runs:?}");

        let below = [(0.0, 10.0), (1.0, 10.0), (2.0, 10.0)];
        assert!(clip_to_band(&below, 40.0, 278.0).is_empty());

        // leaves the band and comes back
        let runs = clip_to_band(&[(0.0, 50.0), (1.0, 30.0), (2.0, 50.0)], 40.0, 60.0);
        assert!(
            close_runs(&runs, &[&[(0.0, 50.0), (0.5, 40.0)], &[(1.5, 40.0), (2.0, 50.0)]]),
            "{runs:?}"
        );
    }

    #[test]
    fn curve_below_the_frame_is_not_drawn() {
        let style = PlotStyle::invmass();
        let window = Window::new((1.72, 2.01), (40.0, 278.0));
        let flat = Curve::new(vec![1.70, 1.85, 2.0, 2.1], vec![10.0; 4]).unwrap();

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (750, 750)).into_drawing_area();
            let mut chart =
                build_frame(&root, &style, window.x, window.y, ("x", "y"), 1.0).unwrap();
            let background = style.component(Component::Background);
            draw_curve(&root, &mut chart, &flat, &background, window, 1.0).unwrap();
            root.present().unwrap();
        }
        assert!(!svg.to_uppercase().contains("#FF0000"));
    }

    #[test]
    fn draws_all_series_kinds() {
        let style = PlotStyle::cutvar();
        let mut hist = Histogram::uniform(10, 0.0, 10.0).unwrap();
        for (i, c) in hist.contents.iter_mut().enumerate() {
            *c = 10.0 * i as f64;
        }
        hist.errors = hist.contents.iter().map(|c| c.sqrt()).collect();
        let curve = Curve::new(vec![0.0, 5.0, 10.0], vec![0.0, 50.0, 100.0]).unwrap();
        let window = Window::new((0.0, 10.0), (0.1, 120.0));

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (750, 750)).into_drawing_area();
            let mut chart =
                build_frame(&root, &style, window.x, window.y, ("x", "y"), 1.0).unwrap();
            let prompt = style.component(Component::Prompt);
            draw_steps(&mut chart, &hist, &prompt, window, 1.0).unwrap();
            let data = style.component(Component::Data);
            draw_points(&mut chart, &hist, &data, window, 1.0).unwrap();
            let background = PlotStyle::invmass().component(Component::Background);
            draw_curve(&root, &mut chart, &curve, &background, window, 1.0).unwrap();
            root.present().unwrap();
        }
        assert!(svg.contains("<circle"));
        assert!(svg.contains("<polyline") || svg.contains("<path"));
    }
}

//! Canvas-level drawing shared by the figures: labels placed in normalized
//! device coordinates, legend boxes, the frame and y-axis scaling.

use anyhow::Result;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::style::{scaled, ComponentStyle, PlotStyle};
use crate::layout::{Annotation, Legend};
use crate::markup;

/// Chart with linear axes on both sides, as used by every figure.
pub type Chart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

const X_TICKS: usize = 6;
const Y_TICKS: usize = 8;

/// Map NDC `(x, y)` (origin bottom-left) to a pixel position on `dim`.
pub fn ndc_to_pixel(dim: (u32, u32), x: f64, y: f64) -> (i32, i32) {
    (
        (x * dim.0 as f64).round() as i32,
        ((1.0 - y) * dim.1 as f64).round() as i32,
    )
}

/// Power of ten shown as a common factor on an axis whose labels would
/// otherwise need more than `max_digits` digits. Always a multiple of 3.
pub fn axis_exponent(max: f64, max_digits: u32) -> i32 {
    if !max.is_finite() || max.abs() < 10f64.powi(max_digits as i32) {
        return 0;
    }
    let magnitude = max.abs().log10().floor() as i32;
    3 * (magnitude / 3)
}

/// Decimals needed so that every tick of an axis spanning `[lo, hi]` with
/// about `ticks` divisions prints with the same precision.
pub fn tick_decimals(lo: f64, hi: f64, ticks: usize) -> usize {
    let span = (hi - lo).abs();
    if span == 0.0 || !span.is_finite() || ticks == 0 {
        return 0;
    }
    let raw_step = span / ticks as f64;
    let step = nice_step(raw_step);
    let digits = -step.log10().floor();
    if digits > 0.0 {
        digits as usize
    } else {
        0
    }
}

/// Round `raw` up to 1, 2 or 5 times a power of ten.
fn nice_step(raw: f64) -> f64 {
    let exp = raw.log10().floor();
    let base = 10f64.powf(exp);
    let mantissa = raw / base;
    let nice = if mantissa <= 1.0 {
        1.0
    } else if mantissa <= 2.0 {
        2.0
    } else if mantissa <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * base
}

/// Axis title (in markup) rendered with the common factor appended,
/// e.g. `Counts (×10³)`.
pub fn scaled_axis_title(title: &str, exponent: i32) -> String {
    if exponent == 0 {
        markup::to_unicode(title)
    } else {
        markup::to_unicode(&format!("{title} (#times10^{{{exponent}}})"))
    }
}

/// Lay out the frame: pad margins from the style, axis titles and tick
/// labels (y labels divided by the common power of ten) and a closed box.
pub fn build_frame<'a, DB>(
    root: &'a DrawingArea<DB, Shift>,
    style: &PlotStyle,
    x_range: (f64, f64),
    y_range: (f64, f64),
    titles: (&str, &str),
    scale: f64,
) -> Result<Chart<'a, DB>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (width, height) = root.dim_in_pixel();
    let margins = style.margins;
    let mut chart = ChartBuilder::on(root)
        .margin_top((margins.top * height as f64).round() as u32)
        .margin_right((margins.right * width as f64).round() as u32)
        .x_label_area_size((margins.bottom * height as f64).round() as u32)
        .y_label_area_size((margins.left * width as f64).round() as u32)
        .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)?;

    let exponent = axis_exponent(y_range.1, style.max_digits);
    let divisor = 10f64.powi(exponent);
    let x_decimals = tick_decimals(x_range.0, x_range.1, X_TICKS);
    let y_decimals = tick_decimals(y_range.0 / divisor, y_range.1 / divisor, Y_TICKS);
    let x_format = |x: &f64| format!("{x:.x_decimals$}");
    let y_format = |y: &f64| format!("{:.y_decimals$}", y / divisor);

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(X_TICKS)
        .y_labels(Y_TICKS)
        .x_desc(markup::to_unicode(titles.0))
        .y_desc(scaled_axis_title(titles.1, exponent))
        .x_label_formatter(&x_format)
        .y_label_formatter(&y_format)
        .axis_style(BLACK.stroke_width(scaled(1, scale)))
        .label_style((style.font, style.text.axis_label * scale))
        .axis_desc_style((style.font, style.text.axis_title * scale))
        .draw()?;

    chart.draw_series(std::iter::once(Rectangle::new(
        [(x_range.0, y_range.0), (x_range.1, y_range.1)],
        BLACK.stroke_width(scaled(1, scale)),
    )))?;

    Ok(chart)
}

/// Draw lines of text with the first line's bottom-left corner at `pos`
/// (`VPos::Bottom`) or the block centred vertically on `pos` (`VPos::Center`).
pub fn draw_lines<DB>(
    root: &DrawingArea<DB, Shift>,
    lines: &[String],
    pos: (i32, i32),
    size: f64,
    font: &str,
    vpos: VPos,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let line_height = (1.15 * size).round() as i32;
    let n = lines.len() as i32;
    let first_baseline = match vpos {
        VPos::Center => pos.1 - (n - 1) * line_height / 2,
        _ => pos.1 - (n - 1) * line_height,
    };
    let style = TextStyle::from((font, size).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, vpos));

    for (i, line) in lines.iter().enumerate() {
        let y = first_baseline + i as i32 * line_height;
        root.draw(&Text::new(line.clone(), (pos.0, y), style.clone()))?;
    }
    Ok(())
}

/// Draw a label at its NDC position, bottom-left anchored.
pub fn draw_annotation<DB>(
    root: &DrawingArea<DB, Shift>,
    annotation: &Annotation,
    style: &PlotStyle,
    scale: f64,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let pos = ndc_to_pixel(root.dim_in_pixel(), annotation.x, annotation.y);
    let size = style.text_size(annotation.role) * scale;
    draw_lines(
        root,
        &markup::to_lines(&annotation.text),
        pos,
        size,
        style.font,
        VPos::Bottom,
    )
}

/// Draw a borderless legend. Each entry gets an equal share of the box
/// height; the symbol takes `style.legend_margin` of its width.
pub fn draw_legend<DB>(
    root: &DrawingArea<DB, Shift>,
    legend: &Legend,
    style: &PlotStyle,
    scale: f64,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    if legend.entries.is_empty() {
        return Ok(());
    }
    let dim = root.dim_in_pixel();
    let (x1, y1, x2, y2) = legend.bbox;
    let (left, bottom) = ndc_to_pixel(dim, x1, y1);
    let (right, top) = ndc_to_pixel(dim, x2, y2);

    let row_height = (bottom - top) as f64 / legend.entries.len() as f64;
    let symbol_width = ((right - left) as f64 * style.legend_margin) as i32;
    let size = style.text.legend * scale;

    for (i, entry) in legend.entries.iter().enumerate() {
        let centre_y = top + (row_height * (i as f64 + 0.5)).round() as i32;
        let sym_left = left + symbol_width / 8;
        let sym_right = left + symbol_width * 7 / 8;
        let sym_half_height = (row_height * 0.3).round() as i32;

        let component = style.component(entry.component);
        draw_symbol(
            root,
            &component,
            (sym_left, centre_y - sym_half_height),
            (sym_right, centre_y + sym_half_height),
            scale,
        )?;

        draw_lines(
            root,
            &markup::to_lines(&entry.text),
            (left + symbol_width + (4.0 * scale) as i32, centre_y),
            size,
            style.font,
            VPos::Center,
        )?;
    }
    Ok(())
}

/// Legend symbol inside the pixel rectangle `[upper_left, lower_right]`.
fn draw_symbol<DB>(
    root: &DrawingArea<DB, Shift>,
    component: &ComponentStyle,
    upper_left: (i32, i32),
    lower_right: (i32, i32),
    scale: f64,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let centre = (
        (upper_left.0 + lower_right.0) / 2,
        (upper_left.1 + lower_right.1) / 2,
    );
    let stroke = component.stroke(scale);

    if let Some(fill) = component.fill {
        root.draw(&Rectangle::new([upper_left, lower_right], fill.filled()))?;
        root.draw(&Rectangle::new([upper_left, lower_right], stroke))?;
    } else if let Some(radius) = component.marker {
        root.draw(&PathElement::new(
            vec![(centre.0, upper_left.1), (centre.0, lower_right.1)],
            stroke,
        ))?;
        root.draw(&Circle::new(
            centre,
            scaled(radius, scale),
            component.color.filled(),
        ))?;
    } else {
        draw_pixel_line(
            root,
            &[(upper_left.0, centre.1), (lower_right.0, centre.1)],
            component,
            scale,
        )?;
    }
    Ok(())
}

/// Polyline in pixel space honouring the component's dash pattern.
pub(crate) fn draw_pixel_line<DB>(
    root: &DrawingArea<DB, Shift>,
    points: &[(i32, i32)],
    component: &ComponentStyle,
    scale: f64,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let stroke = component.stroke(scale);
    match component.dash.pattern() {
        None => {
            root.draw(&PathElement::new(points.to_vec(), stroke))?;
        }
        Some((dash, gap)) => {
            let dash = scaled(dash, scale) as f64;
            let gap = scaled(gap, scale) as f64;
            for pair in points.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                let dx = (b.0 - a.0) as f64;
                let dy = (b.1 - a.1) as f64;
                let len = dx.hypot(dy);
                if len == 0.0 {
                    continue;
                }
                let mut t = 0.0;
                while t < len {
                    let end = (t + dash).min(len);
                    let p = |s: f64| {
                        (
                            a.0 + (dx * s / len).round() as i32,
                            a.1 + (dy * s / len).round() as i32,
                        )
                    };
                    root.draw(&PathElement::new(vec![p(t), p(end)], stroke))?;
                    t = end + gap;
                }
            }
        }
    }
    Ok(())
}

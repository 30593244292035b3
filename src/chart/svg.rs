// Static SVG rendering for report charts.

use super::{ChartData, ChartKind, Orientation, Palette, StylingConfig, ValueFormat};
use crate::utils::error::{ReportError, Result};

const MARGIN_TOP: f64 = 70.0;
const MARGIN_RIGHT: f64 = 70.0;
const MARGIN_BOTTOM: f64 = 70.0;
const MARGIN_LEFT: f64 = 100.0;
/// Left margin for horizontal bars, where category names sit.
const CATEGORY_GUTTER: f64 = 220.0;
const LINE_PADDING: f64 = 30.0;
const TICK_COUNT: usize = 5;

#[derive(Debug, Clone, Copy)]
struct PlotArea {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl PlotArea {
    fn right(&self) -> f64 {
        self.left + self.width
    }

    fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Renders `data` as a standalone SVG document.
///
/// The output is a pure function of its arguments, so identical input
/// produces byte-identical files.
pub fn render_chart(data: &ChartData, kind: ChartKind, style: &StylingConfig) -> Result<String> {
    check_data(data, kind)?;
    let palette = style
        .palette()
        .map_err(|e| ReportError::render(&data.title, e.to_string()))?;

    let (width, height) = style.pixel_size();
    let horizontal = kind != ChartKind::Line && data.orientation == Orientation::Horizontal;
    let left = if horizontal { CATEGORY_GUTTER } else { MARGIN_LEFT };
    let plot = PlotArea {
        left,
        top: MARGIN_TOP,
        width: width - left - MARGIN_RIGHT,
        height: height - MARGIN_TOP - MARGIN_BOTTOM,
    };
    if plot.width <= 0.0 || plot.height <= 0.0 {
        return Err(ReportError::render(
            &data.title,
            format!("figure of {}x{}px is too small to draw into", width, height),
        ));
    }

    let fg = style.foreground();
    let axis_max = axis_step(data.max_value() * 1.05, data.value_format) * TICK_COUNT as f64;

    let mut svg = String::new();
    svg.push_str(&format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="Helvetica, Arial, sans-serif">
<rect width="100%" height="100%" fill="{bg}"/>
<text x="{cx:.1}" y="40" text-anchor="middle" font-size="20" font-weight="bold" fill="{primary}">{title}</text>
"##,
        w = width,
        h = height,
        bg = escape(&style.background_color),
        cx = width / 2.0,
        primary = palette.primary,
        title = escape(&data.title),
    ));

    value_axis(&mut svg, data, &plot, axis_max, horizontal, fg);

    match kind {
        ChartKind::Line => draw_line(&mut svg, data, &plot, axis_max, &palette, fg),
        ChartKind::Bar => draw_bars(&mut svg, data, &plot, axis_max, &[palette.primary], horizontal, fg),
        ChartKind::GroupedBar => {
            let colors: Vec<&str> = (0..data.series.len()).map(|i| palette.series_color(i)).collect();
            draw_bars(&mut svg, data, &plot, axis_max, &colors, horizontal, fg);
            draw_legend(&mut svg, data, &plot, &colors, fg);
        }
    }

    axis_titles(&mut svg, data, &plot, height, fg);
    svg.push_str("</svg>\n");
    Ok(svg)
}

fn check_data(data: &ChartData, kind: ChartKind) -> Result<()> {
    let fail = |reason: String| -> Result<()> { Err(ReportError::render(&data.title, reason)) };

    if data.categories.is_empty() {
        return fail("no data points".to_string());
    }
    if data.series.is_empty() {
        return fail("no series".to_string());
    }
    if matches!(kind, ChartKind::Bar | ChartKind::Line) && data.series.len() != 1 {
        return fail(format!(
            "{:?} charts take exactly one series, got {}",
            kind,
            data.series.len()
        ));
    }
    for series in &data.series {
        if series.values.len() != data.categories.len() {
            return fail(format!(
                "series '{}' has {} values for {} categories",
                series.name,
                series.values.len(),
                data.categories.len()
            ));
        }
        if let Some(bad) = series.values.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return fail(format!("series '{}' contains unsupported value {}", series.name, bad));
        }
    }
    if !data.annotations.is_empty() && data.annotations.len() != data.categories.len() {
        return fail(format!(
            "{} annotations for {} categories",
            data.annotations.len(),
            data.categories.len()
        ));
    }
    Ok(())
}

/// Rounds up to 1, 2, 2.5, 4 or 5 times a power of ten.
fn nice_step(raw: f64) -> f64 {
    if !(raw > 0.0) {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let factor = [1.0, 2.0, 2.5, 4.0, 5.0, 10.0]
        .into_iter()
        .find(|s| normalized <= *s)
        .unwrap_or(10.0);
    factor * magnitude
}

/// Distance between value-axis ticks covering `max` in `TICK_COUNT` steps.
///
/// The step is a whole number of the format's tick unit, so every tick label
/// is exact and no two labels collide.
fn axis_step(max: f64, format: ValueFormat) -> f64 {
    let unit = format.tick_unit();
    let units = nice_step(max / TICK_COUNT as f64 / unit);
    // 0.1 * 10 等浮點誤差不應進位
    (units - 1e-9).ceil().max(1.0) * unit
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

fn value_axis(svg: &mut String, data: &ChartData, plot: &PlotArea, axis_max: f64, horizontal: bool, fg: &str) {
    for i in 0..=TICK_COUNT {
        let value = axis_max * i as f64 / TICK_COUNT as f64;
        let label = escape(&data.value_format.format(value));
        if horizontal {
            let x = plot.left + value / axis_max * plot.width;
            svg.push_str(&format!(
                r##"<line x1="{x:.1}" y1="{y1:.1}" x2="{x:.1}" y2="{y2:.1}" stroke="{fg}" stroke-opacity="0.3" stroke-dasharray="4 4"/>
<text x="{x:.1}" y="{ly:.1}" text-anchor="middle" font-size="12" fill="{fg}">{label}</text>
"##,
                y1 = plot.top,
                y2 = plot.bottom(),
                ly = plot.bottom() + 20.0,
            ));
        } else {
            let y = plot.bottom() - value / axis_max * plot.height;
            svg.push_str(&format!(
                r##"<line x1="{x1:.1}" y1="{y:.1}" x2="{x2:.1}" y2="{y:.1}" stroke="{fg}" stroke-opacity="0.3" stroke-dasharray="4 4"/>
<text x="{lx:.1}" y="{ty:.1}" text-anchor="end" font-size="12" fill="{fg}">{label}</text>
"##,
                x1 = plot.left,
                x2 = plot.right(),
                lx = plot.left - 8.0,
                ty = y + 4.0,
            ));
        }
    }
}

fn draw_bars(
    svg: &mut String,
    data: &ChartData,
    plot: &PlotArea,
    axis_max: f64,
    colors: &[&str],
    horizontal: bool,
    fg: &str,
) {
    let n = data.categories.len() as f64;
    let k = data.series.len() as f64;
    let stroke_width = if data.series.len() > 1 { 1.0 } else { 2.0 };

    for (i, category) in data.categories.iter().enumerate() {
        let i_f = i as f64;
        if horizontal {
            let band = plot.height / n;
            let group = band * 0.7;
            let bar = group / k;
            let gy = plot.top + i_f * band + (band - group) / 2.0;
            let mut widest: f64 = 0.0;

            for (j, series) in data.series.iter().enumerate() {
                let value = series.values[i];
                let w = value / axis_max * plot.width;
                let y = gy + j as f64 * bar;
                widest = widest.max(w);
                svg.push_str(&format!(
                    r##"<rect x="{x:.1}" y="{y:.1}" width="{w:.1}" height="{bar:.1}" fill="{fill}" stroke="{fg}" stroke-width="{stroke_width}"/>
"##,
                    x = plot.left,
                    fill = colors[j % colors.len()],
                ));
                if data.value_labels {
                    svg.push_str(&format!(
                        r##"<text x="{x:.1}" y="{ty:.1}" font-size="12" font-weight="bold" fill="{fg}">{label}</text>
"##,
                        x = plot.left + w + 6.0,
                        ty = y + bar / 2.0 + 4.0,
                        label = escape(&data.value_format.format(value)),
                    ));
                }
            }

            let cy = plot.top + i_f * band + band / 2.0 + 4.0;
            svg.push_str(&format!(
                r##"<text x="{x:.1}" y="{cy:.1}" text-anchor="end" font-size="12" fill="{fg}">{label}</text>
"##,
                x = plot.left - 8.0,
                label = escape(category),
            ));
            if let Some(note) = data.annotations.get(i) {
                let offset = if data.value_labels { 60.0 } else { 6.0 };
                svg.push_str(&format!(
                    r##"<text x="{x:.1}" y="{cy:.1}" font-size="10" fill="{fg}">{note}</text>
"##,
                    x = plot.left + widest + offset,
                    note = escape(note),
                ));
            }
        } else {
            let band = plot.width / n;
            let group = band * 0.7;
            let bar = group / k;
            let gx = plot.left + i_f * band + (band - group) / 2.0;

            for (j, series) in data.series.iter().enumerate() {
                let value = series.values[i];
                let h = value / axis_max * plot.height;
                let x = gx + j as f64 * bar;
                let y = plot.bottom() - h;
                svg.push_str(&format!(
                    r##"<rect x="{x:.1}" y="{y:.1}" width="{bar:.1}" height="{h:.1}" fill="{fill}" stroke="{fg}" stroke-width="{stroke_width}"/>
"##,
                    fill = colors[j % colors.len()],
                ));
                if data.value_labels {
                    svg.push_str(&format!(
                        r##"<text x="{cx:.1}" y="{ty:.1}" text-anchor="middle" font-size="12" font-weight="bold" fill="{fg}">{label}</text>
"##,
                        cx = x + bar / 2.0,
                        ty = y - 6.0,
                        label = escape(&data.value_format.format(value)),
                    ));
                }
            }

            let cx = plot.left + i_f * band + band / 2.0;
            svg.push_str(&format!(
                r##"<text x="{cx:.1}" y="{ly:.1}" text-anchor="middle" font-size="12" fill="{fg}">{label}</text>
"##,
                ly = plot.bottom() + 20.0,
                label = escape(category),
            ));
            if let Some(note) = data.annotations.get(i) {
                svg.push_str(&format!(
                    r##"<text x="{cx:.1}" y="{ly:.1}" text-anchor="middle" font-size="10" fill="{fg}">{note}</text>
"##,
                    ly = plot.bottom() + 36.0,
                    note = escape(note),
                ));
            }
        }
    }

    let baseline = if horizontal {
        (plot.left, plot.top, plot.left, plot.bottom())
    } else {
        (plot.left, plot.bottom(), plot.right(), plot.bottom())
    };
    svg.push_str(&format!(
        r##"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{fg}" stroke-width="1"/>
"##,
        baseline.0, baseline.1, baseline.2, baseline.3,
    ));
}

fn draw_line(svg: &mut String, data: &ChartData, plot: &PlotArea, axis_max: f64, palette: &Palette, fg: &str) {
    let values = &data.series[0].values;
    let n = values.len();
    let inner = plot.width - 2.0 * LINE_PADDING;
    let points: Vec<(f64, f64)> = values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let x = if n == 1 {
                plot.left + plot.width / 2.0
            } else {
                plot.left + LINE_PADDING + inner * i as f64 / (n - 1) as f64
            };
            (x, plot.bottom() - v / axis_max * plot.height)
        })
        .collect();

    let path: Vec<String> = points.iter().map(|(x, y)| format!("{:.1},{:.1}", x, y)).collect();
    let first_x = points[0].0;
    let last_x = points[n - 1].0;

    svg.push_str(&format!(
        r##"<polygon points="{first_x:.1},{base:.1} {path} {last_x:.1},{base:.1}" fill="{c}" fill-opacity="0.3"/>
<polyline points="{path}" fill="none" stroke="{c}" stroke-width="3"/>
"##,
        base = plot.bottom(),
        path = path.join(" "),
        c = palette.primary,
    ));

    for (i, ((x, y), category)) in points.iter().zip(&data.categories).enumerate() {
        svg.push_str(&format!(
            r##"<circle cx="{x:.1}" cy="{y:.1}" r="6" fill="{c}"/>
<text x="{x:.1}" y="{ly:.1}" text-anchor="middle" font-size="12" fill="{fg}">{label}</text>
"##,
            c = palette.primary,
            ly = plot.bottom() + 20.0,
            label = escape(category),
        ));
        if data.value_labels {
            svg.push_str(&format!(
                r##"<text x="{x:.1}" y="{ty:.1}" text-anchor="middle" font-size="12" font-weight="bold" fill="{fg}">{label}</text>
"##,
                ty = y - 12.0,
                label = escape(&data.value_format.format(values[i])),
            ));
        }
    }
}

fn draw_legend(svg: &mut String, data: &ChartData, plot: &PlotArea, colors: &[&str], fg: &str) {
    let x = plot.right() - 160.0;
    for (j, series) in data.series.iter().enumerate() {
        let y = plot.top + 8.0 + j as f64 * 18.0;
        svg.push_str(&format!(
            r##"<rect x="{x:.1}" y="{y:.1}" width="12" height="12" fill="{fill}"/>
<text x="{tx:.1}" y="{ty:.1}" font-size="12" fill="{fg}">{name}</text>
"##,
            fill = colors[j % colors.len()],
            tx = x + 18.0,
            ty = y + 10.0,
            name = escape(&series.name),
        ));
    }
}

fn axis_titles(svg: &mut String, data: &ChartData, plot: &PlotArea, height: f64, fg: &str) {
    if !data.x_label.is_empty() {
        svg.push_str(&format!(
            r##"<text x="{cx:.1}" y="{y:.1}" text-anchor="middle" font-size="14" font-weight="bold" fill="{fg}">{label}</text>
"##,
            cx = plot.left + plot.width / 2.0,
            y = height - 16.0,
            label = escape(&data.x_label),
        ));
    }
    if !data.y_label.is_empty() {
        let cy = plot.top + plot.height / 2.0;
        svg.push_str(&format!(
            r##"<text x="24" y="{cy:.1}" transform="rotate(-90 24 {cy:.1})" text-anchor="middle" font-size="14" font-weight="bold" fill="{fg}">{label}</text>
"##,
            label = escape(&data.y_label),
        ));
    }
}

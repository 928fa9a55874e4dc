use crate::canvas::Canvas;
use crate::error::ShakemapError;
use crate::layout::PanelLayout;
use groundmotion::contour::ContourStyle;
use groundmotion::levels::{ElevationLevels, ScalarLevels};
use groundmotion::ticks::{decimals_for_step, format_ticks};
use plotters::style::text_anchor::{HPos, VPos};

/// Label and tick marks of a panel's colorbar, in level units.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorbarSpec {
    pub label: String,
    pub ticks: Vec<f64>,
    pub tick_labels: Vec<String>,
    pub minor_ticks: Vec<f64>,
}

impl ColorbarSpec {
    /// Major ticks on the round ladder values, minor ticks on the finer ladder.
    pub fn logarithmic(label: impl Into<String>, levels: &ScalarLevels) -> Self {
        let ticks = levels.major_ticks.clone();
        let minor_ticks = levels
            .minor_ticks
            .iter()
            .copied()
            .filter(|m| !ticks.iter().any(|t| (t - m).abs() <= 1e-9 * t.abs()))
            .collect();
        Self {
            label: label.into(),
            tick_labels: ticks.iter().map(|v| format_log_tick(*v)).collect(),
            ticks,
            minor_ticks,
        }
    }

    /// One tick per level; levels are metres, labels kilometres.
    pub fn elevation(label: impl Into<String>, levels: &ElevationLevels) -> Self {
        let km: Vec<f64> = levels.levels.iter().map(|m| m / 1000.0).collect();
        Self {
            label: label.into(),
            tick_labels: format_ticks(&km),
            ticks: levels.levels.clone(),
            minor_ticks: Vec::new(),
        }
    }
}

fn format_log_tick(value: f64) -> String {
    let decimals = decimals_for_step(value.abs());
    format!("{value:.decimals$}")
}

/// Vertical colorbar with triangular under/over extensions.
pub fn draw_colorbar(
    canvas: &Canvas,
    layout: &PanelLayout,
    style: &ContourStyle,
    spec: &ColorbarSpec,
) -> Result<(), ShakemapError> {
    let bar = layout.colorbar;
    let body = layout.colorbar_body();
    let norm = style.norm();
    let levels = style.levels();
    let position = |value: f64| {
        let t = norm.apply(value).clamp(0.0, 1.0);
        body.bottom() - (t * (body.height - 1) as f64).round() as i32
    };

    let (first, last) = (levels[0], levels[levels.len() - 1]);
    if last > first {
        for (window, color) in levels.windows(2).zip(style.band_colors()) {
            canvas.fill_rect(
                (body.left(), position(window[1])),
                (body.right(), position(window[0])),
                *color,
            )?;
        }
    } else {
        let color = style.band_colors().first().copied().unwrap_or(style.under());
        canvas.fill_rect((body.left(), body.top()), (body.right(), body.bottom()), color)?;
    }

    let center = bar.center_x();
    canvas.polygon(
        vec![(body.left(), body.top()), (body.right(), body.top()), (center, bar.top())],
        style.over(),
    )?;
    canvas.polygon(
        vec![(body.left(), body.bottom()), (body.right(), body.bottom()), (center, bar.bottom())],
        style.under(),
    )?;
    canvas.path(vec![
        (center, bar.top()),
        (body.right(), body.top()),
        (body.right(), body.bottom()),
        (center, bar.bottom()),
        (body.left(), body.bottom()),
        (body.left(), body.top()),
        (center, bar.top()),
    ])?;

    let tick = canvas.style.tick_length;
    let label_px = canvas.style.label_px;
    let in_range = |value: f64| value >= first.min(last) * (1.0 - 1e-9) && value <= last * (1.0 + 1e-9);
    for value in spec.minor_ticks.iter().copied().filter(|v| in_range(*v)) {
        let y = position(value);
        canvas.line((body.right(), y), (body.right() + tick / 2, y))?;
    }
    for (value, label) in spec.ticks.iter().zip(&spec.tick_labels) {
        if !in_range(*value) && last > first {
            continue;
        }
        let y = position(*value);
        canvas.line((body.right(), y), (body.right() + tick, y))?;
        canvas.text(
            label,
            (body.right() + tick + (label_px * 0.3) as i32, y),
            label_px,
            (HPos::Left, VPos::Center),
        )?;
    }

    canvas.vertical_text(
        &spec.label,
        (bar.right() + tick + (label_px * 4.2) as i32, bar.center_y()),
        label_px,
    )?;
    Ok(())
}

use crate::canvas::Canvas;
use crate::colorbar::{ColorbarSpec, draw_colorbar};
use crate::error::ShakemapError;
use crate::layout::{AxisMap, PanelLayout, PixelRect};
use groundmotion::contour::ContourStyle;
use groundmotion::mesh::{ContourMesh, Extent};
use groundmotion::raster::FieldRaster;
use groundmotion::ticks::{axis_ticks, format_ticks};
use plotters::style::text_anchor::{HPos, VPos};

pub const X_LABEL: &str = "x [km]";
pub const Y_LABEL: &str = "y [km]";

/// Everything needed to draw one filled-contour panel.
#[derive(Debug, Clone)]
pub struct PanelSpec {
    pub title: String,
    pub mesh: ContourMesh,
    pub style: ContourStyle,
    /// Axis limits in km
    pub view: Extent,
    pub colorbar: ColorbarSpec,
}

impl PanelSpec {
    /// Width over height of the axis limits.
    pub fn aspect(&self) -> f64 {
        let size = self.view.size();
        size.x / size.y
    }
}

pub fn draw_panel(canvas: &Canvas, layout: &PanelLayout, panel: &PanelSpec) -> Result<(), ShakemapError> {
    let plot = layout.plot;
    let raster = FieldRaster::render(
        &panel.mesh,
        &panel.style,
        panel.view,
        plot.width as usize,
        plot.height as usize,
    );
    for (col, row, color) in raster.iter_filled() {
        canvas.pixel((plot.x + col as i32, plot.y + row as i32), color)?;
    }

    draw_axes(canvas, plot, panel.view)?;
    canvas.text(
        &panel.title,
        (plot.center_x(), plot.top() - (canvas.style.title_px * 0.5) as i32),
        canvas.style.title_px,
        (HPos::Center, VPos::Bottom),
    )?;
    draw_colorbar(canvas, layout, &panel.style, &panel.colorbar)
}

/// Frame with inward ticks on all four sides and labels on the left and bottom.
fn draw_axes(canvas: &Canvas, plot: PixelRect, view: Extent) -> Result<(), ShakemapError> {
    canvas.frame(plot)?;
    let map = AxisMap { view, rect: plot };
    let tick = canvas.style.tick_length;
    let label_px = canvas.style.label_px;
    let pad = (label_px * 0.3) as i32;

    let x_ticks = axis_ticks(view.min.x, view.max.x, canvas.style.max_ticks);
    for (value, label) in x_ticks.iter().zip(format_ticks(&x_ticks)) {
        let x = map.x(*value);
        canvas.line((x, plot.bottom()), (x, plot.bottom() - tick))?;
        canvas.line((x, plot.top()), (x, plot.top() + tick))?;
        canvas.text(&label, (x, plot.bottom() + pad), label_px, (HPos::Center, VPos::Top))?;
    }

    let y_ticks = axis_ticks(view.min.y, view.max.y, canvas.style.max_ticks);
    for (value, label) in y_ticks.iter().zip(format_ticks(&y_ticks)) {
        let y = map.y(*value);
        canvas.line((plot.left(), y), (plot.left() + tick, y))?;
        canvas.line((plot.right(), y), (plot.right() - tick, y))?;
        canvas.text(&label, (plot.left() - pad, y), label_px, (HPos::Right, VPos::Center))?;
    }

    canvas.text(
        X_LABEL,
        (plot.center_x(), plot.bottom() + pad + (label_px * 1.5) as i32),
        label_px,
        (HPos::Center, VPos::Top),
    )?;
    canvas.vertical_text(
        Y_LABEL,
        (plot.left() - (label_px * 3.4) as i32, plot.center_y()),
        label_px,
    )
}

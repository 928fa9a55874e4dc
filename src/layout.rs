//! Pixel geometry of one shake-map panel: plot box, colorbar and margins.

use glam::DVec2;
use groundmotion::ShakemapConfig;
use groundmotion::mesh::Extent;

/// Sizes shared by every panel, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureStyle {
    pub label_px: f64,
    pub title_px: f64,
    pub line_width: u32,
    pub tick_length: i32,
    pub max_ticks: usize,
}

impl FigureStyle {
    pub fn from_config(config: &ShakemapConfig) -> Self {
        let label_px = config.points_to_pixels(config.axes.label_font_pt);
        Self {
            label_px,
            title_px: config.points_to_pixels(config.axes.title_font_pt),
            // matplotlib's default 0.8 pt frame, 3.5 pt ticks
            line_width: config.points_to_pixels(0.8).round().max(1.0) as u32,
            tick_length: config.points_to_pixels(3.5).round().max(2.0) as i32,
            max_ticks: config.axes.max_ticks,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    pub fn left(&self) -> i32 {
        self.x
    }

    /// Last pixel column inside the rect.
    pub fn right(&self) -> i32 {
        self.x + self.width - 1
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    /// Last pixel row inside the rect.
    pub fn bottom(&self) -> i32 {
        self.y + self.height - 1
    }

    pub fn center_x(&self) -> i32 {
        self.x + self.width / 2
    }

    pub fn center_y(&self) -> i32 {
        self.y + self.height / 2
    }

    pub fn contains_rect(&self, other: &PixelRect) -> bool {
        other.left() >= self.left()
            && other.right() <= self.right()
            && other.top() >= self.top()
            && other.bottom() <= self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelLayout {
    pub panel: PixelRect,
    pub plot: PixelRect,
    /// Full colorbar span, extension triangles included
    pub colorbar: PixelRect,
    /// Height of each extension triangle
    pub extension: i32,
}

impl PanelLayout {
    /// Lays out a `width x height` panel so that the plot box keeps the data
    /// `aspect` (x span over y span), with the colorbar to its right.
    pub fn new(width: u32, height: u32, aspect: f64, style: &FigureStyle) -> Self {
        let label = style.label_px;
        let top = style.title_px * 2.0;
        let bottom = label * 3.6;
        let left = label * 4.5;
        let gap = label * 0.8;
        let bar_width = (label * 0.9).max(8.0);
        let right = gap + bar_width + label * 3.5 + label * 1.6 + label * 0.5;

        let avail_w = (width as f64 - left - right).max(1.0);
        let avail_h = (height as f64 - top - bottom).max(1.0);
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        let (plot_w, plot_h) = if avail_w / avail_h > aspect {
            (avail_h * aspect, avail_h)
        } else {
            (avail_w, avail_w / aspect)
        };
        let (plot_w, plot_h) = (plot_w.floor().max(1.0), plot_h.floor().max(1.0));

        let offset_x = ((avail_w - plot_w) / 2.0).floor();
        let offset_y = ((avail_h - plot_h) / 2.0).floor();
        let plot = PixelRect {
            x: (left + offset_x) as i32,
            y: (top + offset_y) as i32,
            width: plot_w as i32,
            height: plot_h as i32,
        };
        let colorbar = PixelRect {
            x: plot.x + plot.width + gap.round() as i32,
            y: plot.y,
            width: bar_width.round() as i32,
            height: plot.height,
        };

        Self {
            panel: PixelRect {
                x: 0,
                y: 0,
                width: width as i32,
                height: height as i32,
            },
            plot,
            colorbar,
            extension: (bar_width.round() as i32).min(plot.height / 4),
        }
    }

    /// The colorbar between its extension triangles.
    pub fn colorbar_body(&self) -> PixelRect {
        PixelRect {
            x: self.colorbar.x,
            y: self.colorbar.y + self.extension,
            width: self.colorbar.width,
            height: (self.colorbar.height - 2 * self.extension).max(1),
        }
    }
}

/// Maps data coordinates inside `view` onto a pixel rect, y pointing up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMap {
    pub view: Extent,
    pub rect: PixelRect,
}

impl AxisMap {
    pub fn x(&self, x: f64) -> i32 {
        let t = (x - self.view.min.x) / self.view.size().x;
        (self.rect.x as f64 + t * self.rect.width as f64).round() as i32
    }

    pub fn y(&self, y: f64) -> i32 {
        let t = (y - self.view.min.y) / self.view.size().y;
        (self.rect.y as f64 + (1.0 - t) * self.rect.height as f64).round() as i32
    }

    pub fn point(&self, p: DVec2) -> (i32, i32) {
        (self.x(p.x), self.y(p.y))
    }
}

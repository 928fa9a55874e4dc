//! Thin pixel-space drawing helpers over a plotters bitmap area.

use crate::error::ShakemapError;
use crate::layout::{FigureStyle, PixelRect};
use groundmotion::colormap::Rgb;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

pub type Area<'b> = DrawingArea<BitMapBackend<'b>, Shift>;

const FONT_FAMILY: &str = "sans-serif";

/// Whether plotters can lay out text, i.e. a system font was found.
pub fn fonts_available(area: &Area) -> bool {
    let style = TextStyle::from((FONT_FAMILY, 12.0).into_font());
    match area.estimate_text_size("0", &style) {
        Ok(_) => true,
        Err(err) => {
            log::warn!("No usable font, labels are left out: {err}");
            false
        }
    }
}

pub struct Canvas<'a, 'b> {
    area: &'a Area<'b>,
    pub style: FigureStyle,
    fonts: bool,
}

impl<'a, 'b> Canvas<'a, 'b> {
    pub fn new(area: &'a Area<'b>, style: FigureStyle, fonts: bool) -> Self {
        Self { area, style, fonts }
    }

    pub fn pixel(&self, at: (i32, i32), color: Rgb) -> Result<(), ShakemapError> {
        self.area.draw_pixel(at, &rgb(color))?;
        Ok(())
    }

    pub fn fill_rect(&self, top_left: (i32, i32), bottom_right: (i32, i32), color: Rgb) -> Result<(), ShakemapError> {
        self.area
            .draw(&Rectangle::new([top_left, bottom_right], rgb(color).filled()))?;
        Ok(())
    }

    pub fn frame(&self, rect: PixelRect) -> Result<(), ShakemapError> {
        self.area.draw(&Rectangle::new(
            [(rect.left(), rect.top()), (rect.right(), rect.bottom())],
            BLACK.stroke_width(self.style.line_width),
        ))?;
        Ok(())
    }

    pub fn line(&self, from: (i32, i32), to: (i32, i32)) -> Result<(), ShakemapError> {
        self.path(vec![from, to])
    }

    pub fn path(&self, points: Vec<(i32, i32)>) -> Result<(), ShakemapError> {
        self.area
            .draw(&PathElement::new(points, BLACK.stroke_width(self.style.line_width)))?;
        Ok(())
    }

    pub fn polygon(&self, points: Vec<(i32, i32)>, color: Rgb) -> Result<(), ShakemapError> {
        self.area.draw(&Polygon::new(points, rgb(color).filled()))?;
        Ok(())
    }

    /// Draws `text` with its anchor point at `at`. Skipped without fonts.
    pub fn text(
        &self,
        text: &str,
        at: (i32, i32),
        size_px: f64,
        anchor: (HPos, VPos),
    ) -> Result<(), ShakemapError> {
        if !self.fonts {
            return Ok(());
        }
        let style = TextStyle::from((FONT_FAMILY, size_px).into_font())
            .color(&BLACK)
            .pos(Pos::new(anchor.0, anchor.1));
        self.area.draw(&Text::new(text.to_string(), at, style))?;
        Ok(())
    }

    /// Text reading bottom to top, centred on `at`.
    pub fn vertical_text(&self, text: &str, at: (i32, i32), size_px: f64) -> Result<(), ShakemapError> {
        if !self.fonts {
            return Ok(());
        }
        let font = (FONT_FAMILY, size_px)
            .into_font()
            .transform(FontTransform::Rotate270);
        let style = TextStyle::from(font)
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center));
        self.area.draw(&Text::new(text.to_string(), at, style))?;
        Ok(())
    }
}

fn rgb([r, g, b]: Rgb) -> RGBColor {
    RGBColor(r, g, b)
}

use crate::canvas::{Canvas, fonts_available};
use crate::error::ShakemapError;
use crate::layout::{FigureStyle, PanelLayout};
use crate::panel::{PanelSpec, draw_panel};
use groundmotion::ShakemapConfig;
use plotters::prelude::*;

/// An RGB8 raster of the whole figure, row-major from the top-left corner.
#[derive(Debug, Clone)]
pub struct Figure {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Figure {
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = 3 * (y as usize * self.width as usize + x as usize);
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }
}

/// Renders up to four panels on a 2x2 grid over a white background, row by row.
pub fn render_figure(panels: &[PanelSpec], config: &ShakemapConfig) -> Result<Figure, ShakemapError> {
    let (width, height) = config.figure_pixels();
    let style = FigureStyle::from_config(config);
    let mut pixels = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;
        let fonts = fonts_available(&root);

        for (area, panel) in root.split_evenly((2, 2)).iter().zip(panels) {
            let (w, h) = area.dim_in_pixel();
            let layout = PanelLayout::new(w, h, panel.aspect(), &style);
            let canvas = Canvas::new(area, style, fonts);
            draw_panel(&canvas, &layout, panel)?;
        }
        root.present()?;
    }
    log::debug!("rendered {} panels on a {width}x{height} figure", panels.len().min(4));

    Ok(Figure {
        width,
        height,
        pixels,
    })
}

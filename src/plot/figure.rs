//! Rendering of figures to RGB images
//!
//! Arrays are rendered as heat maps with a colormap, one block of
//! `scale x scale` image pixels per array pixel, overlays on top. Points and
//! lines are drawn with plotters on a white background. No text is drawn.

use image::{imageops, Rgb, RgbImage};
use imageproc::{
    drawing::{draw_cross_mut, draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_circle_mut},
    rect::Rect,
};
use plotters::prelude::*;

use super::{PlotError, Result, Visuals};
use crate::structures::Array2D;

const WHITE_PIXEL: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK_PIXEL: Rgb<u8> = Rgb([0, 0, 0]);

/// What a plotter draws
#[derive(Debug, Clone, PartialEq)]
pub enum Figure {
    /// Heat map of a 2D array
    Array(Array2D),
    /// Scatter of `[y, x]` points
    Points(Vec<[f64; 2]>),
    /// Line through `(x, y)` points, optionally with a log10 y axis
    Line { points: Vec<(f64, f64)>, log_y: bool },
}
impl From<Array2D> for Figure {
    fn from(array: Array2D) -> Self {
        Figure::Array(array)
    }
}
impl Figure {
    /// Figure data as a 2D array, points and lines become `(n, 2)` arrays
    pub fn to_array(&self) -> Result<Array2D> {
        let pairs: Vec<f64> = match self {
            Figure::Array(array) => return Ok(array.clone()),
            Figure::Points(points) => points.iter().flatten().cloned().collect(),
            Figure::Line { points, .. } => points.iter().flat_map(|&(x, y)| [x, y]).collect(),
        };
        Ok(Array2D::new((pairs.len() / 2, 2), (1., 1.), pairs)?)
    }
}

/// Colormap and size of the rendered figures
#[derive(Clone, Copy)]
pub struct Style {
    pub gradient: colorous::Gradient,
    pub size: u32,
}
impl std::fmt::Debug for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Style").field("size", &self.size).finish()
    }
}
impl Default for Style {
    fn default() -> Self {
        Self {
            gradient: colorous::VIRIDIS,
            size: 256,
        }
    }
}
impl Style {
    pub fn new(cmap: &str, size: u32) -> Result<Self> {
        Ok(Self {
            gradient: colormap(cmap)?,
            size: size.max(16),
        })
    }
}

/// Colormap from its name
pub fn colormap(name: &str) -> Result<colorous::Gradient> {
    Ok(match name.to_lowercase().as_str() {
        "viridis" => colorous::VIRIDIS,
        "inferno" => colorous::INFERNO,
        "magma" => colorous::MAGMA,
        "plasma" => colorous::PLASMA,
        "cividis" => colorous::CIVIDIS,
        "turbo" => colorous::TURBO,
        "cubehelix" => colorous::CUBEHELIX,
        "greys" | "gray" => colorous::GREYS,
        "warm" => colorous::WARM,
        "cool" => colorous::COOL,
        _ => return Err(PlotError::Colormap(name.to_string())),
    })
}

/// Maps `[y, x]` coordinates to canvas pixels
struct Canvas {
    shape: (usize, usize),
    pixel_scales: (f64, f64),
    scale: u32,
}
impl Canvas {
    fn at(&self, [y, x]: [f64; 2]) -> (i32, i32) {
        let (rows, cols) = self.shape;
        let col = x / self.pixel_scales.1 + 0.5 * (cols as f64 - 1.);
        let row = 0.5 * (rows as f64 - 1.) - y / self.pixel_scales.0;
        let s = self.scale as f64;
        (((col + 0.5) * s) as i32, ((row + 0.5) * s) as i32)
    }
}

/// Renders an array as a heat map with its overlays
pub fn render_array(array: &Array2D, visuals: &Visuals, style: &Style) -> RgbImage {
    let (rows, cols) = array.shape();
    let scale = (style.size / rows.max(cols).max(1) as u32).max(1);
    let mut image = RgbImage::new(cols as u32 * scale, rows as u32 * scale);
    let (min, max) = array.minmax().unwrap_or((0., 0.));
    let range = max - min;
    for (row, values) in array.rows().enumerate() {
        for (col, &value) in values.iter().enumerate() {
            let color = if value.is_finite() {
                let t = if range > 0. { (value - min) / range } else { 0.5 };
                let c = style.gradient.eval_continuous(t);
                Rgb([c.r, c.g, c.b])
            } else {
                BLACK_PIXEL
            };
            draw_filled_rect_mut(
                &mut image,
                Rect::at((col as u32 * scale) as i32, (row as u32 * scale) as i32)
                    .of_size(scale, scale),
                color,
            );
        }
    }

    let canvas = Canvas {
        shape: array.shape(),
        pixel_scales: array.pixel_scales(),
        scale,
    };
    let dot = (scale as i32 / 4).max(1);
    for &coords in &visuals.mask_edge {
        draw_filled_circle_mut(&mut image, canvas.at(coords), dot, BLACK_PIXEL);
    }
    for &coords in &visuals.critical_curves {
        draw_filled_circle_mut(&mut image, canvas.at(coords), dot, Rgb([255, 255, 0]));
    }
    for &coords in &visuals.positions {
        draw_hollow_circle_mut(&mut image, canvas.at(coords), 3 * dot, Rgb([255, 0, 255]));
    }
    let cross = |image: &mut RgbImage, coords: [f64; 2], color: Rgb<u8>| {
        let (x, y) = canvas.at(coords);
        draw_cross_mut(image, color, x, y);
    };
    if let Some(origin) = visuals.origin {
        cross(&mut image, origin, WHITE_PIXEL);
    }
    for &coords in &visuals.light_profile_centres {
        cross(&mut image, coords, Rgb([255, 0, 0]));
    }
    for &coords in &visuals.mass_profile_centres {
        cross(&mut image, coords, Rgb([0, 255, 255]));
    }
    image
}

fn padded_range(values: impl Iterator<Item = f64>) -> std::ops::Range<f64> {
    let (min, max) = values
        .filter(|x| x.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), x| (a.min(x), b.max(x)));
    if !min.is_finite() {
        return -1f64..1f64;
    }
    let padding = if max > min { 0.05 * (max - min) } else { 1. };
    min - padding..max + padding
}

fn draw_error<E: std::error::Error>(e: E) -> PlotError {
    PlotError::Draw(e.to_string())
}

/// Renders a scatter of `[y, x]` points
pub fn render_points(points: &[[f64; 2]], style: &Style) -> Result<RgbImage> {
    let (w, h) = (style.size, style.size);
    let mut buffer = vec![255u8; (w * h * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (w, h)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_error)?;
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .build_cartesian_2d(
                padded_range(points.iter().map(|p| p[1])),
                padded_range(points.iter().map(|p| p[0])),
            )
            .map_err(draw_error)?;
        let color = colorous::TABLEAU10[0];
        let rgb = RGBColor(color.r, color.g, color.b);
        chart
            .draw_series(
                points
                    .iter()
                    .map(|&[y, x]| Circle::new((x, y), 2, rgb.filled())),
            )
            .map_err(draw_error)?;
        root.present().map_err(draw_error)?;
    }
    RgbImage::from_raw(w, h, buffer).ok_or(PlotError::Image)
}

/// Renders a line through `(x, y)` points
pub fn render_line(points: &[(f64, f64)], log_y: bool, style: &Style) -> Result<RgbImage> {
    let points: Vec<(f64, f64)> = points
        .iter()
        .map(|&(x, y)| (x, if log_y { y.log10() } else { y }))
        .filter(|(_, y)| y.is_finite())
        .collect();
    let (w, h) = (style.size * 3 / 2, style.size);
    let mut buffer = vec![255u8; (w * h * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (w, h)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_error)?;
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .build_cartesian_2d(
                padded_range(points.iter().map(|p| p.0)),
                padded_range(points.iter().map(|p| p.1)),
            )
            .map_err(draw_error)?;
        let color = colorous::TABLEAU10[0];
        let rgb = RGBColor(color.r, color.g, color.b);
        chart
            .draw_series(LineSeries::new(points.iter().cloned(), &rgb))
            .map_err(draw_error)?;
        root.present().map_err(draw_error)?;
    }
    RgbImage::from_raw(w, h, buffer).ok_or(PlotError::Image)
}

/// Renders any figure
pub fn render(figure: &Figure, visuals: &Visuals, style: &Style) -> Result<RgbImage> {
    match figure {
        Figure::Array(array) => Ok(render_array(array, visuals, style)),
        Figure::Points(points) => render_points(points, style),
        Figure::Line { points, log_y } => render_line(points, *log_y, style),
    }
}

/// Lays out figures on a grid of at most `ceil(sqrt(n))` columns
pub fn compose(cells: &[RgbImage]) -> RgbImage {
    let n = cells.len().max(1);
    let columns = (n as f64).sqrt().ceil() as u32;
    let rows = (n as u32).div_ceil(columns);
    let cell_width = cells.iter().map(|c| c.width()).max().unwrap_or(1);
    let cell_height = cells.iter().map(|c| c.height()).max().unwrap_or(1);
    let mut canvas = RgbImage::from_pixel(columns * cell_width, rows * cell_height, WHITE_PIXEL);
    for (i, cell) in cells.iter().enumerate() {
        let (row, col) = (i as u32 / columns, i as u32 % columns);
        imageops::overlay(
            &mut canvas,
            cell,
            (col * cell_width) as i64,
            (row * cell_height) as i64,
        );
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heat_map_size() {
        let array = Array2D::new((2, 4), (0.1, 0.1), vec![0., 1., 2., 3., 4., 5., 6., f64::NAN]).unwrap();
        let style = Style::default();
        let image = render_array(&array, &Visuals::default(), &style);
        assert_eq!(image.dimensions(), (256, 128));
        assert_eq!(*image.get_pixel(255, 127), BLACK_PIXEL);
        let c = colorous::VIRIDIS.eval_continuous(0.);
        assert_eq!(*image.get_pixel(0, 0), Rgb([c.r, c.g, c.b]));
    }

    #[test]
    fn unknown_colormap() {
        assert!(matches!(Style::new("rainbow", 64), Err(PlotError::Colormap(_))));
        assert!(Style::new("CubeHelix", 64).is_ok());
    }

    #[test]
    fn composite_layout() {
        let cells = vec![RgbImage::new(10, 20); 5];
        assert_eq!(compose(&cells).dimensions(), (30, 40));
    }

    #[test]
    fn figure_as_array() {
        let figure = Figure::Points(vec![[1., 2.], [3., 4.]]);
        let array = figure.to_array().unwrap();
        assert_eq!(array.shape(), (2, 2));
        assert_eq!(array.data(), &[1., 2., 3., 4.]);
    }
}

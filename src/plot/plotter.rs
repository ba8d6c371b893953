use std::path::{Path, PathBuf};

use image::RgbImage;

use super::{
    figure::{compose, render, Figure, Style},
    Format, Output, PlotError, Result, Visuals,
};
use crate::{config::Config, fits, structures::Array2D};

/// Anything figures can be drawn to: a single-figure [Plotter] or a [SubPlotter] cell
pub trait ArrayPlotter {
    fn plot_figure(&mut self, name: &str, figure: Figure, visuals: &Visuals) -> Result<()>;
    fn plot_array(&mut self, name: &str, array: &Array2D, visuals: &Visuals) -> Result<()> {
        self.plot_figure(name, Figure::Array(array.clone()), visuals)
    }
}

/// Writes one file per figure
#[derive(Debug, Clone)]
pub struct Plotter {
    output: Output,
    style: Style,
}
impl Plotter {
    pub fn new(output: Output, style: Style) -> Self {
        Self { output, style }
    }
    /// Plotter with the colormap and figure size of the configuration
    pub fn from_config<P: AsRef<Path>>(config: &Config, path: P, format: Format) -> Result<Self> {
        let general = config.general_config();
        Ok(Self::new(
            Output::new(path, format),
            Style::new(&general.cmap, general.figure_size)?,
        ))
    }
    /// A plotter with the same style writing to another folder and format
    pub fn with_output<P: AsRef<Path>>(&self, path: P, format: Format) -> Self {
        Self {
            output: Output::new(path, format),
            style: self.style,
        }
    }
    pub fn output(&self) -> &Output {
        &self.output
    }
    pub fn style(&self) -> &Style {
        &self.style
    }
    /// A sub-plotter sharing this plotter output and style
    pub fn sub_plotter(&self) -> SubPlotter {
        SubPlotter::new(self.output.clone(), self.style)
    }
    fn write(&self, name: &str, figure: &Figure, visuals: &Visuals) -> Result<PathBuf> {
        let path = self.output.filename(name)?;
        match self.output.format() {
            Format::Png => render(figure, visuals, &self.style)?
                .save(&path)
                .map_err(|e| PlotError::Save(e, path.clone()))?,
            Format::Fits => fits::write_array(&path, &figure.to_array()?)?,
        }
        log::info!("{path:?} written");
        Ok(path)
    }
}
impl ArrayPlotter for Plotter {
    fn plot_figure(&mut self, name: &str, figure: Figure, visuals: &Visuals) -> Result<()> {
        self.write(name, &figure, visuals).map(|_| ())
    }
}

/// Collects figures into the cells of one composite figure
#[derive(Debug)]
pub struct SubPlotter {
    output: Output,
    style: Style,
    name: Option<String>,
    cells: Vec<RgbImage>,
}
impl SubPlotter {
    pub fn new(output: Output, style: Style) -> Self {
        Self {
            output,
            style,
            name: None,
            cells: Vec::new(),
        }
    }
    /// Starts the composite figure `name`, discarding any unflushed cells
    pub fn open(&mut self, name: &str) {
        self.name = Some(name.to_string());
        self.cells.clear();
    }
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }
    /// Writes the composite figure to a single file
    ///
    /// Composite figures are images: with a non-image output format nothing is written.
    pub fn flush(&mut self) -> Result<Option<PathBuf>> {
        let name = self.name.take().ok_or(PlotError::NoSubplot)?;
        let cells = std::mem::take(&mut self.cells);
        if self.output.format() != Format::Png {
            log::warn!(
                "subplot {name} is not written with the {} output format",
                self.output.format()
            );
            return Ok(None);
        }
        let path = self.output.filename(&name)?;
        compose(&cells)
            .save(&path)
            .map_err(|e| PlotError::Save(e, path.clone()))?;
        log::info!("{path:?} written with {} cells", cells.len());
        Ok(Some(path))
    }
}
impl ArrayPlotter for SubPlotter {
    fn plot_figure(&mut self, name: &str, figure: Figure, visuals: &Visuals) -> Result<()> {
        if self.name.is_none() {
            return Err(PlotError::NoSubplot);
        }
        log::debug!("subplot cell {name}");
        self.cells.push(render(&figure, visuals, &self.style)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_file_per_figure() {
        let dir = tempfile::tempdir().unwrap();
        let mut plotter = Plotter::new(Output::new(dir.path(), Format::Png), Style::default());
        let array = Array2D::full(1., (3, 3), (0.1, 0.1));
        plotter.plot_array("image", &array, &Visuals::default()).unwrap();
        assert!(dir.path().join("image.png").is_file());

        let mut fits_plotter = plotter.with_output(dir.path().join("fits"), Format::Fits);
        fits_plotter.plot_array("image", &array, &Visuals::default()).unwrap();
        assert_eq!(fits::read_array(dir.path().join("fits").join("image.fits")).unwrap(), array);
    }

    #[test]
    fn subplot_is_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let plotter = Plotter::new(Output::new(dir.path(), Format::Png), Style::default());
        let mut sub_plotter = plotter.sub_plotter();
        let array = Array2D::full(1., (3, 3), (0.1, 0.1));
        assert!(matches!(
            sub_plotter.plot_array("image", &array, &Visuals::default()),
            Err(PlotError::NoSubplot)
        ));
        sub_plotter.open("subplot_test");
        for _ in 0..3 {
            sub_plotter.plot_array("image", &array, &Visuals::default()).unwrap();
        }
        assert_eq!(sub_plotter.n_cells(), 3);
        let path = sub_plotter.flush().unwrap().unwrap();
        assert_eq!(path, dir.path().join("subplot_test.png"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
        assert!(sub_plotter.flush().is_err());
    }
}

//! Figures of profiles, galaxies and planes
//!
//! Every function evaluates one quantity of its subject on the sub-grid,
//! bins it back to the pixels of the grid mask and hands the array to a
//! plotter. The subject capability is checked before anything is written.

use super::{ArrayPlotter, Figure, Include, PlotError, Result, SubPlotter, Visuals};
use crate::{
    galaxy::Galaxy,
    profiles::{Evaluable, LightProfile, Quantity},
    structures::{Grid, Mask},
};

/// Where the figure of a subject is drawn and what is drawn on top of it
fn visuals(
    subject: &dyn Evaluable,
    grid: &Grid,
    mask: Option<&Mask>,
    positions: Option<&[[f64; 2]]>,
    include: &Include,
) -> Result<Visuals> {
    Ok(include.visuals(grid.mask(), mask, Some(subject), positions)?)
}

fn plot_values<P: ArrayPlotter + ?Sized>(
    name: &str,
    values: &[f64],
    subject: &dyn Evaluable,
    grid: &Grid,
    mask: Option<&Mask>,
    positions: Option<&[[f64; 2]]>,
    include: &Include,
    plotter: &mut P,
) -> Result<()> {
    let array = grid.array_from_sub_values(values)?;
    let visuals = visuals(subject, grid, mask, positions, include)?;
    plotter.plot_array(name, &array, &visuals)
}

pub fn profile_image<P: ArrayPlotter + ?Sized>(
    subject: &dyn Evaluable,
    grid: &Grid,
    mask: Option<&Mask>,
    positions: Option<&[[f64; 2]]>,
    include: &Include,
    plotter: &mut P,
) -> Result<()> {
    let values = subject.profile_image(grid)?;
    plot_values("profile_image", &values, subject, grid, mask, positions, include, plotter)
}

pub fn convergence<P: ArrayPlotter + ?Sized>(
    subject: &dyn Evaluable,
    grid: &Grid,
    mask: Option<&Mask>,
    positions: Option<&[[f64; 2]]>,
    include: &Include,
    plotter: &mut P,
) -> Result<()> {
    let values = subject.convergence(grid)?;
    plot_values("convergence", &values, subject, grid, mask, positions, include, plotter)
}

pub fn potential<P: ArrayPlotter + ?Sized>(
    subject: &dyn Evaluable,
    grid: &Grid,
    mask: Option<&Mask>,
    positions: Option<&[[f64; 2]]>,
    include: &Include,
    plotter: &mut P,
) -> Result<()> {
    let values = subject.potential(grid)?;
    plot_values("potential", &values, subject, grid, mask, positions, include, plotter)
}

/// Component 0 of the deflection angles
pub fn deflections_y<P: ArrayPlotter + ?Sized>(
    subject: &dyn Evaluable,
    grid: &Grid,
    mask: Option<&Mask>,
    positions: Option<&[[f64; 2]]>,
    include: &Include,
    plotter: &mut P,
) -> Result<()> {
    let values: Vec<f64> = subject.deflections(grid)?.into_iter().map(|d| d[0]).collect();
    plot_values("deflections_y", &values, subject, grid, mask, positions, include, plotter)
}

/// Component 1 of the deflection angles
pub fn deflections_x<P: ArrayPlotter + ?Sized>(
    subject: &dyn Evaluable,
    grid: &Grid,
    mask: Option<&Mask>,
    positions: Option<&[[f64; 2]]>,
    include: &Include,
    plotter: &mut P,
) -> Result<()> {
    let values: Vec<f64> = subject.deflections(grid)?.into_iter().map(|d| d[1]).collect();
    plot_values("deflections_x", &values, subject, grid, mask, positions, include, plotter)
}

pub fn magnification<P: ArrayPlotter + ?Sized>(
    subject: &dyn Evaluable,
    grid: &Grid,
    mask: Option<&Mask>,
    positions: Option<&[[f64; 2]]>,
    include: &Include,
    plotter: &mut P,
) -> Result<()> {
    let values = subject.magnification(grid)?;
    plot_values("magnification", &values, subject, grid, mask, positions, include, plotter)
}

/// Contribution map of a hyper galaxy
pub fn contribution_map<P: ArrayPlotter + ?Sized>(
    galaxy: &Galaxy,
    mask: Option<&Mask>,
    positions: Option<&[[f64; 2]]>,
    include: &Include,
    plotter: &mut P,
) -> Result<()> {
    let array = galaxy
        .contribution_map()
        .ok_or_else(|| PlotError::Missing(String::from("contribution map")))?;
    let geometry = Mask::unmasked(array.shape(), array.pixel_scales());
    let visuals = include.visuals(&geometry, mask, Some(galaxy), positions)?;
    plotter.plot_array("contribution_map", &array, &visuals)
}

type ProfilePlot = fn(
    &dyn Evaluable,
    &Grid,
    Option<&Mask>,
    Option<&[[f64; 2]]>,
    &Include,
    &mut SubPlotter,
) -> Result<()>;

/// One cell per profile, then a single composite file
fn subplot(
    name: &str,
    quantity: Quantity,
    galaxy: &Galaxy,
    grid: &Grid,
    mask: Option<&Mask>,
    positions: Option<&[[f64; 2]]>,
    include: &Include,
    sub_plotter: &mut SubPlotter,
    plot: ProfilePlot,
) -> Result<()> {
    galaxy.check(quantity)?;
    let profiles: Vec<&dyn Evaluable> = if quantity.is_mass() {
        galaxy.mass.iter().map(|p| &p.value as &dyn Evaluable).collect()
    } else {
        galaxy.light.iter().map(|p| &p.value as &dyn Evaluable).collect()
    };
    sub_plotter.open(name);
    for profile in profiles {
        plot(profile, grid, mask, positions, include, sub_plotter)?;
    }
    sub_plotter.flush()?;
    Ok(())
}

pub fn profile_image_subplot(
    galaxy: &Galaxy,
    grid: &Grid,
    mask: Option<&Mask>,
    positions: Option<&[[f64; 2]]>,
    include: &Include,
    sub_plotter: &mut SubPlotter,
) -> Result<()> {
    subplot(
        "profile_image_subplot",
        Quantity::Image,
        galaxy,
        grid,
        mask,
        positions,
        include,
        sub_plotter,
        profile_image,
    )
}

pub fn convergence_subplot(
    galaxy: &Galaxy,
    grid: &Grid,
    mask: Option<&Mask>,
    positions: Option<&[[f64; 2]]>,
    include: &Include,
    sub_plotter: &mut SubPlotter,
) -> Result<()> {
    subplot(
        "convergence_subplot",
        Quantity::Convergence,
        galaxy,
        grid,
        mask,
        positions,
        include,
        sub_plotter,
        convergence,
    )
}

pub fn potential_subplot(
    galaxy: &Galaxy,
    grid: &Grid,
    mask: Option<&Mask>,
    positions: Option<&[[f64; 2]]>,
    include: &Include,
    sub_plotter: &mut SubPlotter,
) -> Result<()> {
    subplot(
        "potential_subplot",
        Quantity::Potential,
        galaxy,
        grid,
        mask,
        positions,
        include,
        sub_plotter,
        potential,
    )
}

pub fn deflections_y_subplot(
    galaxy: &Galaxy,
    grid: &Grid,
    mask: Option<&Mask>,
    positions: Option<&[[f64; 2]]>,
    include: &Include,
    sub_plotter: &mut SubPlotter,
) -> Result<()> {
    subplot(
        "deflections_y_subplot",
        Quantity::Deflections,
        galaxy,
        grid,
        mask,
        positions,
        include,
        sub_plotter,
        deflections_y,
    )
}

pub fn deflections_x_subplot(
    galaxy: &Galaxy,
    grid: &Grid,
    mask: Option<&Mask>,
    positions: Option<&[[f64; 2]]>,
    include: &Include,
    sub_plotter: &mut SubPlotter,
) -> Result<()> {
    subplot(
        "deflections_x_subplot",
        Quantity::Deflections,
        galaxy,
        grid,
        mask,
        positions,
        include,
        sub_plotter,
        deflections_x,
    )
}

/// Log-spaced radii of the luminosity curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialBins {
    pub minimum_radius: f64,
    pub maximum_radius: f64,
    pub radii_bins: usize,
}
impl Default for RadialBins {
    fn default() -> Self {
        Self {
            minimum_radius: 1e-4,
            maximum_radius: 10.,
            radii_bins: 10,
        }
    }
}
impl RadialBins {
    pub fn radii(&self) -> Vec<f64> {
        let (log_min, log_max) = (self.minimum_radius.log10(), self.maximum_radius.log10());
        let n = self.radii_bins.max(2);
        (0..n)
            .map(|i| 10f64.powf(log_min + (log_max - log_min) * i as f64 / (n - 1) as f64))
            .collect()
    }
}

/// Luminosity inside circles of increasing radius
pub fn luminosity_within_circle_as_function_of_radius<P: ArrayPlotter + ?Sized>(
    light: &LightProfile,
    bins: RadialBins,
    plotter: &mut P,
) -> Result<()> {
    let points = bins
        .radii()
        .into_iter()
        .map(|radius| (radius, light.luminosity_within_circle(radius)))
        .collect();
    plotter.plot_figure(
        "luminosity_within_circle_as_function_of_radius",
        Figure::Line {
            points,
            log_y: true,
        },
        &Visuals::default(),
    )
}

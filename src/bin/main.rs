use std::{fs, path::PathBuf, rc::Rc};

use anyhow::Context;
use galaxy_viz::{
    plot::{profiles, profiles::RadialBins, Format, Plotter},
    profiles::{Evaluable, Quantity},
    structures::{Grid, Mask},
    Config, Error, Galaxy,
};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "galaxy-viz", about = "Profile figures of a galaxy")]
struct Opt {
    /// YAML file of the galaxy
    galaxy: PathBuf,
    /// Output folder
    #[structopt(short, long, default_value = "galaxy-viz")]
    output: PathBuf,
    /// Configuration folder with `visualize/general.yaml`
    #[structopt(short, long)]
    config: Option<PathBuf>,
    /// Grid shape
    #[structopt(long, default_value = "100")]
    shape: usize,
    /// Pixel scale in arcsec
    #[structopt(long, default_value = "0.05")]
    pixel_scale: f64,
    /// Sub-grid size
    #[structopt(long, default_value = "2")]
    sub_size: usize,
    /// Circular mask radius in arcsec
    #[structopt(short, long)]
    mask_radius: Option<f64>,
    /// Writes FITS files instead of PNG images
    #[structopt(long)]
    fits: bool,
    /// Writes one composite figure per quantity with a cell per profile
    #[structopt(short, long)]
    subplots: bool,
    /// Plots the luminosity of the light profiles within circles
    #[structopt(short, long)]
    luminosity: bool,
}

/// Writes the figures of the quantities the galaxy supports
fn plot(opt: &Opt, galaxy: &Galaxy) -> Result<(), Error> {
    let config = match &opt.config {
        Some(path) => Config::load(path, &opt.output)?,
        None => Rc::new(Config::new(&opt.output)),
    };
    let include = config.include_config();

    let shape = (opt.shape, opt.shape);
    let pixel_scales = (opt.pixel_scale, opt.pixel_scale);
    let mask = match opt.mask_radius {
        Some(radius) => Mask::circular(shape, pixel_scales, radius),
        None => Mask::unmasked(shape, pixel_scales),
    };
    let grid = Grid::from_mask(mask.clone(), opt.sub_size);
    let mask = opt.mask_radius.map(|_| &mask);

    let format = if opt.fits { Format::Fits } else { Format::Png };
    let mut plotter = Plotter::from_config(&config, &opt.output, format)?;

    if galaxy.supports(Quantity::Image) {
        profiles::profile_image(galaxy, &grid, mask, None, include, &mut plotter)?;
    }
    if galaxy.supports(Quantity::Convergence) {
        profiles::convergence(galaxy, &grid, mask, None, include, &mut plotter)?;
        profiles::potential(galaxy, &grid, mask, None, include, &mut plotter)?;
        profiles::deflections_y(galaxy, &grid, mask, None, include, &mut plotter)?;
        profiles::deflections_x(galaxy, &grid, mask, None, include, &mut plotter)?;
        profiles::magnification(galaxy, &grid, mask, None, include, &mut plotter)?;
    }
    if galaxy.contribution_map().is_some() {
        profiles::contribution_map(galaxy, mask, None, include, &mut plotter)?;
    }

    if opt.subplots {
        let mut sub_plotter = plotter.sub_plotter();
        if galaxy.has_light_profile() {
            profiles::profile_image_subplot(galaxy, &grid, mask, None, include, &mut sub_plotter)?;
        }
        if galaxy.has_mass_profile() {
            profiles::convergence_subplot(galaxy, &grid, mask, None, include, &mut sub_plotter)?;
            profiles::potential_subplot(galaxy, &grid, mask, None, include, &mut sub_plotter)?;
            profiles::deflections_y_subplot(galaxy, &grid, mask, None, include, &mut sub_plotter)?;
            profiles::deflections_x_subplot(galaxy, &grid, mask, None, include, &mut sub_plotter)?;
        }
    }

    if opt.luminosity {
        for light in &galaxy.light {
            let mut plotter = plotter.with_output(opt.output.join(&light.name), format);
            profiles::luminosity_within_circle_as_function_of_radius(
                &light.value,
                RadialBins::default(),
                &mut plotter,
            )?;
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let contents = fs::read_to_string(&opt.galaxy)
        .with_context(|| format!("failed to read {:?}", opt.galaxy))?;
    let galaxy: Galaxy = serde_yaml::from_str(&contents)
        .with_context(|| format!("failed to parse the galaxy in {:?}", opt.galaxy))?;
    plot(&opt, &galaxy)?;
    Ok(())
}

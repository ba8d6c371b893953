use std::{fs, path::Path, rc::Rc};

use galaxy_viz::{
    config::PlotsConfig,
    dataset::{GalaxyData, GalaxyQuantity, Imaging, Instrument, Interferometer, SimulatorImaging},
    fit::{FitGalaxy, FitImaging, FitInterferometer},
    fits,
    inversion::{Inversion, Pixelization},
    plot::{
        products::{
            FitImagingPlot, FitInterferometerPlot, GalaxyFitPlot, ImagingPlot, InterferometerPlot,
            InversionPlot,
        },
        Visuals,
    },
    profiles::EllipticalSersic,
    structures::{Array2D, Grid, Kernel, Mask},
    Config, Galaxy, Named, Plane, Section, Visualizer,
};
use strum::IntoEnumIterator;

const DATASET_KEYS: [&str; 1] = ["subplot_dataset"];
const FIT_KEYS: [&str; 4] = [
    "all_at_end_png",
    "all_at_end_fits",
    "subplot_fit",
    "subplots_of_galaxies_fits",
];
const INVERSION_KEYS: [&str; 1] = ["subplot_inversion"];
const HYPER_KEYS: [&str; 4] = [
    "fit_no_hyper",
    "model_image",
    "images_of_galaxies",
    "contribution_maps_of_galaxies",
];

fn plane() -> Plane {
    Plane::new(vec![Named::new(
        "galaxy_0",
        Galaxy::new(0.5).light(
            "bulge",
            EllipticalSersic {
                intensity: 1.,
                ..Default::default()
            },
        ),
    )])
}

fn imaging() -> Imaging {
    SimulatorImaging::from_instrument(Instrument::Vro)
        .simulate(&plane())
        .unwrap()
}

fn keys<Q: AsRef<str>>(quantities: impl Iterator<Item = Q>) -> Vec<String> {
    quantities.map(|q| q.as_ref().to_string()).collect()
}

/// Every flag of the dataset, fit, inversion and hyper sections set to `value`
fn plots(value: bool) -> PlotsConfig {
    let dataset = keys(ImagingPlot::iter())
        .into_iter()
        .chain(keys(InterferometerPlot::iter()))
        .chain(DATASET_KEYS.map(String::from));
    let fit = keys(FitImagingPlot::iter())
        .into_iter()
        .chain(keys(FitInterferometerPlot::iter()))
        .chain(FIT_KEYS.map(String::from));
    let inversion = keys(InversionPlot::iter())
        .into_iter()
        .chain(INVERSION_KEYS.map(String::from));
    let sections = [
        (Section::Dataset, dataset.collect::<Vec<_>>()),
        (Section::Fit, fit.collect()),
        (Section::Inversion, inversion.collect()),
        (Section::Hyper, HYPER_KEYS.map(String::from).to_vec()),
    ];
    sections
        .into_iter()
        .flat_map(|(section, names)| names.into_iter().map(move |name| (section, name)))
        .fold(PlotsConfig::default(), |plots, (section, name)| {
            plots.set(section, name, value)
        })
}

fn visualizer(path: &Path, plots: PlotsConfig) -> Visualizer {
    let config = Rc::new(Config::new(path).plots(plots));
    Visualizer::new(path.join("image"), config).unwrap()
}

fn count_files(path: &Path) -> usize {
    match fs::read_dir(path) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| {
                let path = entry.path();
                if path.is_dir() {
                    count_files(&path)
                } else {
                    1
                }
            })
            .sum(),
        Err(_) => 0,
    }
}

#[test]
fn all_false_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let imaging = imaging();
    let mask = Mask::circular((40, 40), (0.2, 0.2), 2.);
    let fit = FitImaging::new(&imaging, &mask, &plane(), 1).unwrap();

    let visualizer = visualizer(dir.path(), plots(false));
    visualizer.visualize_imaging(&imaging).unwrap();
    visualizer.visualize_fit_imaging(&fit, false, None).unwrap();
    assert_eq!(count_files(dir.path()), 0);
}

#[test]
fn one_flag_one_file() {
    let dir = tempfile::tempdir().unwrap();
    let visualizer = visualizer(
        dir.path(),
        plots(false).set(Section::Dataset, "noise_map", true),
    );
    visualizer.visualize_imaging(&imaging()).unwrap();
    assert_eq!(count_files(dir.path()), 1);
    assert!(dir.path().join("image/imaging/noise_map.png").is_file());
}

#[test]
fn subplot_is_a_single_file() {
    let dir = tempfile::tempdir().unwrap();
    let visualizer = visualizer(
        dir.path(),
        plots(false).set(Section::Dataset, "subplot_dataset", true),
    );
    visualizer.visualize_imaging(&imaging()).unwrap();
    assert_eq!(count_files(dir.path()), 1);
    assert!(dir.path().join("image/imaging/subplot_imaging.png").is_file());
}

#[test]
fn all_at_end_writes_png_and_fits() {
    let dir = tempfile::tempdir().unwrap();
    let imaging = imaging();
    let mask = Mask::circular((40, 40), (0.2, 0.2), 2.);
    let fit = FitImaging::new(&imaging, &mask, &plane(), 1).unwrap();

    let only_residuals = plots(false).set(Section::Fit, "residual_map", true);
    let during = dir.path().join("during");
    visualizer(&during, only_residuals.clone())
        .visualize_fit_imaging(&fit, true, None)
        .unwrap();
    assert_eq!(count_files(&during), 1);

    let at_end = dir.path().join("at_end");
    visualizer(
        &at_end,
        only_residuals
            .set(Section::Fit, "all_at_end_png", true)
            .set(Section::Fit, "all_at_end_fits", true),
    )
    .visualize_fit_imaging(&fit, false, None)
    .unwrap();
    let fit_folder = at_end.join("image/fit_imaging");
    assert!(fit_folder.join("residual_map.png").is_file());
    assert!(fit_folder.join("fits/residual_map.fits").is_file());
    assert!(fit_folder.join("chi_squared_map.png").is_file());
    let fits = count_files(&fit_folder.join("fits"));
    assert!(fits >= FitImagingPlot::iter().count());
    assert_eq!(count_files(&fit_folder), 2 * fits);
}

#[test]
fn missing_key_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut plots = PlotsConfig::default().set(Section::Hyper, "fit_no_hyper", false);
    plots = plots.set(Section::Dataset, "data", true);
    let visualizer = visualizer(dir.path(), plots);
    assert!(visualizer.visualize_imaging(&imaging()).is_err());
}

#[test]
fn galaxy_fit_with_explicit_visuals() {
    let dir = tempfile::tempdir().unwrap();
    let imaging = imaging();
    let mask = Mask::circular((40, 40), (0.2, 0.2), 3.);
    let data = GalaxyData::new(
        imaging.image.clone(),
        imaging.noise_map.clone(),
        GalaxyQuantity::Image,
        mask,
    );
    let fit = FitGalaxy::new(&data, &plane()).unwrap();

    let plots = GalaxyFitPlot::iter()
        .fold(plots(false), |plots, q| {
            plots.set(Section::GalaxyFit, q.as_ref(), false)
        })
        .set(Section::GalaxyFit, "subplot_galaxy_fit", true)
        .set(Section::GalaxyFit, "model_image", true);
    visualizer(dir.path(), plots)
        .visualize_galaxy_fit(&fit, Some(&Visuals::default()))
        .unwrap();
    let folder = dir.path().join("image/galaxy_fit");
    assert!(folder.join("subplot_fit_galaxy.png").is_file());
    assert!(folder.join("model_image.png").is_file());
    assert_eq!(count_files(dir.path()), 2);
}

fn interferometer() -> Interferometer {
    Interferometer::new(
        "test",
        vec![[1., 0.5], [-0.5, 2.], [0.25, -1.]],
        vec![[1.; 2]; 3],
        vec![[1e4, 2e4], [-5e4, 3e4], [1e5, -1e5]],
    )
    .unwrap()
}

fn fit_interferometer(data: &Interferometer) -> FitInterferometer {
    let real_space_mask = Mask::circular((15, 15), (0.1, 0.1), 0.5);
    FitInterferometer::new(data, &data.visibilities_mask(), &real_space_mask, &plane(), 1).unwrap()
}

/// Flat image reconstructed on a 3x3 source pixelization
fn inversion() -> Inversion {
    let mask = Mask::circular((9, 9), (0.1, 0.1), 0.35);
    let image = mask.apply(&Array2D::full(2., (9, 9), (0.1, 0.1))).unwrap();
    Inversion::imaging(
        &image,
        &Array2D::full(0.1, (9, 9), (0.1, 0.1)),
        &Kernel::no_blur((0.1, 0.1)),
        &Grid::from_mask(mask, 1),
        &Pixelization {
            shape: (3, 3),
            coefficient: 1e-3,
        },
    )
    .unwrap()
}

#[test]
fn interferometer_figures() {
    let dir = tempfile::tempdir().unwrap();
    let data = interferometer();

    let none = dir.path().join("none");
    visualizer(&none, plots(false))
        .visualize_interferometer(&data)
        .unwrap();
    assert_eq!(count_files(&none), 0);

    let visibilities = dir.path().join("visibilities");
    visualizer(&visibilities, plots(false).set(Section::Dataset, "data", true))
        .visualize_interferometer(&data)
        .unwrap();
    assert_eq!(count_files(&visibilities), 1);
    assert!(visibilities
        .join("image/interferometer/visibilities.png")
        .is_file());

    let uv = dir.path().join("uv");
    visualizer(
        &uv,
        plots(false).set(Section::Dataset, "uv_wavelengths", true),
    )
    .visualize_interferometer(&data)
    .unwrap();
    assert_eq!(count_files(&uv), 2);
    let folder = uv.join("image/interferometer");
    assert!(folder.join("u_wavelengths.png").is_file());
    assert!(folder.join("v_wavelengths.png").is_file());
}

#[test]
fn fit_interferometer_figures() {
    let dir = tempfile::tempdir().unwrap();
    let data = interferometer();
    let fit = fit_interferometer(&data);

    let none = dir.path().join("none");
    visualizer(&none, plots(false))
        .visualize_fit_interferometer(&fit, true, None)
        .unwrap();
    assert_eq!(count_files(&none), 0);

    let only_residuals = plots(false).set(Section::Fit, "residual_map", true);
    let during = dir.path().join("during");
    visualizer(&during, only_residuals.clone())
        .visualize_fit_interferometer(&fit, true, None)
        .unwrap();
    assert_eq!(count_files(&during), 1);
    assert!(during
        .join("image/fit_interferometer/residual_map.png")
        .is_file());

    let subplots = dir.path().join("subplots");
    visualizer(&subplots, plots(false).set(Section::Fit, "subplot_fit", true))
        .visualize_fit_interferometer(&fit, true, None)
        .unwrap();
    let folder = subplots.join("image/fit_interferometer");
    assert!(folder.join("subplot_fit_interferometer.png").is_file());
    assert!(folder.join("subplot_fit_real_space.png").is_file());
    assert_eq!(count_files(&subplots), 2);

    let at_end = dir.path().join("at_end");
    visualizer(
        &at_end,
        only_residuals.set(Section::Fit, "all_at_end_fits", true),
    )
    .visualize_fit_interferometer(&fit, false, None)
    .unwrap();
    let fits_folder = at_end.join("image/fit_interferometer/fits");
    assert_eq!(count_files(&fits_folder), FitInterferometerPlot::iter().count());
    assert_eq!(count_files(&at_end), 1 + FitInterferometerPlot::iter().count());

    // one row per visibility, the imaginary part first
    let points = fits::read_array(fits_folder.join("visibilities.fits")).unwrap();
    assert_eq!(points.shape(), (3, 2));
    for (i, [re, im]) in data.visibilities.iter().enumerate() {
        assert_eq!(points.get(i, 0), *im);
        assert_eq!(points.get(i, 1), *re);
    }
    let model = fits::read_array(fits_folder.join("model_visibilities.fits")).unwrap();
    assert_eq!(model.get(2, 1), fit.model_visibilities[2][0]);
}

#[test]
fn inversion_figures() {
    let dir = tempfile::tempdir().unwrap();
    let inversion = inversion();

    let none = dir.path().join("none");
    visualizer(&none, plots(false))
        .visualize_inversion(&inversion, true)
        .unwrap();
    assert_eq!(count_files(&none), 0);

    let errors = dir.path().join("errors");
    visualizer(&errors, plots(false).set(Section::Inversion, "errors", true))
        .visualize_inversion(&inversion, true)
        .unwrap();
    assert_eq!(count_files(&errors), 1);
    assert!(errors.join("image/inversion/errors.png").is_file());

    // the reconstruction is drawn as the reconstructed image and the source values
    let at_end = dir.path().join("at_end");
    visualizer(&at_end, plots(false))
        .visualize_inversion(&inversion, false)
        .unwrap();
    assert_eq!(count_files(&at_end), InversionPlot::iter().count() + 1);
    let folder = at_end.join("image/inversion");
    for name in [
        "reconstructed_image",
        "reconstruction",
        "regularization_weights",
        "interpolated_errors",
    ] {
        assert!(folder.join(format!("{name}.png")).is_file(), "{name}");
    }
}

#[test]
fn hyper_image_figures() {
    let dir = tempfile::tempdir().unwrap();
    let model_image = Array2D::full(3., (5, 5), (0.1, 0.1));
    let galaxy_images = vec![
        Named::new("galaxy_0", Array2D::full(1., (5, 5), (0.1, 0.1))),
        Named::new("galaxy_1", Array2D::full(2., (5, 5), (0.1, 0.1))),
    ];
    let contribution_maps = vec![Named::new("galaxy_0", Array2D::full(0.5, (5, 5), (0.1, 0.1)))];
    let run = |name: &str, plots: PlotsConfig| {
        let path = dir.path().join(name);
        visualizer(&path, plots)
            .visualize_hyper_images(&galaxy_images, &model_image, &contribution_maps)
            .unwrap();
        path
    };

    assert_eq!(count_files(&run("none", plots(false))), 0);
    for (key, file) in [
        ("model_image", "hyper_model_image.png"),
        ("images_of_galaxies", "subplot_hyper_images_of_galaxies.png"),
        (
            "contribution_maps_of_galaxies",
            "subplot_contribution_maps_of_galaxies.png",
        ),
    ] {
        let path = run(key, plots(false).set(Section::Hyper, key, true));
        assert_eq!(count_files(&path), 1, "{key}");
        assert!(path.join("image/hyper").join(file).is_file(), "{key}");
    }
}

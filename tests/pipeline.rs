use std::{path::Path, rc::Rc};

use galaxy_viz::{
    config::NestConfig,
    dataset::{Instrument, SimulatorImaging},
    pipeline::{
        Dataset, GalaxyModel, Info, Model, Phase, Pipeline, PipelineError, ProfileModel,
        SearchKind,
    },
    profiles::{EllipticalSersic, ProfileKind},
    structures::Mask,
    Config, Galaxy, Named, Plane,
};

fn dataset() -> Dataset {
    let plane = Plane::new(vec![Named::new(
        "galaxy_0",
        Galaxy::new(0.5).light(
            "bulge",
            EllipticalSersic {
                intensity: 1.,
                ..Default::default()
            },
        ),
    )]);
    SimulatorImaging::from_instrument(Instrument::Vro)
        .simulate(&plane)
        .unwrap()
        .into()
}

fn mask() -> Mask {
    Mask::circular((40, 40), (0.2, 0.2), 2.)
}

fn config(output: &Path) -> Rc<Config> {
    Config::load(
        Path::new(env!("CARGO_MANIFEST_DIR")).join("integration/config_mock"),
        output,
    )
    .unwrap()
}

/// Sersic bulge with only its intensity and effective radius free
fn model() -> Model {
    let bulge = ProfileModel::new(ProfileKind::EllipticalSersic)
        .fix("centre_0", 0.)
        .and_then(|p| p.fix("centre_1", 0.))
        .and_then(|p| p.fix("axis_ratio", 1.))
        .and_then(|p| p.fix("phi", 0.))
        .and_then(|p| p.fix("sersic_index", 4.))
        .unwrap();
    Model::new().galaxy("galaxy_0", GalaxyModel::new(0.5).light("bulge", bulge))
}

#[test]
fn phases_run_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let folders = vec![String::from("pipeline")];
    let (first, second) = (folders.clone(), folders);
    let pipeline = Pipeline::new("ordering", config(dir.path()))
        .phase(move |results| {
            assert!(results.is_empty());
            Ok(Phase::imaging("phase_1", &first, model()))
        })
        .phase(move |results| {
            let previous = results.get(0)?;
            assert_eq!(previous.name, "phase_1");
            Ok(Phase::imaging("phase_2", &second, previous.model.clone()))
        });
    let results = pipeline
        .run(&dataset(), &mask(), &Info::new())
        .unwrap();
    let names: Vec<_> = results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["phase_1", "phase_2"]);
    for name in names {
        let phase = dir.path().join("pipeline").join(name);
        assert!(phase.join("model.results").is_file());
        assert!(phase.join("samples.csv").is_file());
        assert!(phase.join("info.json").is_file());
    }
}

#[test]
fn later_results_are_not_available() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new("ahead", config(dir.path())).phase(|results| {
        results.get(1)?;
        Ok(Phase::imaging("phase_1", &[], model()))
    });
    assert!(matches!(
        pipeline.run(&dataset(), &mask(), &Info::new()),
        Err(PipelineError::MissingResult {
            index: 1,
            available: 0
        })
    ));
}

#[test]
fn interferometer_phase_rejects_imaging() {
    let dir = tempfile::tempdir().unwrap();
    let phase = Phase::interferometer("phase_1", &[], model(), mask());
    assert!(matches!(
        phase.run(&dataset(), &mask(), &Info::new(), &config(dir.path()), None),
        Err(PipelineError::DatasetKind { .. })
    ));
}

#[test]
fn nested_sampler_beats_the_prior_median() {
    let dir = tempfile::tempdir().unwrap();
    let nest = NestConfig {
        n_live_points: 20,
        max_iterations: 200,
        ..Default::default()
    };
    let config = Rc::new((*config(dir.path())).clone().nest(nest));
    let dataset = dataset();
    let info = Info::new();

    let mock = Phase::imaging("mock", &[], model())
        .search_kind(SearchKind::Mock)
        .run(&dataset, &mask(), &info, &config, None)
        .unwrap();
    let nest = Phase::imaging("nest", &[], model())
        .search_kind(SearchKind::Nest)
        .run(&dataset, &mask(), &info, &config, None)
        .unwrap();
    assert!(nest.log_likelihood > mock.log_likelihood);
    assert!(nest.samples.samples.len() > 1);
    assert_eq!(mock.samples.samples.len(), 1);
}

#[test]
fn model_results_lists_free_parameters() {
    let dir = tempfile::tempdir().unwrap();
    Phase::imaging("results", &[], model())
        .run(&dataset(), &mask(), &Info::new(), &config(dir.path()), None)
        .unwrap();
    let contents = std::fs::read_to_string(dir.path().join("results/model.results")).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], "phase: results");
    assert_eq!(lines[1], "search: mock");
    assert!(lines[2].starts_with("maximum log likelihood: "));
    // the mock search has no evidence
    assert_eq!(lines[3], "");
    assert_eq!(lines.len(), 6);
    assert!(lines[4].starts_with("galaxy_0.bulge.intensity "));
    assert!(lines[4].contains(" 0.5000 ("));
    assert!(lines[5].starts_with("galaxy_0.bulge.effective_radius "));
    assert!(lines[5].contains(" 2.0000 ("));
}

use galaxy_viz::{
    pipeline::{self, GalaxyModel, Model, Phase, Pipeline, ProfileModel},
    profiles::ProfileKind,
};

use crate::{DatasetKind, PipelineArgs, TestModule};

/// Sersic bulge with its centre fixed at `centre`
fn bulge(centre: f64) -> pipeline::Result<ProfileModel> {
    ProfileModel::new(ProfileKind::EllipticalSersic)
        .fix("centre_0", centre)?
        .fix("centre_1", centre)
}

/// Two Sersic bulges with hyper galaxies
///
/// The first phase fits the bulges then their hyper galaxies; the second phase
/// refits the bulges from the first phase priors with the hyper galaxies fixed.
pub struct GalaxyX2SersicsHyper;
impl TestModule for GalaxyX2SersicsHyper {
    fn test_type(&self) -> &str {
        "galaxy_x2"
    }
    fn test_name(&self) -> &str {
        "galaxy_x2__sersics__hyper"
    }
    fn data_label(&self) -> &str {
        "galaxy_x2__sersics"
    }
    fn instrument(&self) -> &str {
        "vro"
    }
    fn kind(&self) -> DatasetKind {
        DatasetKind::Imaging
    }
    fn make_pipeline(&self, args: PipelineArgs) -> pipeline::Result<Pipeline> {
        let PipelineArgs {
            name,
            phase_folders,
            search,
            config,
            ..
        } = args;
        let model = Model::new()
            .galaxy("galaxy_0", GalaxyModel::new(0.5).light("bulge", bulge(-1.)?))
            .galaxy("galaxy_1", GalaxyModel::new(0.5).light("bulge", bulge(1.)?));
        let folders = phase_folders.clone();
        let phase_1 = move |_: &pipeline::Results| -> pipeline::Result<Phase> {
            Ok(Phase::imaging("phase_1", &folders, model.clone())
                .search_kind(search)
                .const_efficiency_mode(true)
                .n_live_points(40)
                .sampling_efficiency(0.8)
                .extend_with_hyper_phase())
        };
        let phase_2 = move |results: &pipeline::Results| -> pipeline::Result<Phase> {
            let phase_1 = results.get(0)?;
            let hyper = &phase_1.hyper_result()?.instance;
            let mut model = Model::new();
            for name in ["galaxy_0", "galaxy_1"] {
                let hyper_galaxy = hyper.galaxy(name)?.hyper_galaxy.unwrap_or_default();
                model = model.galaxy(
                    name,
                    phase_1.model.galaxy_model(name)?.hyper_galaxy(hyper_galaxy),
                );
            }
            Ok(Phase::imaging("phase_2", &phase_folders, model)
                .search_kind(search)
                .const_efficiency_mode(true)
                .n_live_points(40)
                .sampling_efficiency(0.8))
        };
        Ok(Pipeline::new(name, config).phase(phase_1).phase(phase_2))
    }
}

use galaxy_viz::{
    pipeline::{self, GalaxyModel, Model, Phase, Pipeline, ProfileModel},
    profiles::ProfileKind,
};

use crate::{DatasetKind, PipelineArgs, TestModule};

fn bulge(centre: f64) -> pipeline::Result<ProfileModel> {
    ProfileModel::new(ProfileKind::EllipticalSersic)
        .fix("centre_0", centre)?
        .fix("centre_1", centre)
}

/// Two Sersic bulges fitted one at a time, then together
///
/// The second phase fixes the first galaxy to the best fit of the first phase,
/// the third phase fits both galaxies from the priors passed by the first two.
pub struct GalaxyX2SersicsSeparate;
impl TestModule for GalaxyX2SersicsSeparate {
    fn test_type(&self) -> &str {
        "galaxy_x1"
    }
    fn test_name(&self) -> &str {
        "galaxy_x2__sersics__separate"
    }
    fn data_label(&self) -> &str {
        "galaxy_x2__sersics"
    }
    fn instrument(&self) -> &str {
        "sma"
    }
    fn kind(&self) -> DatasetKind {
        DatasetKind::Interferometer
    }
    fn make_pipeline(&self, args: PipelineArgs) -> pipeline::Result<Pipeline> {
        let PipelineArgs {
            name,
            phase_folders,
            search,
            real_space_mask,
            config,
        } = args;
        let phase = move |name: &str, model: Model, n_live_points: usize| {
            Phase::interferometer(name, &phase_folders, model, real_space_mask.clone())
                .search_kind(search)
                .const_efficiency_mode(true)
                .n_live_points(n_live_points)
                .sampling_efficiency(0.8)
        };
        let phase_1 = phase.clone();
        let phase_2 = phase.clone();
        let phase_3 = phase;

        let galaxy_0 = GalaxyModel::new(0.5).light("bulge", bulge(-1.)?);
        let galaxy_1 = GalaxyModel::new(0.5).light("bulge", bulge(1.)?);
        Ok(Pipeline::new(name, config)
            .phase(move |_| {
                let model = Model::new().galaxy("galaxy_0", galaxy_0.clone());
                Ok(phase_1("phase_1", model, 40))
            })
            .phase(move |results| {
                let galaxy_0 = results.get(0)?.instance.galaxy("galaxy_0")?.clone();
                let model = Model::new()
                    .galaxy("galaxy_0", galaxy_0)
                    .galaxy("galaxy_1", galaxy_1.clone());
                Ok(phase_2("phase_2", model, 40))
            })
            .phase(move |results| {
                let model = Model::new()
                    .galaxy("galaxy_0", results.get(0)?.model.galaxy_model("galaxy_0")?)
                    .galaxy("galaxy_1", results.get(1)?.model.galaxy_model("galaxy_1")?);
                Ok(phase_3("phase_3", model, 60))
            }))
    }
}

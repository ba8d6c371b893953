use galaxy_viz::{
    pipeline::{self, GalaxyModel, Model, Phase, Pipeline},
    profiles::ProfileKind,
};

use crate::{DatasetKind, PipelineArgs, TestModule};

/// One Sersic bulge fitted in a single phase
pub struct GalaxyX1Sersic;
impl TestModule for GalaxyX1Sersic {
    fn test_type(&self) -> &str {
        "galaxy_x1"
    }
    fn test_name(&self) -> &str {
        "galaxy_x1__sersic"
    }
    fn data_label(&self) -> &str {
        "galaxy_x1__sersic"
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
        let model = Model::new().galaxy(
            "galaxy_0",
            GalaxyModel::new(0.5).light("bulge", ProfileKind::EllipticalSersic),
        );
        Ok(Pipeline::new(name, config).phase(move |_| {
            Ok(Phase::imaging("phase_1", &phase_folders, model.clone())
                .search_kind(search)
                .const_efficiency_mode(true)
                .n_live_points(40)
                .sampling_efficiency(0.8))
        }))
    }
}

use std::path::{Path, PathBuf};

use galaxy_viz::{
    dataset::{
        grid_from_instrument, load_test_imaging, load_test_interferometer,
        pixel_scales_from_instrument,
    },
    pipeline::{Dataset, Info, Results, SearchKind},
    structures::Mask,
    Config,
};

use crate::{DatasetKind, PipelineArgs, Result, TestModule};

/// Radius of the default circular mask in arcsec
pub const MASK_RADIUS: f64 = 2.0;

/// Runs test modules against the datasets and configurations of a test folder
#[derive(Debug, Clone)]
pub struct Runner {
    test_path: PathBuf,
}
impl Default for Runner {
    /// The `integration` crate folder
    fn default() -> Self {
        Self::new(env!("CARGO_MANIFEST_DIR"))
    }
}
impl Runner {
    pub fn new<P: AsRef<Path>>(test_path: P) -> Self {
        Self {
            test_path: test_path.as_ref().to_path_buf(),
        }
    }
    pub fn test_path(&self) -> &Path {
        &self.test_path
    }
    pub fn output_path(&self, kind: DatasetKind) -> PathBuf {
        self.test_path.join("output").join(kind.folder())
    }
    /// Runs the pipeline of `module` named `test_name`, the module test name by default
    ///
    /// Without a `mask`, the real-space mask is a circle of radius [MASK_RADIUS].
    pub fn run(
        &self,
        module: &dyn TestModule,
        test_name: Option<&str>,
        search: SearchKind,
        config_folder: &str,
        mask: Option<Mask>,
    ) -> Result<Results> {
        let test_name = test_name.unwrap_or(module.test_name()).to_string();
        let kind = module.kind();
        let config = Config::load(self.test_path.join(config_folder), self.output_path(kind))?;
        log::info!("Running {test_name} with the {search} search");

        let (dataset, mask, info): (Dataset, Mask, Info) = match kind {
            DatasetKind::Imaging => {
                let imaging =
                    load_test_imaging(&self.test_path, module.data_label(), module.instrument())?;
                let mask = mask.unwrap_or_else(|| {
                    Mask::circular(
                        imaging.image.shape(),
                        imaging.image.pixel_scales(),
                        MASK_RADIUS,
                    )
                });
                let info = Info::from([(String::from("test"), serde_json::json!(2))]);
                (imaging.into(), mask, info)
            }
            DatasetKind::Interferometer => {
                let interferometer = load_test_interferometer(
                    &self.test_path,
                    module.data_label(),
                    module.instrument(),
                )?;
                let mask = match mask {
                    Some(mask) => mask,
                    None => {
                        let grid = grid_from_instrument(module.instrument())?;
                        let pixel_scales = pixel_scales_from_instrument(module.instrument())?;
                        Mask::circular(grid.shape(), pixel_scales, MASK_RADIUS)
                    }
                };
                (interferometer.into(), mask, Info::new())
            }
        };

        let pipeline = module.make_pipeline(PipelineArgs {
            name: test_name.clone(),
            phase_folders: vec![module.test_type().to_string(), test_name],
            search,
            real_space_mask: mask.clone(),
            config,
        })?;
        Ok(pipeline.run(&dataset, &mask, &info)?)
    }
    /// Runs `module` with the mock search
    pub fn run_a_mock(&self, module: &dyn TestModule) -> Result<Results> {
        self.run(
            module,
            Some(&format!("{}_mock", module.test_name())),
            SearchKind::Mock,
            "config_mock",
            None,
        )
    }
    /// Runs `module` with the nested sampler
    pub fn run_with_multi_nest(&self, module: &dyn TestModule) -> Result<Results> {
        self.run(
            module,
            Some(&format!("{}_nest", module.test_name())),
            SearchKind::Nest,
            "config_mock",
            None,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_folders() {
        let runner = Runner::new("/tmp/galaxy");
        assert_eq!(
            runner.output_path(DatasetKind::Interferometer),
            PathBuf::from("/tmp/galaxy/output/interferometer")
        );
        assert!(Runner::default().test_path().join("Cargo.toml").is_file());
    }

    #[test]
    fn missing_config() {
        let root = tempfile::tempdir().unwrap();
        let runner = Runner::new(root.path());
        let module = crate::imaging::GalaxyX1Sersic;
        assert!(matches!(
            runner.run_a_mock(&module),
            Err(crate::IntegrationError::Config(_))
        ));
    }
}

use std::path::PathBuf;

use galaxy_integration::{modules, simulators, Runner};
use galaxy_viz::pipeline::SearchKind;
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "galaxy-integration", about = "Runs the galaxy test pipelines")]
struct Opt {
    /// Regular expression matching the names of the tests to run
    #[structopt(default_value = ".*")]
    filter: String,
    /// Runs the tests with the mock search
    #[structopt(long)]
    mock: bool,
    /// Runs the tests with the nested sampler and the mock configuration
    #[structopt(long)]
    nest: bool,
    /// Simulates the datasets of the tests first
    #[structopt(long)]
    simulate: bool,
    /// Folder with the datasets, configurations and outputs
    #[structopt(long)]
    test_path: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let filter = Regex::new(&opt.filter)?;
    let modules: Vec<_> = modules()
        .into_iter()
        .filter(|module| filter.is_match(module.test_name()))
        .collect();
    println!("Found {} tests matching {:?}", modules.len(), opt.filter);
    let runner = opt.test_path.map_or_else(Runner::default, Runner::new);

    if opt.simulate {
        for module in &modules {
            simulators::simulate(runner.test_path(), module.as_ref())?;
        }
    }

    let pb = ProgressBar::new(modules.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
            )?
            .progress_chars("#>-"),
    );
    for module in &modules {
        let module = module.as_ref();
        pb.set_message(module.test_name().to_string());
        if opt.mock {
            runner.run_a_mock(module)?;
        }
        if opt.nest {
            runner.run_with_multi_nest(module)?;
        }
        if !(opt.mock || opt.nest) {
            runner.run(module, None, SearchKind::Nest, "config", None)?;
        }
        pb.inc(1);
    }
    pb.finish_with_message("done");
    Ok(())
}

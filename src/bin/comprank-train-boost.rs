//! Train the gradient boosting pipeline, write `submission.csv` and print
//! feature importances.

use std::path::Path;

use comprank::config::{self, CONFIG_FILE_NAME};
use comprank::logging;
use comprank::pipeline::{self, PipelineError, PipelineKind};
use comprank::report::format_importances;

fn main() {
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), PipelineError> {
    let config = config::load_or_default(Path::new(CONFIG_FILE_NAME))?;
    let summary = pipeline::run(PipelineKind::Boost, &config)?;
    println!("{}", summary.accuracy);
    if let Some(ranked) = &summary.importances {
        println!("{}", format_importances(ranked));
    }
    Ok(())
}

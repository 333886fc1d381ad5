//! Train the random forest pipeline and write `submission.csv`.

use std::path::Path;

use comprank::config::{self, CONFIG_FILE_NAME};
use comprank::logging;
use comprank::pipeline::{self, PipelineError, PipelineKind};

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
    let summary = pipeline::run(PipelineKind::Forest, &config)?;
    println!("{}", summary.accuracy);
    Ok(())
}

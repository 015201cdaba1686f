use std::path::Path;

use recval_core::config::loader::{ConfigLoader, default_config_path};
use recval_core::predicates::PredicateRegistry;

use crate::logging;

pub fn run(config: Option<&Path>) {
    let rc = match ConfigLoader::load(config) {
        Ok(rc) => rc,
        Err(e) => {
            println!("FAIL recval doctor");
            println!("{e}");
            if config.is_none() {
                println!("looked for: {}", default_config_path().display());
            }
            std::process::exit(1);
        }
    };
    logging::init(&rc);

    println!("OK   recval doctor");
    println!("path: {}", rc.config_path.display());
    if let Some(dir) = &rc.models_dir {
        println!("models_dir: {}", dir.display());
    }
    println!("logging.level: {}", rc.logging.level);

    let registry = PredicateRegistry::with_builtins();
    let mut failed = false;
    for name in rc.model_names() {
        match rc.build_model(name, &registry) {
            Ok(model) => println!("OK   model {name} ({} fields)", model.fields().len()),
            Err(e) => {
                failed = true;
                println!("FAIL model {name}: {e}");
            }
        }
    }

    if failed {
        logging::flush();
        std::process::exit(1);
    }
}

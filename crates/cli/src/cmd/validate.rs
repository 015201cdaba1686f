//! Validate command implementation.

use std::path::Path;
use std::sync::Arc;

use color_eyre::eyre::{Result, WrapErr, bail};
use recval_core::config::loader::ConfigLoader;
use recval_core::hooks::TracingHooks;
use recval_core::model::Record;
use recval_core::predicates::PredicateRegistry;
use recval_core::report::{ErrorItem, ValidateError};
use recval_core::validation::{ValidateOptions, validate};
use serde_json::Value as Json;
use tracing::debug;

use super::output::{RecordOutput, print_items_table, print_json};
use crate::{ValidateArgs, logging};

pub async fn run(config: Option<&Path>, args: &ValidateArgs) {
    let rc = match ConfigLoader::load(config) {
        Ok(rc) => rc,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            std::process::exit(1);
        }
    };
    logging::init(&rc);

    let model = match rc.build_model(&args.model, &PredicateRegistry::with_builtins()) {
        Ok(model) => Arc::new(model),
        Err(e) => {
            eprintln!("Error building model '{}': {e}", args.model);
            exit(1);
        }
    };

    let inputs = match load_records(&args.record) {
        Ok(inputs) => inputs,
        Err(e) => {
            eprintln!("Error: {e:#}");
            exit(1);
        }
    };

    let total = inputs.len();
    let options = options(args);
    let mut reports: Vec<(usize, Vec<ErrorItem>)> = Vec::new();
    for (index, json) in inputs.into_iter().enumerate() {
        let record = Arc::new(Record::from_json(Arc::clone(&model), json));
        match validate(record, options.clone(), &TracingHooks).await {
            Ok(_) => debug!(index, "record valid"),
            Err(ValidateError::Invalid(report)) => reports.push((index, report.into_errors())),
            Err(e) => {
                eprintln!("Error validating record {index}: {e}");
                exit(1);
            }
        }
    }

    if args.json {
        let outputs: Vec<RecordOutput<'_>> = (0..total)
            .map(|index| {
                let errors = reports
                    .iter()
                    .find(|(i, _)| *i == index)
                    .map_or(&[][..], |(_, items)| items.as_slice());
                RecordOutput { index, valid: errors.is_empty(), errors }
            })
            .collect();
        print_json(&outputs);
    } else {
        print_items_table(&reports, total);
    }

    if !reports.is_empty() {
        exit(1);
    }
}

fn options(args: &ValidateArgs) -> ValidateOptions {
    let mut options = ValidateOptions::new().hooks(!args.no_hooks);
    if !args.skip.is_empty() {
        options = options.skip(args.skip.iter().cloned());
    }
    if !args.fields.is_empty() {
        options = options.fields(args.fields.iter().cloned());
    }
    options
}

/// Read a JSON object, or an array of objects, from `path`.
fn load_records(path: &Path) -> Result<Vec<Json>> {
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    let json: Json = serde_json::from_str(&content)
        .wrap_err_with(|| format!("failed to parse JSON in {}", path.display()))?;

    let records = match json {
        Json::Array(items) => items,
        other => vec![other],
    };
    if let Some(pos) = records.iter().position(|r| !r.is_object()) {
        bail!("record {pos} in {} is not a JSON object", path.display());
    }
    Ok(records)
}

fn exit(code: i32) -> ! {
    logging::flush();
    std::process::exit(code);
}

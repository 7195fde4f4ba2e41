use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command, ValueHint};

use churn_classifiers::config::{load_pipeline_config, PipelineConfig};
use churn_classifiers::dataset::CustomerRecord;
use churn_classifiers::evaluation::format_comparison;
use churn_classifiers::pipeline::ChurnPipeline;

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("CHURN_LOG", "error,churn_classifiers=info"),
    )
    .init();

    let matches = Command::new("churn")
        .version(clap::crate_version!())
        .about("Customer churn prediction pipeline")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("train")
                .about("Train every model variant on a labelled dataset and print the comparison")
                .arg(
                    Arg::new("dataset")
                        .help("Path to the labelled churn CSV")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .help("Path to a pipeline JSON configuration file")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("predict")
                .about("Bootstrap the pipeline and score a single customer record")
                .arg(
                    Arg::new("dataset")
                        .help("Path to the labelled churn CSV used for training")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("record")
                        .short('r')
                        .long("record")
                        .help("Path to a flat JSON customer record")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .help("Path to a pipeline JSON configuration file")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .get_matches();

    let result = match matches.subcommand() {
        Some(("train", sub_matches)) => handle_train(sub_matches),
        Some(("predict", sub_matches)) => handle_predict(sub_matches),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            log::error!("{:#}", e);
            std::process::exit(1)
        }
    }
}

fn resolve_config(matches: &ArgMatches) -> Result<PipelineConfig> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => load_pipeline_config(path),
        None => Ok(PipelineConfig::default()),
    }
}

fn handle_train(matches: &ArgMatches) -> Result<()> {
    let dataset: &PathBuf = matches.get_one("dataset").unwrap();
    let config = resolve_config(matches)?;

    let pipeline = ChurnPipeline::bootstrap(config, dataset)
        .with_context(|| format!("Training failed for {:?}", dataset))?;

    let selected = pipeline.selected_variant().map(|v| v.name.clone());
    println!("{}", format_comparison(pipeline.results(), selected.as_deref()));
    Ok(())
}

fn handle_predict(matches: &ArgMatches) -> Result<()> {
    let dataset: &PathBuf = matches.get_one("dataset").unwrap();
    let record_path: &PathBuf = matches.get_one("record").unwrap();
    let config = resolve_config(matches)?;

    let content = std::fs::read_to_string(record_path)
        .with_context(|| format!("Failed to read record: {}", record_path.display()))?;
    let record: CustomerRecord = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse record: {}", record_path.display()))?;

    let pipeline = ChurnPipeline::bootstrap(config, dataset)
        .with_context(|| format!("Training failed for {:?}", dataset))?;

    let probability = pipeline.predict(&record)?;
    let model = pipeline
        .selected_variant()
        .map(|v| v.name.as_str())
        .unwrap_or("unknown");
    println!("churn probability: {:.4} (model: {})", probability, model);
    Ok(())
}

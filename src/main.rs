use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::info;

use cultivar::{bundle, features, form, Classifier, FeatureSample};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the serialized model bundle (defaults to
    /// model/wine_cultivar_model.json, or $CULTIVAR_MODEL when set)
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Run a single prediction and print it instead of opening the form
    #[arg(long)]
    headless: bool,

    /// Override a feature value in headless mode, e.g. --set alcohol=13.2.
    /// Unset features keep their default midpoint; values are clamped to the
    /// same ranges the form enforces.
    #[arg(long = "set", value_name = "NAME=VALUE")]
    overrides: Vec<String>,
}

fn main() -> ExitCode {
    cultivar::init_logger();
    let args = Args::parse();

    let bundle_path = args.model.unwrap_or_else(bundle::default_bundle_path);

    // Both load failures are terminal: report and stop before any form is
    // rendered.
    let bundle = match bundle::load_cached(&bundle_path) {
        Ok(bundle) => bundle,
        Err(e @ bundle::BundleError::NotFound(_)) => {
            eprintln!(
                "{}. Please ensure the model bundle is available at {:?}.",
                e, bundle_path
            );
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("Error loading model: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let classifier = Classifier::from_bundle(bundle);
    info!(
        "Classifier ready: {} features, {} classes",
        classifier.feature_names().len(),
        classifier.target_names().len()
    );

    let result = if args.headless {
        run_headless(&classifier, &args.overrides)
    } else {
        form::run(classifier)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Builds the sample for a headless run: default midpoints plus any
/// `--set name=value` overrides, clamped to the form's ranges.
fn build_sample(overrides: &[String]) -> anyhow::Result<FeatureSample> {
    let mut sample = features::default_sample();
    for entry in overrides {
        let (name, value) = entry.split_once('=').ok_or_else(|| {
            anyhow::anyhow!("invalid --set '{}', expected NAME=VALUE", entry)
        })?;
        let spec = features::spec_for(name)
            .ok_or_else(|| anyhow::anyhow!("unknown feature '{}'", name))?;
        let value: f64 = value
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid value for '{}': '{}'", name, value))?;
        sample.insert(spec.name.to_string(), spec.clamp(value));
    }
    Ok(sample)
}

fn run_headless(classifier: &Classifier, overrides: &[String]) -> anyhow::Result<()> {
    let sample = build_sample(overrides)?;
    let prediction = classifier.predict(&sample)?;

    println!("Predicted cultivar: {}", prediction.label);

    let mut scores: Vec<_> = classifier
        .target_names()
        .iter()
        .zip(prediction.probabilities.iter())
        .collect();
    scores.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap_or(std::cmp::Ordering::Equal));

    println!("Confidence scores (sorted):");
    for (label, probability) in scores {
        println!("  {}: {:.2}%", label, probability * 100.0);
    }

    println!("Input summary:");
    for spec in &features::FEATURE_SPECS {
        println!("  {}: {}", spec.display_label(), sample[spec.name]);
    }

    Ok(())
}

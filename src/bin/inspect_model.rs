//! Utility to fetch the configured model artifact and print its input schema.
//!
//! Lists the columns the trained pipeline expects next to the columns the form
//! produces, so schema drift can be confirmed before deploying a new artifact.

use tourism_predictor::config::Config;
use tourism_predictor::loader;
use tourism_predictor::pipeline::Classifier;
use tourism_predictor::profile::COLUMNS;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tourism_predictor=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    let model = loader::initialize(&config)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!(
        "Model: {} (version {})",
        model.model_id.as_deref().unwrap_or("<unnamed>"),
        model.model_version
    );
    match &model.classifier {
        Classifier::LogisticRegression { .. } => println!("Classifier: logistic regression"),
        Classifier::GradientBoostedTrees { trees, .. } => {
            println!("Classifier: gradient boosted trees ({} trees)", trees.len())
        }
    }
    println!("Decision threshold: {}", model.threshold);
    println!("Transformed width: {}", model.width());
    println!();

    println!("Numeric columns:");
    for feature in &model.numeric_features {
        println!("  - {} (mean {}, scale {})", feature.name, feature.mean, feature.scale);
    }
    println!("Categorical columns:");
    for feature in &model.categorical_features {
        println!("  - {}: {}", feature.name, feature.categories.join(", "));
    }
    println!();

    let drift = model.schema_drift(&COLUMNS);
    if drift.is_empty() {
        println!("Schema matches the {} form columns.", COLUMNS.len());
    } else {
        for column in &drift.missing {
            println!("MISSING from form: {}", column);
        }
        for column in &drift.unused {
            println!("Not used by model: {}", column);
        }
    }

    Ok(())
}

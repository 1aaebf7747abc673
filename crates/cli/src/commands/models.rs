//! Model catalog commands

use anyhow::{Context, Result};
use colored::Colorize;
use predict_lib::{ModelFilter, ModelInfo, ModelReference, PredictionClient};
use tabled::Tabled;

use crate::output::{format_timestamp, print_info, print_json, print_table, print_warning, truncate, OutputFormat};

/// Row for models table
#[derive(Tabled)]
struct ModelRow {
    #[tabled(rename = "Model")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    model_type: String,
    #[tabled(rename = "Created")]
    created_at: String,
}

/// Row for inference parameters table
#[derive(Tabled)]
struct ParamRow {
    #[tabled(rename = "Parameter")]
    name: String,
    #[tabled(rename = "Default")]
    default: String,
}

/// Search the catalog
pub async fn list_models(
    client: &PredictionClient,
    query: Option<String>,
    model_type: Option<String>,
    page: Option<u32>,
    per_page: Option<u32>,
    format: OutputFormat,
) -> Result<()> {
    let filter = ModelFilter {
        query,
        model_type_id: model_type,
        page,
        per_page,
    };

    let models = client
        .list_models(&filter)
        .await
        .context("Failed to list models")?;

    match format {
        OutputFormat::Json => print_json(&models)?,
        OutputFormat::Table => {
            if models.is_empty() {
                print_warning("No models found");
                return Ok(());
            }

            let rows: Vec<ModelRow> = models
                .iter()
                .map(|m| ModelRow {
                    id: m.qualified_id(),
                    name: truncate(&m.name, 40),
                    model_type: m.model_type_id.clone().unwrap_or_default(),
                    created_at: format_timestamp(m.created_at.as_ref()),
                })
                .collect();
            print_table(rows);
            println!("\nTotal: {} models", models.len());
        }
    }

    Ok(())
}

/// Show one model with its declared inference parameters
pub async fn show_model(client: &PredictionClient, model: &str, format: OutputFormat) -> Result<()> {
    let reference: ModelReference = model
        .parse()
        .with_context(|| format!("Invalid model reference: {}", model))?;

    let info = client
        .get_model(&reference)
        .await
        .with_context(|| format!("Failed to fetch model {}", reference))?;

    match format {
        OutputFormat::Json => print_json(&info)?,
        OutputFormat::Table => print_model(&info),
    }

    Ok(())
}

fn print_model(info: &ModelInfo) {
    println!("{}", info.name.bold());
    println!("{}", "=".repeat(50));
    println!("Model:       {}", info.qualified_id());
    if let Some(model_type) = &info.model_type_id {
        println!("Type:        {}", model_type);
    }
    println!("Created:     {}", format_timestamp(info.created_at.as_ref()));
    if let Some(description) = &info.description {
        println!("Description: {}", truncate(description, 200));
    }

    let Some(version) = &info.version else {
        return;
    };
    println!("Version:     {}", version.id);

    if version.params.is_empty() {
        print_info("Model declares no inference parameters");
        return;
    }

    println!();
    let rows: Vec<ParamRow> = version
        .params
        .iter()
        .map(|(name, value)| ParamRow {
            name: name.clone(),
            default: value.to_string(),
        })
        .collect();
    print_table(rows);
}

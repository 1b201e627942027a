//! Collateral generation pipelines.
//!
//! Each task follows the same flow: resolve input paths (explicit, or the
//! newest file in the matching category directory), extract and archive each
//! document, send the rendered text to the assistant, assemble the report,
//! and write it to the task's output directory.

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

use crate::assistant::{Assistant, EmailPurpose, PitchTone, PresentationKind};
use crate::config::Config;
use crate::extract;
use crate::library::{Category, Library};
use crate::report::{self, Report};

/// Resolve a task input: an explicit path must exist; a missing argument
/// falls back to the newest file in the category directory.
fn resolve_required(
    library: &Library,
    explicit: Option<PathBuf>,
    category: Category,
    flag: &str,
) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if !path.exists() {
            bail!("File does not exist: {}", path.display());
        }
        return Ok(path);
    }
    match library.latest(category)? {
        Some(path) => {
            println!(
                "  using newest {} file: {}",
                category.dir_name(),
                path.display()
            );
            Ok(path)
        }
        None => bail!(
            "No {} found in {}. Pass {} or add a file to that directory.",
            category.label(),
            library.category_dir(category).display(),
            flag
        ),
    }
}

/// Like [`resolve_required`] but a missing argument with an empty category
/// directory simply omits the document.
fn resolve_optional(
    library: &Library,
    explicit: Option<PathBuf>,
    category: Category,
) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            bail!("File does not exist: {}", path.display());
        }
        return Ok(Some(path));
    }
    Ok(library.latest(category)?)
}

/// Extract a document, archive the structured data as a JSON sidecar, and
/// return the rendered text for prompting.
fn load_document(config: &Config, path: &Path) -> Result<String> {
    let document = extract::extract_path(path)
        .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
    let sidecar = report::write_extracted(&config.workspace, path, &document)?;
    println!("  extracted {} -> {}", path.display(), sidecar.display());
    Ok(document.render())
}

pub async fn run_analysis(
    config: &Config,
    product: Option<PathBuf>,
    competitor: Option<PathBuf>,
    output: Option<String>,
) -> Result<()> {
    let library = Library::new(config)?;
    let assistant = Assistant::new(&config.ai)?;

    println!("analysis");
    let product_path = resolve_required(&library, product, Category::Product, "--product")?;
    let competitor_path = resolve_optional(&library, competitor, Category::Competitor)?;

    let product_text = load_document(config, &product_path)?;
    let competitor_text = match &competitor_path {
        Some(path) => Some(load_document(config, path)?),
        None => None,
    };

    let analysis = assistant
        .compare_products(&product_text, competitor_text.as_deref())
        .await?;

    let mut report = Report::new("Product Analysis Report").section("Product", &product_text);
    if let Some(competitor_text) = &competitor_text {
        report = report.section("Competitor", competitor_text);
    }
    let report = report.section("Analysis", &analysis);

    let path = report::write_report(
        &config.workspace,
        "analysis",
        output,
        "product_analysis",
        &report,
    )?;
    println!("  report: {}", path.display());
    println!("ok");
    Ok(())
}

pub async fn run_pitch(
    config: &Config,
    product: Option<PathBuf>,
    customer: Option<PathBuf>,
    tone: PitchTone,
    output: Option<String>,
) -> Result<()> {
    let library = Library::new(config)?;
    let assistant = Assistant::new(&config.ai)?;

    println!("pitch ({} tone)", tone.as_str());
    let product_path = resolve_required(&library, product, Category::Product, "--product")?;
    let customer_path = resolve_optional(&library, customer, Category::Customer)?;

    let product_text = load_document(config, &product_path)?;
    let customer_text = match &customer_path {
        Some(path) => Some(load_document(config, path)?),
        None => None,
    };

    let script = assistant
        .sales_pitch(&product_text, customer_text.as_deref(), tone)
        .await?;

    let title = format!("Sales Pitch Script ({} tone)", tone.as_str());
    let mut report = Report::new(title).section("Product", &product_text);
    if let Some(customer_text) = &customer_text {
        report = report.section("Customer Profile", customer_text);
    }
    let report = report.section("Pitch Script", &script);

    let stem = format!("pitch_{}", tone.as_str());
    let path = report::write_report(&config.workspace, "pitches", output, &stem, &report)?;
    println!("  report: {}", path.display());
    println!("ok");
    Ok(())
}

pub async fn run_presentation(
    config: &Config,
    product: Option<PathBuf>,
    customer: Option<PathBuf>,
    kind: PresentationKind,
    output: Option<String>,
) -> Result<()> {
    let library = Library::new(config)?;
    let assistant = Assistant::new(&config.ai)?;

    println!("presentation ({})", kind.as_str());
    let product_path = resolve_required(&library, product, Category::Product, "--product")?;
    let customer_path = resolve_required(&library, customer, Category::Customer, "--customer")?;

    let product_text = load_document(config, &product_path)?;
    let customer_text = load_document(config, &customer_path)?;

    let outline = assistant
        .presentation_outline(&product_text, &customer_text, kind)
        .await?;

    let title = format!("Customer Presentation Outline ({})", kind.as_str());
    let report = Report::new(title)
        .section("Product", &product_text)
        .section("Customer", &customer_text)
        .section("Outline", &outline);

    let stem = format!("presentation_{}", kind.as_str());
    let path = report::write_report(&config.workspace, "presentations", output, &stem, &report)?;
    println!("  report: {}", path.display());
    println!("ok");
    Ok(())
}

pub async fn run_recommendation(
    config: &Config,
    customer: Option<PathBuf>,
    catalog: Option<PathBuf>,
    output: Option<String>,
) -> Result<()> {
    let library = Library::new(config)?;
    let assistant = Assistant::new(&config.ai)?;

    println!("recommendation");
    let customer_path = resolve_required(&library, customer, Category::Customer, "--customer")?;
    let catalog_path = resolve_required(&library, catalog, Category::Catalog, "--catalog")?;

    let customer_text = load_document(config, &customer_path)?;
    let catalog_text = load_document(config, &catalog_path)?;

    let recommendation = assistant
        .recommend_products(&customer_text, &catalog_text)
        .await?;

    let report = Report::new("Customer Needs Analysis and Recommendation")
        .section("Customer", &customer_text)
        .section("Product Catalog", &catalog_text)
        .section("Recommendation", &recommendation);

    let path = report::write_report(
        &config.workspace,
        "recommendations",
        output,
        "recommendation",
        &report,
    )?;
    println!("  report: {}", path.display());
    println!("ok");
    Ok(())
}

pub async fn run_email(
    config: &Config,
    purpose: EmailPurpose,
    product: Option<PathBuf>,
    recipient: Option<PathBuf>,
    output: Option<String>,
) -> Result<()> {
    let library = Library::new(config)?;
    let assistant = Assistant::new(&config.ai)?;

    println!("email ({})", purpose.as_str());
    let product_path = resolve_required(&library, product, Category::Product, "--product")?;
    let recipient_path = resolve_optional(&library, recipient, Category::Customer)?;

    let product_text = load_document(config, &product_path)?;
    let recipient_text = match &recipient_path {
        Some(path) => Some(load_document(config, path)?),
        None => None,
    };

    let email = assistant
        .sales_email(purpose, &product_text, recipient_text.as_deref())
        .await?;

    let title = format!("Sales Email ({})", purpose.as_str());
    let mut report = Report::new(title).section("Product", &product_text);
    if let Some(recipient_text) = &recipient_text {
        report = report.section("Recipient", recipient_text);
    }
    let report = report.section("Email", &email);

    let stem = format!("email_{}", purpose.as_str().replace('-', "_"));
    let path = report::write_report(&config.workspace, "emails", output, &stem, &report)?;
    println!("  report: {}", path.display());
    println!("ok");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkspaceConfig;

    fn config_at(root: &Path) -> Config {
        let mut config = Config::minimal();
        config.workspace = WorkspaceConfig {
            root: root.to_path_buf(),
        };
        config.workspace.ensure_layout().unwrap();
        config
    }

    #[test]
    fn required_input_falls_back_to_newest_category_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_at(dir.path());
        let library = Library::new(&config).unwrap();
        let path = library.category_dir(Category::Product).join("plan.xlsx");
        std::fs::write(&path, b"x").unwrap();

        let resolved = resolve_required(&library, None, Category::Product, "--product").unwrap();
        assert_eq!(resolved, path);
    }

    #[test]
    fn required_input_errors_when_category_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_at(dir.path());
        let library = Library::new(&config).unwrap();

        let err =
            resolve_required(&library, None, Category::Catalog, "--catalog").unwrap_err();
        assert!(err.to_string().contains("--catalog"));
    }

    #[test]
    fn explicit_missing_path_is_an_error_even_for_optional_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_at(dir.path());
        let library = Library::new(&config).unwrap();

        let missing = dir.path().join("nope.xlsx");
        assert!(resolve_required(&library, Some(missing.clone()), Category::Product, "-p").is_err());
        assert!(resolve_optional(&library, Some(missing), Category::Customer).is_err());
    }

    #[test]
    fn optional_input_omits_when_category_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_at(dir.path());
        let library = Library::new(&config).unwrap();

        let resolved = resolve_optional(&library, None, Category::Competitor).unwrap();
        assert!(resolved.is_none());
    }
}

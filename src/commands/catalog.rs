//! Catalog command handler - print the active flag catalog

use crate::cli::{CatalogArgs, OutputFormat};
use crate::commands::{load_catalog, CommandContext};
use crate::error::Result;

/// Run the catalog command
pub fn run_catalog(args: &CatalogArgs, ctx: &CommandContext) -> Result<String> {
    let catalog = load_catalog(args.catalog.as_deref())?;

    let output = match ctx.format {
        OutputFormat::Json => serde_json::to_string_pretty(&catalog).unwrap_or_default(),
        OutputFormat::Text => {
            let mut output = String::new();

            output.push_str(&format!(
                "exclusive optimization levels ({}):\n",
                catalog.exclusive.len()
            ));
            for flag in &catalog.exclusive {
                output.push_str(&format!("  {}\n", flag));
            }

            output.push_str(&format!("\nindependent flags ({}):\n", catalog.independent.len()));
            for flag in &catalog.independent {
                output.push_str(&format!("  {}\n", flag));
            }

            output
        }
    };

    Ok(output)
}

//! One-shot premium lookup, no model involved.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use premiumbot::tools::{PremiumLookupTool, PremiumQuery, PremiumTable};

use super::common::load_config;

/// Print the quote the `premium_filter` tool would return for these inputs.
pub(crate) fn cmd_lookup(
    config_path: Option<&Path>,
    age: &str,
    cancer: &str,
    gender: &str,
    option: Option<&str>,
    table: Option<PathBuf>,
) -> Result<()> {
    let path = match table {
        Some(path) => path,
        None => load_config(config_path)?.table_path(),
    };
    let table = PremiumTable::load(&path)
        .with_context(|| format!("Failed to load premium table from {}", path.display()))?;

    let tool = PremiumLookupTool::new(Arc::new(table));
    println!("{}", tool.quote(&PremiumQuery::new(age, cancer, gender, option)));
    Ok(())
}

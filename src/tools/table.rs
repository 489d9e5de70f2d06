//! Premium reference table.
//!
//! Loaded once at startup from a JSON export of the premium sheet and shared
//! read-only across sessions behind an `Arc`.
//!
//! The file is an array of rows using the sheet's column names:
//!
//! ```json
//! [
//!   {"Age": "30", "Cancer_type": "Lung Cancer", "Stage": "Early Stage",
//!    "Gender": "Male", "Option A": "1,500,000", "Option B": "1,000,000", "Option C": "500,000"}
//! ]
//! ```
//!
//! Cells may be strings or numbers.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::info;

use crate::error::{BotError, Result};

use super::normalize::{capitalize, title_case, value_to_text, AgeBrackets, CoverageOption};

fn loose_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_text(&value))
}

/// One row of the premium sheet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PremiumRow {
    #[serde(rename = "Age", alias = "age", deserialize_with = "loose_string")]
    pub age: String,
    #[serde(rename = "Cancer_type", alias = "cancer_type", deserialize_with = "loose_string")]
    pub cancer_type: String,
    #[serde(rename = "Stage", alias = "stage", deserialize_with = "loose_string")]
    pub stage: String,
    #[serde(rename = "Gender", alias = "gender", deserialize_with = "loose_string")]
    pub gender: String,
    #[serde(rename = "Option A", alias = "option_a", deserialize_with = "loose_string")]
    pub option_a: String,
    #[serde(rename = "Option B", alias = "option_b", deserialize_with = "loose_string")]
    pub option_b: String,
    #[serde(rename = "Option C", alias = "option_c", deserialize_with = "loose_string")]
    pub option_c: String,
}

impl PremiumRow {
    /// Trim every cell and fix casing of the categorical columns.
    fn normalized(self) -> Self {
        Self {
            age: self.age.trim().to_string(),
            cancer_type: title_case(&self.cancer_type),
            stage: self.stage.trim().to_string(),
            gender: capitalize(&self.gender),
            option_a: self.option_a.trim().to_string(),
            option_b: self.option_b.trim().to_string(),
            option_c: self.option_c.trim().to_string(),
        }
    }

    /// Premium figure for the given tier.
    pub fn premium(&self, option: CoverageOption) -> &str {
        match option {
            CoverageOption::A => &self.option_a,
            CoverageOption::B => &self.option_b,
            CoverageOption::C => &self.option_c,
        }
    }
}

type RowKey = (String, String, String);

/// Immutable, indexed premium table.
#[derive(Debug, Clone)]
pub struct PremiumTable {
    rows: Vec<PremiumRow>,
    index: HashMap<RowKey, Vec<usize>>,
    brackets: AgeBrackets,
}

impl PremiumTable {
    /// Build a table from raw rows, normalizing each one.
    pub fn from_rows(rows: Vec<PremiumRow>) -> Result<Self> {
        if rows.is_empty() {
            return Err(BotError::Table("premium table has no rows".into()));
        }

        let rows: Vec<PremiumRow> = rows.into_iter().map(PremiumRow::normalized).collect();
        let mut index: HashMap<RowKey, Vec<usize>> = HashMap::new();
        for (i, row) in rows.iter().enumerate() {
            index
                .entry((row.age.clone(), row.cancer_type.clone(), row.gender.clone()))
                .or_default()
                .push(i);
        }
        let brackets = AgeBrackets::from_labels(rows.iter().map(|r| r.age.as_str()));

        Ok(Self {
            rows,
            index,
            brackets,
        })
    }

    /// Parse a table from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let rows: Vec<PremiumRow> = serde_json::from_str(json)
            .map_err(|e| BotError::Table(format!("invalid premium table JSON: {}", e)))?;
        Self::from_rows(rows)
    }

    /// Load a table from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BotError::Table(format!("couldn't read '{}': {}", path.display(), e))
        })?;
        let table = Self::from_json_str(&content)?;
        info!(
            path = %path.display(),
            rows = table.len(),
            age_brackets = table.brackets.len(),
            "Premium table loaded"
        );
        Ok(table)
    }

    /// Rows for one (age bracket, cancer type, gender) key, in file order.
    pub fn lookup(&self, age: &str, cancer_type: &str, gender: &str) -> Vec<&PremiumRow> {
        self.index
            .get(&(age.to_string(), cancer_type.to_string(), gender.to_string()))
            .map(|idx| idx.iter().map(|&i| &self.rows[i]).collect())
            .unwrap_or_default()
    }

    /// Age brackets derived from the data.
    pub fn brackets(&self) -> &AgeBrackets {
        &self.brackets
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

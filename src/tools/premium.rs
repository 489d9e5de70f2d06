//! The `premium_filter` lookup tool.
//!
//! Quotes the premium of one coverage tier for every disease stage, given
//! the customer's age, gender and cancer type. Unsupported inputs and table
//! misses are answered with a question or apology the model can relay.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{BotError, Result};

use super::normalize::{value_to_text, CancerType, CoverageOption, Gender, Stage};
use super::table::PremiumTable;
use super::Tool;

/// Name the model uses to call the lookup.
pub const TOOL_NAME: &str = "premium_filter";

const TOOL_DESCRIPTION: &str = "Get the insurance premium for a type of cancer based on the \
customer's age, gender and cancer type. Returns the premium of the chosen plan for the early, \
major and advanced stages. Age can be a specific age like \"23\" or one of the supported age \
groups. Option is A (Premium), B (Standard) or C (Basic) and defaults to A.";

const MAJOR_DESCRIPTION: &str = "offering balanced benefits for more intensive treatments and care";
const ADVANCED_DESCRIPTION: &str =
    "ensuring appropriate support for advanced treatments and hospitalizations";
const CLOSING: &str = "This plan is designed to give you peace of mind, knowing that your medical \
expenses are covered, allowing you to focus on your recovery. Would you be interested in \
exploring this option further?";

/// Arguments as the model sends them.
#[derive(Debug, Clone, Deserialize)]
pub struct PremiumQuery {
    pub age: Value,
    pub cancer: String,
    pub gender: String,
    #[serde(default)]
    pub option: Option<String>,
}

impl PremiumQuery {
    pub fn new(age: &str, cancer: &str, gender: &str, option: Option<&str>) -> Self {
        Self {
            age: Value::String(age.to_string()),
            cancer: cancer.to_string(),
            gender: gender.to_string(),
            option: option.map(str::to_string),
        }
    }
}

/// Premium lookup over a shared, preloaded table.
pub struct PremiumLookupTool {
    table: Arc<PremiumTable>,
}

impl PremiumLookupTool {
    pub fn new(table: Arc<PremiumTable>) -> Self {
        Self { table }
    }

    /// Answer one query. Pure: identical queries yield identical text.
    pub fn quote(&self, query: &PremiumQuery) -> String {
        let option = CoverageOption::parse(query.option.as_deref());

        let Some(gender) = Gender::parse(&query.gender) else {
            return "I need to know if you're looking for coverage for a male or female. \
                    Could you please clarify?"
                .to_string();
        };
        let Some(cancer) = CancerType::parse(&query.cancer) else {
            return format!(
                "We provide coverage for {}. Which type are you interested in?",
                CancerType::joined()
            );
        };

        let brackets = self.table.brackets();
        let age_match = brackets.normalize_value(&query.age);
        let Some(bracket) = age_match.bracket() else {
            return format!(
                "Please provide a valid age. We have plans for these age groups: {}.",
                brackets.labels().join(", ")
            );
        };

        let rows = self.table.lookup(bracket, cancer.as_str(), gender.as_str());
        // Later rows for the same stage override earlier ones.
        let mut premiums: [Option<&str>; 3] = [None; 3];
        for row in &rows {
            if let Some(stage) = Stage::parse(&row.stage) {
                premiums[stage as usize] = Some(row.premium(option));
            }
        }

        if rows.is_empty() {
            return format!(
                "I don't currently have coverage information for {} at age {} for {}s. \
                 Would you like to explore other options?",
                cancer,
                value_to_text(&query.age),
                gender
            );
        }

        format_quote(cancer, option, &premiums)
    }
}

fn format_quote(cancer: CancerType, option: CoverageOption, premiums: &[Option<&str>; 3]) -> String {
    let plan = option.plan_name();
    let mut out = format!(
        "For someone in your situation, we have several coverage options available for {}. \
         Let's look at the {} plan:\n\n",
        cancer, plan
    );
    for stage in Stage::ALL {
        let Some(premium) = premiums[stage as usize] else {
            continue;
        };
        let line = match stage {
            Stage::Early => format!(
                "- **{}**: The {} plan is IDR {}. It {}.\n",
                stage.label(),
                plan,
                premium,
                option.early_description()
            ),
            Stage::Major => format!(
                "- **{}**: The {} plan is IDR {}, {}.\n",
                stage.label(),
                plan,
                premium,
                MAJOR_DESCRIPTION
            ),
            Stage::Advanced => format!(
                "- **{}**: The {} plan is IDR {}, {}.\n",
                stage.label(),
                plan,
                premium,
                ADVANCED_DESCRIPTION
            ),
        };
        out.push_str(&line);
    }
    out.push('\n');
    out.push_str(CLOSING);
    out
}

#[async_trait]
impl Tool for PremiumLookupTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        TOOL_DESCRIPTION
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "age": {
                    "type": "string",
                    "description": "Age of the person, e.g. \"23\", or a supported age group"
                },
                "cancer": {
                    "type": "string",
                    "description": "Type of cancer",
                    "enum": CancerType::ALL.iter().map(|c| c.as_str()).collect::<Vec<_>>()
                },
                "gender": {
                    "type": "string",
                    "description": "Male or Female"
                },
                "option": {
                    "type": "string",
                    "description": "A (Premium), B (Standard) or C (Basic). Defaults to A."
                }
            },
            "required": ["age", "cancer", "gender"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let query: PremiumQuery = serde_json::from_value(args)
            .map_err(|e| BotError::Tool(format!("invalid {} arguments: {}", TOOL_NAME, e)))?;
        Ok(self.quote(&query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool() -> PremiumLookupTool {
        let table = PremiumTable::from_json_str(
            r#"[
            {"Age": "20", "Cancer_type": "Lung Cancer", "Stage": "Advanced Stage", "Gender": "Male",
             "Option A": "300", "Option B": "200", "Option C": "100"},
            {"Age": "20", "Cancer_type": "Lung Cancer", "Stage": "Early Stage", "Gender": "Male",
             "Option A": "100", "Option B": "70", "Option C": "40"},
            {"Age": "25", "Cancer_type": "Skin Cancer", "Stage": "Early Stage", "Gender": "Female",
             "Option A": "90", "Option B": "60", "Option C": "30"}
        ]"#,
        )
        .unwrap();
        PremiumLookupTool::new(Arc::new(table))
    }

    #[test]
    fn test_stages_in_fixed_order_and_missing_skipped() {
        let text = tool().quote(&PremiumQuery::new("20", "Lung Cancer", "Male", Some("B")));
        let early = text.find("**Early Stage**").unwrap();
        let advanced = text.find("**Advanced Stage**").unwrap();
        assert!(early < advanced);
        assert!(!text.contains("Major Stage"));
        assert!(text.contains("The Standard plan is IDR 70. It provides essential support"));
        assert!(text.contains("The Standard plan is IDR 200, ensuring appropriate support"));
        assert!(text.ends_with("Would you be interested in exploring this option further?"));
    }

    #[test]
    fn test_invalid_cancer_lists_supported_types() {
        let text = tool().quote(&PremiumQuery::new("20", "liver cancer", "Male", None));
        assert_eq!(
            text,
            "We provide coverage for Kidney Cancer, Lung Cancer, Throat Cancer, Skin Cancer, \
             Thyroid Cancer, Cervical Cancer, Bone Cancer, Bladder Cancer. Which type are you \
             interested in?"
        );
    }

    #[test]
    fn test_invalid_age_lists_groups() {
        let text = tool().quote(&PremiumQuery::new("old", "Lung Cancer", "Male", None));
        assert_eq!(
            text,
            "Please provide a valid age. We have plans for these age groups: 20, 25."
        );
    }

    #[test]
    fn test_miss_reports_original_age() {
        let text = tool().quote(&PremiumQuery::new("27", "Lung Cancer", "Female", None));
        assert_eq!(
            text,
            "I don't currently have coverage information for Lung Cancer at age 27 for \
             Females. Would you like to explore other options?"
        );
    }

    #[test]
    fn test_gender_checked_before_cancer() {
        let text = tool().quote(&PremiumQuery::new("x", "nothing", "robot", None));
        assert!(text.starts_with("I need to know if you're looking for coverage"));
    }

    #[tokio::test]
    async fn test_execute_accepts_numeric_age() {
        let text = tool()
            .execute(json!({"age": 22, "cancer": "lung cancer", "gender": "male"}))
            .await
            .unwrap();
        assert!(text.contains("Let's look at the Premium plan"));
        assert!(text.contains("IDR 100"));
    }

    #[tokio::test]
    async fn test_execute_rejects_missing_fields() {
        let err = tool().execute(json!({"age": "20"})).await.unwrap_err();
        assert!(matches!(err, BotError::Tool(_)));
    }

    #[test]
    fn test_definition() {
        let def = tool().definition();
        assert_eq!(def.name, "premium_filter");
        assert_eq!(def.parameters["required"], json!(["age", "cancer", "gender"]));
    }
}

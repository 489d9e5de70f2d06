//! Typed normalization of loose tool arguments.
//!
//! The model passes age, gender, cancer type and plan option as free text
//! (age sometimes as a JSON number). Everything here is total: each function
//! returns a canonical value or an explicit "unrecognized" outcome, never an
//! error.

use std::fmt;

use serde_json::Value;

/// Python-style `capitalize`: first character upper-cased, the rest lower.
///
/// # Example
/// ```
/// use premiumbot::tools::normalize::capitalize;
///
/// assert_eq!(capitalize("  fEMALE "), "Female");
/// ```
pub fn capitalize(raw: &str) -> String {
    let mut chars = raw.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Title case: every letter that follows a non-letter is upper-cased, every
/// other letter lower-cased.
///
/// # Example
/// ```
/// use premiumbot::tools::normalize::title_case;
///
/// assert_eq!(title_case("lung cancer"), "Lung Cancer");
/// ```
pub fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_alpha = false;
    for c in raw.trim().chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Gender values covered by the premium table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    /// Normalize and match free text. `None` when it is neither value.
    pub fn parse(raw: &str) -> Option<Self> {
        match capitalize(raw).as_str() {
            "Male" => Some(Gender::Male),
            "Female" => Some(Gender::Female),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cancer types covered by the premium table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancerType {
    Kidney,
    Lung,
    Throat,
    Skin,
    Thyroid,
    Cervical,
    Bone,
    Bladder,
}

impl CancerType {
    /// All supported types, in the order they are offered to the customer.
    pub const ALL: [CancerType; 8] = [
        CancerType::Kidney,
        CancerType::Lung,
        CancerType::Throat,
        CancerType::Skin,
        CancerType::Thyroid,
        CancerType::Cervical,
        CancerType::Bone,
        CancerType::Bladder,
    ];

    /// Normalize and match free text such as `"lung cancer"`.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = title_case(raw);
        Self::ALL.into_iter().find(|c| c.as_str() == normalized)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CancerType::Kidney => "Kidney Cancer",
            CancerType::Lung => "Lung Cancer",
            CancerType::Throat => "Throat Cancer",
            CancerType::Skin => "Skin Cancer",
            CancerType::Thyroid => "Thyroid Cancer",
            CancerType::Cervical => "Cervical Cancer",
            CancerType::Bone => "Bone Cancer",
            CancerType::Bladder => "Bladder Cancer",
        }
    }

    /// Comma-separated list of every supported type.
    pub fn joined() -> String {
        Self::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for CancerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coverage tier. Unknown input falls back to [`CoverageOption::A`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CoverageOption {
    #[default]
    A,
    B,
    C,
}

impl CoverageOption {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_uppercase()).as_deref() {
            Some("B") => CoverageOption::B,
            Some("C") => CoverageOption::C,
            _ => CoverageOption::A,
        }
    }

    /// Customer-facing plan name.
    pub fn plan_name(&self) -> &'static str {
        match self {
            CoverageOption::A => "Premium",
            CoverageOption::B => "Standard",
            CoverageOption::C => "Basic",
        }
    }

    /// Plan-specific sentence used for the early stage.
    pub fn early_description(&self) -> &'static str {
        match self {
            CoverageOption::A => {
                "provides extensive coverage for treatments, hospital stays, and specialized care"
            }
            CoverageOption::B => {
                "provides essential support for treatments and hospital stays at a moderate price"
            }
            CoverageOption::C => {
                "offers basic coverage for essential treatments at our most affordable rate"
            }
        }
    }
}

/// Disease-progression stage, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Early,
    Major,
    Advanced,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Early, Stage::Major, Stage::Advanced];

    /// Match a table label such as `"Early Stage"` (case-insensitive).
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = title_case(raw);
        Self::ALL.into_iter().find(|s| s.label() == normalized)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Early => "Early Stage",
            Stage::Major => "Major Stage",
            Stage::Advanced => "Advanced Stage",
        }
    }
}

/// One age bracket label from the table, e.g. `"30"` or `"20-25"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgeBracket {
    label: String,
    lower: Option<i64>,
    upper: Option<i64>,
}

impl AgeBracket {
    /// Parse a label. Labels that are not numeric are kept for exact matching only.
    pub fn new(label: &str) -> Self {
        let label = label.trim().to_string();
        let (lower, upper) = match label.split_once('-') {
            Some((lo, hi)) => (lo.trim().parse().ok(), hi.trim().parse().ok()),
            None => (label.parse().ok(), None),
        };
        Self {
            label,
            lower,
            upper,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    fn contains(&self, age: i64) -> bool {
        match (self.lower, self.upper) {
            (Some(lo), Some(hi)) => lo <= age && age < hi,
            _ => false,
        }
    }
}

/// Outcome of age normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgeMatch {
    /// The input equals a bracket label.
    Exact(String),
    /// A numeric input mapped onto a bracket.
    Mapped { bracket: String, age: i64 },
    /// Not a bracket label and not a number.
    Unrecognized,
}

impl AgeMatch {
    /// The bracket label, if one was found.
    pub fn bracket(&self) -> Option<&str> {
        match self {
            AgeMatch::Exact(b) | AgeMatch::Mapped { bracket: b, .. } => Some(b),
            AgeMatch::Unrecognized => None,
        }
    }
}

/// The set of age brackets present in the reference table.
#[derive(Debug, Clone, Default)]
pub struct AgeBrackets {
    /// Numeric brackets first, ascending by lower bound, then the rest by label.
    brackets: Vec<AgeBracket>,
}

impl AgeBrackets {
    /// Build from labels; duplicates are collapsed.
    pub fn from_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let mut brackets: Vec<AgeBracket> = Vec::new();
        for label in labels {
            let bracket = AgeBracket::new(label);
            if !brackets.iter().any(|b| b.label == bracket.label) {
                brackets.push(bracket);
            }
        }
        brackets.sort_by(|a, b| match (a.lower, b.lower) {
            (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.label.cmp(&b.label)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.label.cmp(&b.label),
        });
        Self { brackets }
    }

    pub fn labels(&self) -> Vec<&str> {
        self.brackets.iter().map(|b| b.label.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.brackets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brackets.is_empty()
    }

    /// Map raw age text onto a bracket.
    ///
    /// 1. An exact label match wins.
    /// 2. A whole number inside a `lower-upper` range (upper exclusive) maps to
    ///    the first such range.
    /// 3. Otherwise it maps to the bracket with the greatest lower bound at or
    ///    below the age; ages under every bracket map to the lowest one.
    pub fn normalize(&self, raw: &str) -> AgeMatch {
        let raw = raw.trim();
        if self.brackets.iter().any(|b| b.label == raw) {
            return AgeMatch::Exact(raw.to_string());
        }

        let age: i64 = match raw.parse() {
            Ok(age) => age,
            Err(_) => return AgeMatch::Unrecognized,
        };

        if let Some(b) = self.brackets.iter().find(|b| b.contains(age)) {
            return AgeMatch::Mapped {
                bracket: b.label.clone(),
                age,
            };
        }

        let numeric = || self.brackets.iter().filter(|b| b.lower.is_some());
        let floor = numeric()
            .filter(|b| b.lower.is_some_and(|lo| lo <= age))
            .last()
            .or_else(|| numeric().next());

        match floor {
            Some(b) => AgeMatch::Mapped {
                bracket: b.label.clone(),
                age,
            },
            None => AgeMatch::Unrecognized,
        }
    }

    /// Normalize a JSON argument that may be a string or a number.
    pub fn normalize_value(&self, raw: &Value) -> AgeMatch {
        self.normalize(&value_to_text(raw))
    }
}

/// Render a loose scalar argument as text. Whole floats lose their `.0`.
pub fn value_to_text(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(f)) if f.fract() == 0.0 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

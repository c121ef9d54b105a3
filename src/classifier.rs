// 🏷️ Expense Classifier - Keywords as Data
// Substring matching over two keyword lists with an amount fallback

use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Need keywords. Checked first, so they win over Want keywords.
pub const NEED_KEYWORDS: &[&str] = &[
    "rent",
    "grocery",
    "medicine",
    "electricity",
    "water",
    "transport",
    "food",
];

/// Want keywords.
pub const WANT_KEYWORDS: &[&str] = &[
    "netflix",
    "movie",
    "uber eats",
    "shopping",
    "gaming",
    "concert",
    "starbucks",
];

/// Unmatched expenses at or below this amount are Wants, above it Needs.
pub const FALLBACK_THRESHOLD: f64 = 200.0;

// ============================================================================
// CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Need,
    Want,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Need => "Need",
            Category::Want => "Want",
        }
    }

    /// Plural label used by the breakdown view
    pub fn plural(&self) -> &'static str {
        match self {
            Category::Need => "Needs",
            Category::Want => "Wants",
        }
    }

    /// Display color: green for Needs, orange for Wants
    pub fn color(&self) -> &'static str {
        match self {
            Category::Need => "#4caf50",
            Category::Want => "#ff9800",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// CLASSIFIER
// ============================================================================

/// Anything that can tag a new expense.
pub trait ExpenseClassifier {
    fn classify(&self, description: &str, amount: f64) -> Category;
}

/// On-disk shape of a keyword rules file. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
struct KeywordRules {
    need: Option<Vec<String>>,
    want: Option<Vec<String>>,
    threshold: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeywordClassifier {
    need: Vec<String>,
    want: Vec<String>,
    threshold: f64,
}

impl KeywordClassifier {
    /// Build from arbitrary keyword lists. Keywords are lowercased; blanks are dropped.
    pub fn new<N, W>(need: N, want: W, threshold: f64) -> Self
    where
        N: IntoIterator,
        N::Item: AsRef<str>,
        W: IntoIterator,
        W::Item: AsRef<str>,
    {
        KeywordClassifier {
            need: normalize_keywords(need),
            want: normalize_keywords(want),
            threshold,
        }
    }

    /// Load overrides from a JSON rules file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read rules file: {:?}", path.as_ref()))?;

        Self::from_json(&content)
    }

    /// Parse overrides from JSON. Missing fields keep the built-in defaults.
    pub fn from_json(content: &str) -> Result<Self> {
        let rules: KeywordRules =
            serde_json::from_str(content).context("Failed to parse keyword rules JSON")?;

        let defaults = Self::default();
        let need = rules.need.map(normalize_keywords).unwrap_or(defaults.need);
        let want = rules.want.map(normalize_keywords).unwrap_or(defaults.want);
        let threshold = match rules.threshold {
            Some(t) if t.is_finite() => t,
            Some(t) => anyhow::bail!("Fallback threshold must be finite, got {}", t),
            None => defaults.threshold,
        };

        Ok(KeywordClassifier { need, want, threshold })
    }

    pub fn need_keywords(&self) -> &[String] {
        &self.need
    }

    pub fn want_keywords(&self) -> &[String] {
        &self.want
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// First keyword from `keywords` found inside `text` (already lowercase)
    fn first_match<'a>(keywords: &'a [String], text: &str) -> Option<&'a str> {
        keywords
            .iter()
            .find(|kw| text.contains(kw.as_str()))
            .map(String::as_str)
    }

    /// Classify and report which keyword fired, if any
    pub fn explain(&self, description: &str, amount: f64) -> (Category, Option<&str>) {
        let lower = description.to_lowercase();

        if let Some(kw) = Self::first_match(&self.need, &lower) {
            return (Category::Need, Some(kw));
        }
        if let Some(kw) = Self::first_match(&self.want, &lower) {
            return (Category::Want, Some(kw));
        }

        let category = if amount <= self.threshold {
            Category::Want
        } else {
            Category::Need
        };
        (category, None)
    }
}

impl ExpenseClassifier for KeywordClassifier {
    fn classify(&self, description: &str, amount: f64) -> Category {
        self.explain(description, amount).0
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(NEED_KEYWORDS, WANT_KEYWORDS, FALLBACK_THRESHOLD)
    }
}

fn normalize_keywords<I>(keywords: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    keywords
        .into_iter()
        .map(|kw| kw.as_ref().trim().to_lowercase())
        .filter(|kw| !kw.is_empty())
        .collect()
}

/// Classify with the built-in keyword sets and threshold.
pub fn classify(description: &str, amount: f64) -> Category {
    KeywordClassifier::default().classify(description, amount)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_need_keyword() {
        assert_eq!(classify("Rent payment", 1000.0), Category::Need);
        assert_eq!(classify("GROCERY run", 10.0), Category::Need);
    }

    #[test]
    fn test_want_keyword() {
        assert_eq!(classify("Netflix subscription", 15.0), Category::Want);
        assert_eq!(classify("Concert tickets", 5000.0), Category::Want);
    }

    #[test]
    fn test_substring_collision_is_preserved() {
        // "carpentry" contains "rent"
        assert_eq!(classify("Bought carpentry tools", 50.0), Category::Need);
    }

    #[test]
    fn test_need_wins_over_want() {
        assert_eq!(classify("Uber Eats food order", 30.0), Category::Need);
        assert_eq!(classify("Movie night water bottles", 30.0), Category::Need);
    }

    #[test]
    fn test_amount_fallback() {
        assert_eq!(classify("Coffee", 150.0), Category::Want);
        assert_eq!(classify("Coffee", 200.0), Category::Want);
        assert_eq!(classify("Coffee", 250.0), Category::Need);
        assert_eq!(classify("", 0.0), Category::Want);
    }

    #[test]
    fn test_default_classifier_matches_free_function() {
        let classifier = KeywordClassifier::default();
        let cases = [
            ("Rent payment", 1000.0),
            ("Netflix subscription", 15.0),
            ("Bought carpentry tools", 50.0),
            ("Coffee", 150.0),
            ("Coffee", 250.0),
            ("Starbucks latte", 900.0),
        ];

        for (desc, amount) in cases {
            assert_eq!(classifier.classify(desc, amount), classify(desc, amount), "{}", desc);
        }
    }

    #[test]
    fn test_explain_reports_keyword() {
        let classifier = KeywordClassifier::default();

        assert_eq!(
            classifier.explain("Monthly RENT", 10.0),
            (Category::Need, Some("rent"))
        );
        assert_eq!(
            classifier.explain("uber eats dinner", 10.0),
            (Category::Want, Some("uber eats"))
        );
        assert_eq!(classifier.explain("Coffee", 10.0), (Category::Want, None));
    }

    #[test]
    fn test_rules_json_overrides() {
        let json = r#"{"need": ["Gym", "  "], "threshold": 50}"#;
        let classifier = KeywordClassifier::from_json(json).unwrap();

        assert_eq!(classifier.need_keywords(), &["gym".to_string()]);
        assert_eq!(classifier.want_keywords().len(), WANT_KEYWORDS.len());
        assert_eq!(classifier.threshold(), 50.0);

        assert_eq!(classifier.classify("gym membership", 10.0), Category::Need);
        // "rent" is no longer a Need keyword
        assert_eq!(classifier.classify("Rent", 40.0), Category::Want);
        assert_eq!(classifier.classify("Rent", 60.0), Category::Need);
    }

    #[test]
    fn test_rules_json_rejects_garbage() {
        assert!(KeywordClassifier::from_json("not json").is_err());
        assert!(KeywordClassifier::from_json(r#"{"need": "rent"}"#).is_err());
    }

    #[test]
    fn test_rules_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        fs::write(&path, r#"{"want": ["vinyl"]}"#).unwrap();

        let classifier = KeywordClassifier::from_file(&path).unwrap();
        assert_eq!(classifier.classify("vinyl records", 999.0), Category::Want);
        assert!(KeywordClassifier::from_file(dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_category_serde_names() {
        assert_eq!(serde_json::to_string(&Category::Need).unwrap(), "\"Need\"");
        let want: Category = serde_json::from_str("\"Want\"").unwrap();
        assert_eq!(want, Category::Want);
        assert!(serde_json::from_str::<Category>("\"need\"").is_err());
    }
}

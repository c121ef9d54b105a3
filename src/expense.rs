// 💸 Expense Model - Value types for the persisted tracker state
//
// An Expense is a value: created once, tagged once, never edited.
// TrackerState is the whole persisted unit (list + budget).

use crate::classifier::{Category, ExpenseClassifier};
use crate::error::InputError;
use serde::{Deserialize, Serialize};

/// Budget used when nothing has been persisted yet
pub const DEFAULT_BUDGET: f64 = 5000.0;

// ============================================================================
// EXPENSE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub name: String,

    pub amount: f64,

    /// Assigned at creation, serialized as `type`
    #[serde(rename = "type")]
    pub category: Category,
}

impl Expense {
    /// Validate input and tag it with `classifier`
    pub fn new(
        name: &str,
        amount: f64,
        classifier: &dyn ExpenseClassifier,
    ) -> Result<Self, InputError> {
        let name = validate_name(name)?;
        let amount = validate_amount(amount)?;
        let category = classifier.classify(&name, amount);

        Ok(Expense { name, amount, category })
    }

    /// Build from raw form text (name field + amount field)
    pub fn from_input(
        name: &str,
        amount_text: &str,
        classifier: &dyn ExpenseClassifier,
    ) -> Result<Self, InputError> {
        // Name is checked first so an empty form reports the name
        validate_name(name)?;
        let amount = parse_amount(amount_text)?;
        Self::new(name, amount, classifier)
    }

    pub fn is_need(&self) -> bool {
        self.category == Category::Need
    }

    /// True if every field satisfies the model invariants
    pub fn is_well_formed(&self) -> bool {
        !self.name.trim().is_empty() && self.amount.is_finite() && self.amount >= 0.0
    }
}

fn validate_name(name: &str) -> Result<String, InputError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(InputError::EmptyName);
    }
    Ok(trimmed.to_string())
}

fn validate_amount(amount: f64) -> Result<f64, InputError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(InputError::NegativeAmount(amount));
    }
    Ok(amount)
}

/// Parse an amount typed by the user. Rejects non-numbers, NaN/inf and negatives.
pub fn parse_amount(text: &str) -> Result<f64, InputError> {
    let trimmed = text.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| InputError::InvalidAmount(text.to_string()))?;

    if !value.is_finite() {
        return Err(InputError::InvalidAmount(text.to_string()));
    }
    validate_amount(value)
}

/// Parse a budget typed by the user
pub fn parse_budget(text: &str) -> Result<f64, InputError> {
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(InputError::InvalidBudget(text.to_string())),
    }
}

// ============================================================================
// TRACKER STATE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerState {
    /// Insertion order = display order = deletion-index order
    pub expenses: Vec<Expense>,

    pub budget: f64,
}

impl TrackerState {
    pub fn new(expenses: Vec<Expense>, budget: f64) -> Self {
        TrackerState { expenses, budget }
    }

    pub fn total_spent(&self) -> f64 {
        self.expenses.iter().fold(0.0, |acc, e| acc + e.amount)
    }

    pub fn total_for(&self, category: Category) -> f64 {
        self.expenses
            .iter()
            .filter(|e| e.category == category)
            .fold(0.0, |acc, e| acc + e.amount)
    }

    /// Over budget once the total strictly exceeds the budget
    pub fn is_over_budget(&self) -> bool {
        self.total_spent() > self.budget
    }

    /// Remove the expense at `index`, keeping the order of the rest
    pub fn remove(&mut self, index: usize) -> Option<Expense> {
        if index < self.expenses.len() {
            Some(self.expenses.remove(index))
        } else {
            None
        }
    }

    pub fn is_well_formed(&self) -> bool {
        self.budget.is_finite()
            && self.budget >= 0.0
            && self.expenses.iter().all(Expense::is_well_formed)
    }
}

impl Default for TrackerState {
    fn default() -> Self {
        TrackerState {
            expenses: Vec::new(),
            budget: DEFAULT_BUDGET,
        }
    }
}

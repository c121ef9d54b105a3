// 📊 Summary - Totals, budget status and the Needs vs Wants breakdown
//
// Derived on demand from a TrackerState; nothing here is persisted.

use crate::classifier::Category;
use crate::expense::TrackerState;
use serde::Serialize;

/// One slice of the Needs vs Wants breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub category: Category,
    pub label: &'static str,
    pub value: f64,
    pub count: usize,
    /// Fraction of total spending in 0.0..=1.0 (0.0 when nothing is spent)
    pub share: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_spent: f64,
    pub budget: f64,
    /// Budget minus total; negative once over budget
    pub remaining: f64,
    pub over_budget: bool,
    pub expense_count: usize,
    /// Always `[Needs, Wants]`
    pub breakdown: [Slice; 2],
}

impl Summary {
    pub fn of(state: &TrackerState) -> Self {
        let total_spent = state.total_spent();

        Summary {
            total_spent,
            budget: state.budget,
            remaining: state.budget - total_spent,
            over_budget: state.is_over_budget(),
            expense_count: state.expenses.len(),
            breakdown: [
                slice(state, Category::Need, total_spent),
                slice(state, Category::Want, total_spent),
            ],
        }
    }

    pub fn needs(&self) -> &Slice {
        &self.breakdown[0]
    }

    pub fn wants(&self) -> &Slice {
        &self.breakdown[1]
    }

    /// Fraction of the budget already used (may exceed 1.0)
    pub fn budget_used(&self) -> f64 {
        if self.budget > 0.0 {
            self.total_spent / self.budget
        } else if self.total_spent > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    }
}

/// `₹1234.50` style amount
pub fn format_money(amount: f64, currency: &str) -> String {
    if amount < 0.0 {
        format!("-{}{:.2}", currency, -amount)
    } else {
        format!("{}{:.2}", currency, amount)
    }
}

/// Clamp a share into 0.0..=1.0 for drawing; NaN and infinities draw as empty
pub fn bar_ratio(share: f64) -> f64 {
    if share.is_finite() {
        share.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Horizontal bar like `████████░░░░░░░░░░░░` for a share in 0.0..=1.0
pub fn ascii_bar(share: f64, width: usize) -> String {
    let ratio = bar_ratio(share);
    let filled = ((ratio * width as f64).round() as usize).min(width);
    let empty = width.saturating_sub(filled);

    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

fn slice(state: &TrackerState, category: Category, total: f64) -> Slice {
    let value = state.total_for(category);
    let count = state
        .expenses
        .iter()
        .filter(|e| e.category == category)
        .count();
    let share = if total > 0.0 { value / total } else { 0.0 };
    // An infinite total gives inf/inf
    let share = if share.is_finite() { share } else { 0.0 };

    Slice {
        category,
        label: category.plural(),
        value,
        count,
        share,
        color: category.color(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expense::Expense;

    fn state(entries: &[(&str, f64, Category)], budget: f64) -> TrackerState {
        TrackerState::new(
            entries
                .iter()
                .map(|(name, amount, category)| Expense {
                    name: name.to_string(),
                    amount: *amount,
                    category: *category,
                })
                .collect(),
            budget,
        )
    }

    #[test]
    fn test_empty_summary() {
        let summary = Summary::of(&TrackerState::default());

        assert_eq!(summary.total_spent, 0.0);
        assert_eq!(summary.remaining, 5000.0);
        assert!(!summary.over_budget);
        assert_eq!(summary.needs().share, 0.0);
        assert_eq!(summary.wants().share, 0.0);
        assert_eq!(summary.needs().label, "Needs");
        assert_eq!(summary.wants().color, "#ff9800");
        assert_eq!(summary.budget_used(), 0.0);
    }

    #[test]
    fn test_breakdown_sums_by_category() {
        let s = state(
            &[
                ("Rent", 750.0, Category::Need),
                ("Movie", 50.0, Category::Want),
                ("Food", 150.0, Category::Need),
                ("Gaming", 50.0, Category::Want),
            ],
            2000.0,
        );
        let summary = Summary::of(&s);

        assert_eq!(summary.total_spent, 1000.0);
        assert_eq!(summary.needs().value, 900.0);
        assert_eq!(summary.needs().count, 2);
        assert_eq!(summary.wants().value, 100.0);
        assert!((summary.needs().share - 0.9).abs() < 1e-12);
        assert!((summary.wants().share - 0.1).abs() < 1e-12);
        assert_eq!(summary.remaining, 1000.0);
        assert_eq!(summary.budget_used(), 0.5);
    }

    #[test]
    fn test_over_budget_flag() {
        let s = state(&[("Rent", 5000.01, Category::Need)], 5000.0);
        let summary = Summary::of(&s);

        assert!(summary.over_budget);
        assert!(summary.remaining < 0.0);
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(1000.0, "₹"), "₹1000.00");
        assert_eq!(format_money(12.5, "$"), "$12.50");
        assert_eq!(format_money(-20.0, "$"), "-$20.00");
    }

    #[test]
    fn test_ascii_bar() {
        assert_eq!(ascii_bar(0.5, 4), "██░░");
        assert_eq!(ascii_bar(0.0, 3), "░░░");
        assert_eq!(ascii_bar(2.0, 3), "███");
        assert_eq!(ascii_bar(f64::NAN, 2), "░░");
    }

    #[test]
    fn test_bar_ratio() {
        assert_eq!(bar_ratio(0.25), 0.25);
        assert_eq!(bar_ratio(-1.0), 0.0);
        assert_eq!(bar_ratio(1.5), 1.0);
        assert_eq!(bar_ratio(f64::NAN), 0.0);
        assert_eq!(bar_ratio(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_infinite_total_keeps_shares_finite() {
        let s = state(
            &[("Rent", 1e308, Category::Need), ("Rent again", 1e308, Category::Need)],
            5000.0,
        );
        let summary = Summary::of(&s);

        assert!(summary.total_spent.is_infinite());
        assert!(summary.over_budget);
        assert_eq!(summary.needs().share, 0.0);
        assert_eq!(summary.wants().share, 0.0);
    }

    #[test]
    fn test_zero_budget() {
        let summary = Summary::of(&state(&[], 0.0));
        assert!(!summary.over_budget);
        assert_eq!(summary.budget_used(), 0.0);

        let summary = Summary::of(&state(&[("Movie", 1.0, Category::Want)], 0.0));
        assert!(summary.over_budget);
        assert!(summary.budget_used().is_infinite());
    }
}

// 🧾 Tracker Session - The single owner of the in-memory state
//
// Load once on open, persist after every successful mutation.
// Rejected input never reaches the store.

use crate::classifier::KeywordClassifier;
use crate::error::InputError;
use crate::expense::{parse_budget, Expense, TrackerState};
use crate::store::{KeyValueStore, LoadOutcome, Store};
use crate::summary::Summary;

pub struct Tracker<S> {
    store: Store<S>,
    state: TrackerState,
    classifier: KeywordClassifier,
    outcome: LoadOutcome,
}

impl<S: KeyValueStore> Tracker<S> {
    /// Open a session with the built-in classifier
    pub fn open(backend: S) -> Self {
        Self::with_classifier(Store::new(backend), KeywordClassifier::default())
    }

    pub fn with_classifier(store: Store<S>, classifier: KeywordClassifier) -> Self {
        let (state, outcome) = store.load_with_outcome();
        Tracker {
            store,
            state,
            classifier,
            outcome,
        }
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.state.expenses
    }

    pub fn budget(&self) -> f64 {
        self.state.budget
    }

    pub fn classifier(&self) -> &KeywordClassifier {
        &self.classifier
    }

    /// How the state was obtained when the session opened
    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.outcome
    }

    pub fn summary(&self) -> Summary {
        Summary::of(&self.state)
    }

    pub fn store(&self) -> &Store<S> {
        &self.store
    }

    /// Add from raw form text
    pub fn add_expense(&mut self, name: &str, amount_text: &str) -> Result<&Expense, InputError> {
        let expense = Expense::from_input(name, amount_text, &self.classifier)
            .inspect_err(|err| tracing::debug!("rejected expense input: {}", err))?;
        self.push(expense)
    }

    pub fn add(&mut self, name: &str, amount: f64) -> Result<&Expense, InputError> {
        let expense = Expense::new(name, amount, &self.classifier)
            .inspect_err(|err| tracing::debug!("rejected expense input: {}", err))?;
        self.push(expense)
    }

    /// Totals stay finite: an expense that would overflow the running sum is rejected
    fn push(&mut self, expense: Expense) -> Result<&Expense, InputError> {
        if !(self.state.total_spent() + expense.amount).is_finite() {
            tracing::debug!(amount = expense.amount, "rejected expense: total would overflow");
            return Err(InputError::TotalOverflow(expense.amount));
        }

        tracing::info!(
            name = %expense.name,
            amount = expense.amount,
            category = %expense.category,
            "expense added"
        );
        self.state.expenses.push(expense);
        self.store.save(&self.state);

        let last = self.state.expenses.len() - 1;
        Ok(&self.state.expenses[last])
    }

    /// Remove by display index. Out of range is a no-op and nothing is written.
    pub fn delete(&mut self, index: usize) -> Option<Expense> {
        let removed = self.state.remove(index);
        match &removed {
            Some(expense) => {
                tracing::info!(index, name = %expense.name, "expense deleted");
                self.store.save(&self.state);
            }
            None => tracing::debug!(index, len = self.state.expenses.len(), "delete index out of range"),
        }
        removed
    }

    pub fn set_budget(&mut self, budget: f64) -> Result<(), InputError> {
        if !budget.is_finite() || budget < 0.0 {
            return Err(InputError::InvalidBudget(budget.to_string()));
        }
        tracing::info!(budget, "budget updated");
        self.state.budget = budget;
        self.store.save(&self.state);
        Ok(())
    }

    pub fn set_budget_text(&mut self, text: &str) -> Result<(), InputError> {
        let budget = parse_budget(text)?;
        self.set_budget(budget)
    }
}

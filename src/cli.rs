use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use expense_tracker::summary::ascii_bar;
use expense_tracker::{
    export_csv, format_money, parse_amount, AppConfig, Backend, KeyValueStore, Overrides, Tracker,
};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "expense-tracker", version, about = "Track expenses as Needs and Wants against a monthly budget")]
pub struct Cli {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Override the data directory.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Override the storage backend.
    #[arg(long, global = true, value_enum)]
    backend: Option<Backend>,
    /// JSON file with custom Need/Want keywords.
    #[arg(long, global = true)]
    rules_file: Option<PathBuf>,
    /// Currency symbol used for display.
    #[arg(long, global = true)]
    currency: Option<String>,
    /// Log filter (e.g. "info", "expense_tracker=debug").
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Interactive terminal UI (default)
    Tui,
    /// Classify and record a new expense
    Add {
        name: String,
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    /// List recorded expenses
    List,
    /// Delete the expense at a zero-based index
    Delete { index: usize },
    /// Show the budget, or set it when an amount is given
    Budget {
        #[arg(allow_hyphen_values = true)]
        amount: Option<String>,
    },
    /// Totals, budget status and Needs vs Wants breakdown
    Summary {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show how a description would be classified without saving it
    Classify {
        description: String,
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    /// Write all expenses to a CSV file
    Export { path: PathBuf },
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            config: self.config.clone(),
            data_dir: self.data_dir.clone(),
            backend: self.backend,
            rules_file: self.rules_file.clone(),
            currency: self.currency.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

pub fn run<S: KeyValueStore>(
    command: Command,
    tracker: &mut Tracker<S>,
    config: &AppConfig,
) -> Result<()> {
    let currency = config.currency.as_str();

    match command {
        // Handled by main
        Command::Tui => Ok(()),
        Command::Add { name, amount } => {
            let expense = tracker
                .add_expense(&name, &amount)
                .context("Expense not added")?;
            println!(
                "✓ Added {} - {} ({})",
                expense.name,
                format_money(expense.amount, currency),
                expense.category
            );
            print_budget_warning(tracker);
            Ok(())
        }
        Command::List => {
            if tracker.expenses().is_empty() {
                println!("No expenses recorded yet.");
                return Ok(());
            }
            for (i, expense) in tracker.expenses().iter().enumerate() {
                println!(
                    "{:>3}  {:<32} {:>12}  {}",
                    i,
                    expense.name,
                    format_money(expense.amount, currency),
                    expense.category
                );
            }
            println!(
                "\nTotal Spent: {}",
                format_money(tracker.state().total_spent(), currency)
            );
            Ok(())
        }
        Command::Delete { index } => {
            let len = tracker.expenses().len();
            match tracker.delete(index) {
                Some(expense) => {
                    println!("✓ Deleted {} - {}", expense.name, format_money(expense.amount, currency));
                    Ok(())
                }
                None => anyhow::bail!("No expense at index {} ({} recorded)", index, len),
            }
        }
        Command::Budget { amount: None } => {
            println!("Monthly Budget: {}", format_money(tracker.budget(), currency));
            Ok(())
        }
        Command::Budget { amount: Some(amount) } => {
            tracker
                .set_budget_text(&amount)
                .context("Budget not changed")?;
            println!("✓ Monthly Budget set to {}", format_money(tracker.budget(), currency));
            print_budget_warning(tracker);
            Ok(())
        }
        Command::Summary { json: true } => {
            let summary = tracker.summary();
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).context("Failed to encode summary")?
            );
            Ok(())
        }
        Command::Summary { json: false } => {
            print_summary(tracker, currency);
            Ok(())
        }
        Command::Classify { description, amount } => {
            let amount = parse_amount(&amount).context("Cannot classify")?;
            let classifier = tracker.classifier();
            let (category, keyword) = classifier.explain(&description, amount);

            match keyword {
                Some(kw) => println!("{} (keyword \"{}\")", category, kw),
                None => println!(
                    "{} (no keyword, amount {} {} {})",
                    category,
                    format_money(amount, currency),
                    if amount <= classifier.threshold() { "≤" } else { ">" },
                    format_money(classifier.threshold(), currency)
                ),
            }
            Ok(())
        }
        Command::Export { path } => {
            let rows = export_csv(tracker.expenses(), &path)?;
            println!("✓ Exported {} expenses to {}", rows, path.display());
            Ok(())
        }
    }
}

fn print_budget_warning<S: KeyValueStore>(tracker: &Tracker<S>) {
    if tracker.summary().over_budget {
        println!("⚠️  You are over your monthly budget!");
    }
}

fn print_summary<S: KeyValueStore>(tracker: &Tracker<S>, currency: &str) {
    let summary = tracker.summary();

    println!("💸 My Finance Tracker");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Expenses:      {}", summary.expense_count);
    println!("Total Spent:   {}", format_money(summary.total_spent, currency));
    println!("Budget:        {}", format_money(summary.budget, currency));
    println!("Remaining:     {}", format_money(summary.remaining, currency));

    if summary.over_budget {
        println!("\n⚠️  You are over your monthly budget!");
    }

    println!("\nBreakdown: Needs vs Wants");
    for slice in &summary.breakdown {
        println!(
            "  {:<6} {} {:>5.1}%  {} ({} entries)",
            slice.label,
            ascii_bar(slice.share, 20),
            slice.share * 100.0,
            format_money(slice.value, currency),
            slice.count
        );
    }
}

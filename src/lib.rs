// Expense Tracker - Core Library
// Classifier, persisted state and session logic shared by the CLI and the TUI

pub mod classifier;
pub mod config;
pub mod error;
pub mod expense;
pub mod export;
pub mod store;
pub mod summary;
pub mod tracker;

// Re-export commonly used types
pub use classifier::{
    classify, Category, ExpenseClassifier, KeywordClassifier,
    NEED_KEYWORDS, WANT_KEYWORDS, FALLBACK_THRESHOLD,
};
pub use config::{AppConfig, Backend, Overrides};
pub use error::{InputError, StoreError};
pub use expense::{parse_amount, parse_budget, Expense, TrackerState, DEFAULT_BUDGET};
pub use export::{export_csv, write_csv};
pub use store::{
    FileStore, KeyValueStore, LoadOutcome, MemoryStore, SqliteStore, Store, STORAGE_KEY,
};
pub use summary::{bar_ratio, format_money, Slice, Summary};
pub use tracker::Tracker;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod completion;
pub mod compose;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod history;
pub mod knowledge;
pub mod models;
pub mod notion;
#[cfg(feature = "symbolic")]
pub mod symbolic;

pub use completion::{
    split_completion, CompletionClient, CompletionConfig, CompletionError, SUMMARY_CHARS,
};
pub use compose::{choose_strategy, compose, Analysis, Strategy};
pub use config::VaultConfig;
pub use error::VaultError;
pub use history::HistoryLog;
pub use knowledge::KnowledgeBase;
pub use models::{AnalysisRecord, Category, KnowledgeNote};
pub use notion::{NotionClient, NotionConfig, NotionError, TITLE_CHARS};

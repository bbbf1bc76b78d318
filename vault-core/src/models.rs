use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of subject labels a query can be classified into.
///
/// Priority order for classification is the declaration order here:
/// Math first, General as the catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Math,
    Science,
    History,
    Literature,
    General,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Category::Math => "Math",
            Category::Science => "Science",
            Category::History => "History",
            Category::Literature => "Literature",
            Category::General => "General",
        };
        f.write_str(name)
    }
}

/// A static, preauthored topic record. Built once at startup and never
/// mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeNote {
    pub topic: String,
    pub summary: String,
    pub sources: String,
}

impl KnowledgeNote {
    pub fn new(
        topic: impl Into<String>,
        summary: impl Into<String>,
        sources: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            summary: summary.into(),
            sources: sources.into(),
        }
    }
}

/// One persisted result of a user's query. Appended to the durable log;
/// never updated or deleted. Field order matches the log's column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub timestamp: DateTime<Utc>,
    pub subject: Category,
    pub query: String,
    pub summary: String,
    pub deep_dive: String,
    pub sources: String,
}

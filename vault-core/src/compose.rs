//! Result composer — routes a classified query to one composition
//! strategy and assembles the four displayed fields.

use chrono::Utc;

use crate::completion::split_completion;
use crate::evaluator;
use crate::knowledge::KnowledgeBase;
use crate::models::{AnalysisRecord, Category};

/// The four-field result shown to the user and persisted to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub summary: String,
    pub deep_dive: String,
    pub visualization: String,
    pub sources: String,
}

impl Analysis {
    /// Stamp the analysis into a persistable record.
    pub fn into_record(self, subject: Category, query: &str) -> AnalysisRecord {
        AnalysisRecord {
            timestamp: Utc::now(),
            subject,
            query: query.to_string(),
            summary: self.summary,
            deep_dive: self.deep_dive,
            sources: self.sources,
        }
    }
}

/// One variant per composition path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Solve,
    Differentiate,
    Lookup,
    Completion,
}

/// Pick the composition strategy for a classified query.
///
/// The remote flag short-circuits everything; Math queries use the
/// evaluator when symbolic support is compiled in, choosing
/// differentiation when the query mentions "derivative" or "d/dx";
/// everything else is a static-note lookup.
pub fn choose_strategy(subject: Category, query: &str, remote: bool) -> Strategy {
    if remote {
        return Strategy::Completion;
    }
    if subject == Category::Math && evaluator::available() {
        let q = query.to_lowercase();
        if q.contains("derivative") || q.contains("d/dx") {
            return Strategy::Differentiate;
        }
        return Strategy::Solve;
    }
    Strategy::Lookup
}

/// Assemble the four-field result. Deterministic string assembly: the
/// only inputs are the strategy, the query, the knowledge base, and the
/// (already fetched) remote completion text, if any.
pub fn compose(
    kb: &KnowledgeBase,
    subject: Category,
    query: &str,
    strategy: Strategy,
    completion: Option<&str>,
) -> Analysis {
    match strategy {
        Strategy::Solve => {
            let (summary, deep_dive) = evaluator::solve(query);
            Analysis {
                summary,
                deep_dive,
                visualization: "Provide a function form for plotting, e.g., 'sin(x)' or 'x**2'."
                    .to_string(),
                sources: "Local symbolic computation.".to_string(),
            }
        }
        Strategy::Differentiate => {
            let (summary, deep_dive) = evaluator::differentiate(query);
            Analysis {
                summary,
                deep_dive,
                visualization: "Use the plot command to chart functions of x.".to_string(),
                sources: "Local symbolic computation.".to_string(),
            }
        }
        Strategy::Lookup => {
            let note = kb.lookup(subject, query);
            Analysis {
                summary: note.summary.clone(),
                deep_dive: format!(
                    "Topic: {}\n\nExpanded points:\n\
                     - Key ideas summarized from local notes.\n\
                     - Extend the built-in note lists to refine content.\n\
                     - This path avoids external calls for reliability.",
                    note.topic
                ),
                visualization: "Visualization suggestions: timelines, bar charts, concept maps."
                    .to_string(),
                sources: note.sources.clone(),
            }
        }
        Strategy::Completion => match completion {
            Some(text) => {
                let (summary, deep_dive) = split_completion(text);
                Analysis {
                    summary,
                    deep_dive,
                    visualization:
                        "Visualization suggestions: timelines, bar charts, concept maps."
                            .to_string(),
                    sources: "External completion service.".to_string(),
                }
            }
            None => Analysis {
                summary: "No result from the completion service.".to_string(),
                deep_dive: "The completion call failed or returned nothing. Check the service \
                            status and COMPLETION_API_KEY, or rerun without --remote to compose \
                            locally."
                    .to_string(),
                visualization: "Visualization suggestions: timelines, bar charts, concept maps."
                    .to_string(),
                sources: "External completion service.".to_string(),
            },
        },
    }
}

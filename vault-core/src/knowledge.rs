//! Static knowledge base — subject classification and note lookup.
//!
//! Both tables are immutable and built once at startup via
//! [`KnowledgeBase::builtin`]; callers hold a reference and pass it into
//! the pipeline explicitly rather than reading module-level state.

use crate::models::{Category, KnowledgeNote};

/// Keyword lists and note lists for every category, plus the generic
/// fallback note returned when a category has no notes at all.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    /// (category, keywords) in classification priority order.
    keywords: Vec<(Category, Vec<&'static str>)>,
    /// (category, notes) — Math deliberately has an empty list, it is
    /// served by the math evaluator instead.
    notes: Vec<(Category, Vec<KnowledgeNote>)>,
    fallback: KnowledgeNote,
}

impl KnowledgeBase {
    /// Build the preauthored dataset.
    pub fn builtin() -> Self {
        let keywords = vec![
            (
                Category::Math,
                vec![
                    "integral", "derivative", "equation", "solve", "limit", "factor",
                    "matrix", "algebra", "calculus", "∫", "∑",
                ],
            ),
            (
                Category::Science,
                vec![
                    "experiment", "hypothesis", "reaction", "photosynthesis", "biology",
                    "chemistry", "physics", "ecosystem",
                ],
            ),
            (
                Category::History,
                vec![
                    "timeline", "revolution", "world war", "causes", "history",
                    "civilization", "era", "empire",
                ],
            ),
            (
                Category::Literature,
                vec![
                    "theme", "character", "metaphor", "poem", "novel", "literature",
                    "analysis", "symbolism",
                ],
            ),
        ];

        let notes = vec![
            (Category::Math, Vec::new()),
            (
                Category::Science,
                vec![
                    KnowledgeNote::new(
                        "Photosynthesis",
                        "Plants convert light energy into chemical energy, producing glucose and oxygen from CO2 and water in chloroplasts.",
                        "Intro biology references.",
                    ),
                    KnowledgeNote::new(
                        "States of Matter",
                        "Solid, liquid, gas, and plasma differ by particle arrangement, energy, and intermolecular forces.",
                        "Chemistry textbooks.",
                    ),
                ],
            ),
            (
                Category::History,
                vec![
                    KnowledgeNote::new(
                        "World War I Causes",
                        "Militarism, alliances, imperialism, and nationalism set the stage for conflict. The assassination of Archduke Franz Ferdinand in 1914 triggered the war.",
                        "Encyclopedia entries and standard history texts.",
                    ),
                    KnowledgeNote::new(
                        "French Revolution Overview",
                        "Economic hardship, Enlightenment ideas, and social inequality led to a revolution starting in 1789, reshaping French society and politics.",
                        "Primary sources and scholarly summaries.",
                    ),
                ],
            ),
            (
                Category::Literature,
                vec![
                    KnowledgeNote::new(
                        "Metaphor",
                        "A figure of speech that describes an object or action as something else to illuminate meaning.",
                        "Literary analysis guides.",
                    ),
                    KnowledgeNote::new(
                        "Character Arc",
                        "The transformation or inner journey of a character over the course of a story.",
                        "Narrative theory materials.",
                    ),
                ],
            ),
            (
                Category::General,
                vec![
                    KnowledgeNote::new(
                        "Time Management",
                        "Prioritize tasks, use time blocking, and review daily to maintain momentum.",
                        "Productivity research.",
                    ),
                    KnowledgeNote::new(
                        "Study Strategies",
                        "Spaced repetition, active recall, and interleaving improve long-term retention.",
                        "Learning science.",
                    ),
                ],
            ),
        ];

        let fallback = KnowledgeNote::new(
            "Math",
            "Use the math tools to compute solutions or derivatives.",
            "Local computation.",
        );

        Self {
            keywords,
            notes,
            fallback,
        }
    }

    /// Classify a query into a subject by substring keyword matching.
    ///
    /// Categories are tried in priority order (Math, Science, History,
    /// Literature); the first category with any keyword hit wins, and
    /// General is the catch-all. Order-sensitive by design — this is not
    /// a scored classifier.
    pub fn classify(&self, query: &str) -> Category {
        let q = query.to_lowercase();
        if q.trim().is_empty() {
            return Category::General;
        }
        for (category, words) in &self.keywords {
            if words.iter().any(|w| q.contains(w)) {
                return *category;
            }
        }
        Category::General
    }

    /// Look up the best static note for a category and query.
    ///
    /// Total function: whitespace tokens of the lowercased query are
    /// matched as substrings against each note's topic + summary; the
    /// first note with a hit wins, otherwise the first note in the list,
    /// otherwise the generic fallback note (Math has an empty list).
    pub fn lookup(&self, category: Category, query: &str) -> &KnowledgeNote {
        let notes = self
            .notes
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, n)| n.as_slice())
            .unwrap_or(&[]);

        let q = query.to_lowercase();
        for note in notes {
            let blob = format!("{} {}", note.topic, note.summary).to_lowercase();
            if q.split_whitespace().any(|word| blob.contains(word)) {
                return note;
            }
        }
        notes.first().unwrap_or(&self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn math_keyword_wins_priority_order() {
        let kb = KnowledgeBase::builtin();
        // "solve" is a Math keyword; "reaction" is Science but Math is
        // checked first.
        assert_eq!(kb.classify("solve the reaction rate equation"), Category::Math);
        assert_eq!(kb.classify("Solve 2*x+3=11"), Category::Math);
    }

    #[test]
    fn each_category_matches_its_keywords() {
        let kb = KnowledgeBase::builtin();
        assert_eq!(kb.classify("Explain photosynthesis"), Category::Science);
        assert_eq!(kb.classify("timeline of the roman empire"), Category::History);
        assert_eq!(kb.classify("the theme of this novel"), Category::Literature);
        assert_eq!(kb.classify("how do I plan my week"), Category::General);
    }

    #[test]
    fn empty_query_is_general() {
        let kb = KnowledgeBase::builtin();
        assert_eq!(kb.classify(""), Category::General);
        assert_eq!(kb.classify("   "), Category::General);
    }

    #[test]
    fn classification_is_case_insensitive() {
        let kb = KnowledgeBase::builtin();
        assert_eq!(kb.classify("DERIVATIVE of x**2"), Category::Math);
        assert_eq!(kb.classify("WORLD WAR origins"), Category::History);
    }

    #[test]
    fn lookup_finds_note_by_token_overlap() {
        let kb = KnowledgeBase::builtin();
        let note = kb.lookup(Category::History, "revolution");
        assert_eq!(note.topic, "French Revolution Overview");

        let note = kb.lookup(Category::Science, "Explain photosynthesis");
        assert_eq!(note.topic, "Photosynthesis");
    }

    #[test]
    fn lookup_falls_back_to_first_note_on_no_hit() {
        let kb = KnowledgeBase::builtin();
        let note = kb.lookup(Category::Science, "zzzz qqqq");
        assert_eq!(note.topic, "Photosynthesis");
    }

    #[test]
    fn math_category_returns_generic_fallback() {
        let kb = KnowledgeBase::builtin();
        let note = kb.lookup(Category::Math, "anything at all");
        assert_eq!(note.topic, "Math");
        assert_eq!(note.sources, "Local computation.");
    }

    #[test]
    fn lookup_with_empty_query_returns_first_note() {
        let kb = KnowledgeBase::builtin();
        let note = kb.lookup(Category::Literature, "");
        assert_eq!(note.topic, "Metaphor");
    }
}

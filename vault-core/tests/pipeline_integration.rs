//! End-to-end pipeline tests: classify -> compose -> persist -> read back.

use vault_core::{
    choose_strategy, compose, AnalysisRecord, Category, HistoryLog, KnowledgeBase, Strategy,
};

fn analyze_locally(kb: &KnowledgeBase, query: &str) -> AnalysisRecord {
    let subject = kb.classify(query);
    let strategy = choose_strategy(subject, query, false);
    compose(kb, subject, query, strategy, None).into_record(subject, query)
}

// ===========================================================================
// TEST 1: the photosynthesis scenario — Science note flows through verbatim
// ===========================================================================
#[test]
fn test_photosynthesis_scenario() {
    let kb = KnowledgeBase::builtin();
    let record = analyze_locally(&kb, "Explain photosynthesis");

    assert_eq!(record.subject, Category::Science);
    let note = kb.lookup(Category::Science, "Explain photosynthesis");
    assert_eq!(record.summary, note.summary, "note summary must flow through verbatim");
    assert_eq!(record.sources, note.sources);
}

// ===========================================================================
// TEST 2: a math query takes the solver path end to end
// ===========================================================================
#[cfg(feature = "symbolic")]
#[test]
fn test_math_query_is_solved() {
    let kb = KnowledgeBase::builtin();
    let subject = kb.classify("solve 2*x+3=11");
    assert_eq!(subject, Category::Math);

    // the evaluator sees the expression, not the surrounding prose
    let strategy = choose_strategy(subject, "solve 2*x+3=11", false);
    assert_eq!(strategy, Strategy::Solve);

    let analysis = compose(&kb, subject, "2*x+3=11", strategy, None);
    assert_eq!(analysis.summary, "Solution: x = [4]");
}

// ===========================================================================
// TEST 3: analyze-then-save round trip through the durable log
// ===========================================================================
#[test]
fn test_analyze_and_persist_round_trip() {
    let kb = KnowledgeBase::builtin();
    let dir = tempfile::tempdir().unwrap();
    let log = HistoryLog::new(dir.path().join("vault_history.csv"));

    let queries = [
        "Explain photosynthesis",
        "causes of world war",
        "what is a metaphor",
        "how should I plan my studying",
    ];
    for q in &queries {
        log.append(&analyze_locally(&kb, q)).unwrap();
    }

    let records = log.load().unwrap();
    assert_eq!(records.len(), queries.len());
    for (record, q) in records.iter().zip(queries.iter()) {
        assert_eq!(&record.query, q);
    }
    assert_eq!(records[0].subject, Category::Science);
    assert_eq!(records[1].subject, Category::History);
    assert_eq!(records[2].subject, Category::Literature);
    assert_eq!(records[3].subject, Category::General);
}

// ===========================================================================
// TEST 4: classification priority — Math keywords win over later categories
// ===========================================================================
#[test]
fn test_math_priority_over_other_subjects() {
    let kb = KnowledgeBase::builtin();
    // "equation" (Math) appears alongside "reaction" (Science) and
    // "history" (History); Math is first in priority order.
    assert_eq!(
        kb.classify("the equation for this reaction in history"),
        Category::Math
    );
}

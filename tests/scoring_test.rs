//! Integration tests for ensemble scoring and ranking order.

use std::sync::Arc;

use sectionrank::scoring::compare_candidates;
use sectionrank::text::RuleTokenizer;
use sectionrank::{
    rank_candidates, Bm25Params, ContextualWeights, EnsembleScorer, EnsembleWeights, PageRange,
    Query, ScoreBreakdown, Section, SectionKind,
};

fn section(doc: &str, page: u32, first_block: usize, heading: Option<&str>, body: &str) -> Section {
    Section {
        document_id: doc.to_string(),
        page_range: PageRange::single(page),
        heading_text: heading.map(str::to_string),
        body_text: body.to_string(),
        constituent_block_ids: vec![first_block, first_block + 1],
        structural_confidence: if heading.is_some() { 2.0 / 3.0 } else { 0.0 },
        kind: SectionKind::classify(heading),
    }
}

fn scorer() -> EnsembleScorer {
    EnsembleScorer::new(
        Arc::new(RuleTokenizer::new()),
        EnsembleWeights::default(),
        Bm25Params::default(),
        ContextualWeights::default(),
    )
    .unwrap()
}

fn breakdown(combined: f64) -> ScoreBreakdown {
    ScoreBreakdown {
        combined_score: combined,
        ..Default::default()
    }
}

#[test]
fn test_scores_bounded_and_aligned() {
    let sections = vec![
        section("a", 1, 0, Some("Market Risk"), "currency risk and market volatility."),
        section("a", 2, 2, Some("Staff"), "the team grew to forty people."),
        section("b", 1, 0, None, ""),
    ];
    let scores = scorer().score(&Query::new("Analyst", "market risk"), &sections);

    assert_eq!(scores.len(), sections.len());
    for s in &scores {
        for value in [s.tfidf_score, s.bm25_score, s.contextual_score, s.combined_score] {
            assert!((0.0..=1.0).contains(&value));
        }
    }
    assert!(scores[0].combined_score > scores[1].combined_score);
    assert!(scores[0].tfidf_score > 0.0);
    assert_eq!(scores[2].tfidf_score, 0.0);
}

#[test]
fn test_query_without_shared_terms() {
    let sections = vec![
        section("a", 1, 0, Some("Pricing"), "prices rose in march."),
        section("a", 2, 2, Some("Hiring"), "hiring slowed in april."),
    ];
    let scores = scorer().score(&Query::new("Botanist", "classify orchids"), &sections);

    for s in &scores {
        assert_eq!(s.tfidf_score, 0.0);
        assert_eq!(s.bm25_score, 0.5);
    }
}

#[test]
fn test_tie_break_order() {
    let sections = vec![
        section("b", 1, 0, Some("Alpha"), "x"),
        section("a", 3, 4, Some("Beta"), "x"),
        section("a", 1, 8, Some("Gamma"), "x"),
        section("a", 1, 2, Some("Delta"), "x"),
        section("a", 1, 0, None, "x"),
    ];
    let breakdowns = vec![breakdown(0.5); sections.len()];
    let ranked = rank_candidates(sections, breakdowns);

    let headings: Vec<&str> = ranked.iter().map(|c| c.section.heading()).collect();
    // equal scores: higher confidence, then document, page and block order
    assert_eq!(headings, vec!["Delta", "Gamma", "Beta", "Alpha", ""]);
    let ranks: Vec<usize> = ranked.iter().map(|c| c.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_higher_score_wins_over_tie_breaks() {
    let low = section("a", 1, 0, Some("First"), "x");
    let high = section("z", 9, 40, None, "x");

    assert_eq!(
        compare_candidates((&high, &breakdown(0.9)), (&low, &breakdown(0.1))),
        std::cmp::Ordering::Less
    );
}

#[test]
fn test_invalid_weights_rejected() {
    let result = EnsembleScorer::new(
        Arc::new(RuleTokenizer::new()),
        EnsembleWeights::new(0.4, 0.4, 0.4),
        Bm25Params::default(),
        ContextualWeights::default(),
    );
    assert!(result.is_err());

    let result = EnsembleScorer::new(
        Arc::new(RuleTokenizer::new()),
        EnsembleWeights::default(),
        Bm25Params::new(-1.0, 0.75),
        ContextualWeights::default(),
    );
    assert!(result.is_err());
}

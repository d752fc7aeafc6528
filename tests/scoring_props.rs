// tests/scoring_props.rs
//
// Property-style coverage for the composite scorer: for any valid-range
// input the result is an integer in [0,100], and scoring is deterministic.

use rand::prelude::*;

use brand_health_analyzer::analyze::scoring::{
    compute_breakdown, compute_score, Article, BrandScoreInput, SerpFeatures,
};
use brand_health_analyzer::sentiment::Sentiment;

fn article(sentiment: Sentiment) -> Article {
    Article {
        title: String::new(),
        description: String::new(),
        source_name: String::new(),
        sentiment,
    }
}

fn random_input(rng: &mut impl Rng) -> BrandScoreInput {
    let article_count = rng.random_range(0..12);
    let news_articles = (0..article_count)
        .map(|_| {
            article(match rng.random_range(0..3) {
                0 => Sentiment::Positive,
                1 => Sentiment::Neutral,
                _ => Sentiment::Negative,
            })
        })
        .collect();

    BrandScoreInput {
        news_articles,
        top_search_position: if rng.random::<bool>() {
            Some(rng.random_range(1..=50))
        } else {
            None
        },
        domain_authority: if rng.random::<bool>() {
            Some(rng.random_range(0.0..=100.0))
        } else {
            None
        },
        serp_features: SerpFeatures {
            answer_box: rng.random(),
            knowledge_graph: rng.random(),
            local_results: rng.random(),
            related_questions: rng.random(),
            related_searches: rng.random(),
        },
    }
}

#[test]
fn score_stays_in_range_for_valid_inputs() {
    let mut rng = rand::rng();
    for _ in 0..1000 {
        let input = random_input(&mut rng);
        let score = compute_score(&input);
        assert!(score <= 100, "score {score} out of range for {input:?}");

        let b = compute_breakdown(&input);
        for sub in [b.news_score, b.search_score, b.domain_score, b.serp_score] {
            assert!((0.0..=100.0).contains(&sub), "sub-score {sub} out of range");
        }
    }
}

#[test]
fn scoring_is_deterministic() {
    let mut rng = rand::rng();
    for _ in 0..100 {
        let input = random_input(&mut rng);
        assert_eq!(compute_score(&input), compute_score(&input));
        assert_eq!(compute_breakdown(&input), compute_breakdown(&input));
    }
}

#[test]
fn known_anchor_points() {
    // Everything absent: round(50*0.3) = 15.
    let empty = BrandScoreInput {
        domain_authority: Some(0.0),
        ..BrandScoreInput::default()
    };
    assert_eq!(compute_score(&empty), 15);

    // Best case pins the ceiling.
    let best = BrandScoreInput {
        news_articles: vec![article(Sentiment::Positive); 4],
        top_search_position: Some(1),
        domain_authority: Some(100.0),
        serp_features: SerpFeatures {
            answer_box: true,
            knowledge_graph: true,
            local_results: true,
            related_questions: true,
            related_searches: true,
        },
    };
    assert_eq!(compute_score(&best), 100);

    // All-negative news with nothing else contributes zero everywhere.
    let worst = BrandScoreInput {
        news_articles: vec![article(Sentiment::Negative); 4],
        ..BrandScoreInput::default()
    };
    assert_eq!(compute_score(&worst), 0);
}

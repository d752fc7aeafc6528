use serde::{Deserialize, Serialize};

/// Fixed keyword sets for the lightweight classifier. Matching is substring
/// containment on the lowered text; each term contributes at most one count.
const POSITIVE_TERMS: &[&str] = &[
    "great",
    "excellent",
    "good",
    "positive",
    "success",
    "innovative",
    "best",
    "leading",
    "growth",
];

const NEGATIVE_TERMS: &[&str] = &[
    "bad",
    "poor",
    "negative",
    "failure",
    "scandal",
    "problem",
    "issue",
    "worst",
    "decline",
    "lawsuit",
];

/// Article-level sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }

    /// Score contribution used by the composite news sub-score.
    pub fn points(self) -> f64 {
        match self {
            Sentiment::Positive => 100.0,
            Sentiment::Neutral => 50.0,
            Sentiment::Negative => 0.0,
        }
    }
}

/// Classify a short text as positive/neutral/negative by keyword counting.
/// Pure and deterministic; ties (including the empty string) are neutral.
pub fn classify(text: &str) -> Sentiment {
    let lower = text.to_lowercase();

    let positive = POSITIVE_TERMS.iter().filter(|t| lower.contains(**t)).count();
    let negative = NEGATIVE_TERMS.iter().filter(|t| lower.contains(**t)).count();

    if positive > negative {
        Sentiment::Positive
    } else if negative > positive {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_is_neutral() {
        assert_eq!(classify(""), Sentiment::Neutral);
    }

    #[test]
    fn positive_keywords_win() {
        assert_eq!(classify("This is a great success"), Sentiment::Positive);
    }

    #[test]
    fn negative_keywords_win() {
        assert_eq!(classify("A terrible failure and scandal"), Sentiment::Negative);
    }

    #[test]
    fn balanced_counts_are_neutral() {
        // One positive term, one negative term.
        assert_eq!(classify("good product, bad support"), Sentiment::Neutral);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(classify("GROWTH and INNOVATIVE design"), Sentiment::Positive);
        assert_eq!(classify("LAWSUIT over DECLINE"), Sentiment::Negative);
    }

    #[test]
    fn containment_counts_once_per_term() {
        // "issue" appears three times but contributes a single count,
        // so the single "growth" on the positive side ties it.
        assert_eq!(classify("issue issue issue growth"), Sentiment::Neutral);
    }

    #[test]
    fn classify_is_deterministic() {
        let text = "leading brand faces lawsuit amid growth concerns";
        assert_eq!(classify(text), classify(text));
    }
}

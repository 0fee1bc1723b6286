//! Rating arithmetic for app reviews
//!
//! Every review carries a map of category → score (1-10). The review's
//! overall score, an app's average score and the per-app summary are all
//! plain means rounded to one decimal place.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rating categories, as `(key, label)` pairs
pub const REVIEW_CATEGORIES: [(&str, &str); 6] = [
    ("uiDesign", "UI Design"),
    ("uxFlow", "UX Flow"),
    ("performance", "Performance"),
    ("functionality", "Functionality"),
    ("innovation", "Innovation"),
    ("overall", "Overall Polish"),
];

/// Lowest score a category can receive
pub const MIN_RATING: f64 = 1.0;

/// Highest score a category can receive
pub const MAX_RATING: f64 = 10.0;

/// Category key → score
pub type Ratings = BTreeMap<String, f64>;

/// Returns true if `key` is one of [`REVIEW_CATEGORIES`]
pub fn is_category(key: &str) -> bool {
    REVIEW_CATEGORIES.iter().any(|(k, _)| *k == key)
}

/// Round to one decimal place (half away from zero)
///
/// ```
/// use lumora_common::scoring::round1;
/// assert_eq!(round1(7.25), 7.3);
/// assert_eq!(round1(6.666), 6.7);
/// ```
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Mean of `values` rounded to one decimal, 0 for an empty input
pub fn average<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        0.0
    } else {
        round1(sum / count as f64)
    }
}

/// Overall score of a single review: mean of every rating present
pub fn overall_score(ratings: &Ratings) -> f64 {
    average(ratings.values().copied().filter(|v| v.is_finite()))
}

/// Aggregate review statistics for one app
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub total_reviews: usize,
    pub ai_reviews: usize,
    pub human_reviews: usize,
    /// Average per category; categories nobody rated are 0
    pub average_scores: BTreeMap<String, f64>,
    /// Mean of the category averages (zero categories included)
    pub overall_average: f64,
}

impl ReviewSummary {
    /// Summary of an app with no reviews
    pub fn empty() -> Self {
        Self {
            total_reviews: 0,
            ai_reviews: 0,
            human_reviews: 0,
            average_scores: REVIEW_CATEGORIES
                .iter()
                .map(|(k, _)| (k.to_string(), 0.0))
                .collect(),
            overall_average: 0.0,
        }
    }
}

/// Summarize a set of reviews given as `(is_ai, ratings)` pairs
pub fn summarize<'a, I>(reviews: I) -> ReviewSummary
where
    I: IntoIterator<Item = (bool, &'a Ratings)>,
{
    let mut summary = ReviewSummary::empty();
    let mut sums = [0.0f64; REVIEW_CATEGORIES.len()];
    let mut counts = [0usize; REVIEW_CATEGORIES.len()];

    for (is_ai, ratings) in reviews {
        summary.total_reviews += 1;
        if is_ai {
            summary.ai_reviews += 1;
        }

        for (i, (key, _)) in REVIEW_CATEGORIES.iter().enumerate() {
            if let Some(score) = ratings.get(*key).filter(|v| v.is_finite()) {
                sums[i] += score;
                counts[i] += 1;
            }
        }
    }

    if summary.total_reviews == 0 {
        return summary;
    }

    summary.human_reviews = summary.total_reviews - summary.ai_reviews;

    for (i, (key, _)) in REVIEW_CATEGORIES.iter().enumerate() {
        let avg = if counts[i] > 0 {
            round1(sums[i] / counts[i] as f64)
        } else {
            0.0
        };
        summary.average_scores.insert(key.to_string(), avg);
    }

    summary.overall_average = average(summary.average_scores.values().copied());
    summary
}

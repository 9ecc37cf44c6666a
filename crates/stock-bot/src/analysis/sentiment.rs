//! News sentiment scoring

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use vader_sentiment::SentimentIntensityAnalyzer;

use crate::error::{Result, StockError};
use crate::model::NewsItem;

/// Scores above this are strongly positive
pub const STRONG_POSITIVE_THRESHOLD: f64 = 0.2;

/// Scores at or below this are strongly negative
pub const STRONG_NEGATIVE_THRESHOLD: f64 = -0.2;

/// Text to compound polarity in [-1, 1]
#[cfg_attr(test, mockall::automock)]
pub trait PolarityScorer: Send + Sync {
    fn score(&self, text: &str) -> Result<f64>;
}

/// Lexicon-based scorer backed by VADER
///
/// The lexicon is compiled into the `vader_sentiment` crate, so construction
/// never touches the filesystem or network.
pub struct VaderScorer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderScorer {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarityScorer for VaderScorer {
    fn score(&self, text: &str) -> Result<f64> {
        self.analyzer
            .polarity_scores(text)
            .get("compound")
            .copied()
            .ok_or_else(|| StockError::SentimentError("missing compound score".to_string()))
    }
}

/// Qualitative band of an average compound score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    StrongPositive,
    MildPositive,
    MildNegative,
    StrongNegative,
}

impl SentimentLabel {
    pub fn classify(score: f64) -> Self {
        if score > STRONG_POSITIVE_THRESHOLD {
            Self::StrongPositive
        } else if score > 0.0 {
            Self::MildPositive
        } else if score > STRONG_NEGATIVE_THRESHOLD {
            Self::MildNegative
        } else {
            Self::StrongNegative
        }
    }
}

/// Averaged news sentiment of one ticker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SentimentResult {
    Scored {
        score: f64,
        label: SentimentLabel,
        articles: usize,
    },
    NotAvailable,
}

impl SentimentResult {
    pub fn score(&self) -> Option<f64> {
        match self {
            Self::Scored { score, .. } => Some(*score),
            Self::NotAvailable => None,
        }
    }

    pub fn label(&self) -> Option<SentimentLabel> {
        match self {
            Self::Scored { label, .. } => Some(*label),
            Self::NotAvailable => None,
        }
    }
}

/// Averages per-article polarity over the most recent news items
#[derive(Clone)]
pub struct SentimentScorer {
    scorer: Arc<dyn PolarityScorer>,
    limit: usize,
}

impl SentimentScorer {
    pub fn new(scorer: Arc<dyn PolarityScorer>, limit: usize) -> Self {
        Self { scorer, limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Score up to `limit` items; any scoring failure makes the whole result unavailable
    pub fn score_news(&self, items: &[NewsItem]) -> SentimentResult {
        let items = &items[..items.len().min(self.limit)];
        if items.is_empty() {
            return SentimentResult::NotAvailable;
        }

        let scores: Result<Vec<f64>> = items
            .iter()
            .map(|item| {
                self.scorer
                    .score(&item.text())
                    .map(|score| score.clamp(-1.0, 1.0))
            })
            .collect();

        match scores {
            Ok(scores) => {
                let score = scores.iter().sum::<f64>() / scores.len() as f64;
                SentimentResult::Scored {
                    score,
                    label: SentimentLabel::classify(score),
                    articles: scores.len(),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "sentiment scoring failed");
                SentimentResult::NotAvailable
            }
        }
    }

    /// Sentiment for a news fetch that may have failed
    pub fn score_fetched(&self, symbol: &str, news: Result<Vec<NewsItem>>) -> SentimentResult {
        match news {
            Ok(items) => self.score_news(&items),
            Err(e) => {
                tracing::warn!(symbol, error = %e, "news unavailable");
                SentimentResult::NotAvailable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: usize) -> Vec<NewsItem> {
        (0..n)
            .map(|i| NewsItem::new(format!("headline {i}"), "summary"))
            .collect()
    }

    fn constant_scorer(value: f64) -> Arc<dyn PolarityScorer> {
        let mut mock = MockPolarityScorer::new();
        mock.expect_score().returning(move |_| Ok(value));
        Arc::new(mock)
    }

    #[test]
    fn test_label_thresholds() {
        assert_eq!(SentimentLabel::classify(0.5), SentimentLabel::StrongPositive);
        assert_eq!(SentimentLabel::classify(0.2), SentimentLabel::MildPositive);
        assert_eq!(SentimentLabel::classify(0.01), SentimentLabel::MildPositive);
        assert_eq!(SentimentLabel::classify(0.0), SentimentLabel::MildNegative);
        assert_eq!(SentimentLabel::classify(-0.1), SentimentLabel::MildNegative);
        assert_eq!(SentimentLabel::classify(-0.2), SentimentLabel::StrongNegative);
        assert_eq!(SentimentLabel::classify(-0.9), SentimentLabel::StrongNegative);
    }

    #[test]
    fn test_no_news_is_not_available() {
        let scorer = SentimentScorer::new(constant_scorer(0.5), 5);
        assert_eq!(scorer.score_news(&[]), SentimentResult::NotAvailable);
    }

    #[test]
    fn test_all_strong_positive() {
        let scorer = SentimentScorer::new(constant_scorer(0.6), 5);
        let result = scorer.score_news(&items(5));

        assert_eq!(result.label(), Some(SentimentLabel::StrongPositive));
        assert!((result.score().unwrap() - 0.6).abs() < 1e-12);
        assert!(matches!(result, SentimentResult::Scored { articles: 5, .. }));
    }

    #[test]
    fn test_only_limit_items_scored() {
        let mut mock = MockPolarityScorer::new();
        mock.expect_score().times(5).returning(|_| Ok(0.1));
        let scorer = SentimentScorer::new(Arc::new(mock), 5);

        let result = scorer.score_news(&items(8));
        assert!(matches!(result, SentimentResult::Scored { articles: 5, .. }));
    }

    #[test]
    fn test_average_of_mixed_scores() {
        let mut mock = MockPolarityScorer::new();
        mock.expect_score()
            .returning(|text| Ok(if text.contains("headline 0") { 0.8 } else { -0.4 }));
        let scorer = SentimentScorer::new(Arc::new(mock), 5);

        let result = scorer.score_news(&items(2));
        assert!((result.score().unwrap() - 0.2).abs() < 1e-12);
        assert_eq!(result.label(), Some(SentimentLabel::MildPositive));
    }

    #[test]
    fn test_scoring_failure_degrades() {
        let mut mock = MockPolarityScorer::new();
        mock.expect_score()
            .returning(|_| Err(StockError::SentimentError("lexicon missing".to_string())));
        let scorer = SentimentScorer::new(Arc::new(mock), 5);

        assert_eq!(scorer.score_news(&items(3)), SentimentResult::NotAvailable);
    }

    #[test]
    fn test_fetch_failure_degrades() {
        let scorer = SentimentScorer::new(constant_scorer(0.5), 5);
        let result = scorer.score_fetched("AAPL", Err(StockError::ApiError("timeout".to_string())));
        assert_eq!(result, SentimentResult::NotAvailable);
    }

    #[test]
    fn test_vader_polarity() {
        let vader = VaderScorer::new();
        let positive = vader.score("Great earnings, excellent growth and happy investors").unwrap();
        let negative = vader.score("Terrible losses, awful guidance and angry investors").unwrap();

        assert!(positive > 0.2);
        assert!(negative < -0.2);
        assert!((-1.0..=1.0).contains(&positive));
    }
}

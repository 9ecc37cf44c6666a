//! Indicator and sentiment computations

pub mod indicator;
pub mod sentiment;

pub use indicator::{DEFAULT_RSI_PERIOD, IndicatorResult, RsiCalculator, Zone};
pub use sentiment::{
    PolarityScorer, SentimentLabel, SentimentResult, SentimentScorer, VaderScorer,
};

#[cfg(test)]
pub use sentiment::MockPolarityScorer;

//! User-facing message text
//!
//! Every string the bot sends lives here so the chat adapters only move bytes.

use super::TickerReport;
use crate::analysis::{IndicatorResult, SentimentLabel, SentimentResult, Zone};

/// Rendered in place of a missing quote field or unavailable sentiment
pub const NOT_AVAILABLE: &str = "not available";

/// Rendered in place of an indicator without enough history
pub const UNDEFINED: &str = "N/A";

const COLUMN_SEPARATOR: &str = " | ";

/// Formats single and comparison reports plus the bot's fixed replies
#[derive(Debug, Clone, Copy)]
pub struct ReportFormatter {
    rsi_period: usize,
}

impl ReportFormatter {
    pub fn new(rsi_period: usize) -> Self {
        Self { rsi_period }
    }

    fn rsi_label(&self) -> String {
        format!("RSI {}", self.rsi_period)
    }

    pub fn single(&self, report: &TickerReport) -> String {
        let quote = &report.snapshot;
        let mut msg = format!("📊 {} ({})\n\n", report.display_name(), report.symbol);

        msg.push_str(&format!(
            "Price: {}   |   Today: {}\n",
            format_price(quote.price),
            format_percent(quote.change_percent)
        ));
        msg.push_str(&format!(
            "Market cap: {}\n",
            format_market_cap(quote.market_cap)
        ));
        msg.push_str(&format!(
            "P/E: {}   |   Analyst target: {}\n\n",
            format_ratio(quote.trailing_pe),
            format_price(quote.target_price)
        ));

        msg.push_str(&format!(
            "📌 {}: {}\n",
            self.rsi_label(),
            format_indicator(&report.indicator)
        ));
        if let Some(zone) = report.indicator.zone() {
            msg.push_str(zone_note(zone));
            msg.push('\n');
        }
        msg.push('\n');

        msg.push_str(&format!(
            "😊 News sentiment: {}\n",
            format_sentiment(&report.sentiment)
        ));
        msg
    }

    /// Aligned rows, one column per ticker in request order
    pub fn comparison(&self, reports: &[TickerReport]) -> String {
        let symbols: Vec<&str> = reports.iter().map(|r| r.symbol.as_str()).collect();
        let mut msg = format!("📊 Comparing {}\n\n", symbols.join(" / "));

        msg.push_str(&row("Ticker", reports, |r| r.symbol.clone()));
        msg.push_str(&row("Price", reports, |r| format_price(r.snapshot.price)));
        msg.push_str(&row("Today", reports, |r| format_percent(r.snapshot.change_percent)));
        msg.push_str(&row("P/E", reports, |r| format_ratio(r.snapshot.trailing_pe)));
        msg.push_str(&row("Market Cap", reports, |r| {
            format_market_cap(r.snapshot.market_cap)
        }));
        msg.push('\n');
        msg.push_str(&row(&format!("📌 {}", self.rsi_label()), reports, |r| {
            format_indicator(&r.indicator)
        }));
        msg.push_str(&row("😊 Sentiment", reports, |r| format_sentiment(&r.sentiment)));
        msg
    }

    pub fn greeting(&self, max_tickers: usize) -> String {
        format!(
            "Hello! 📈\n\
             Send a ticker such as NVDA for a single stock report\n\
             or compare up to {max_tickers} stocks with /, e.g. NVDA/PLTR or NVDA/AAPL/TSLA/MSFT\n\
             Quote data + price chart + {} + news sentiment\n\
             Example: NVDA or NVDA/AAPL/TSLA",
            self.rsi_label()
        )
    }

    pub fn progress_single(&self, symbol: &str) -> String {
        format!("Analyzing {symbol}... please wait ⏳")
    }

    pub fn progress_compare(&self, symbols: &[String]) -> String {
        format!(
            "Comparing {} ({} stocks)... please wait ⏳",
            symbols.join("/"),
            symbols.len()
        )
    }

    pub fn too_many_tickers(&self, limit: usize) -> String {
        format!("Comparison supports at most {limit} stocks 😅\nExample: NVDA/AAPL/TSLA/MSFT")
    }

    pub fn not_found(&self, symbol: &str) -> String {
        format!("No data found for {symbol}")
    }

    pub fn single_error(&self, symbol: &str, error: &str) -> String {
        format!("Error analyzing {symbol}: {error}")
    }

    pub fn chart_unavailable(&self, subject: &str) -> String {
        format!("⚠️ Chart unavailable for {subject}")
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new(crate::analysis::DEFAULT_RSI_PERIOD)
    }
}

fn row(label: &str, reports: &[TickerReport], cell: impl Fn(&TickerReport) -> String) -> String {
    let cells: Vec<String> = reports.iter().map(cell).collect();
    format!("{label}: {}\n", cells.join(COLUMN_SEPARATOR))
}

/// `$2.50T` from one trillion up, `$8.10B` below; zero counts as missing
pub fn format_market_cap(market_cap: Option<f64>) -> String {
    match market_cap {
        Some(cap) if cap >= 1e12 => format!("${:.2}T", cap / 1e12),
        Some(cap) if cap > 0.0 => format!("${:.2}B", cap / 1e9),
        _ => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_price(price: Option<f64>) -> String {
    price.map_or_else(|| NOT_AVAILABLE.to_string(), |p| format!("${p:.2}"))
}

pub fn format_percent(percent: Option<f64>) -> String {
    percent.map_or_else(|| NOT_AVAILABLE.to_string(), |p| format!("{p:.2}%"))
}

pub fn format_ratio(ratio: Option<f64>) -> String {
    ratio.map_or_else(|| NOT_AVAILABLE.to_string(), |r| format!("{r:.2}"))
}

pub fn format_indicator(indicator: &IndicatorResult) -> String {
    indicator
        .value()
        .map_or_else(|| UNDEFINED.to_string(), |v| format!("{v:.2}"))
}

pub fn format_sentiment(sentiment: &SentimentResult) -> String {
    match sentiment {
        SentimentResult::Scored { score, label, .. } => {
            format!("{score:.3} → {}", sentiment_text(*label))
        }
        SentimentResult::NotAvailable => NOT_AVAILABLE.to_string(),
    }
}

fn sentiment_text(label: SentimentLabel) -> &'static str {
    match label {
        SentimentLabel::StrongPositive => "Strong Positive ✅",
        SentimentLabel::MildPositive => "Mild Positive ✅",
        SentimentLabel::MildNegative => "Mild Negative ⚠️",
        SentimentLabel::StrongNegative => "Strong Negative ⚠️",
    }
}

fn zone_note(zone: Zone) -> &'static str {
    match zone {
        Zone::Overbought => "→ Overbought (may pull back) ⚠️",
        Zone::Oversold => "→ Oversold (may rebound) ✅",
        Zone::Normal => "→ Normal ⚖️",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PriceSeries, QuoteSnapshot};

    fn report(symbol: &str, price: f64, rsi: Option<f64>) -> TickerReport {
        let mut snapshot = QuoteSnapshot::new(symbol);
        snapshot.name = Some(format!("{symbol} Corp"));
        snapshot.price = Some(price);
        snapshot.change_percent = Some(1.234);
        snapshot.market_cap = Some(2.5e12);
        snapshot.trailing_pe = Some(31.456);
        snapshot.target_price = Some(price * 1.1);

        TickerReport {
            symbol: symbol.to_string(),
            snapshot,
            series: PriceSeries::empty(symbol),
            indicator: rsi.map_or(IndicatorResult::Undefined, IndicatorResult::from_value),
            sentiment: SentimentResult::Scored {
                score: 0.35,
                label: SentimentLabel::StrongPositive,
                articles: 5,
            },
        }
    }

    #[test]
    fn test_market_cap() {
        assert_eq!(format_market_cap(Some(2.5e12)), "$2.50T");
        assert_eq!(format_market_cap(Some(8.1e9)), "$8.10B");
        assert_eq!(format_market_cap(None), "not available");
        assert_eq!(format_market_cap(Some(0.0)), "not available");
    }

    #[test]
    fn test_missing_fields_use_sentinels() {
        assert_eq!(format_price(None), NOT_AVAILABLE);
        assert_eq!(format_percent(None), NOT_AVAILABLE);
        assert_eq!(format_ratio(None), NOT_AVAILABLE);
        assert_eq!(format_indicator(&IndicatorResult::Undefined), UNDEFINED);
        assert_eq!(format_sentiment(&SentimentResult::NotAvailable), NOT_AVAILABLE);
    }

    #[test]
    fn test_sentiment_text() {
        let scored = SentimentResult::Scored {
            score: -0.05,
            label: SentimentLabel::MildNegative,
            articles: 3,
        };
        assert_eq!(format_sentiment(&scored), "-0.050 → Mild Negative ⚠️");
    }

    #[test]
    fn test_single_report() {
        let text = ReportFormatter::default().single(&report("NVDA", 120.5, Some(72.0)));

        assert!(text.starts_with("📊 NVDA Corp (NVDA)"));
        assert!(text.contains("Price: $120.50   |   Today: 1.23%"));
        assert!(text.contains("Market cap: $2.50T"));
        assert!(text.contains("P/E: 31.46   |   Analyst target: $132.55"));
        assert!(text.contains("📌 RSI 40: 72.00\n→ Overbought"));
        assert!(text.contains("😊 News sentiment: 0.350 → Strong Positive ✅"));
    }

    #[test]
    fn test_single_report_degraded() {
        let mut degraded = report("XYZ", 1.0, None);
        degraded.snapshot = QuoteSnapshot::new("XYZ");
        degraded.sentiment = SentimentResult::NotAvailable;

        let text = ReportFormatter::default().single(&degraded);
        assert!(text.starts_with("📊 XYZ (XYZ)"));
        assert!(text.contains("Price: not available"));
        assert!(text.contains("📌 RSI 40: N/A\n\n"));
        assert!(!text.contains('→'));
        assert!(text.contains("News sentiment: not available"));
    }

    #[test]
    fn test_comparison_keeps_request_order() {
        let reports = vec![report("B", 20.0, Some(25.0)), report("A", 10.0, None)];
        let text = ReportFormatter::default().comparison(&reports);

        assert!(text.starts_with("📊 Comparing B / A"));
        assert!(text.contains("Ticker: B | A\n"));
        assert!(text.contains("Price: $20.00 | $10.00\n"));
        assert!(text.contains("📌 RSI 40: 25.00 | N/A\n"));

        for line in text.lines().filter(|l| l.contains(" | ")) {
            let cells: Vec<&str> = line.split(COLUMN_SEPARATOR).collect();
            assert_eq!(cells.len(), 2, "row `{line}` should have one cell per ticker");
        }
    }

    #[test]
    fn test_fixed_replies() {
        let formatter = ReportFormatter::new(14);
        assert!(formatter.greeting(4).contains("up to 4 stocks"));
        assert!(formatter.greeting(4).contains("RSI 14"));
        assert!(formatter.too_many_tickers(4).contains("at most 4"));
        assert_eq!(formatter.not_found("ZZZZ"), "No data found for ZZZZ");
        assert_eq!(
            formatter.progress_compare(&["NVDA".to_string(), "AAPL".to_string()]),
            "Comparing NVDA/AAPL (2 stocks)... please wait ⏳"
        );
        assert!(formatter.single_error("ZZZZ", "not found").contains("ZZZZ"));
    }
}

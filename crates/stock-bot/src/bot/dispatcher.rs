//! Routes one inbound message through fetch, analysis, formatting and charting

use futures::future::join_all;
use std::sync::Arc;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use super::commands::Command;
use super::reply::ReplySink;
use super::request::{MAX_TICKERS, RequestMode, TickerRequest};
use crate::analysis::{PolarityScorer, RsiCalculator, SentimentScorer, VaderScorer};
use crate::api::{MarketDataClient, MarketDataProvider};
use crate::chart::{Chart, ChartRenderer, PlottersChartRenderer};
use crate::config::{FetchMode, StockConfig};
use crate::error::{Result, StockError};
use crate::model::PriceSeries;
use crate::report::{ReportFormatter, TickerReport};

/// Handles chat messages end to end
///
/// Collaborators are shared and immutable, so one dispatcher serves any number
/// of concurrent requests.
pub struct RequestDispatcher {
    provider: Arc<dyn MarketDataProvider>,
    sentiment: SentimentScorer,
    rsi: RsiCalculator,
    formatter: ReportFormatter,
    renderer: Arc<dyn ChartRenderer>,
    config: Arc<StockConfig>,
}

impl RequestDispatcher {
    pub fn new(
        config: StockConfig,
        provider: Arc<dyn MarketDataProvider>,
        scorer: Arc<dyn PolarityScorer>,
        renderer: Arc<dyn ChartRenderer>,
    ) -> Result<Self> {
        config.validate()?;
        let rsi = RsiCalculator::new(config.rsi_period)?;

        Ok(Self {
            provider,
            sentiment: SentimentScorer::new(scorer, config.news_limit),
            formatter: ReportFormatter::new(rsi.period()),
            rsi,
            renderer,
            config: Arc::new(config),
        })
    }

    /// Wire up the Yahoo/Finnhub provider, VADER and the plotters renderer
    pub fn from_config(config: StockConfig) -> Result<Self> {
        let provider = Arc::new(MarketDataClient::new(&config)?);
        let renderer = Arc::new(PlottersChartRenderer::new(&config));
        info!(
            news_source = provider.news_source(),
            fetch_mode = ?config.fetch_mode,
            "dispatcher ready"
        );
        Self::new(config, provider, Arc::new(VaderScorer::new()), renderer)
    }

    pub fn config(&self) -> &StockConfig {
        &self.config
    }

    /// Handle one message; only reply delivery failures are returned
    pub async fn handle(&self, input: &str, sink: &dyn ReplySink) -> Result<()> {
        let span = info_span!("request", request_id = %Uuid::new_v4());
        self.dispatch(input, sink).instrument(span).await
    }

    async fn dispatch(&self, input: &str, sink: &dyn ReplySink) -> Result<()> {
        match Command::parse(input) {
            Ok(Command::Help) => sink.send_text(&self.formatter.greeting(MAX_TICKERS)).await,
            Ok(Command::Unknown { name }) => {
                debug!(command = %name, "ignoring unknown command");
                Ok(())
            }
            Ok(Command::Empty) => Ok(()),
            Ok(Command::Tickers(request)) => self.route(&request, sink).await,
            Err(StockError::TooManyTickers { requested, limit }) => {
                info!(requested, limit, "rejecting oversized comparison");
                sink.send_text(&self.formatter.too_many_tickers(limit)).await
            }
            Err(e) => {
                debug!(error = %e, "unparseable message");
                Ok(())
            }
        }
    }

    async fn route(&self, request: &TickerRequest, sink: &dyn ReplySink) -> Result<()> {
        info!(symbols = ?request.symbols(), mode = ?request.mode(), "handling ticker request");

        match (request.mode(), request.symbols()) {
            (RequestMode::Single, [symbol, ..]) => self.analyze_single(symbol, sink).await,
            (RequestMode::Compare, symbols) => self.compare(symbols, sink).await,
            (RequestMode::Single, []) => Ok(()),
        }
    }

    /// Fetch snapshot, history and news for one ticker and derive its indicators
    ///
    /// Snapshot and history failures are returned; a news failure only leaves
    /// the sentiment unavailable.
    pub async fn build_report(&self, symbol: &str) -> Result<TickerReport> {
        debug!(symbol, "fetching quote snapshot");
        let snapshot = self.provider.snapshot(symbol).await?;

        debug!(symbol, range = %self.config.history_range, "fetching price history");
        let series = self
            .provider
            .history(symbol, &self.config.history_range)
            .await?;

        debug!(symbol, limit = self.sentiment.limit(), "fetching news");
        let news = self.provider.news(symbol, self.sentiment.limit()).await;

        let indicator = self.rsi.calculate(&series.closes())?;
        let sentiment = self.sentiment.score_fetched(symbol, news);

        Ok(TickerReport {
            symbol: symbol.to_string(),
            snapshot,
            series,
            indicator,
            sentiment,
        })
    }

    async fn analyze_single(&self, symbol: &str, sink: &dyn ReplySink) -> Result<()> {
        sink.send_text(&self.formatter.progress_single(symbol)).await?;

        let report = match self.build_report(symbol).await {
            Ok(report) => report,
            Err(e) => {
                warn!(symbol, error = %e, "single ticker analysis failed");
                return sink
                    .send_text(&self.formatter.single_error(symbol, &e.to_string()))
                    .await;
            }
        };

        sink.send_text(&self.formatter.single(&report)).await?;

        if report.series.is_empty() {
            debug!(symbol, "no price history, skipping chart");
            return Ok(());
        }

        let renderer = Arc::clone(&self.renderer);
        let series = report.series;
        match render(move || renderer.render_single(&series)).await {
            Ok(chart) => send_chart(sink, chart).await,
            Err(e) => {
                warn!(symbol, error = %e, "chart rendering failed");
                sink.send_text(&self.formatter.chart_unavailable(symbol)).await
            }
        }
    }

    async fn compare(&self, symbols: &[String], sink: &dyn ReplySink) -> Result<()> {
        sink.send_text(&self.formatter.progress_compare(symbols)).await?;

        let results = match self.config.fetch_mode {
            FetchMode::Sequential => {
                let mut results = Vec::with_capacity(symbols.len());
                for symbol in symbols {
                    let result = self.build_report(symbol).await;
                    let failed = result.is_err();
                    results.push(result);
                    if failed {
                        break;
                    }
                }
                results
            }
            FetchMode::Concurrent => join_all(symbols.iter().map(|s| self.build_report(s))).await,
        };

        let mut reports = Vec::with_capacity(symbols.len());
        for (symbol, result) in symbols.iter().zip(results) {
            match result {
                Ok(report) => reports.push(report),
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "comparison aborted");
                    return sink.send_text(&self.formatter.not_found(symbol)).await;
                }
            }
        }

        sink.send_text(&self.formatter.comparison(&reports)).await?;

        let renderer = Arc::clone(&self.renderer);
        let series: Vec<PriceSeries> = reports.into_iter().map(|r| r.series).collect();
        match render(move || renderer.render_comparison(&series)).await {
            Ok(Some(chart)) => send_chart(sink, chart).await,
            Ok(None) => {
                debug!("no price history for any ticker, skipping chart");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "comparison chart rendering failed");
                sink.send_text(&self.formatter.chart_unavailable(&symbols.join(", ")))
                    .await
            }
        }
    }
}

/// Run a CPU-bound render off the async workers
async fn render<T, F>(job: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| StockError::ChartError(format!("render task failed: {e}")))?
}

async fn send_chart(sink: &dyn ReplySink, chart: Chart) -> Result<()> {
    sink.send_image(chart.png, &chart.caption).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::MockPolarityScorer;
    use crate::api::MockMarketDataProvider;
    use crate::bot::reply::{BotReply, ReplyBuffer};
    use crate::chart::MockChartRenderer;
    use crate::model::{NewsItem, PricePoint, QuoteSnapshot};
    use chrono::NaiveDate;

    fn series(symbol: &str, len: usize) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PriceSeries::new(
            symbol,
            (0..len).map(|i| {
                PricePoint::new(start + chrono::Duration::days(i as i64), 100.0 + i as f64)
            }),
        )
    }

    fn snapshot(symbol: &str) -> QuoteSnapshot {
        let mut quote = QuoteSnapshot::new(symbol);
        quote.price = Some(100.0);
        quote
    }

    /// Provider that knows every symbol except `ZZZZ`
    fn provider() -> MockMarketDataProvider {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_snapshot().returning(|symbol| {
            if symbol == "ZZZZ" {
                Err(StockError::TickerNotFound {
                    symbol: symbol.to_string(),
                    reason: "No fundamentals data found".to_string(),
                })
            } else {
                Ok(snapshot(symbol))
            }
        });
        mock.expect_history()
            .returning(|symbol, _| Ok(series(symbol, 60)));
        mock.expect_news()
            .returning(|_, _| Ok(vec![NewsItem::new("Record profits", "Strong quarter")]));
        mock
    }

    fn scorer() -> Arc<dyn PolarityScorer> {
        let mut mock = MockPolarityScorer::new();
        mock.expect_score().returning(|_| Ok(0.4));
        Arc::new(mock)
    }

    fn renderer() -> MockChartRenderer {
        let mut mock = MockChartRenderer::new();
        mock.expect_render_single().returning(|s| {
            Ok(Chart {
                png: vec![0x89, b'P'],
                caption: format!("📉 {} chart", s.symbol()),
            })
        });
        mock.expect_render_comparison().returning(|_| {
            Ok(Some(Chart {
                png: vec![0x89, b'P'],
                caption: "comparison".to_string(),
            }))
        });
        mock
    }

    fn dispatcher(
        config: StockConfig,
        provider: MockMarketDataProvider,
        renderer: MockChartRenderer,
    ) -> RequestDispatcher {
        RequestDispatcher::new(config, Arc::new(provider), scorer(), Arc::new(renderer)).unwrap()
    }

    fn texts(replies: &[BotReply]) -> Vec<&str> {
        replies.iter().filter_map(BotReply::as_text).collect()
    }

    #[tokio::test]
    async fn test_too_many_tickers_fetches_nothing() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_snapshot().never();
        mock.expect_history().never();
        mock.expect_news().never();

        let bot = dispatcher(StockConfig::default(), mock, MockChartRenderer::new());
        let sink = ReplyBuffer::new();
        bot.handle("A/B/C/D/E", &sink).await.unwrap();

        let replies = sink.take();
        assert_eq!(replies.len(), 1);
        assert!(replies[0].as_text().unwrap().contains("at most 4"));
    }

    #[tokio::test]
    async fn test_single_ticker_report_and_chart() {
        let bot = dispatcher(StockConfig::default(), provider(), renderer());
        let sink = ReplyBuffer::new();
        bot.handle("nvda", &sink).await.unwrap();

        let replies = sink.take();
        assert_eq!(replies.len(), 3);
        assert!(replies[0].as_text().unwrap().contains("Analyzing NVDA"));
        let report = replies[1].as_text().unwrap();
        assert!(report.starts_with("📊 NVDA (NVDA)"));
        assert!(report.contains("RSI 40: 100.00"));
        assert!(report.contains("0.400 → Strong Positive"));
        assert!(matches!(&replies[2], BotReply::Image { caption, .. } if caption.contains("NVDA")));
    }

    #[tokio::test]
    async fn test_single_unknown_ticker_reports_error() {
        let mut renderer = MockChartRenderer::new();
        renderer.expect_render_single().never();

        let bot = dispatcher(StockConfig::default(), provider(), renderer);
        let sink = ReplyBuffer::new();
        bot.handle("ZZZZ", &sink).await.unwrap();

        let replies = sink.take();
        assert!(replies.iter().all(|r| !r.is_image()));
        let error = replies.last().and_then(BotReply::as_text).unwrap();
        assert!(error.starts_with("Error analyzing ZZZZ"));
    }

    #[tokio::test]
    async fn test_comparison_keeps_request_order() {
        let mut renderer = MockChartRenderer::new();
        renderer
            .expect_render_comparison()
            .withf(|series| {
                series.iter().map(PriceSeries::symbol).collect::<Vec<_>>() == ["MSFT", "AAPL"]
            })
            .times(1)
            .returning(|_| {
                Ok(Some(Chart {
                    png: vec![1],
                    caption: "comparison".to_string(),
                }))
            });

        let bot = dispatcher(StockConfig::default(), provider(), renderer);
        let sink = ReplyBuffer::new();
        bot.handle("MSFT/AAPL", &sink).await.unwrap();

        let replies = sink.take();
        assert_eq!(replies.len(), 3);
        let table = replies[1].as_text().unwrap();
        assert!(table.starts_with("📊 Comparing MSFT / AAPL"));
        assert!(table.contains("Ticker: MSFT | AAPL"));
        assert!(replies[2].is_image());
    }

    #[tokio::test]
    async fn test_comparison_aborts_on_failing_ticker() {
        let bot = dispatcher(StockConfig::default(), provider(), MockChartRenderer::new());
        let sink = ReplyBuffer::new();
        bot.handle("AAPL/ZZZZ/MSFT", &sink).await.unwrap();

        let replies = sink.take();
        assert_eq!(texts(&replies).last(), Some(&"No data found for ZZZZ"));
        assert!(replies.iter().all(|r| !r.is_image()));
    }

    #[tokio::test]
    async fn test_concurrent_fetch_keeps_order() {
        let config = StockConfig {
            fetch_mode: FetchMode::Concurrent,
            ..StockConfig::default()
        };
        let bot = dispatcher(config, provider(), renderer());
        let sink = ReplyBuffer::new();
        bot.handle("nvda/aapl/tsla/msft", &sink).await.unwrap();

        let replies = sink.take();
        assert!(replies[1]
            .as_text()
            .unwrap()
            .contains("Ticker: NVDA | AAPL | TSLA | MSFT"));
    }

    #[tokio::test]
    async fn test_news_failure_only_degrades_sentiment() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_snapshot().returning(|s| Ok(snapshot(s)));
        mock.expect_history().returning(|s, _| Ok(series(s, 10)));
        mock.expect_news()
            .returning(|_, _| Err(StockError::ApiError("rate limited".to_string())));

        let bot = dispatcher(StockConfig::default(), mock, renderer());
        let sink = ReplyBuffer::new();
        bot.handle("AAPL", &sink).await.unwrap();

        let replies = sink.take();
        let report = replies[1].as_text().unwrap();
        assert!(report.contains("News sentiment: not available"));
        assert!(report.contains("RSI 40: N/A"));
        assert!(replies[2].is_image());
    }

    #[tokio::test]
    async fn test_empty_history_sends_no_chart() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_snapshot().returning(|s| Ok(snapshot(s)));
        mock.expect_history().returning(|s, _| Ok(PriceSeries::empty(s)));
        mock.expect_news().returning(|_, _| Ok(Vec::new()));

        let mut renderer = MockChartRenderer::new();
        renderer.expect_render_single().never();

        let bot = dispatcher(StockConfig::default(), mock, renderer);
        let sink = ReplyBuffer::new();
        bot.handle("AAPL", &sink).await.unwrap();

        let replies = sink.take();
        assert_eq!(replies.len(), 2);
        assert!(replies.iter().all(|r| !r.is_image()));
    }

    #[tokio::test]
    async fn test_chart_failure_falls_back_to_text() {
        let mut renderer = MockChartRenderer::new();
        renderer
            .expect_render_single()
            .returning(|_| Err(StockError::ChartError("no fonts".to_string())));

        let bot = dispatcher(StockConfig::default(), provider(), renderer);
        let sink = ReplyBuffer::new();
        bot.handle("NVDA", &sink).await.unwrap();

        let replies = sink.take();
        assert_eq!(
            texts(&replies).last(),
            Some(&"⚠️ Chart unavailable for NVDA")
        );
    }

    #[tokio::test]
    async fn test_help_and_unknown_commands() {
        let bot = dispatcher(
            StockConfig::default(),
            MockMarketDataProvider::new(),
            MockChartRenderer::new(),
        );
        let sink = ReplyBuffer::new();

        bot.handle("/start", &sink).await.unwrap();
        bot.handle("/settings", &sink).await.unwrap();
        bot.handle("   ", &sink).await.unwrap();

        let replies = sink.take();
        assert_eq!(replies.len(), 1);
        assert!(replies[0].as_text().unwrap().starts_with("Hello!"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = StockConfig {
            rsi_period: 0,
            ..StockConfig::default()
        };
        let result = RequestDispatcher::new(
            config,
            Arc::new(MockMarketDataProvider::new()),
            scorer(),
            Arc::new(MockChartRenderer::new()),
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_sequential_comparison_stops_after_failure() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_snapshot()
            .withf(|symbol: &str| symbol == "MSFT")
            .never();
        mock.expect_history()
            .withf(|symbol: &str, _: &str| symbol == "MSFT")
            .never();
        mock.expect_news()
            .withf(|symbol: &str, _: &usize| symbol == "MSFT")
            .never();
        mock.expect_snapshot()
            .withf(|symbol: &str| symbol != "MSFT")
            .times(2)
            .returning(|symbol| {
                if symbol == "ZZZZ" {
                    Err(StockError::TickerNotFound {
                        symbol: symbol.to_string(),
                        reason: "No fundamentals data found".to_string(),
                    })
                } else {
                    Ok(snapshot(symbol))
                }
            });
        mock.expect_history()
            .withf(|symbol: &str, _: &str| symbol == "AAPL")
            .times(1)
            .returning(|symbol, _| Ok(series(symbol, 60)));
        mock.expect_news()
            .withf(|symbol: &str, _: &usize| symbol == "AAPL")
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        let bot = dispatcher(StockConfig::default(), mock, MockChartRenderer::new());
        let sink = ReplyBuffer::new();
        bot.handle("AAPL/ZZZZ/MSFT", &sink).await.unwrap();

        let replies = sink.take();
        assert_eq!(texts(&replies).last(), Some(&"No data found for ZZZZ"));
        assert!(replies.iter().all(|r| !r.is_image()));
    }

    #[tokio::test]
    async fn test_concurrent_comparison_reports_first_failure() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_snapshot().times(3).returning(|symbol| {
            if symbol == "AAPL" {
                Ok(snapshot(symbol))
            } else {
                Err(StockError::TickerNotFound {
                    symbol: symbol.to_string(),
                    reason: "No fundamentals data found".to_string(),
                })
            }
        });
        mock.expect_history()
            .returning(|symbol, _| Ok(series(symbol, 60)));
        mock.expect_news().returning(|_, _| Ok(Vec::new()));

        let mut renderer = MockChartRenderer::new();
        renderer.expect_render_comparison().never();

        let config = StockConfig {
            fetch_mode: FetchMode::Concurrent,
            ..StockConfig::default()
        };
        let bot = dispatcher(config, mock, renderer);
        let sink = ReplyBuffer::new();
        bot.handle("AAPL/ZZZZ/YYYY", &sink).await.unwrap();

        let replies = sink.take();
        assert_eq!(replies.len(), 2);
        assert_eq!(texts(&replies).last(), Some(&"No data found for ZZZZ"));
        assert!(replies.iter().all(|r| !r.is_image()));
    }

    #[tokio::test]
    async fn test_comparison_news_failure_degrades_one_column() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_snapshot().returning(|s| Ok(snapshot(s)));
        mock.expect_history()
            .returning(|s, _| Ok(series(s, 60)));
        mock.expect_news().returning(|symbol, _| {
            if symbol == "MSFT" {
                Err(StockError::ApiError("rate limited".to_string()))
            } else {
                Ok(vec![NewsItem::new("Record profits", "Strong quarter")])
            }
        });

        let bot = dispatcher(StockConfig::default(), mock, renderer());
        let sink = ReplyBuffer::new();
        bot.handle("MSFT/AAPL", &sink).await.unwrap();

        let replies = sink.take();
        assert_eq!(replies.len(), 3);
        let table = replies[1].as_text().unwrap();
        assert!(table.contains("😊 Sentiment: not available | 0.400 → Strong Positive ✅\n"));
        assert!(replies[2].is_image());
    }

    #[tokio::test]
    async fn test_configured_rsi_period_labels_report() {
        let config = StockConfig {
            rsi_period: 14,
            ..StockConfig::default()
        };
        let bot = dispatcher(config, provider(), renderer());
        let sink = ReplyBuffer::new();
        bot.handle("NVDA", &sink).await.unwrap();

        let replies = sink.take();
        let report = replies[1].as_text().unwrap();
        assert!(report.contains("📌 RSI 14: 100.00"));
    }
}

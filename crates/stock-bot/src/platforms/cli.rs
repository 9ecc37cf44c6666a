//! Interactive terminal front-end
//!
//! Text replies go to stdout; chart images are written as PNG files.

use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use uuid::Uuid;

use crate::bot::{ReplySink, RequestDispatcher};
use crate::error::Result;

const PROMPT: &str = ">>> ";

/// Writes replies to the terminal and charts to `chart_dir`
#[derive(Debug, Clone)]
pub struct CliSink {
    chart_dir: PathBuf,
}

impl CliSink {
    pub fn new(chart_dir: impl Into<PathBuf>) -> Self {
        Self {
            chart_dir: chart_dir.into(),
        }
    }

    pub fn chart_dir(&self) -> &Path {
        &self.chart_dir
    }

    /// Save a chart and return its path
    pub async fn save_chart(&self, png: &[u8]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.chart_dir).await?;
        let path = self.chart_dir.join(format!("chart-{}.png", Uuid::new_v4()));
        tokio::fs::write(&path, png).await?;
        Ok(path)
    }
}

#[async_trait]
impl ReplySink for CliSink {
    async fn send_text(&self, text: &str) -> Result<()> {
        println!("{text}\n");
        Ok(())
    }

    async fn send_image(&self, png: Vec<u8>, caption: &str) -> Result<()> {
        let path = self.save_chart(&png).await?;
        println!("{caption}\n(saved to {})\n", path.display());
        Ok(())
    }
}

/// Read-eval-print loop over stdin
pub struct CliBot {
    dispatcher: Arc<RequestDispatcher>,
    sink: CliSink,
}

impl CliBot {
    pub fn new(dispatcher: Arc<RequestDispatcher>, chart_dir: impl Into<PathBuf>) -> Self {
        Self {
            dispatcher,
            sink: CliSink::new(chart_dir),
        }
    }

    /// Run until EOF, `exit` or `quit`
    pub async fn run(&self) -> Result<()> {
        self.dispatcher.handle("/help", &self.sink).await?;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("{PROMPT}");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let line = line.trim();
            if is_exit(line) {
                break;
            }

            if let Err(e) = self.dispatcher.handle(line, &self.sink).await {
                warn!(error = %e, "failed to print reply");
                eprintln!("❌ {e}");
            }
        }

        println!("Bye!");
        Ok(())
    }
}

fn is_exit(line: &str) -> bool {
    line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit")
}

use std::{future::Future, io, sync::Arc, time::Duration};

use anyhow::{Context, Result, bail};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt},
    sync::Mutex,
};
use tracing::debug;

use crate::ansi::{Colorize, Rgb};

const SPINNER_TICK: Duration = Duration::from_millis(500);

type Sink = Box<dyn AsyncWrite + Send + Unpin>;

/// Shared terminal output. Clones write to the same sink, one whole line at
/// a time, so render tasks and the turn loop do not interleave mid-line.
#[derive(Clone)]
pub struct Screen {
    out: Arc<Mutex<Sink>>,
}

impl Screen {
    pub fn new<W>(writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            out: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }

    pub async fn line(&self, text: &str) -> io::Result<()> {
        self.write(text, b"\n").await
    }

    /// Rewrites the current line in place.
    pub async fn overwrite(&self, text: &str) -> io::Result<()> {
        self.write(text, b"\r").await
    }

    async fn write(&self, text: &str, end: &[u8]) -> io::Result<()> {
        let mut out = self.out.lock().await;
        out.write_all(text.as_bytes()).await?;
        out.write_all(end).await?;
        out.flush().await
    }
}

/// Line-oriented prompt input paired with the screen it echoes to.
pub struct Console<I> {
    input: I,
    screen: Screen,
}

impl<I> Console<I>
where
    I: AsyncBufRead + Unpin,
{
    pub fn new(input: I, screen: Screen) -> Self {
        Self { input, screen }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub async fn line(&self, text: &str) -> Result<()> {
        self.screen
            .line(text)
            .await
            .context("failed to write to the terminal")
    }

    /// Reads one line without its line ending.
    pub async fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        let bytes = self
            .input
            .read_line(&mut line)
            .await
            .context("failed to read from input")?;
        if bytes == 0 {
            bail!("input closed");
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    pub async fn prompt(&mut self, text: &str) -> Result<String> {
        self.line(text).await?;
        self.read_line().await
    }
}

/// Shows `label` with cycling dots until `waiting_for` completes.
pub async fn animate<F, T>(screen: &Screen, label: &str, waiting_for: F) -> T
where
    F: Future<Output = T>,
{
    let ticker = {
        let screen = screen.clone();
        let label = label.to_string();
        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(SPINNER_TICK);
            for count in 0usize.. {
                ticks.tick().await;
                let frame = format!("{label}{}", ".".repeat(count % 4)).color(Rgb::GREEN);
                if let Err(err) = screen.overwrite(&frame).await {
                    debug!(?err, "spinner stopped");
                    break;
                }
            }
        })
    };

    let output = waiting_for.await;
    ticker.abort();
    let _ = ticker.await;
    if let Err(err) = screen.line("").await {
        debug!(?err, "failed to end spinner line");
    }
    output
}

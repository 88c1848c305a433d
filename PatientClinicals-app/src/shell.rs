//! Line-oriented terminal loop

use std::future::Future;
use std::io;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use patient_clinicals_domain::views::ConfirmDialog;

use crate::app::{App, Flow};
use crate::command::{is_affirmative, Command, HELP};

const PROMPT: &str = "> ";

/// Asks confirmations on the shell's own input and output
pub struct TerminalDialog<'a, R, W> {
    lines: &'a Mutex<Lines<BufReader<R>>>,
    output: &'a Mutex<W>,
}

#[async_trait]
impl<'a, R, W> ConfirmDialog for TerminalDialog<'a, R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn confirm(&self, message: &str) -> bool {
        let question = format!("{} [y/N] ", message);
        if let Err(e) = write_text(self.output, &question).await {
            warn!("Could not ask for confirmation: {}", e);
            return false;
        }

        match self.lines.lock().await.next_line().await {
            Ok(Some(answer)) => is_affirmative(&answer),
            Ok(None) => false,
            Err(e) => {
                warn!("Could not read confirmation: {}", e);
                false
            }
        }
    }
}

async fn write_text<W: AsyncWrite + Unpin>(output: &Mutex<W>, text: &str) -> io::Result<()> {
    let mut output = output.lock().await;
    output.write_all(text.as_bytes()).await?;
    output.flush().await
}

async fn write_screen<W: AsyncWrite + Unpin>(output: &Mutex<W>, app: &App) -> io::Result<()> {
    let screen = app.render(Instant::now());
    write_text(output, &format!("\n{}\n{}", screen, PROMPT)).await
}

/// Run the shell until `quit`, end of input, or `shutdown` resolves.
///
/// Delayed navigations are applied as they arrive, even while waiting for input.
pub async fn run<R, W, S>(app: &mut App, input: R, output: W, shutdown: S) -> io::Result<()>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
    S: Future<Output = ()>,
{
    let lines = Mutex::new(BufReader::new(input).lines());
    let output = Mutex::new(output);
    tokio::pin!(shutdown);

    write_screen(&output, app).await?;

    loop {
        let line = {
            let mut reader = lines.lock().await;
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                Some(command) = app.next_navigation() => {
                    if app.apply(command).await {
                        write_screen(&output, app).await?;
                    }
                    continue;
                }
                line = reader.next_line() => line?,
            }
        };

        let Some(line) = line else {
            debug!("End of input");
            break;
        };

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                write_text(&output, &format!("{}\n", e)).await?;
                write_screen(&output, app).await?;
                continue;
            }
        };

        let dialog = TerminalDialog {
            lines: &lines,
            output: &output,
        };
        match app.handle(command, &dialog).await {
            Ok(Flow::Quit) => break,
            Ok(Flow::ShowHelp) => write_text(&output, &format!("{}\n", HELP)).await?,
            Ok(Flow::Continue) => {}
            Err(e) => write_text(&output, &format!("{}\n", e)).await?,
        }
        write_screen(&output, app).await?;
    }

    write_text(&output, "Goodbye\n").await
}

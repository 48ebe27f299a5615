//! Stdio pumps: JSON lines in from the frontend, JSON lines out to it

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::util::rate_limit::InputRateLimiter;
use crate::wire::protocol::{InputMsg, OutputMsg};

/// Pump errors
#[derive(Debug, thiserror::Error)]
pub enum PumpError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Reader loop: input lines -> session.
///
/// Malformed lines are skipped. End of input is reported as `Quit`.
pub async fn read_input<R>(
    reader: R,
    input_tx: mpsc::Sender<InputMsg>,
    mut limiter: InputRateLimiter,
) -> Result<(), PumpError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let msg = match serde_json::from_str::<InputMsg>(line) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(error = %e, "Failed to parse input message");
                continue;
            }
        };

        // Releases and quit always get through so no key stays stuck down
        let limited = !matches!(msg, InputMsg::KeyUp { .. } | InputMsg::Quit);
        if limited && !limiter.check_input() {
            warn!(dropped = limiter.dropped(), "Rate limited input message");
            continue;
        }

        let quit = msg == InputMsg::Quit;
        if input_tx.send(msg).await.is_err() {
            debug!("Input channel closed");
            return Ok(());
        }
        if quit {
            info!("Quit requested by frontend");
            return Ok(());
        }
    }

    info!("Input closed");
    let _ = input_tx.send(InputMsg::Quit).await;
    Ok(())
}

/// Writer loop: session -> output lines, until the channel closes
pub async fn write_output<W>(mut writer: W, mut output_rx: mpsc::Receiver<OutputMsg>) -> Result<(), PumpError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(msg) = output_rx.recv().await {
        let mut line = serde_json::to_vec(&msg)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
        writer.flush().await?;
    }

    debug!("Output channel closed");
    Ok(())
}

/// Spawn both pumps on the process's stdin and stdout
pub fn spawn_stdio(
    input_tx: mpsc::Sender<InputMsg>,
    output_rx: mpsc::Receiver<OutputMsg>,
    limiter: InputRateLimiter,
) -> (JoinHandle<Result<(), PumpError>>, JoinHandle<Result<(), PumpError>>) {
    let reader = tokio::spawn(read_input(BufReader::new(tokio::io::stdin()), input_tx, limiter));
    let writer = tokio::spawn(write_output(tokio::io::stdout(), output_rx));
    (reader, writer)
}

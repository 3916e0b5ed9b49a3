//! Line-oriented question loop over a shared session.

use anyhow::Context;
use docent_core::{CoreError, RagService};
use docent_llm::LlmProvider;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

const HELP: &str = "Type a question, or one of: /history /clear /rebuild /reset /help, exit";

#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Question(&'a str),
    History,
    Clear,
    Rebuild,
    Reset,
    Help,
    Exit,
    Empty,
}

fn parse(line: &str) -> Input<'_> {
    match line.trim() {
        "" => Input::Empty,
        "exit" | "quit" | "/exit" | "/quit" => Input::Exit,
        "/history" => Input::History,
        "/clear" => Input::Clear,
        "/rebuild" => Input::Rebuild,
        "/reset" => Input::Reset,
        "/help" => Input::Help,
        q => Input::Question(q),
    }
}

/// Read questions from `reader` until EOF or `exit`, writing answers to `writer`.
///
/// Recoverable failures (missing index, quota, upstream errors) are printed and the loop
/// continues.
///
/// # Errors
///
/// Returns an error only when reading input or writing output fails.
pub async fn run<P, R, W>(
    service: &RagService<P>,
    session_id: &str,
    reader: R,
    mut writer: W,
) -> anyhow::Result<()>
where
    P: LlmProvider,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    writer.write_all(format!("{HELP}\n").as_bytes()).await?;
    loop {
        writer.write_all(b"> ").await?;
        writer.flush().await?;
        let Some(line) = lines.next_line().await.context("failed to read input")? else {
            break;
        };

        let out = match parse(&line) {
            Input::Empty => continue,
            Input::Exit => break,
            Input::Help => HELP.to_owned(),
            Input::History => render_history(service, session_id).await,
            Input::Clear => {
                service.clear_history(session_id).await;
                "History cleared.".to_owned()
            }
            Input::Rebuild => match service.rebuild_index().await {
                Ok(stats) => format!(
                    "Indexed {} document(s) into {} chunk(s).",
                    stats.documents, stats.chunks
                ),
                Err(e) => report(&e),
            },
            Input::Reset => match service.reset().await {
                Ok(_) => "All uploads and the index were deleted.".to_owned(),
                Err(e) => report(&e),
            },
            Input::Question(q) => match service.ask(session_id, q).await {
                Ok(answer) => match answer.queries_remaining {
                    Some(left) => format!("{}\n[{left} question(s) left]", answer.text),
                    None => answer.text,
                },
                Err(e) => report(&e),
            },
        };
        writer.write_all(format!("{out}\n").as_bytes()).await?;
    }
    writer.flush().await?;
    Ok(())
}

async fn render_history<P: LlmProvider>(service: &RagService<P>, session_id: &str) -> String {
    let history = service.history(session_id).await;
    if history.is_empty() {
        return "No questions asked yet.".to_owned();
    }
    history
        .iter()
        .map(|e| format!("Q: {}\nA: {}", e.question, e.answer))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn report(err: &CoreError) -> String {
    if !matches!(
        err,
        CoreError::NotFound(_) | CoreError::QuotaExceeded { .. } | CoreError::EmptyQuestion
    ) {
        tracing::error!("chat command failed: {err}");
    }
    format!("error: {err}")
}

//! Terminal front end: text rendering and the interactive loop.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::error;

use crate::agents::LibrarianAgent;
use crate::models::RecommendationResult;

pub fn render(result: &RecommendationResult) -> String {
    let mut out = format!(
        "\n=== Recommendation ===\n{}\nReason: {}\n",
        result.choice.title, result.choice.reason
    );

    let full = &result.full_summary;
    if full.found {
        if let Some(author) = &full.author {
            out.push_str(&format!("Author: {}\n", author));
        }
        out.push_str(&format!("\nFull summary:\n{}\n", full.summary));
    } else {
        out.push_str("\nFull summary unavailable.\n");
    }

    out.push_str(&format!(
        "\n(RAG candidates): {}\n",
        result.candidate_titles().join(", ")
    ));
    out.push_str("\n-------------------------------------\n\n");
    out
}

fn is_exit(line: &str) -> bool {
    line.is_empty() || line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit")
}

/// Read one query per line until EOF, a blank line, `exit` or `quit`.
/// Retrieval failures are reported and the loop keeps going.
pub async fn run_repl<R, W>(
    librarian: &LibrarianAgent,
    top_k: usize,
    input: R,
    mut output: W,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    output
        .write_all(b"Smart Librarian (CLI). Ask a question or type 'exit':\n")
        .await?;

    loop {
        output.write_all(b"> ").await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            output.write_all(b"\nBye!\n").await?;
            break;
        };
        let query = line.trim();
        if is_exit(query) {
            output.write_all(b"Bye!\n").await?;
            break;
        }

        match librarian.recommend(query, top_k).await {
            Ok(result) => output.write_all(render(&result).as_bytes()).await?,
            Err(e) => {
                error!("Recommendation failed: {}", e);
                output
                    .write_all(format!("Error: could not search the catalog ({})\n\n", e).as_bytes())
                    .await?;
            }
        }
    }

    output.flush().await
}

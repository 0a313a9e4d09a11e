//! Collection sanity report: size, a few sample rows, and raw hits for a probe query.

use anyhow::Result;
use std::io::Write;

use finrag_core::traits::ChunkStore;

pub const PROBE_QUERY: &str = "How to file ITR for FY 2024-25?";
const SAMPLE_ROWS: usize = 5;
const SNIPPET_CHARS: usize = 200;

fn snippet(text: &str) -> &str {
    match text.char_indices().nth(SNIPPET_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub async fn write_collection_report<S, W>(store: &S, out: &mut W) -> Result<usize>
where
    S: ChunkStore + ?Sized,
    W: Write,
{
    let total = store.count().await?;
    writeln!(out, "Collection '{}': {} documents", store.name(), total)?;
    let rows = store.get(Some(SAMPLE_ROWS)).await?;
    if !rows.is_empty() {
        writeln!(out, "\nSample documents:")?;
    }
    for row in rows {
        writeln!(out, "Source: {}", row.metadata.source)?;
        writeln!(out, "Content (first {SNIPPET_CHARS} chars): {}", snippet(&row.content))?;
        writeln!(out, "{}", "-".repeat(50))?;
    }
    Ok(total)
}

pub async fn write_probe_report<S, W>(store: &S, query: &str, n_results: usize, out: &mut W) -> Result<usize>
where
    S: ChunkStore + ?Sized,
    W: Write,
{
    let hits = store.query(query, n_results).await?;
    writeln!(out, "\nQuery: {query}")?;
    if hits.is_empty() {
        writeln!(out, "(no results)")?;
    }
    for hit in &hits {
        writeln!(out, "Source: {}, Distance: {:.4}", hit.metadata.source, hit.distance)?;
        writeln!(out, "Content snippet: {}", snippet(&hit.content))?;
        writeln!(out, "{}", "=".repeat(50))?;
    }
    Ok(hits.len())
}

#[cfg(test)]
mod tests {
    use super::snippet;

    #[test]
    fn snippet_respects_char_boundaries() {
        let text = "₹".repeat(250);
        assert_eq!(snippet(&text).chars().count(), 200);
        assert_eq!(snippet("short"), "short");
    }
}

use serde::Serialize;

use crate::{
    cli::SearchArgs,
    error::Result,
    fuzzy::{MatchField, SearchHit, Threshold},
    repository::Repository,
    settings::Settings,
    text_util::extract_snippet,
};

/// A ranked hit as shown to the user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalResult {
    pub rank: usize,
    pub id: u64,
    pub title: String,
    pub category: String,
    pub score: Option<f64>,
    pub field: Option<MatchField>,
    pub snippet: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse<'a> {
    query: &'a str,
    threshold: f64,
    result_count: usize,
    results: &'a [FinalResult],
}

/// Resolve the threshold: command-line flag first, then stored setting.
pub fn resolve_threshold(
    flag: Option<f64>,
    settings: &Settings,
) -> Result<Threshold> {
    match flag {
        Some(value) => Threshold::new(value),
        None => Ok(settings.threshold),
    }
}

/// Run a search with CLI arguments and stored settings applied.
///
/// 1. Fuzzy search over the repository
/// 2. Limit to -n results (or the stored limit) unless --all
/// 3. Attach ranks and snippets
pub fn execute_search(
    args: &SearchArgs,
    repo: &Repository,
    settings: &Settings,
) -> Result<(Threshold, Vec<FinalResult>)> {
    let threshold = resolve_threshold(args.threshold, settings)?;
    let hits = repo.search(&args.query, threshold)?;

    let limit = if args.all {
        hits.len()
    } else {
        args.count.unwrap_or(settings.limit)
    };

    let results = hits
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, hit)| to_final(i + 1, hit, &args.query))
        .collect();
    Ok((threshold, results))
}

fn to_final(rank: usize, hit: SearchHit, query: &str) -> FinalResult {
    let SearchHit {
        document,
        score,
        field,
    } = hit;
    FinalResult {
        rank,
        id: document.id.get(),
        snippet: extract_snippet(&document.content, query),
        title: document.title,
        category: document.category.to_string(),
        score,
        field,
    }
}

/// Format results for human-readable terminal output.
pub fn format_human(results: &[FinalResult]) {
    if results.is_empty() {
        println!("No results found.");
        return;
    }

    for r in results {
        match (r.score, r.field) {
            (Some(score), Some(field)) => println!(
                "{:>3}. [{:.3}] #{} {} ({}, matched {field})",
                r.rank, score, r.id, r.title, r.category
            ),
            _ => println!(
                "{:>3}. #{} {} ({})",
                r.rank, r.id, r.title, r.category
            ),
        }
        if let Some(snippet) = &r.snippet {
            for line in snippet.lines() {
                println!("     {line}");
            }
        }
    }
    println!("\n{} result(s)", results.len());
}

/// Format results as JSON output.
pub fn format_json(
    results: &[FinalResult],
    query: &str,
    threshold: Threshold,
) -> Result<()> {
    let response = SearchResponse {
        query,
        threshold: threshold.get(),
        result_count: results.len(),
        results,
    };
    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}

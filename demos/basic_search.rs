//! Example: Search two terms on DuckDuckGo and print a summary.

use search_digest::{ProviderKind, QueryTerms, Search, SearchConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let search = Search::from_config(&SearchConfig::default())?;
    println!("Configured {} search engines", search.engine_count());

    let terms = QueryTerms::new(["rust programming language", "tokio runtime"])?;
    println!("Searching for: {:?}", terms.as_slice());
    println!();

    let results = search.search(ProviderKind::DuckDuckGo, &terms).await;
    println!("Found {} results", results.len());
    println!();

    for (i, result) in results.iter().take(10).enumerate() {
        println!("{}. {}", i + 1, result.title_or_empty());
        println!("   URL: {}", result.url);
        if !result.description.is_empty() {
            let snippet: String = result.description.chars().take(100).collect();
            println!("   {}", snippet);
        }
        println!();
    }

    println!("--- summary ---");
    println!("{}", search_digest::summarize(results, true));

    Ok(())
}

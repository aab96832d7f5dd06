//! Example: Prose digest of Google result pages.

use search_digest::{ProviderKind, QueryTerms, Search, SearchConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let search = Search::from_config(&SearchConfig::default())?;
    let terms = QueryTerms::single("rust borrow checker")?;

    let digest = search.digest(ProviderKind::Google, false, &terms).await;
    if digest.is_empty() {
        println!("Google returned nothing (blocked or rate limited?)");
    } else {
        println!("{}", digest);
    }

    Ok(())
}

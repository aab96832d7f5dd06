//! # search-digest
//!
//! Fetches results from external search providers, merges them into a
//! deduplicated set, and renders that set as plain-text summaries.
//!
//! - Per-provider extraction from raw HTML/JSON (Google result pages,
//!   DuckDuckGo's handshake-protected JSON endpoint, generic JSON APIs)
//! - Concurrent fan-out over several query terms with a bounded per-term retry
//! - Deduplication by URL and text summaries
//! - A thin HTTP surface (see [`server`])
//!
//! Provider failures never surface as errors: they degrade to fewer (or no)
//! results.
//!
//! ## Example
//!
//! ```rust,no_run
//! use search_digest::{ProviderKind, QueryTerms, Search, SearchConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let search = Search::from_config(&SearchConfig::default())?;
//!     let terms = QueryTerms::new(["rust programming", "tokio runtime"])?;
//!
//!     for result in search.search(ProviderKind::DuckDuckGo, &terms).await {
//!         println!("{}: {}", result.title_or_empty(), result.url);
//!     }
//!     println!("{}", search.summary(ProviderKind::Google, false, &terms).await);
//!     Ok(())
//! }
//! ```

mod engine;
mod error;
mod query;
mod result;
mod search;

pub mod aggregator;
pub mod config;
pub mod engines;
pub mod fetcher;
pub mod fetcher_http;
pub mod server;

pub use aggregator::{deduplicate, render_block, summarize};
pub use config::{ClientConfig, RetryPolicy, SearchConfig};
pub use engine::{Engine, EngineConfig, ProviderKind};
pub use error::{Result, SearchError};
pub use query::{QueryTerms, SafeSearch, TimeRange};
pub use result::{is_absolute_http_url, SearchResult};
pub use search::{Search, DIGEST_SEPARATOR};

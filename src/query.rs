//! Query terms and provider query knobs.

use serde::{Deserialize, Serialize};

use crate::{Result, SearchError};

/// Safe search level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafeSearch {
    /// No filtering.
    #[default]
    Off,
    /// Moderate filtering.
    Moderate,
    /// Strict filtering.
    Strict,
}

impl SafeSearch {
    /// Value of DuckDuckGo's `p` parameter.
    pub fn ddg_param(self) -> i8 {
        match self {
            SafeSearch::Strict => 1,
            SafeSearch::Moderate => -1,
            SafeSearch::Off => -2,
        }
    }
}

/// Time range filter for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Day,
    Week,
    Month,
    Year,
}

impl TimeRange {
    /// Value of DuckDuckGo's `df` parameter.
    pub fn ddg_param(self) -> &'static str {
        match self {
            TimeRange::Day => "d",
            TimeRange::Week => "w",
            TimeRange::Month => "m",
            TimeRange::Year => "y",
        }
    }
}

/// Ordered, non-empty set of query terms for one aggregation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryTerms(Vec<String>);

impl QueryTerms {
    /// Builds a term set. Blank terms are dropped; an empty result is an
    /// `InvalidQuery` error.
    pub fn new<I, S>(terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let terms: Vec<String> = terms
            .into_iter()
            .map(Into::into)
            .filter(|t| !t.trim().is_empty())
            .collect();

        if terms.is_empty() {
            return Err(SearchError::InvalidQuery("Query cannot be empty".into()));
        }
        Ok(Self(terms))
    }

    /// Builds a term set holding a single term.
    pub fn single(term: impl Into<String>) -> Result<Self> {
        Self::new([term.into()])
    }

    /// Returns the terms in caller order.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no terms.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

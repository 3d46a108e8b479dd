use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::BillId;

/// Normalized query handed to the legislation search index.
///
/// The site's search form always asks the index for fully loaded records
/// (`load_all`), and a blank submission means "show everything" rather
/// than "show nothing".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: Option<String>,
    pub load_all: bool,
}

impl SearchQuery {
    pub fn from_form_input(raw: Option<&str>) -> Self {
        let text = raw
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_owned);
        Self {
            text,
            load_all: true,
        }
    }

    pub fn matches_all(&self) -> bool {
        self.text.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct BillHit {
    pub bill_id: BillId,
    pub identifier: String,
    pub description: String,
    pub slug: String,
    pub last_action_date: Option<NaiveDate>,
}

/// Boundary to the search subsystem. The storage crate ships the default
/// implementation; a dedicated index can stand in behind the same trait.
#[async_trait]
pub trait SearchIndex {
    async fn search_bills(&self, query: &SearchQuery) -> anyhow::Result<Vec<BillHit>>;
}

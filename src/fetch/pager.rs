//! Pull-based pager over one HelpScout endpoint
//!
//! Each `next_page` call issues exactly one request, normalizes the rows,
//! and advances the page cursor; `None` marks exhaustion. The pager
//! performs no retries of its own (the HTTP client owns those) and never
//! re-orders pages.

use crate::error::Result;
use crate::http::{HelpScoutClient, RequestConfig};
use crate::streams::{PageEnvelope, StreamDescriptor};
use crate::transform::{normalize_embedded_page, normalize_flat_page};
use crate::types::{JsonObject, JsonValue};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// Hard ceiling on pages fetched for one endpoint invocation
pub const MAX_PAGES: u32 = 1000;

/// Per-invocation query context for a pager
#[derive(Debug, Clone)]
pub struct FetchQuery {
    path: String,
    cursor: Option<DateTime<Utc>>,
    window_end: DateTime<Utc>,
}

impl FetchQuery {
    /// Create a query for an endpoint path (parent ids already substituted)
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            cursor: None,
            window_end: Utc::now(),
        }
    }

    /// Set the effective start cursor used for server-side filtering
    #[must_use]
    pub fn with_cursor(mut self, cursor: DateTime<Utc>) -> Self {
        self.cursor = Some(cursor);
        self
    }

    /// Set the window end sent to date-windowed endpoints
    #[must_use]
    pub fn with_window_end(mut self, end: DateTime<Utc>) -> Self {
        self.window_end = end;
        self
    }

    /// Endpoint path this query targets
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Format an instant the way HelpScout query parameters expect
fn format_cursor(instant: &DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Pager yielding normalized pages of one stream's endpoint
pub struct Pager<'a> {
    descriptor: &'static StreamDescriptor,
    query: FetchQuery,
    client: &'a HelpScoutClient,
    next_page: u32,
    done: bool,
}

impl<'a> Pager<'a> {
    /// Create a pager; fetching always starts at page 1
    pub fn new(
        descriptor: &'static StreamDescriptor,
        query: FetchQuery,
        client: &'a HelpScoutClient,
    ) -> Self {
        Self {
            descriptor,
            query,
            client,
            next_page: 1,
            done: false,
        }
    }

    /// Fetch and normalize the next page; `None` once exhausted
    pub async fn next_page(&mut self) -> Result<Option<Vec<JsonObject>>> {
        if self.done {
            return Ok(None);
        }

        let mut request = RequestConfig::new().query("page", self.next_page.to_string());
        for &(key, value) in self.descriptor.static_query_params {
            request = request.query(key, value);
        }
        if let (Some(param), Some(cursor)) =
            (self.descriptor.bookmark_query_param(), self.query.cursor)
        {
            request = request.query(param, format_cursor(&cursor));
        }
        if self.descriptor.date_window_params {
            if let Some(cursor) = self.query.cursor {
                request = request.query("start", format_cursor(&cursor));
            }
            request = request.query("end", format_cursor(&self.query.window_end));
        }

        let page = self
            .client
            .get_json_with_config(self.query.path(), request)
            .await?;

        let records = match self.descriptor.envelope {
            PageEnvelope::Embedded => {
                normalize_embedded_page(&page, self.descriptor.data_key, self.descriptor.id)?
            }
            PageEnvelope::Flat => {
                normalize_flat_page(&page, self.descriptor.data_key, self.descriptor.id)?
            }
        };

        self.advance(&page, records.len());
        Ok(Some(records))
    }

    /// Update pagination counters from the envelope of the page just read
    fn advance(&mut self, page: &JsonValue, record_count: usize) {
        let Some((current, total)) = self.page_info(page) else {
            // No envelope means a single-page response
            self.done = true;
            return;
        };

        debug!(
            stream = %self.descriptor.id,
            page = current,
            total_pages = total,
            records = record_count,
            "fetched page"
        );

        // Some endpoints (workflows) report page 0 when the first page is
        // the only page; terminal, not an error.
        if current == 0 || current >= total {
            self.done = true;
            return;
        }

        if current + 1 > MAX_PAGES {
            warn!(
                stream = %self.descriptor.id,
                "stopping pagination at the {MAX_PAGES} page ceiling"
            );
            self.done = true;
            return;
        }

        self.next_page = current + 1;
    }

    /// Current page number and total pages, per the descriptor's envelope
    fn page_info(&self, page: &JsonValue) -> Option<(u32, u32)> {
        let (number, total) = match self.descriptor.envelope {
            PageEnvelope::Embedded => {
                let info = page.get("page")?;
                (info.get("number")?, info.get("totalPages")?)
            }
            PageEnvelope::Flat => (page.get("page")?, page.get("pages")?),
        };
        let number = u32::try_from(number.as_u64()?).ok()?;
        let total = u32::try_from(total.as_u64()?).ok()?;
        Some((number, total))
    }
}

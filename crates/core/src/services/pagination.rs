//! Cursor-following enumeration over list-style provider queries.

use std::collections::{HashSet, VecDeque};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::services::provider::{
    CloudProvider, ListQuery, PageRequest, ProviderError, CURSOR_FIELD,
};

enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Lazy, finite, non-restartable sequence of page items.
///
/// `fetch` is called with the cursor of the next page (`None` for the first
/// page). A failed fetch is yielded as an `Err` item and ends the sequence, so
/// callers always see whether the enumeration was complete.
pub struct Paginator<F> {
    fetch: F,
    label: String,
    item_fields: &'static [&'static str],
    cursor: Cursor,
    seen: HashSet<String>,
    buffered: VecDeque<Value>,
    pending_error: Option<ProviderError>,
}

impl<F> Paginator<F>
where
    F: FnMut(Option<&str>) -> Result<Value, ProviderError>,
{
    pub fn new(label: impl Into<String>, item_fields: &'static [&'static str], fetch: F) -> Self {
        Self {
            fetch,
            label: label.into(),
            item_fields,
            cursor: Cursor::Start,
            seen: HashSet::new(),
            buffered: VecDeque::new(),
            pending_error: None,
        }
    }

    /// Deserialize every item into `T`, stopping at the first failure.
    pub fn collect_typed<T: DeserializeOwned>(self) -> Result<Vec<T>, ProviderError> {
        let label = self.label.clone();
        self.map(|item| {
            item.and_then(|value| {
                serde_json::from_value(value).map_err(|e| {
                    ProviderError::InvalidResponse(format!("unexpected item in {label}: {e}"))
                })
            })
        })
        .collect()
    }
}

impl<F> Iterator for Paginator<F>
where
    F: FnMut(Option<&str>) -> Result<Value, ProviderError>,
{
    type Item = Result<Value, ProviderError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffered.pop_front() {
                return Some(Ok(item));
            }
            if let Some(err) = self.pending_error.take() {
                return Some(Err(err));
            }

            let cursor = match std::mem::replace(&mut self.cursor, Cursor::Done) {
                Cursor::Done => return None,
                Cursor::Start => None,
                Cursor::Next(token) => Some(token),
            };

            let page = match (self.fetch)(cursor.as_deref()) {
                Ok(page) => page,
                Err(err) => return Some(Err(err)),
            };
            self.buffered.extend(extract_items(&page, self.item_fields));

            match next_cursor(&page) {
                Some(next) if !self.seen.insert(next.clone()) => {
                    self.pending_error = Some(ProviderError::PaginationLoop {
                        query: self.label.clone(),
                        cursor: next,
                    });
                }
                Some(next) => self.cursor = Cursor::Next(next),
                None => {}
            }
        }
    }
}

/// Enumerate a provider list query page by page.
pub fn paginate<'a>(
    provider: &'a dyn CloudProvider,
    query: ListQuery,
    limit: Option<u32>,
) -> Paginator<impl FnMut(Option<&str>) -> Result<Value, ProviderError> + 'a> {
    let label = query.label();
    let item_fields = query.item_fields();
    Paginator::new(label, item_fields, move |cursor: Option<&str>| {
        tracing::debug!(
            provider = provider.name(),
            query = ?query,
            cursor = ?cursor,
            "fetching page"
        );
        provider.list_page(&PageRequest { query: &query, cursor, limit })
    })
}

/// Items of the first populated field from `fields`.
pub fn extract_items(page: &Value, fields: &[&str]) -> Vec<Value> {
    fields
        .iter()
        .find_map(|field| page.get(*field).and_then(Value::as_array))
        .cloned()
        .unwrap_or_default()
}

/// Non-empty cursor of a page, if any.
pub fn next_cursor(page: &Value) -> Option<String> {
    page.get(CURSOR_FIELD)
        .and_then(Value::as_str)
        .filter(|cursor| !cursor.is_empty())
        .map(str::to_string)
}

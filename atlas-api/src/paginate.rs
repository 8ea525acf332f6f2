//! Lazy listing over paginated endpoints.
//!
//! Two strategies, both producing a single-pass stream of records that
//! fetches a page only when the consumer polls past the previous one:
//!
//! - [`cursor_pages`] walks a list sorted by id, advancing an `id__gt`
//!   cursor to the last id seen until the platform reports no next page.
//! - [`id_batches`] looks up an explicit id list in fixed-size `id__in`
//!   batches, one request per batch.
//!
//! A failed fetch yields a single `Err` and ends the stream; records
//! already yielded stay with the caller.

use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use tracing::debug;

use atlas_core::constants::PAGE_SIZE;
use atlas_core::error::{AtlasError, AtlasResult};

use crate::client::{AtlasClient, QueryParams};
use crate::response::Page;

/// Stream of records from a listing endpoint.
pub type RecordStream<T> = BoxStream<'static, AtlasResult<T>>;

/// Records that can position an `id__gt` cursor.
pub trait CursorKey {
    fn cursor_key(&self) -> u64;
}

/// Position of an `id__gt` cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdCursor {
    /// Before the first record (`id__gt=-1`).
    Start,
    /// After the record with this id.
    After(u64),
}

impl IdCursor {
    pub fn as_param(&self) -> String {
        match self {
            IdCursor::Start => "-1".to_string(),
            IdCursor::After(id) => id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum CursorState {
    Fetch(IdCursor),
    Done,
}

/// Walk a cursor-paginated listing from the beginning.
///
/// `params` must already carry `sort=id`; the cursor adds `id__gt`.
pub fn cursor_pages<T>(client: AtlasClient, url: String, params: QueryParams) -> RecordStream<T>
where
    T: DeserializeOwned + CursorKey + Send + 'static,
{
    let pages = stream::try_unfold(CursorState::Fetch(IdCursor::Start), move |state| {
        fetch_after(client.clone(), url.clone(), params.clone(), state)
    });
    flatten(pages)
}

async fn fetch_after<T>(
    client: AtlasClient,
    url: String,
    mut query: QueryParams,
    state: CursorState,
) -> AtlasResult<Option<(Vec<T>, CursorState)>>
where
    T: DeserializeOwned + CursorKey,
{
    let cursor = match state {
        CursorState::Done => return Ok(None),
        CursorState::Fetch(cursor) => cursor,
    };
    query.push(("id__gt".to_string(), cursor.as_param()));

    let page: Page<T> = client.get_json(&url, &query).await?;

    let next_state = match page.next {
        None => CursorState::Done,
        Some(ref next) => {
            let last = page.results.last().ok_or_else(|| {
                AtlasError::Pagination(format!(
                    "page after id {} was empty but reported a next page ({next})",
                    cursor.as_param()
                ))
            })?;
            CursorState::Fetch(IdCursor::After(last.cursor_key()))
        }
    };

    debug!(
        parent: client.span(),
        records = page.results.len(),
        more = page.next.is_some(),
        "page fetched"
    );
    Ok(Some((page.results, next_state)))
}

/// Look up `ids` in batches of `PAGE_SIZE`, one request per batch.
///
/// `ids` is owned by the stream and never modified; an empty list makes
/// no requests.
pub fn id_batches<T>(
    client: AtlasClient,
    url: String,
    params: QueryParams,
    ids: Vec<u64>,
) -> RecordStream<T>
where
    T: DeserializeOwned + Send + 'static,
{
    let ids: Arc<[u64]> = ids.into();
    let pages = stream::try_unfold(0usize, move |offset| {
        fetch_batch(
            client.clone(),
            url.clone(),
            params.clone(),
            Arc::clone(&ids),
            offset,
        )
    });
    flatten(pages)
}

async fn fetch_batch<T>(
    client: AtlasClient,
    url: String,
    mut query: QueryParams,
    ids: Arc<[u64]>,
    offset: usize,
) -> AtlasResult<Option<(Vec<T>, usize)>>
where
    T: DeserializeOwned,
{
    if offset >= ids.len() {
        return Ok(None);
    }
    let end = (offset + PAGE_SIZE).min(ids.len());
    query.push(("id__in".to_string(), join_ids(&ids[offset..end])));

    let page: Page<T> = client.get_json(&url, &query).await?;
    debug!(
        parent: client.span(),
        batch_start = offset,
        batch_len = end - offset,
        records = page.results.len(),
        "batch fetched"
    );
    Ok(Some((page.results, end)))
}

fn flatten<T, S>(pages: S) -> RecordStream<T>
where
    T: Send + 'static,
    S: futures::Stream<Item = AtlasResult<Vec<T>>> + Send + 'static,
{
    pages
        .map_ok(|records| stream::iter(records.into_iter().map(Ok::<T, AtlasError>)))
        .try_flatten()
        .boxed()
}

/// Comma-join ids for `id__in` and measurement probe selectors.
pub fn join_ids(ids: &[u64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

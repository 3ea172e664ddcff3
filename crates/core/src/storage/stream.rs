use std::future::Future;

use futures_util::stream::{self, BoxStream, StreamExt};

use super::Result;

/// Rows fetched per window by [`fetch_in_batches`] unless a repository is
/// configured otherwise.
pub const DEFAULT_BATCH_SIZE: u32 = 256;

/// Lazy, single-pass sequence of decoded entities.
///
/// Once exhausted the stream keeps yielding `None`. A decode failure is
/// yielded as an `Err` at its position; items before it are unaffected.
pub type EntityStream<E> = BoxStream<'static, Result<E>>;

/// Wraps fetched rows in an [`EntityStream`] that decodes each row only
/// when the stream is advanced to it.
pub fn decode_rows<R, E, D>(rows: Vec<R>, decode: D) -> EntityStream<E>
where
    R: Send + 'static,
    E: Send + 'static,
    D: FnMut(R) -> Result<E> + Send + 'static,
{
    stream::iter(rows.into_iter().map(decode)).fuse().boxed()
}

/// Position of a batched read within the requested `LIMIT`/`OFFSET` range.
struct Window {
    offset: u32,
    remaining: Option<u32>,
    done: bool,
}

impl Window {
    fn next_size(&self, batch_size: u32) -> Option<u32> {
        if self.done {
            return None;
        }
        match self.remaining {
            Some(0) => None,
            Some(remaining) => Some(remaining.min(batch_size)),
            None => Some(batch_size),
        }
    }

    fn advance(&mut self, requested: u32, fetched: usize) {
        let fetched = u32::try_from(fetched).unwrap_or(u32::MAX);
        self.offset = self.offset.saturating_add(fetched);
        self.remaining = self.remaining.map(|r| r.saturating_sub(fetched));
        // A short window means the source has no more rows.
        self.done = fetched < requested;
    }
}

/// Builds an [`EntityStream`] that pulls rows from the backend one window
/// at a time.
///
/// `fetch(limit, offset)` runs only when the consumer has drained the
/// previous window, so at most `batch_size` rows are held at once. The
/// stream covers `offset..offset + limit` of the underlying result and
/// ends after a short window or after yielding a fetch error.
pub fn fetch_in_batches<R, E, Q, Fut, D>(
    limit: Option<u32>,
    offset: Option<u32>,
    batch_size: u32,
    fetch: Q,
    mut decode: D,
) -> EntityStream<E>
where
    R: Send + 'static,
    E: Send + 'static,
    Q: Fn(u32, u32) -> Fut + Send + 'static,
    Fut: Future<Output = Result<Vec<R>>> + Send + 'static,
    D: FnMut(R) -> Result<E> + Send + 'static,
{
    let batch_size = batch_size.max(1);
    let window = Window {
        offset: offset.unwrap_or(0),
        remaining: limit,
        done: false,
    };

    stream::unfold((window, fetch), move |(mut window, fetch)| async move {
        let Some(size) = window.next_size(batch_size) else {
            return None;
        };
        let batch = fetch(size, window.offset).await;
        match &batch {
            Ok(rows) => window.advance(size, rows.len()),
            Err(_) => window.done = true,
        }
        Some((batch, (window, fetch)))
    })
    .flat_map(|batch| {
        let rows: Vec<Result<R>> = match batch {
            Ok(rows) => rows.into_iter().map(Ok).collect(),
            Err(err) => vec![Err(err)],
        };
        stream::iter(rows)
    })
    .map(move |row| row.and_then(&mut decode))
    .fuse()
    .boxed()
}

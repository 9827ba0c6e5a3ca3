use super::CycleContext;
use crate::metrics::ShelfStat;
use bookstack_client::{
    models::{
        BookDetail,
        ContentCounts,
        ShelfDetail,
        ShelfSummary,
    },
    ApiError,
    ApiResult,
    Endpoint,
    ListQuery,
};
use futures::future::join_all;

pub(crate) async fn list_shelves(ctx: &CycleContext) -> ApiResult<Vec<ShelfSummary>> {
    match ctx
        .bounded(ctx.api.fetch_collection(Endpoint::Shelves, ListQuery::all()))
        .await
    {
        Ok(listing) => listing.decode(),
        Err(ApiError::NotFound) => Ok(Vec::new()),
        Err(err) => Err(err),
    }
}

/// Stats for every shelf, in the given order. Shelves that no longer exist are left out.
pub(crate) async fn collect_all(ctx: &CycleContext, shelves: &[ShelfSummary]) -> Vec<ShelfStat> {
    join_all(shelves.iter().map(|shelf| compute_shelf_stats(ctx, shelf)))
        .await
        .into_iter()
        .flatten()
        .collect()
}

/// `None` when the shelf was deleted since it was listed.
pub(crate) async fn compute_shelf_stats(ctx: &CycleContext, shelf: &ShelfSummary) -> Option<ShelfStat> {
    let detail = match shelf_detail(ctx, shelf.id).await {
        Ok(detail) => detail,
        Err(ApiError::NotFound) => {
            debug!(shelf_id = shelf.id, "Shelf disappeared, dropping it");
            return None;
        }
        Err(err) => {
            warn!(shelf_id = shelf.id, %err, "Failed to read shelf, reporting it as partial");
            return Some(ShelfStat::failed(shelf.id, shelf.name.clone()));
        }
    };

    // The shelf-detail permit is released here, before the book fan-out starts.
    let results = join_all(detail.books.iter().map(|book| book_counts(ctx, book.id))).await;

    let mut stat = ShelfStat::empty(detail.id, detail.name);
    for (book, result) in detail.books.iter().zip(results) {
        match result {
            Ok(counts) => stat.add_book(counts),
            Err(ApiError::NotFound) => debug!(shelf_id = stat.id, book_id = book.id, "Book disappeared, skipping it"),
            Err(err) => {
                warn!(shelf_id = stat.id, book_id = book.id, %err, "Failed to read book");
                stat.add_unreadable_book();
            }
        }
    }
    Some(stat)
}

async fn shelf_detail(ctx: &CycleContext, id: u64) -> ApiResult<ShelfDetail> {
    let value = ctx.gated(ctx.api.fetch_detail(Endpoint::Shelves, id)).await?;
    Ok(serde_json::from_value(value)?)
}

async fn book_counts(ctx: &CycleContext, id: u64) -> ApiResult<ContentCounts> {
    let value = ctx.gated(ctx.api.fetch_detail(Endpoint::Books, id)).await?;
    let book: BookDetail = serde_json::from_value(value)?;
    Ok(book.content_counts())
}

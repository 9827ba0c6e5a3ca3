use super::CycleContext;
use crate::metrics::LastUpdatedPage;
use bookstack_client::{
    models::{
        PageDetail,
        PageSummary,
    },
    ApiError,
    ApiResult,
    Endpoint,
    ListQuery,
};

/// Pages considered by the change detector, newest first by server ordering.
pub const CANDIDATE_WINDOW: usize = 10;

pub(crate) async fn find_last_updated_page(ctx: &CycleContext) -> ApiResult<Option<LastUpdatedPage>> {
    let query = ListQuery::all().sorted_by("-updated_at").take(CANDIDATE_WINDOW);
    let listing = match ctx.bounded(ctx.api.fetch_collection(Endpoint::Pages, query)).await {
        Ok(listing) => listing,
        Err(ApiError::NotFound) => return Ok(None),
        Err(err) => return Err(err),
    };
    let candidates: Vec<PageSummary> = listing.decode()?;

    let Some(newest) = select_newest(&candidates) else {
        return Ok(None);
    };

    let detail = match ctx.bounded(ctx.api.fetch_detail(Endpoint::Pages, newest.id)).await {
        Ok(value) => serde_json::from_value::<PageDetail>(value)?,
        Err(ApiError::NotFound) => {
            debug!(page_id = newest.id, "Newest page disappeared before its detail was read");
            return Ok(None);
        }
        Err(err) => return Err(err),
    };

    Ok(Some(LastUpdatedPage::from_detail(detail, ctx.api.base_url())))
}

/// Maximum by `(updated_at, id)`.
pub fn select_newest(candidates: &[PageSummary]) -> Option<&PageSummary> {
    candidates.iter().max_by_key(|page| (page.updated_at, page.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{
        DateTime,
        Utc,
    };

    fn page(id: u64, updated_at: &str) -> PageSummary {
        PageSummary {
            id,
            name: format!("page {id}"),
            updated_at: DateTime::parse_from_rfc3339(updated_at).unwrap().with_timezone(&Utc),
        }
    }

    #[test]
    fn newest_wins_regardless_of_order() {
        let pages = [
            page(1, "2024-01-01T00:00:00Z"),
            page(2, "2024-03-01T00:00:00Z"),
            page(3, "2024-02-01T00:00:00Z"),
        ];
        assert_eq!(select_newest(&pages).map(|page| page.id), Some(2));
    }

    #[test]
    fn ties_go_to_the_highest_id() {
        let pages = [page(7, "2024-03-01T12:00:00Z"), page(12, "2024-03-01T12:00:00Z")];
        assert_eq!(select_newest(&pages).map(|page| page.id), Some(12));
        let reversed = [page(12, "2024-03-01T12:00:00Z"), page(7, "2024-03-01T12:00:00Z")];
        assert_eq!(select_newest(&reversed).map(|page| page.id), Some(12));
    }

    #[test]
    fn nothing_to_pick() {
        assert!(select_newest(&[]).is_none());
    }
}

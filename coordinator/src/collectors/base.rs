use super::CycleContext;
use crate::metrics::Counts;
use bookstack_client::{
    models::SystemInfo,
    ApiError,
    ApiResult,
    Endpoint,
    ListQuery,
};
use futures::future::try_join_all;

pub(crate) struct BaseStats {
    pub(crate) counts: Counts,
    pub(crate) system: SystemInfo,
}

/// System info plus one count per endpoint, issued together. The first failure
/// other than a 404 fails the whole set.
pub(crate) async fn collect(ctx: &CycleContext) -> ApiResult<BaseStats> {
    let system = ctx.bounded(ctx.api.fetch_system());
    let totals = try_join_all(Endpoint::counted().map(|endpoint| async move {
        count(ctx, endpoint).await.map(|total| (endpoint, total))
    }));

    let (system, totals) = tokio::try_join!(system, totals)?;

    let mut counts = Counts::default();
    for (endpoint, total) in totals {
        counts.set(endpoint, total);
    }
    Ok(BaseStats { counts, system })
}

async fn count(ctx: &CycleContext, endpoint: Endpoint) -> ApiResult<u64> {
    match ctx
        .bounded(ctx.api.fetch_collection(endpoint, ListQuery::count_only()))
        .await
    {
        Ok(listing) => Ok(listing.total),
        Err(ApiError::NotFound) => {
            debug!(%endpoint, "Endpoint not found, counting zero");
            Ok(0)
        }
        Err(err) => Err(err),
    }
}

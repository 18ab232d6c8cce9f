//! Product catalogue routes: price bands, name search and product removal
//!
//! The three price bands share one handler pair; [`band_routes`] mounts it
//! once per band using the path table in [`band_paths`].

use super::{AppState, Deleted, QueryPairs, TOTAL_COUNT_HEADER};
use crate::core::error::{ApiError, NotFoundError};
use crate::core::query::{self, DEFAULT_LIMIT, NAME_SEARCH_LIMIT, NameQuery, PriceBand};
use crate::core::record::{self, PRODUCT_ID, PRODUCTS, Record};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

/// `(plain, paged)` route paths for a band
pub fn band_paths(band: PriceBand) -> (&'static str, &'static str) {
    match band {
        PriceBand::Low => (
            "/products/sortByPriceUnder1000K",
            "/products/sortByPriceUnder1000KPage",
        ),
        PriceBand::Mid => (
            "/products/sortByPriceFrom1mto5m",
            "/products/sortByPriceFrom1mto5mPage",
        ),
        PriceBand::High => (
            "/products/sortByPriceOver5m",
            "/products/sortByPriceOver5mPage",
        ),
    }
}

/// Routes for every price band and both name searches
pub fn catalog_routes() -> Router<AppState> {
    band_routes()
        .route("/products/searchByName", get(search_by_name))
        .route("/products/searchByNamePage", get(search_by_name_page))
}

fn band_routes() -> Router<AppState> {
    PriceBand::ALL
        .into_iter()
        .fold(Router::new(), |router, band| {
            let (plain, paged) = band_paths(band);
            router
                .route(
                    plain,
                    get(move |state: State<AppState>, params: QueryPairs| {
                        list_band(band, state, params)
                    }),
                )
                .route(
                    paged,
                    get(move |state: State<AppState>, params: QueryPairs| {
                        list_band_page(band, state, params)
                    }),
                )
        })
}

/// Body of the paged band routes
///
/// `totalPages` and `currentPage` are only reported by bands whose
/// [`PriceBand::reports_page_count`] is set.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BandPage {
    pub total: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_page: Option<usize>,

    pub products: Vec<Record>,
}

/// GET /products/sortByPrice{band}?category=
pub async fn list_band(
    band: PriceBand,
    State(state): State<AppState>,
    params: QueryPairs,
) -> Result<Json<Vec<Record>>, ApiError> {
    let products = state.products().await?;
    Ok(Json(query::filter_by_price_band(
        &products,
        band,
        params.first("category"),
    )))
}

/// GET /products/sortByPrice{band}Page?category=&_page=&_limit=
pub async fn list_band_page(
    band: PriceBand,
    State(state): State<AppState>,
    params: QueryPairs,
) -> Result<Json<BandPage>, ApiError> {
    let products = state.products().await?;
    let matched = query::filter_by_price_band(&products, band, params.first("category"));
    let paging = params.paging();
    let page = query::paginate(matched, paging.page(), paging.limit_or(DEFAULT_LIMIT));

    let counted = band.reports_page_count();
    Ok(Json(BandPage {
        total: page.meta.total,
        total_pages: counted.then_some(page.meta.total_pages),
        current_page: counted.then_some(page.meta.page),
        products: page.items,
    }))
}

/// GET /products/searchByName?name_like=
pub async fn search_by_name(
    State(state): State<AppState>,
    params: QueryPairs,
) -> Result<Json<Vec<Record>>, ApiError> {
    let name = NameQuery::parse(params.first("name_like"))?;
    let products = state.products().await?;
    Ok(Json(query::filter_by_name(&products, &name)))
}

/// GET /products/searchByNamePage?name_like=&_page=&_limit=
///
/// The body is the bare page; the match count travels in `X-Total-Count`.
pub async fn search_by_name_page(
    State(state): State<AppState>,
    params: QueryPairs,
) -> Result<impl IntoResponse, ApiError> {
    let name = NameQuery::parse(params.first("name_like"))?;
    let products = state.products().await?;
    let matched = query::filter_by_name(&products, &name);
    let paging = params.paging();
    let page = query::paginate(
        matched,
        paging.page(),
        paging.limit_or(NAME_SEARCH_LIMIT),
    );

    Ok((
        [(TOTAL_COUNT_HEADER, page.meta.total.to_string())],
        Json(page.items),
    ))
}

/// DELETE /products?productId=
pub async fn delete_product(
    State(state): State<AppState>,
    params: QueryPairs,
) -> Result<Json<Deleted>, ApiError> {
    let product_id = params.product_id()?;
    let matches = |product: &Record| record::field_equals(product, PRODUCT_ID, product_id);

    let removed = state.store.remove(PRODUCTS, &matches).await?;
    if removed == 0 {
        return Err(NotFoundError::Product.into());
    }
    tracing::info!(product_id, removed, "deleted product");

    Ok(Json(Deleted {
        message: format!("Product with productId {} deleted successfully", product_id),
    }))
}

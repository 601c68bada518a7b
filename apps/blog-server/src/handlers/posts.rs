//! Post listing, search and detail handlers.

use actix_web::{HttpResponse, web};
use blog_core::pagination::PageRequest;
use blog_core::service::{ListingScope, PostListing};
use blog_shared::dto::{PageParams, SearchParams};

use super::{base_context, html};
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    params: web::Query<PageParams>,
) -> AppResult<HttpResponse> {
    let page = PageRequest::parse(params.page.as_deref());
    let listing = state.posts.list_posts(identity.viewer(), page).await?;
    render_listing(&state, &identity, listing)
}

/// GET /category/{slug}
pub async fn by_category(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    slug: web::Path<String>,
    params: web::Query<PageParams>,
) -> AppResult<HttpResponse> {
    let page = PageRequest::parse(params.page.as_deref());
    let listing = state
        .posts
        .list_by_category(identity.viewer(), &slug, page)
        .await?;
    render_listing(&state, &identity, listing)
}

/// GET /tag/{slug}
pub async fn by_tag(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    slug: web::Path<String>,
    params: web::Query<PageParams>,
) -> AppResult<HttpResponse> {
    let page = PageRequest::parse(params.page.as_deref());
    let listing = state.posts.list_by_tag(identity.viewer(), &slug, page).await?;
    render_listing(&state, &identity, listing)
}

/// GET /search?query=&page=
pub async fn search(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    params: web::Query<SearchParams>,
) -> AppResult<HttpResponse> {
    let params = params.into_inner();
    let page = PageRequest::parse(params.page.as_deref());
    let results = state
        .posts
        .search(identity.viewer(), params.query.as_deref(), page)
        .await?;

    let query_string = serde_urlencoded::to_string([("query", results.query.as_str())])
        .unwrap_or_default();

    let mut context = base_context(&identity);
    context.insert("scope", &ListingScope::All);
    context.insert("page", &results.page);
    context.insert("searching", &true);
    context.insert("query", &results.query);
    context.insert("post_count", &results.post_count);
    context.insert("page_query_prefix", &format!("?{query_string}&"));
    html(&state, "post_list.html", &context)
}

/// GET /post/{id}
pub async fn detail(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let detail = state.posts.get_post(identity.viewer(), *id).await?;

    let mut context = base_context(&identity);
    context.insert("post", &detail.post);
    context.insert("comments", &detail.comments);
    html(&state, "post_detail.html", &context)
}

fn render_listing(
    state: &AppState,
    identity: &OptionalIdentity,
    listing: PostListing,
) -> AppResult<HttpResponse> {
    let mut context = base_context(identity);
    context.insert("scope", &listing.scope);
    context.insert("page", &listing.page);
    context.insert("searching", &false);
    context.insert("page_query_prefix", "?");
    html(state, "post_list.html", &context)
}

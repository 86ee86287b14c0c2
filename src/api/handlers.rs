use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::RequestId;
use crate::models::{
    validate_sort, CatalogPage, ContentContext, ContentItem, FacetKind, FacetUpdate, FilterState,
    SortKey,
};
use crate::services::{filtering, BrowseContext, FeedStats};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    pub items: Vec<ContentItem>,
    #[serde(default)]
    pub state: FilterState,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    /// Previously issued session id whose filter state should be restored
    #[serde(default)]
    pub resume: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct SortRequest {
    pub sort_by: SortKey,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContextResponse {
    pub context: ContentContext,
    pub query: Option<String>,
    pub state: FilterState,
    pub facets: &'static [FacetKind],
    pub sort_keys: &'static [SortKey],
    pub feed: FeedStats,
}

impl From<&BrowseContext> for ContextResponse {
    fn from(ctx: &BrowseContext) -> Self {
        let context = ctx.state().context;
        Self {
            context,
            query: ctx.query().map(str::to_string),
            state: ctx.state().clone(),
            facets: context.facets(),
            sort_keys: context.sort_keys(),
            feed: ctx.feed().stats(0),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub contexts: Vec<ContextResponse>,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub changed: bool,
    #[serde(flatten)]
    pub context: ContextResponse,
}

#[derive(Debug, Serialize)]
pub struct ResultsResponse {
    pub context: ContentContext,
    pub is_filters_active: bool,
    pub sort_by: SortKey,
    pub total: usize,
    pub items: Vec<ContentItem>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Runs the engine once over a caller-supplied list and snapshot
pub async fn filter_items(
    State(state): State<AppState>,
    Json(request): Json<FilterRequest>,
) -> AppResult<Json<Vec<ContentItem>>> {
    if request.items.len() > state.limits.max_feed_items {
        return Err(AppError::InvalidInput(format!(
            "at most {} items can be filtered per request",
            state.limits.max_feed_items
        )));
    }
    validate_sort(request.state.context, request.state.sort_by)?;

    Ok(Json(filtering::apply(&request.items, &request.state)))
}

/// Opens a new session or resumes a persisted one
pub async fn create_session(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<CreateSessionRequest>,
) -> AppResult<(StatusCode, Json<SessionResponse>)> {
    let id = state.open_session(request.resume).await?;

    let inner = state.inner.read().await;
    let session = inner
        .sessions
        .get(&id)
        .ok_or_else(|| AppError::Internal(format!("session {} vanished after creation", id)))?;

    tracing::info!(request_id = %request_id, session_id = %id, "Session opened");

    let response = SessionResponse {
        id,
        contexts: ContentContext::ALL
            .into_iter()
            .map(|context| ContextResponse::from(session.context(context)))
            .collect(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Closes a session and drops its persisted snapshots
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if state.close_session(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(session_not_found(id))
    }
}

/// Current filter state, facet descriptors and feed progress of a context
pub async fn get_context(
    State(state): State<AppState>,
    Path((id, context)): Path<(Uuid, ContentContext)>,
) -> AppResult<Json<ContextResponse>> {
    let mut inner = state.inner.write().await;
    let session = inner.session_mut(&id).ok_or_else(|| session_not_found(id))?;
    Ok(Json(ContextResponse::from(session.context(context))))
}

/// Sets one facet
pub async fn set_facet(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path((id, context)): Path<(Uuid, ContentContext)>,
    Json(update): Json<FacetUpdate>,
) -> AppResult<Json<ContextResponse>> {
    update.validate(context)?;

    tracing::info!(
        request_id = %request_id,
        session_id = %id,
        context = %context,
        facet = %update.facet(),
        "Setting facet"
    );

    mutate_context(&state, id, context, |ctx| ctx.set_facet(update)).await
}

/// Sets the sort order
pub async fn set_sort(
    State(state): State<AppState>,
    Path((id, context)): Path<(Uuid, ContentContext)>,
    Json(request): Json<SortRequest>,
) -> AppResult<Json<ContextResponse>> {
    validate_sort(context, request.sort_by)?;
    mutate_context(&state, id, context, |ctx| ctx.set_sort_order(request.sort_by)).await
}

/// Restores every facet of a context to its default
pub async fn reset_filters(
    State(state): State<AppState>,
    Path((id, context)): Path<(Uuid, ContentContext)>,
) -> AppResult<Json<ContextResponse>> {
    mutate_context(&state, id, context, BrowseContext::reset).await
}

/// Switches the query a context's feed belongs to
pub async fn change_query(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path((id, context)): Path<(Uuid, ContentContext)>,
    Json(request): Json<QueryRequest>,
) -> AppResult<Json<QueryResponse>> {
    let mut changed = false;
    let Json(response) = mutate_context(&state, id, context, |ctx| {
        changed = ctx.change_query(request.query);
    })
    .await?;

    if changed {
        tracing::info!(
            request_id = %request_id,
            session_id = %id,
            context = %context,
            "Query changed, filters reset"
        );
    }

    Ok(Json(QueryResponse {
        changed,
        context: response,
    }))
}

/// Appends one fetched catalog page to a context's feed
pub async fn append_page(
    State(state): State<AppState>,
    Path((id, context)): Path<(Uuid, ContentContext)>,
    Json(page): Json<CatalogPage>,
) -> AppResult<Json<FeedStats>> {
    if page.results.len() > state.limits.max_page_items {
        return Err(AppError::InvalidInput(format!(
            "page has {} items, limit is {}",
            page.results.len(),
            state.limits.max_page_items
        )));
    }

    let mut inner = state.inner.write().await;
    let session = inner
        .session_mut(&id)
        .ok_or_else(|| session_not_found(id))?;
    let stats = session.context_mut(context).append_page(page);

    Ok(Json(stats))
}

/// Filtered and sorted items of a context
pub async fn get_results(
    State(state): State<AppState>,
    Path((id, context)): Path<(Uuid, ContentContext)>,
) -> AppResult<Json<ResultsResponse>> {
    let mut inner = state.inner.write().await;
    let session = inner
        .session_mut(&id)
        .ok_or_else(|| session_not_found(id))?;
    let ctx = session.context_mut(context);
    let items = ctx.results();

    Ok(Json(ResultsResponse {
        context,
        is_filters_active: ctx.state().is_filters_active,
        sort_by: ctx.state().sort_by,
        total: items.len(),
        items: items.as_ref().clone(),
    }))
}

/// Applies a mutation to a context, persists its snapshot and returns it
async fn mutate_context<F>(
    state: &AppState,
    id: Uuid,
    context: ContentContext,
    mutate: F,
) -> AppResult<Json<ContextResponse>>
where
    F: FnOnce(&mut BrowseContext),
{
    let mut inner = state.inner.write().await;
    let session = inner
        .session_mut(&id)
        .ok_or_else(|| session_not_found(id))?;
    let ctx = session.context_mut(context);
    mutate(ctx);

    state.persist(id, ctx.state());
    Ok(Json(ContextResponse::from(&*ctx)))
}

fn session_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("session {}", id))
}

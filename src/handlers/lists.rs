//! Handlers for the `/lists` resource: lists and the URL entries inside them.

use crate::error::AppError;
use crate::response::{created, no_content, ok};
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, JsonRejection, QueryRejection},
        Query, State,
    },
    response::Response,
    Json,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct GetListsQuery {
    pub id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListBody {
    pub custom_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddUrlBody {
    pub list_id: i64,
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUrlBody {
    pub url_id: i64,
    pub new_url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteQuery {
    pub url_id: Option<String>,
    pub list_id: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// GET /lists?id=<slug> returns one list; without `id`, every list.
pub async fn get_lists(
    State(state): State<AppState>,
    query: Result<Query<GetListsQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    match non_empty(query.id) {
        Some(slug) => Ok(ok(state.lists.get_list(&slug).await?)),
        None => Ok(ok(state.lists.get_all_lists().await?)),
    }
}

/// POST /lists with `{customUrl?}`. An empty body is the same as `{}`.
pub async fn create_list(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AppError> {
    let body = body?;
    let body: CreateListBody = if body.iter().all(u8::is_ascii_whitespace) {
        CreateListBody::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::Validation(format!("invalid JSON body: {}", e)))?
    };
    let list = state.lists.create_list(body.custom_url.as_deref()).await?;
    Ok(created(list))
}

/// PUT /lists with `{listId, url, title?, description?}` appends an entry.
pub async fn add_url(
    State(state): State<AppState>,
    body: Result<Json<AddUrlBody>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = body?;
    let entry = state
        .lists
        .add_url_to_list(
            body.list_id,
            &body.url,
            body.title.as_deref(),
            body.description.as_deref(),
        )
        .await?;
    Ok(ok(entry))
}

/// PATCH /lists with `{urlId, newUrl}` replaces an entry's URL text.
pub async fn update_url(
    State(state): State<AppState>,
    body: Result<Json<UpdateUrlBody>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = body?;
    let entry = state.lists.update_url(body.url_id, &body.new_url).await?;
    Ok(ok(entry))
}

/// DELETE /lists?urlId=<id> or ?listId=<slug>. `urlId` wins when both are given.
pub async fn delete_entry(
    State(state): State<AppState>,
    query: Result<Query<DeleteQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    if let Some(raw) = non_empty(query.url_id) {
        let url_id: i64 = raw
            .trim()
            .parse()
            .map_err(|_| AppError::Validation("urlId must be an integer".into()))?;
        state.lists.delete_url(url_id).await?;
        return Ok(no_content());
    }
    if let Some(slug) = non_empty(query.list_id) {
        state.lists.delete_list(&slug).await?;
        return Ok(no_content());
    }
    Err(AppError::BadRequest("Missing urlId or listId parameter".into()))
}

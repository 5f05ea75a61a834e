use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::db::operations::entries;
use crate::entries::payload::{parse_changes, parse_new_entry};
use crate::entries::{normalize_word, EntryError, PageRequest};
use crate::response::{AppError, MessageResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct SearchQuery {
    q: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/words", get(list_words).post(create_word))
        .route("/api/words/search", get(search_words))
        .route(
            "/api/words/:word",
            get(get_word).put(update_word).delete(delete_word),
        )
}

/// Paging params are read leniently: repeats keep the first value and
/// anything unusable falls back to the defaults.
async fn list_words(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let params = match query {
        Ok(Query(params)) => params,
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "unreadable list query, using defaults");
            Vec::new()
        }
    };
    let request = PageRequest::from_query(
        first_param(&params, "page"),
        first_param(&params, "limit"),
        state.max_page_limit(),
    );

    let page = entries::list_entries_page(state.db_proxy().as_ref(), request).await?;
    Ok(Json(page))
}

async fn search_words(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    let term = query.q.unwrap_or_default();
    if term.trim().is_empty() {
        return Err(EntryError::MissingTerm.into());
    }

    let matches = entries::search_entries(state.db_proxy().as_ref(), &term).await?;
    Ok(Json(matches))
}

fn first_param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

async fn get_word(
    State(state): State<AppState>,
    Path(word): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let key = normalize_word(&word);
    let entry = entries::find_entry(state.db_proxy().as_ref(), &key)
        .await?
        .ok_or(EntryError::NotFound(key))?;
    Ok(Json(entry))
}

async fn create_word(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let entry = parse_new_entry(state.schema(), &body)?;
    let proxy = state.db_proxy();

    // fast path for a friendly answer; the unique index still decides races
    if entries::find_entry(proxy.as_ref(), &entry.word).await?.is_some() {
        return Err(EntryError::DuplicateKey(entry.word).into());
    }

    let created = entries::insert_entry(proxy.as_ref(), entry).await?;
    tracing::info!(word = %created.word, "word created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_word(
    State(state): State<AppState>,
    Path(word): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let key = normalize_word(&word);
    let changes = parse_changes(state.schema(), &body)?;

    let updated = entries::update_entry(state.db_proxy().as_ref(), &key, changes)
        .await?
        .ok_or(EntryError::NotFound(key))?;
    tracing::info!(word = %updated.word, "word updated");
    Ok(Json(updated))
}

async fn delete_word(
    State(state): State<AppState>,
    Path(word): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let key = normalize_word(&word);
    if !entries::delete_entry(state.db_proxy().as_ref(), &key).await? {
        return Err(EntryError::NotFound(key).into());
    }

    tracing::info!(word = %key, "word deleted");
    Ok(Json(MessageResponse {
        message: "Word deleted successfully".to_string(),
    }))
}

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use super::error::ApiError;
use super::sniff::sniff_content_type;
use super::AppState;
use crate::model::{Page, Session, SessionSummary};

#[derive(Debug, Deserialize)]
pub(crate) struct NameQuery {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageQuery {
    session: Option<String>,
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AvatarQuery {
    session: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RenameRequest {
    #[serde(default)]
    old: String,
    #[serde(default)]
    new: String,
}

fn required(value: Option<String>, what: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::BadRequest(format!("{what} is required"))),
    }
}

fn rename_pair(req: RenameRequest) -> Result<(String, String), ApiError> {
    if req.old.is_empty() || req.new.is_empty() {
        return Err(ApiError::BadRequest("old and new names required".to_owned()));
    }
    Ok((req.old, req.new))
}

/// Last path segment of a user-supplied session name.
fn base_name(name: &str) -> &str {
    let trimmed = name.trim_end_matches(['/', '\\']);
    trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed)
}

pub(crate) async fn ping() -> &'static str {
    "pong"
}

pub(crate) async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<Vec<SessionSummary>>, ApiError> {
    state.run(|store| store.list()).await.map(Json)
}

pub(crate) async fn get_session(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> Result<Json<Session>, ApiError> {
    let name = required(query.name, "name")?;
    state.run(move |store| store.get(&name)).await.map(Json)
}

pub(crate) async fn create_session(
    State(state): State<AppState>,
    Json(mut session): Json<Session>,
) -> Result<StatusCode, ApiError> {
    if session.name.is_empty() {
        return Err(ApiError::BadRequest("name is required".to_owned()));
    }
    session.name = base_name(&session.name).to_owned();
    state.run(move |store| store.create(&session)).await?;
    Ok(StatusCode::CREATED)
}

pub(crate) async fn update_session(
    State(state): State<AppState>,
    Json(session): Json<Session>,
) -> Result<StatusCode, ApiError> {
    if session.name.is_empty() {
        return Err(ApiError::BadRequest("name is required".to_owned()));
    }
    state.run(move |store| store.update(&session)).await?;
    Ok(StatusCode::OK)
}

pub(crate) async fn delete_session(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> Result<StatusCode, ApiError> {
    let name = required(query.name, "name")?;
    state.run(move |store| store.delete(&name)).await?;
    Ok(StatusCode::OK)
}

pub(crate) async fn rename_session(
    State(state): State<AppState>,
    Json(req): Json<RenameRequest>,
) -> Result<StatusCode, ApiError> {
    let (old, new) = rename_pair(req)?;
    state.run(move |store| store.rename(&old, &new)).await?;
    Ok(StatusCode::OK)
}

pub(crate) async fn create_page(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    Json(page): Json<Page>,
) -> Result<StatusCode, ApiError> {
    let session = required(query.session, "session")?;
    state
        .run(move |store| store.create_page(&session, page))
        .await?;
    Ok(StatusCode::OK)
}

pub(crate) async fn update_page(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    Json(page): Json<Page>,
) -> Result<StatusCode, ApiError> {
    let session = required(query.session, "session")?;
    state
        .run(move |store| store.update_page(&session, page))
        .await?;
    Ok(StatusCode::OK)
}

pub(crate) async fn delete_page(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<StatusCode, ApiError> {
    let session = required(query.session, "session")?;
    let id = required(query.id, "page id")?;
    state
        .run(move |store| store.delete_page(&session, &id))
        .await?;
    Ok(StatusCode::OK)
}

pub(crate) async fn list_avatars(
    State(state): State<AppState>,
    Query(query): Query<AvatarQuery>,
) -> Result<Json<Vec<String>>, ApiError> {
    let session = required(query.session, "session")?;
    state
        .run(move |store| store.list_avatars(&session))
        .await
        .map(Json)
}

pub(crate) async fn upload_avatar(
    State(state): State<AppState>,
    Query(query): Query<AvatarQuery>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let session = required(query.session, "session")?;
    let name = required(query.name, "name")?;
    state
        .run(move |store| store.save_avatar(&session, &name, &body))
        .await?;
    Ok(StatusCode::OK)
}

pub(crate) async fn delete_avatar(
    State(state): State<AppState>,
    Query(query): Query<AvatarQuery>,
) -> Result<StatusCode, ApiError> {
    let session = required(query.session, "session")?;
    let name = required(query.name, "name")?;
    state
        .run(move |store| store.delete_avatar(&session, &name))
        .await?;
    Ok(StatusCode::OK)
}

pub(crate) async fn rename_avatar(
    State(state): State<AppState>,
    Query(query): Query<AvatarQuery>,
    Json(req): Json<RenameRequest>,
) -> Result<StatusCode, ApiError> {
    let session = required(query.session, "session")?;
    let (old, new) = rename_pair(req)?;
    state
        .run(move |store| store.rename_avatar(&session, &old, &new))
        .await?;
    Ok(StatusCode::OK)
}

pub(crate) async fn get_avatar(
    State(state): State<AppState>,
    Query(query): Query<AvatarQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let session = required(query.session, "session")?;
    let name = required(query.name, "name")?;
    let data = state
        .run(move |store| store.get_avatar(&session, &name))
        .await?;
    Ok(([(header::CONTENT_TYPE, sniff_content_type(&data))], data))
}

#[cfg(test)]
mod tests {
    use super::base_name;

    #[test]
    fn base_name_keeps_last_segment() {
        assert_eq!(base_name("demo"), "demo");
        assert_eq!(base_name("../../etc/demo"), "demo");
        assert_eq!(base_name("dir/demo/"), "demo");
        assert_eq!(base_name("c:\\decks\\demo"), "demo");
        assert_eq!(base_name("/"), "");
    }
}

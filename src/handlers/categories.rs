use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::db::queries::categories;
use crate::error::{AppError, AppResult};
use crate::models::{CategoryKind, NewCategory, UserCategory};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub tipo: Option<String>,
}

fn validate(category: &NewCategory) -> AppResult<()> {
    if category.name.trim().is_empty() {
        return Err(AppError::Validation("Category name is required".into()));
    }
    let color = category.color.as_str();
    let is_hex = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !is_hex {
        return Err(AppError::Validation(format!(
            "Invalid color '{}', expected #RRGGBB",
            color
        )));
    }
    Ok(())
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<Vec<UserCategory>>>> {
    let kind = match query.tipo.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            CategoryKind::parse(raw)
                .ok_or_else(|| AppError::Validation(format!("Unknown category kind '{}'", raw)))?,
        ),
    };

    let conn = state.db.get()?;
    let cats = categories::list_categories(&conn, kind)?;
    Ok(ApiResponse::ok(cats))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewCategory>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(body) = payload?;
    validate(&body)?;

    let conn = state.db.get()?;
    if categories::find_by_key(&conn, &body.key())?.is_some() {
        return Err(AppError::Conflict(format!(
            "Category '{}' already exists",
            body.name
        )));
    }

    let created = categories::create_category(&conn, &body).map_err(|e| match e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            AppError::Conflict(format!("Category '{}' already exists", body.name))
        }
        other => AppError::Database(other),
    })?;
    info!(category_id = %created.id, name = %created.name, is_default = created.is_default, "Category created");

    Ok((StatusCode::CREATED, ApiResponse::ok(created)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<NewCategory>, JsonRejection>,
) -> AppResult<Json<ApiResponse<UserCategory>>> {
    let Json(body) = payload?;
    validate(&body)?;

    let conn = state.db.get()?;
    categories::get_category(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Category not found".into()))?;

    if let Some(other) = categories::find_by_key(&conn, &body.key())? {
        if other.id != id {
            return Err(AppError::Conflict(format!(
                "Category '{}' already exists",
                body.name
            )));
        }
    }

    categories::update_category(&conn, &id, &body)?;
    let updated = categories::get_category(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Category not found".into()))?;
    Ok(ApiResponse::ok(updated))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let conn = state.db.get()?;
    let category = categories::get_category(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Category not found".into()))?;

    if category.is_default {
        return Err(AppError::Forbidden(
            "Default categories cannot be deleted".into(),
        ));
    }

    categories::delete_category(&conn, &id)?;
    info!(category_id = %id, "Category deleted");
    Ok(ApiResponse::ok(json!({ "id": id })))
}

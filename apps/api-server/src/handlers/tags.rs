//! Tag CRUD handlers. All routes are protected.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use blog_shared::ApiResponse;
use blog_shared::dto::{CreateTagRequest, TagResponse, UpdateTagRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/tags
pub async fn index(state: web::Data<AppState>, _identity: Identity) -> AppResult<HttpResponse> {
    let tags = state.tags.list().await?;
    let data: Vec<TagResponse> = tags.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::new("Tags recuperadas com sucesso.", data)))
}

/// GET /api/tags/{id}
pub async fn show(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let tag = state.tags.get(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "Tag recuperada com sucesso.",
        TagResponse::from(tag),
    )))
}

/// POST /api/tags
pub async fn store(
    state: web::Data<AppState>,
    _identity: Identity,
    body: web::Json<CreateTagRequest>,
) -> AppResult<HttpResponse> {
    let tag = state.tags.create(body.into_inner().name).await?;

    Ok(HttpResponse::Created().json(ApiResponse::new(
        "Tag criada com sucesso.",
        TagResponse::from(tag),
    )))
}

/// PUT /api/tags/{id}
pub async fn update(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateTagRequest>,
) -> AppResult<HttpResponse> {
    let tag = state
        .tags
        .update(path.into_inner(), body.into_inner().name)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "Tag atualizada com sucesso.",
        TagResponse::from(tag),
    )))
}

/// DELETE /api/tags/{id}
pub async fn destroy(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.tags.delete(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "Tag removida com sucesso!",
        serde_json::Value::Null,
    )))
}

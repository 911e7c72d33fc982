//! Post CRUD handlers. All routes are protected.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use blog_core::domain::{NewPost, PostPatch};
use blog_shared::ApiResponse;
use blog_shared::dto::{CreatePostRequest, PostResponse, UpdatePostRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/posts
pub async fn index(state: web::Data<AppState>, _identity: Identity) -> AppResult<HttpResponse> {
    let posts = state.posts.list().await?;
    let data: Vec<PostResponse> = posts.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::new("Posts recuperados com sucesso.", data)))
}

/// GET /api/posts/{id}
pub async fn show(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state.posts.get(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "Post recuperado com sucesso.",
        PostResponse::from(post),
    )))
}

/// POST /api/posts
pub async fn store(
    state: web::Data<AppState>,
    _identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let post = state
        .posts
        .create(NewPost {
            user_id: req.user_id,
            title: req.title,
            content: req.content,
            tag_ids: req.tags,
        })
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::new(
        "Post criado com sucesso.",
        PostResponse::from(post),
    )))
}

/// PUT /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let post = state
        .posts
        .update(
            path.into_inner(),
            PostPatch {
                title: req.title,
                content: req.content,
                user_id: req.user_id,
                tag_ids: req.tags,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "Post atualizado com sucesso.",
        PostResponse::from(post),
    )))
}

/// DELETE /api/posts/{id}
pub async fn destroy(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.posts.delete(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "Post removido com sucesso!",
        serde_json::Value::Null,
    )))
}

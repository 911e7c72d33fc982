//! User CRUD handlers. All routes are protected.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use blog_core::domain::UserPatch;
use blog_shared::ApiResponse;
use blog_shared::dto::{
    CreateUserRequest, PostSummary, UpdateUserRequest, UserDetailResponse, UserResponse,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/users
pub async fn index(state: web::Data<AppState>, _identity: Identity) -> AppResult<HttpResponse> {
    let users = state.users.list().await?;
    let data: Vec<UserResponse> = users.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::new("Usuários recuperados com sucesso.", data)))
}

/// GET /api/users/{id} - includes the user's posts
pub async fn show(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let (user, posts) = state.users.get(path.into_inner()).await?;

    let data = UserDetailResponse {
        user: UserResponse::from(user),
        posts: posts.into_iter().map(PostSummary::from).collect(),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::new("Usuário recuperado com sucesso.", data)))
}

/// POST /api/users
pub async fn store(
    state: web::Data<AppState>,
    _identity: Identity,
    body: web::Json<CreateUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .create(req.name, req.email, req.password)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::new(
        "Usuário criado com sucesso.",
        UserResponse::from(user),
    )))
}

/// PUT /api/users/{id}
pub async fn update(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .update(
            path.into_inner(),
            UserPatch {
                name: req.name,
                email: req.email,
                password: req.password,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "Usuário atualizado com sucesso.",
        UserResponse::from(user),
    )))
}

/// DELETE /api/users/{id}
pub async fn destroy(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.users.delete(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "Usuário removido com sucesso!",
        serde_json::Value::Null,
    )))
}

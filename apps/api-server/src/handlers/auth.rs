//! Authentication handlers: register, login, logout, profile.

use actix_web::{HttpResponse, web};

use blog_core::service::Registration;
use blog_shared::dto::{
    LoginRequest, LoginResponse, MessageResponse, RegisterRequest, RegisterResponse, UserResponse,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let (user, token) = state
        .auth
        .register(Registration {
            name: req.name,
            email: req.email,
            password: req.password,
            password_confirmation: req.password_confirmation,
        })
        .await?;

    Ok(HttpResponse::Created().json(RegisterResponse {
        user: UserResponse::from(user),
        token,
    }))
}

/// POST /api/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let token = state.auth.login(&req.email, &req.password).await?;

    Ok(HttpResponse::Ok().json(LoginResponse { token }))
}

/// POST /api/logout - Protected route
///
/// Tokens are stateless; there is nothing to revoke server-side. The
/// endpoint acknowledges and the client discards its token.
pub async fn logout(_identity: Identity) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Successfully logged out".to_string(),
    }))
}

/// GET /api/profile - Protected route
pub async fn profile(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state.auth.profile(identity.user_id).await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

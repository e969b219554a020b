use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use shared_config::AppConfig;
use shared_models::auth::AuthReason;
use shared_models::error::AppError;

use crate::jwt::validate_token;

/// Authentication middleware. Resolves the bearer credential to a [`User`]
/// and stores it in the request extensions for handlers to pick up.
///
/// [`User`]: shared_models::auth::User
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .ok_or(AppError::Auth(AuthReason::Missing))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth(AuthReason::Malformed))?;

    let token = auth_value
        .strip_prefix("Bearer ")
        .ok_or(AppError::Auth(AuthReason::Malformed))?;

    let user = validate_token(token, &config.supabase_jwt_secret).map_err(AppError::Auth)?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

use axum::{extract::Request, middleware::Next, response::Response};

use crate::{api::identity, app_error::AppError, config};

/// Resolves the bearer token against the auth provider and restricts access to
/// campus accounts. The resolved identity is inserted as a request extension.
pub async fn buyers_authorization(mut req: Request, next: Next) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?
        .to_string();

    let user = identity::get_current_user(reqwest::Client::new(), &token).await?;

    let domain = config::allowed_email_domain();
    if !user.email.ends_with(&format!("@{}", domain)) {
        return Err(AppError::ForbiddenResource(format!(
            "Only {} accounts can use the shop",
            domain
        )));
    }

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

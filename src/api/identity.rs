use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{api::ApiUrls, app_error::AppError};

/// Identity resolved by the external auth provider for a bearer token.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
}

pub async fn get_current_user(client: Client, bearer_token: &str) -> Result<CurrentUser, AppError> {
    let url = ApiUrls::get_auth_service_url();
    let res = client
        .get(format!("{}/user", url))
        .bearer_auth(bearer_token)
        .send()
        .await
        .map_err(|_| AppError::ServiceUnreachable("AuthService".into()))?;

    if res.status() == StatusCode::UNAUTHORIZED {
        return Err(AppError::Unauthorized);
    }

    let user: CurrentUser = res
        .json()
        .await
        .map_err(|err| AppError::Other(anyhow::Error::new(err).context("Failed to parse JSON")))?;

    Ok(user)
}

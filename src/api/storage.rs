use anyhow::Result;
use reqwest::Client;

use crate::{api::ApiUrls, app_error::AppError};

/// Stores raw bytes under `bucket/key` in the blob store.
pub async fn upload(client: Client, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<()> {
    let url = ApiUrls::get_storage_service_url();
    let res = client
        .post(format!("{}/object/{}/{}", url, bucket, key))
        .body(bytes)
        .send()
        .await
        .map_err(|_| AppError::ServiceUnreachable("StorageService".into()))?;

    if !res.status().is_success() {
        anyhow::bail!("Blob upload failed with status {}", res.status());
    }

    Ok(())
}

/// Public, retrievable URL for an uploaded object.
pub fn public_url(bucket: &str, key: &str) -> String {
    format!(
        "{}/object/public/{}/{}",
        ApiUrls::get_storage_service_url(),
        bucket,
        key
    )
}

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, multipart};
use serde::Deserialize;

use crate::{api::ApiUrls, app_error::AppError};

#[derive(Deserialize)]
struct RecognizeRes {
    text: String,
}

/// Sends a receipt image to the OCR engine and returns the recognized raw text.
/// Recognition can take several seconds; the call is bounded by `timeout`, and
/// exceeding it surfaces as an unreachable engine.
pub async fn recognize(client: Client, image: Vec<u8>, timeout: Duration) -> Result<String> {
    let url = ApiUrls::get_ocr_service_url();
    let form = multipart::Form::new()
        .part("image", multipart::Part::bytes(image).file_name("receipt"));

    let res: RecognizeRes = client
        .post(format!("{}/recognize", url))
        .timeout(timeout)
        .multipart(form)
        .send()
        .await
        .map_err(|_| AppError::ServiceUnreachable("OcrService".into()))?
        .json()
        .await
        .context("Failed to parse JSON")?;

    Ok(res.text)
}

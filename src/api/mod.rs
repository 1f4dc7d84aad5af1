pub mod identity;
pub mod ocr;
pub mod storage;

pub struct ApiUrls;

impl ApiUrls {
    pub fn get_auth_service_url() -> String {
        std::env::var("AUTH_SERVICE_URL")
            .unwrap_or("http://localhost:3000/auth-service".to_string())
    }

    pub fn get_storage_service_url() -> String {
        std::env::var("STORAGE_SERVICE_URL")
            .unwrap_or("http://localhost:3000/storage-service".to_string())
    }

    pub fn get_ocr_service_url() -> String {
        std::env::var("OCR_SERVICE_URL").unwrap_or("http://localhost:3000/ocr-service".to_string())
    }
}

//! User-facing strings.
//!
//! Face search and event-photo screens speak Arabic, list and detail screens
//! speak Persian, matching the web client these screens replace.

use crate::error::{ApiError, ValidationError};

pub const INVALID_IMAGE: &str = "يرجى اختيار صورة صالحة";
pub const IMAGE_TOO_LARGE: &str = "حجم الصورة يجب أن يكون أقل من 10 ميجابايت";
pub const NO_MATCHES: &str = "لم يتم العثور على صور مطابقة";
pub const SEARCH_FAILED: &str = "فشل البحث. يرجى المحاولة مرة أخرى.";
pub const NO_FACE_DETECTED: &str = "لم يتم اكتشاف وجه في الصورة. يرجى تحميل صورة واضحة.";
pub const PHOTOS_LOAD_FAILED: &str = "فشل في تحميل الصور. يرجى المحاولة مرة أخرى.";

pub const EVENTS_LOAD_FAILED: &str = "خطا در بارگذاری رویدادها. لطفاً دوباره تلاش کنید.";
pub const EVENT_LOAD_FAILED: &str = "خطا در بارگذاری رویداد. لطفاً دوباره تلاش کنید.";
pub const GALLERIES_LOAD_FAILED: &str = "خطا در بارگذاری گالری‌ها. لطفاً دوباره تلاش کنید.";
pub const GALLERY_LOAD_FAILED: &str = "خطا در بارگذاری گالری. لطفاً دوباره تلاش کنید.";

pub const EMPTY_QUERY: &str = "Enter something to search for";
pub const NO_FILE_SELECTED: &str = "Choose a photo first";
pub const NO_EVENT_SELECTED: &str = "Choose an event first";
pub const NOTHING_TO_UPLOAD: &str = "Add some photos to upload";
pub const BUSY: &str = "Please wait for the current request to finish";
pub const LOGIN_FAILED: &str = "Login failed. Check your username and password.";

/// Message shown when a face search fails
pub fn search_failure(err: &ApiError) -> &'static str {
    if err.is_no_face_detected() {
        NO_FACE_DETECTED
    } else {
        SEARCH_FAILED
    }
}

pub fn validation(err: &ValidationError) -> &'static str {
    match err {
        ValidationError::NotAnImage => INVALID_IMAGE,
        ValidationError::TooLarge { .. } => IMAGE_TOO_LARGE,
        ValidationError::EmptyQuery => EMPTY_QUERY,
        ValidationError::NoFileSelected => NO_FILE_SELECTED,
        ValidationError::NoEventSelected => NO_EVENT_SELECTED,
        ValidationError::NothingToUpload => NOTHING_TO_UPLOAD,
        ValidationError::Busy => BUSY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_face_detected_is_special_cased() {
        let err = ApiError::Status {
            status: 400,
            body: r#"{"error":"No face detected in uploaded image"}"#.to_string(),
        };
        assert_eq!(search_failure(&err), NO_FACE_DETECTED);
    }

    #[test]
    fn test_other_failures_are_generic() {
        let errors = [
            ApiError::Status { status: 500, body: "Internal Server Error".to_string() },
            ApiError::Network("connection refused".to_string()),
            ApiError::Decode("expected object".to_string()),
        ];
        for err in &errors {
            assert_eq!(search_failure(err), SEARCH_FAILED);
        }
    }
}

use std::path::PathBuf;

use crate::api::transport::FilePart;
use crate::error::ValidationError;

/// Largest image accepted for search or upload
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// A picked file known only by its metadata; bytes are read when it is sent
#[derive(Debug, Clone, PartialEq)]
pub struct LocalFile {
    pub path: PathBuf,
    pub file_name: String,
    pub mime_type: String,
    pub size: u64,
}

/// Reject anything that is not an image or exceeds the size ceiling
pub fn validate_image(file: &FilePart) -> Result<(), ValidationError> {
    check_image(&file.mime_type, file.bytes.len() as u64)
}

pub fn validate_local(file: &LocalFile) -> Result<(), ValidationError> {
    check_image(&file.mime_type, file.size)
}

fn check_image(mime_type: &str, size: u64) -> Result<(), ValidationError> {
    if !mime_type.starts_with("image/") {
        return Err(ValidationError::NotAnImage);
    }
    if size > MAX_IMAGE_BYTES {
        return Err(ValidationError::TooLarge {
            size,
            limit: MAX_IMAGE_BYTES,
        });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn file_of(name: &str, mime_type: &str, size: usize) -> FilePart {
    use std::sync::Arc;
    FilePart {
        file_name: name.to_string(),
        mime_type: mime_type.to_string(),
        bytes: Arc::new(vec![0u8; size]),
    }
}

#[cfg(test)]
pub(crate) fn local_of(name: &str, mime_type: &str, size: u64) -> LocalFile {
    LocalFile {
        path: PathBuf::from("/photos").join(name),
        file_name: name.to_string(),
        mime_type: mime_type.to_string(),
        size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("application/pdf")]
    #[case("text/plain")]
    #[case("video/mp4")]
    #[case("")]
    fn test_non_images_rejected(#[case] mime: &str) {
        let file = file_of("x", mime, 10);
        assert_eq!(validate_image(&file), Err(ValidationError::NotAnImage));
    }

    #[test]
    fn test_size_ceiling_is_inclusive() {
        let at_limit = file_of("a.jpg", "image/jpeg", MAX_IMAGE_BYTES as usize);
        assert_eq!(validate_image(&at_limit), Ok(()));

        let over = file_of("b.jpg", "image/jpeg", MAX_IMAGE_BYTES as usize + 1);
        assert!(matches!(validate_image(&over), Err(ValidationError::TooLarge { .. })));
    }

    #[test]
    fn test_local_files_checked_by_metadata() {
        assert_eq!(validate_local(&local_of("a.png", "image/png", 2048)), Ok(()));
        assert_eq!(
            validate_local(&local_of("clip.jpg", "image/jpeg", 4 * 1024 * 1024 * 1024)),
            Err(ValidationError::TooLarge {
                size: 4 * 1024 * 1024 * 1024,
                limit: MAX_IMAGE_BYTES
            })
        );
        assert_eq!(
            validate_local(&local_of("notes.txt", "text/plain", 1)),
            Err(ValidationError::NotAnImage)
        );
    }
}

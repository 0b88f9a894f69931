/// Local image handling
///
/// This module handles:
/// - Inspecting picked files and reading them when they are sent
/// - Generating previews of the selected face image
/// - Fetching and caching remote photos for the viewer
/// - Collecting image files from a folder for bulk upload
use image::imageops::FilterType;
use image::{ImageFormat, ImageReader};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::api::transport::{FilePart, HttpTransport};
use crate::messages;
use crate::state::selection::{LocalFile, MAX_IMAGE_BYTES};

/// Longest edge of the selected-image preview
const PREVIEW_SIZE: u32 = 384;

/// Extensions picked up when uploading a whole folder
pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "webp", "gif", "bmp"];

/// Decoded RGBA pixels ready for display
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Encoded photo bytes plus their pixel size
#[derive(Debug, Clone, PartialEq)]
pub struct RemotePhoto {
    pub url: String,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Bytes sniffed for the MIME type of a picked file
const SNIFF_LEN: usize = 64;

/// Read a picked file into an upload part, refusing oversize files before
/// touching their content
pub async fn read_file(path: PathBuf) -> Result<FilePart, String> {
    let size = tokio::fs::metadata(&path)
        .await
        .map_err(|e| format!("Could not read {}: {}", path.display(), e))?
        .len();
    if size > MAX_IMAGE_BYTES {
        warn!("{} is {size} bytes, not reading it", path.display());
        return Err(messages::IMAGE_TOO_LARGE.to_string());
    }

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| format!("Could not read {}: {}", path.display(), e))?;

    Ok(FilePart {
        file_name: file_name_of(&path),
        mime_type: mime_type_for(&path, &bytes),
        bytes: Arc::new(bytes),
    })
}

/// Size and type of a picked file from its metadata and first few bytes
pub async fn inspect_file(path: PathBuf) -> Result<LocalFile, String> {
    let mut file = tokio::fs::File::open(&path)
        .await
        .map_err(|e| format!("Could not open {}: {}", path.display(), e))?;
    let size = file
        .metadata()
        .await
        .map_err(|e| format!("Could not stat {}: {}", path.display(), e))?
        .len();

    let mut header = Vec::with_capacity(SNIFF_LEN);
    (&mut file)
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut header)
        .await
        .map_err(|e| format!("Could not read {}: {}", path.display(), e))?;

    Ok(LocalFile {
        file_name: file_name_of(&path),
        mime_type: mime_type_for(&path, &header),
        size,
        path,
    })
}

/// Inspect several files, dropping the ones that cannot be opened
pub async fn inspect_files(paths: Vec<PathBuf>) -> Vec<LocalFile> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        match inspect_file(path).await {
            Ok(file) => files.push(file),
            Err(e) => warn!("{e}"),
        }
    }
    files
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload".to_string())
}

/// Read a picked face image and decode its preview off the UI thread
pub async fn read_with_preview(path: PathBuf) -> Result<(FilePart, Option<Preview>), String> {
    let file = read_file(path).await?;
    let bytes = file.bytes.clone();

    // Decoding is CPU-bound
    let preview = tokio::task::spawn_blocking(move || preview(&bytes))
        .await
        .map_err(|e| format!("Task join error: {}", e))?;

    Ok((file, preview))
}

/// MIME type from content first, then extension
pub fn mime_type_for(path: &Path, bytes: &[u8]) -> String {
    image::guess_format(bytes)
        .or_else(|_| ImageFormat::from_path(path))
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| "application/octet-stream".to_string())
}

/// Downscaled RGBA preview of an encoded image
pub fn preview(bytes: &[u8]) -> Option<Preview> {
    let img = image::load_from_memory(bytes).ok()?;
    let thumb = img.resize(PREVIEW_SIZE, PREVIEW_SIZE, FilterType::Triangle);
    let rgba = thumb.to_rgba8();
    Some(Preview {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

/// Pixel size without decoding the whole image
pub fn dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

/// Get the photo cache directory
/// Returns ~/.cache/ifoto/photos on Linux
pub fn photo_cache_dir() -> Option<PathBuf> {
    let mut path = dirs_next::cache_dir().or_else(dirs_next::home_dir)?;
    path.push("ifoto");
    path.push("photos");
    Some(path)
}

/// Cache file for a remote URL
pub fn cached_path(cache_dir: &Path, url: &str) -> PathBuf {
    let mut hasher = DefaultHasher::new();
    url.hash(&mut hasher);
    cache_dir.join(format!("{:016x}.img", hasher.finish()))
}

/// Fetch a photo for the viewer, going to the network only on a cache miss
pub async fn load_photo(transport: Arc<HttpTransport>, url: String) -> Result<RemotePhoto, String> {
    let cache_file = photo_cache_dir().map(|dir| cached_path(&dir, &url));

    let cached = match &cache_file {
        Some(path) => tokio::fs::read(path).await.ok(),
        None => None,
    };

    let bytes = match cached {
        Some(bytes) => {
            debug!("📸 Cache hit for {url}");
            bytes
        }
        None => {
            let bytes = transport
                .download(&url)
                .await
                .map_err(|e| format!("Could not fetch photo: {e}"))?;
            if let Some(path) = &cache_file {
                store_in_cache(path, &bytes).await;
            }
            bytes
        }
    };

    let (width, height) =
        dimensions(&bytes).ok_or_else(|| "Downloaded file is not an image".to_string())?;
    Ok(RemotePhoto {
        url,
        bytes,
        width,
        height,
    })
}

async fn store_in_cache(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            warn!("Could not create photo cache directory: {e}");
            return;
        }
    }
    if let Err(e) = tokio::fs::write(path, bytes).await {
        warn!("Could not cache photo at {}: {e}", path.display());
    }
}

/// Every image file under `folder`, recursively, sorted by path
pub fn image_files_in(folder: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = WalkDir::new(folder)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.to_string_lossy().to_lowercase())
                .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        })
        .collect();
    paths.sort();
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 40, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_mime_sniffing() {
        let png = png_bytes(4, 4);
        assert_eq!(mime_type_for(Path::new("no_extension"), &png), "image/png");
        assert_eq!(mime_type_for(Path::new("photo.JPG"), b"garbage"), "image/jpeg");
        assert_eq!(
            mime_type_for(Path::new("notes.txt"), b"hello"),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_preview_is_downscaled() {
        let preview = preview(&png_bytes(1000, 500)).unwrap();
        assert_eq!((preview.width, preview.height), (384, 192));
        assert_eq!(preview.rgba.len(), 384 * 192 * 4);
        assert!(super::preview(b"not an image").is_none());
    }

    #[test]
    fn test_dimensions() {
        assert_eq!(dimensions(&png_bytes(31, 17)), Some((31, 17)));
        assert_eq!(dimensions(b"nope"), None);
    }

    #[test]
    fn test_cached_path_is_stable_per_url() {
        let dir = Path::new("/cache");
        assert_eq!(cached_path(dir, "https://a/1.jpg"), cached_path(dir, "https://a/1.jpg"));
        assert_ne!(cached_path(dir, "https://a/1.jpg"), cached_path(dir, "https://a/2.jpg"));
    }

    #[tokio::test]
    async fn test_read_with_preview() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selfie.png");
        std::fs::write(&path, png_bytes(800, 800)).unwrap();

        let (file, preview) = read_with_preview(path).await.unwrap();
        assert_eq!(file.mime_type, "image/png");
        let preview = preview.unwrap();
        assert_eq!((preview.width, preview.height), (384, 384));

        assert!(read_with_preview(dir.path().join("missing.png")).await.is_err());
    }

    #[tokio::test]
    async fn test_folder_scan_and_inspect() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("day2")).unwrap();
        std::fs::write(dir.path().join("a.png"), png_bytes(2, 2)).unwrap();
        std::fs::write(dir.path().join("day2").join("b.JPEG"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let paths = image_files_in(dir.path());
        assert_eq!(paths.len(), 2);

        let files = inspect_files(paths).await;
        assert_eq!(files[0].file_name, "a.png");
        assert_eq!(files[0].mime_type, "image/png");
        assert_eq!(files[0].size, png_bytes(2, 2).len() as u64);
        assert_eq!(files[1].mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_oversize_file_is_never_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.jpg");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(MAX_IMAGE_BYTES + 1).unwrap();

        let inspected = inspect_file(path.clone()).await.unwrap();
        assert_eq!(inspected.size, MAX_IMAGE_BYTES + 1);

        assert_eq!(read_file(path).await.unwrap_err(), messages::IMAGE_TOO_LARGE);
    }
}

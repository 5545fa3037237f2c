//! Image Sources
//!
//! Turns a picked file, a dropped file or a camera capture into the single
//! [`ImageHandle`] the scanner works on.

pub mod camera;
pub mod ffmpeg;
pub mod frame;
pub mod handle;

pub use camera::{capture_frame, open_camera, stop_camera, CameraBackend, CameraError, CameraSession};
pub use ffmpeg::FfmpegCamera;
pub use frame::CapturedFrame;
pub use handle::{DataUrl, ImageHandle, ImageOrigin};

use image::ImageFormat;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Which file types the picker accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePolicy {
    /// Accept `application/pdf` besides `image/*`
    pub accept_pdf: bool,
}

impl Default for SourcePolicy {
    fn default() -> Self {
        Self { accept_pdf: true }
    }
}

/// File selection failures
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("'{name}' is not an accepted image type")]
    Unsupported { name: String },
    #[error("Failed to read '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// MIME type for a file name, if it is one the picker accepts
pub fn accepted_mime(name: &str, policy: SourcePolicy) -> Option<&'static str> {
    let path = Path::new(name);
    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    if is_pdf {
        return policy.accept_pdf.then_some("application/pdf");
    }

    ImageFormat::from_path(path)
        .ok()
        .map(|format| format.to_mime_type())
        .filter(|mime| mime.starts_with("image/"))
}

/// Read an image file into an [`ImageHandle`].
///
/// Only the file type is checked; the content is passed through as-is.
pub fn select_from_file(path: &Path, policy: SourcePolicy) -> Result<ImageHandle, SourceError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mime = accepted_mime(&name, policy).ok_or_else(|| SourceError::Unsupported { name: name.clone() })?;
    let bytes = std::fs::read(path).map_err(|source| SourceError::Io {
        name: name.clone(),
        source,
    })?;

    info!("Selected {} ({}, {} bytes)", name, mime, bytes.len());

    Ok(ImageHandle::new(
        ImageOrigin::File {
            name,
            path: Some(path.to_path_buf()),
        },
        DataUrl::new(mime, bytes),
    ))
}

/// Build an [`ImageHandle`] from a dropped file that only carries bytes
pub fn select_from_bytes(name: &str, bytes: impl Into<std::sync::Arc<[u8]>>, policy: SourcePolicy) -> Result<ImageHandle, SourceError> {
    let mime = accepted_mime(name, policy).ok_or_else(|| SourceError::Unsupported { name: name.to_string() })?;
    let data = DataUrl::new(mime, bytes);

    info!("Selected dropped {} ({}, {} bytes)", name, mime, data.bytes().len());

    Ok(ImageHandle::new(
        ImageOrigin::File {
            name: name.to_string(),
            path: None,
        },
        data,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_accepted_mime_images() {
        let policy = SourcePolicy::default();
        assert_eq!(accepted_mime("scan.png", policy), Some("image/png"));
        assert_eq!(accepted_mime("PHOTO.JPG", policy), Some("image/jpeg"));
        assert_eq!(accepted_mime("page.tiff", policy), Some("image/tiff"));
        assert_eq!(accepted_mime("notes.txt", policy), None);
        assert_eq!(accepted_mime("no_extension", policy), None);
    }

    #[test]
    fn test_pdf_depends_on_policy() {
        assert_eq!(accepted_mime("doc.pdf", SourcePolicy { accept_pdf: true }), Some("application/pdf"));
        assert_eq!(accepted_mime("doc.PDF", SourcePolicy { accept_pdf: false }), None);
    }

    #[test]
    fn test_select_from_file_reads_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.png");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"not really a png").unwrap();

        let handle = select_from_file(&path, SourcePolicy::default()).unwrap();

        assert_eq!(handle.data().mime(), "image/png");
        assert_eq!(handle.data().bytes(), b"not really a png");
        assert_eq!(handle.label(), "receipt.png");
        assert!(handle.data().to_string().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_select_from_file_rejects_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let err = select_from_file(&path, SourcePolicy::default()).unwrap_err();
        assert!(matches!(err, SourceError::Unsupported { .. }));
    }

    #[test]
    fn test_select_from_file_missing() {
        let err = select_from_file(Path::new("/nonexistent/scan.png"), SourcePolicy::default()).unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }

    #[test]
    fn test_select_from_bytes() {
        let handle = select_from_bytes("drop.webp", vec![1u8, 2], SourcePolicy::default()).unwrap();
        assert_eq!(handle.data().mime(), "image/webp");
        assert_eq!(
            handle.origin(),
            &ImageOrigin::File {
                name: "drop.webp".to_string(),
                path: None
            }
        );
    }
}

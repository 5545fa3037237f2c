//! In-memory image representation shared by the file and camera sources

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

/// Image bytes tagged with their MIME type, convertible to a `data:` URL
#[derive(Clone, PartialEq, Eq)]
pub struct DataUrl {
    mime: String,
    bytes: Arc<[u8]>,
}

impl DataUrl {
    pub fn new(mime: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared handle to the bytes, cheap to clone into worker threads
    pub fn shared_bytes(&self) -> Arc<[u8]> {
        self.bytes.clone()
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

impl fmt::Debug for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataUrl")
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Where an image came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOrigin {
    /// Picked or dropped file; `path` is absent for drops that only carry bytes
    File { name: String, path: Option<PathBuf> },
    /// Frame captured from the camera
    Camera { width: u32, height: u32 },
}

/// The currently selected image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle {
    /// Unique per selection; clones share it
    id: u64,
    origin: ImageOrigin,
    data: DataUrl,
}

impl ImageHandle {
    pub fn new(origin: ImageOrigin, data: DataUrl) -> Self {
        Self {
            id: NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed),
            origin,
            data,
        }
    }

    pub fn origin(&self) -> &ImageOrigin {
        &self.origin
    }

    pub fn data(&self) -> &DataUrl {
        &self.data
    }

    /// Short label for the UI
    pub fn label(&self) -> String {
        match &self.origin {
            ImageOrigin::File { name, .. } => name.clone(),
            ImageOrigin::Camera { width, height } => format!("Camera capture ({width}x{height})"),
        }
    }

    /// URI for egui's image cache; differs for every distinct selection
    pub fn preview_uri(&self) -> String {
        let extension = self.data.mime().rsplit('/').next().unwrap_or("bin");
        format!("bytes://image-{}.{extension}", self.id)
    }

    /// Whether the data can be previewed as a raster image
    pub fn is_previewable(&self) -> bool {
        self.data.mime().starts_with("image/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_format() {
        let url = DataUrl::new("image/png", vec![1u8, 2, 3]);
        assert_eq!(url.to_string(), "data:image/png;base64,AQID");
    }

    #[test]
    fn test_labels() {
        let file = ImageHandle::new(
            ImageOrigin::File { name: "receipt.jpg".into(), path: None },
            DataUrl::new("image/jpeg", vec![0u8]),
        );
        assert_eq!(file.label(), "receipt.jpg");
        assert!(file.is_previewable());

        let capture = ImageHandle::new(
            ImageOrigin::Camera { width: 640, height: 480 },
            DataUrl::new("image/png", vec![0u8]),
        );
        assert_eq!(capture.label(), "Camera capture (640x480)");
    }

    #[test]
    fn test_pdf_is_not_previewable() {
        let pdf = ImageHandle::new(
            ImageOrigin::File { name: "scan.pdf".into(), path: None },
            DataUrl::new("application/pdf", vec![0u8]),
        );
        assert!(!pdf.is_previewable());
    }

    #[test]
    fn test_preview_uri_distinguishes_selections() {
        let a = ImageHandle::new(
            ImageOrigin::File { name: "a.png".into(), path: None },
            DataUrl::new("image/png", vec![0u8]),
        );
        let b = ImageHandle::new(
            ImageOrigin::File { name: "a.png".into(), path: None },
            DataUrl::new("image/png", vec![0u8]),
        );
        assert_ne!(a.preview_uri(), b.preview_uri());
        assert_eq!(a.preview_uri(), a.clone().preview_uri());
        assert!(a.preview_uri().ends_with(".png"));
    }
}

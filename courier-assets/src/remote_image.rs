//! Remote image download and decode.
//!
//! One blocking GET per call, bounded by a whole-request timeout and a
//! maximum body size. Every failure degrades to "no image".

use std::fmt;
use std::io::Read;
use std::time::Duration;

use courier_core::{AssetConfig, AssetError};
use image::ImageFormat;
use reqwest::blocking::Client;
use tracing::{debug, warn};

/// Timeout used when no configuration is supplied.
pub const DEFAULT_IMAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Largest body accepted when no configuration is supplied (10 MiB).
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// A decoded image, converted to RGBA8.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteImage {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8 pixels, `width * height * 4` bytes.
    pub pixels: Vec<u8>,
    /// Encoding the body was detected as.
    pub format: ImageFormat,
}

impl fmt::Debug for RemoteImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pixels", &format_args!("[{} bytes]", self.pixels.len()))
            .field("format", &self.format)
            .finish()
    }
}

/// Downloads and decodes remote images with a blocking HTTP client.
///
/// The client must not be created or dropped inside an async runtime; run
/// it from a plain thread or `tokio::task::spawn_blocking`.
pub struct RemoteImageLoader {
    client: Client,
    timeout: Duration,
    max_bytes: u64,
}

impl RemoteImageLoader {
    pub fn new(timeout: Duration, max_bytes: u64) -> Result<Self, AssetError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AssetError::ClientInit {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            timeout,
            max_bytes,
        })
    }

    pub fn from_config(config: &AssetConfig) -> Result<Self, AssetError> {
        Self::new(config.image_timeout(), config.max_image_bytes)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Fetch and decode `url`, or `None` on any failure.
    ///
    /// Failures are logged at warn level and never propagated.
    pub fn fetch_remote_image(&self, url: &str) -> Option<RemoteImage> {
        if url.trim().is_empty() {
            warn!("Failed to download image, the URL is empty");
            return None;
        }

        match self.try_fetch(url) {
            Ok(image) => Some(image),
            Err(err) => {
                warn!(url = %url, error = %err, "Failed to download image");
                None
            }
        }
    }

    /// Fetch and decode `url`, reporting why it failed.
    ///
    /// # Errors
    ///
    /// [`AssetError::Unavailable`] for a blank URL, transport errors and
    /// timeouts, non-success statuses, oversize bodies and undecodable data.
    pub fn try_fetch(&self, url: &str) -> Result<RemoteImage, AssetError> {
        if url.trim().is_empty() {
            return Err(unavailable(url, "URL is empty"));
        }

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| unavailable(url, format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(url, format!("response status was {}", status)));
        }

        if let Some(length) = response.content_length() {
            if length > self.max_bytes {
                return Err(unavailable(
                    url,
                    format!("body of {} bytes exceeds limit of {}", length, self.max_bytes),
                ));
            }
        }

        let bytes = self.read_body(url, response)?;
        let image = decode_image(url, &bytes)?;

        debug!(
            url = %url,
            width = image.width,
            height = image.height,
            format = ?image.format,
            size_bytes = bytes.len(),
            "Downloaded image"
        );
        Ok(image)
    }

    fn read_body(&self, url: &str, response: reqwest::blocking::Response) -> Result<Vec<u8>, AssetError> {
        // Chunked responses carry no length, so enforce the limit while reading.
        let mut bytes = Vec::new();
        response
            .take(self.max_bytes.saturating_add(1))
            .read_to_end(&mut bytes)
            .map_err(|e| unavailable(url, format!("failed to read body: {}", e)))?;

        if bytes.len() as u64 > self.max_bytes {
            return Err(unavailable(
                url,
                format!("body exceeds limit of {} bytes", self.max_bytes),
            ));
        }
        Ok(bytes)
    }
}

impl fmt::Debug for RemoteImageLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteImageLoader")
            .field("timeout", &self.timeout)
            .field("max_bytes", &self.max_bytes)
            .finish_non_exhaustive()
    }
}

/// Decode an in-memory image body.
pub fn decode_image(url: &str, bytes: &[u8]) -> Result<RemoteImage, AssetError> {
    let format = image::guess_format(bytes)
        .map_err(|e| unavailable(url, format!("unrecognized image data: {}", e)))?;
    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| unavailable(url, format!("failed to decode image: {}", e)))?;

    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(RemoteImage {
        width,
        height,
        pixels: rgba.into_raw(),
        format,
    })
}

fn unavailable(url: &str, reason: impl Into<String>) -> AssetError {
    AssetError::Unavailable {
        url: url.to_string(),
        reason: reason.into(),
    }
}

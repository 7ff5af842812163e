//! HTML → bitmap. Production shells out to a `wkhtmltoimage`-compatible binary over
//! stdin/stdout; tests plug in a fake through the [`Rasterizer`] trait.

use std::process::Stdio;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::export::ExportError;
use crate::render::SHEET_WIDTH_PX;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];
const ZOOM: &str = "2";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageEncoding {
    Png,
    Jpeg,
}

impl ImageEncoding {
    fn tool_format(&self) -> &'static str {
        match self {
            ImageEncoding::Png => "png",
            ImageEncoding::Jpeg => "jpg",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RasterImage {
    pub bytes: Bytes,
    pub width: u32,
    pub height: u32,
    pub encoding: ImageEncoding,
}

impl RasterImage {
    /// Wraps encoded bytes, reading the pixel size from the image header.
    pub fn from_encoded(bytes: Bytes, encoding: ImageEncoding) -> Result<Self, ExportError> {
        let (width, height) = match encoding {
            ImageEncoding::Png => png_dimensions(&bytes)?,
            ImageEncoding::Jpeg => {
                let info = jpeg_info(&bytes)?;
                (info.width, info.height)
            }
        };
        Ok(Self {
            bytes,
            width,
            height,
            encoding,
        })
    }
}

#[async_trait]
pub trait Rasterizer: Send + Sync {
    async fn rasterize(&self, html: &str, encoding: ImageEncoding) -> Result<RasterImage, ExportError>;
}

pub struct CommandRasterizer {
    program: String,
}

impl CommandRasterizer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl Rasterizer for CommandRasterizer {
    async fn rasterize(&self, html: &str, encoding: ImageEncoding) -> Result<RasterImage, ExportError> {
        let width = SHEET_WIDTH_PX.to_string();
        let mut child = Command::new(&self.program)
            .args([
                "--quiet",
                "--format",
                encoding.tool_format(),
                "--width",
                width.as_str(),
                "--zoom",
                ZOOM,
                "-",
                "-",
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExportError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Feed stdin from a separate task so a full stdout pipe cannot stall the write.
        let writer = child.stdin.take().map(|mut stdin| {
            let html = html.to_owned();
            tokio::spawn(async move {
                if let Err(e) = stdin.write_all(html.as_bytes()).await {
                    warn!("Rasterizer stopped reading input: {e}");
                }
            })
        });

        let output = child.wait_with_output().await?;
        join_input(writer).await;

        if !output.status.success() {
            return Err(ExportError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let image = RasterImage::from_encoded(Bytes::from(output.stdout), encoding)?;
        debug!(
            "Rasterized {} bytes of HTML into {}x{} {:?}",
            html.len(),
            image.width,
            image.height,
            encoding
        );
        Ok(image)
    }
}

/// Waits for the stdin feeder. Returns false if it panicked or was cancelled.
async fn join_input(writer: Option<JoinHandle<()>>) -> bool {
    let Some(writer) = writer else {
        return true;
    };
    match writer.await {
        Ok(()) => true,
        Err(e) => {
            warn!("Rasterizer input task did not finish: {e}");
            false
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Header parsing
// ────────────────────────────────────────────────────────────────────────────

fn be_u16(bytes: &[u8], at: usize) -> Option<u16> {
    Some(u16::from_be_bytes([*bytes.get(at)?, *bytes.get(at + 1)?]))
}

fn be_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let slice = bytes.get(at..at + 4)?;
    Some(u32::from_be_bytes([slice[0], slice[1], slice[2], slice[3]]))
}

/// Width and height from the IHDR chunk, which must come first.
pub fn png_dimensions(bytes: &[u8]) -> Result<(u32, u32), ExportError> {
    let bad = |why| ExportError::BadImage(ImageEncoding::Png, why);
    if bytes.get(..8) != Some(&PNG_SIGNATURE[..]) {
        return Err(bad("missing PNG signature"));
    }
    if bytes.get(12..16) != Some(&b"IHDR"[..]) {
        return Err(bad("first chunk is not IHDR"));
    }
    let width = be_u32(bytes, 16).ok_or(bad("truncated IHDR"))?;
    let height = be_u32(bytes, 20).ok_or(bad("truncated IHDR"))?;
    if width == 0 || height == 0 {
        return Err(bad("zero-sized image"));
    }
    Ok((width, height))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegInfo {
    pub width: u32,
    pub height: u32,
    pub components: u8,
}

/// Walks JPEG marker segments up to the first start-of-frame.
pub fn jpeg_info(bytes: &[u8]) -> Result<JpegInfo, ExportError> {
    let bad = |why| ExportError::BadImage(ImageEncoding::Jpeg, why);
    if bytes.get(..2) != Some(&[0xFF, 0xD8][..]) {
        return Err(bad("missing SOI marker"));
    }

    let mut at = 2;
    loop {
        if bytes.get(at) != Some(&0xFF) {
            return Err(bad("expected a marker"));
        }
        // Any number of 0xFF fill bytes may precede the marker code.
        while bytes.get(at) == Some(&0xFF) {
            at += 1;
        }
        let marker = *bytes.get(at).ok_or(bad("truncated before frame header"))?;
        at += 1;

        match marker {
            // Standalone markers carry no length.
            0x01 | 0xD0..=0xD7 => continue,
            0xD9 | 0xDA => return Err(bad("no frame header before scan data")),
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                let height = be_u16(bytes, at + 3).ok_or(bad("truncated frame header"))?;
                let width = be_u16(bytes, at + 5).ok_or(bad("truncated frame header"))?;
                let components = *bytes.get(at + 7).ok_or(bad("truncated frame header"))?;
                if width == 0 || height == 0 {
                    return Err(bad("zero-sized image"));
                }
                return Ok(JpegInfo {
                    width: width.into(),
                    height: height.into(),
                    components,
                });
            }
            _ => {
                let length = be_u16(bytes, at).ok_or(bad("truncated segment"))?;
                if length < 2 {
                    return Err(bad("invalid segment length"));
                }
                at += usize::from(length);
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_dimensions() {
        assert_eq!(png_dimensions(&fixtures::png(1632, 2112)).unwrap(), (1632, 2112));
    }

    #[test]
    fn test_png_rejects_other_data() {
        assert!(png_dimensions(b"GIF89a").is_err());
        let mut truncated = fixtures::png(10, 10);
        truncated.truncate(18);
        assert!(png_dimensions(&truncated).is_err());
    }

    #[test]
    fn test_jpeg_info_skips_app_segments() {
        let info = jpeg_info(&fixtures::jpeg(1632, 2200)).unwrap();
        assert_eq!(
            info,
            JpegInfo {
                width: 1632,
                height: 2200,
                components: 3
            }
        );
    }

    #[test]
    fn test_jpeg_without_frame_header_is_rejected() {
        assert!(jpeg_info(&[0xFF, 0xD8, 0xFF, 0xD9]).is_err());
        assert!(jpeg_info(&fixtures::png(1, 1)).is_err());
    }

    #[test]
    fn test_from_encoded_checks_requested_encoding() {
        let png = Bytes::from(fixtures::png(4, 3));
        let image = RasterImage::from_encoded(png.clone(), ImageEncoding::Png).unwrap();
        assert_eq!((image.width, image.height), (4, 3));
        assert!(RasterImage::from_encoded(png, ImageEncoding::Jpeg).is_err());
    }

    #[tokio::test]
    async fn test_missing_binary_is_a_spawn_error() {
        let rasterizer = CommandRasterizer::new("definitely-not-a-rasterizer-binary");
        let err = rasterizer
            .rasterize("<html></html>", ImageEncoding::Png)
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_panicked_input_task_is_reported_not_propagated() {
        let panicked: JoinHandle<()> = tokio::spawn(async { panic!("stdin feeder blew up") });
        assert!(!join_input(Some(panicked)).await);
        assert!(join_input(Some(tokio::spawn(async {}))).await);
        assert!(join_input(None).await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_reported() {
        let rasterizer = CommandRasterizer::new("false");
        let err = rasterizer
            .rasterize("<html></html>", ImageEncoding::Png)
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Failed { .. }));
    }
}

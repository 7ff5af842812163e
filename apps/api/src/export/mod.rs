// Export of the open resume as a downloadable PDF or PNG.
// The rendered template goes through the rasterizer; PDF wraps the bitmap in a page.

pub mod pdf;
pub mod raster;

use bytes::Bytes;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::editor::requests::{self, AlreadyInFlight, RequestKey, SharedTracker};
use crate::models::resume::Resume;
use crate::render::render_resume;
use crate::session::{SessionController, SessionError};

use raster::{ImageEncoding, Rasterizer};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to start rasterizer '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("Rasterizer I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rasterizer exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Unreadable {0:?} image: {1}")]
    BadImage(ImageEncoding, &'static str),
}

/// Failure of the export operation as a whole.
#[derive(Debug, Error)]
pub enum ExportRunError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    InFlight(#[from] AlreadyInFlight),

    #[error(transparent)]
    Export(#[from] ExportError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Png,
}

impl ExportFormat {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "pdf" => Some(ExportFormat::Pdf),
            "png" => Some(ExportFormat::Png),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Png => "png",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Png => "image/png",
        }
    }

    fn encoding(&self) -> ImageEncoding {
        match self {
            ExportFormat::Pdf => ImageEncoding::Jpeg,
            ExportFormat::Png => ImageEncoding::Png,
        }
    }
}

/// `Jane   Q Doe` → `Jane_Q_Doe_Resume.pdf`. A blank name yields `Resume.pdf`.
pub fn export_file_name(full_name: &str, format: ExportFormat) -> String {
    let stem: Vec<&str> = full_name.split_whitespace().collect();
    if stem.is_empty() {
        format!("Resume.{}", format.extension())
    } else {
        format!("{}_Resume.{}", stem.join("_"), format.extension())
    }
}

#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Bytes,
}

/// Renders `resume` with its template and encodes it as `format`.
pub async fn export_resume(
    resume: &Resume,
    format: ExportFormat,
    rasterizer: &dyn Rasterizer,
) -> Result<ExportedFile, ExportError> {
    let html = render_resume(resume);
    let image = rasterizer.rasterize(&html, format.encoding()).await?;
    let bytes = match format {
        ExportFormat::Png => image.bytes,
        ExportFormat::Pdf => Bytes::from(pdf::build_pdf(&image)?),
    };
    Ok(ExportedFile {
        file_name: export_file_name(&resume.personal_details.full_name, format),
        content_type: format.content_type(),
        bytes,
    })
}

/// Exports the open resume, tracked under its export key. The session lock is only held
/// while taking a snapshot of the resume.
pub async fn export_active(
    session: &Mutex<SessionController>,
    rasterizer: &dyn Rasterizer,
    tracker: &SharedTracker,
    format: ExportFormat,
) -> Result<ExportedFile, ExportRunError> {
    let resume = session.lock().await.open_resume("export")?;

    let guard = requests::start(tracker, RequestKey::Export {
        resume_id: resume.id.clone(),
    })?;
    match export_resume(&resume, format, rasterizer).await {
        Ok(file) => {
            guard.succeed();
            info!("Exported resume {} as {} ({} bytes)", resume.id, file.file_name, file.bytes.len());
            Ok(file)
        }
        Err(e) => {
            guard.fail();
            error!("Export of resume {} as {:?} failed: {e}", resume.id, format);
            Err(e.into())
        }
    }
}

//! Single-page PDF 1.4 writer around one JPEG.
//!
//! The JPEG is embedded as-is with `/DCTDecode`, so no image decoding happens here. The
//! page is US Letter. The image keeps its aspect ratio, fills the page width (or height,
//! if it is relatively taller than the page) and sits in the top-left corner.

use crate::export::raster::{jpeg_info, ImageEncoding, RasterImage};
use crate::export::ExportError;

pub const PAGE_WIDTH_PT: f64 = 612.0;
pub const PAGE_HEIGHT_PT: f64 = 792.0;

/// Image rectangle in PDF user space (origin bottom-left, points).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

pub fn fit_to_page(image_width: u32, image_height: u32) -> Placement {
    let image_ratio = f64::from(image_width) / f64::from(image_height);
    let page_ratio = PAGE_WIDTH_PT / PAGE_HEIGHT_PT;

    let (width, height) = if image_ratio > page_ratio {
        (PAGE_WIDTH_PT, PAGE_WIDTH_PT / image_ratio)
    } else {
        (PAGE_HEIGHT_PT * image_ratio, PAGE_HEIGHT_PT)
    };

    Placement {
        x: 0.0,
        y: PAGE_HEIGHT_PT - height,
        width,
        height,
    }
}

fn color_space(components: u8) -> Result<&'static str, ExportError> {
    match components {
        1 => Ok("/DeviceGray"),
        3 => Ok("/DeviceRGB"),
        4 => Ok("/DeviceCMYK"),
        _ => Err(ExportError::BadImage(
            ImageEncoding::Jpeg,
            "unsupported component count",
        )),
    }
}

pub fn build_pdf(image: &RasterImage) -> Result<Vec<u8>, ExportError> {
    if image.encoding != ImageEncoding::Jpeg {
        return Err(ExportError::BadImage(
            image.encoding,
            "PDF pages embed JPEG data only",
        ));
    }
    let info = jpeg_info(&image.bytes)?;
    let color_space = color_space(info.components)?;
    let place = fit_to_page(info.width, info.height);

    let content = format!(
        "q {:.2} 0 0 {:.2} {:.2} {:.2} cm /Im0 Do Q\n",
        place.width, place.height, place.x, place.y
    );

    let mut pdf = PdfWriter::new();
    pdf.object(1, b"<< /Type /Catalog /Pages 2 0 R >>");
    pdf.object(2, b"<< /Type /Pages /Kids [3 0 R] /Count 1 >>");
    pdf.object(
        3,
        format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH_PT} {PAGE_HEIGHT_PT}] \
             /Resources << /XObject << /Im0 5 0 R >> >> /Contents 4 0 R >>"
        )
        .as_bytes(),
    );
    pdf.stream(4, "", content.as_bytes());
    pdf.stream(
        5,
        &format!(
            "/Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace {color_space} \
             /BitsPerComponent 8 /Filter /DCTDecode",
            info.width, info.height
        ),
        &image.bytes,
    );
    Ok(pdf.finish(1))
}

/// Appends numbered objects in order and writes the cross-reference table at the end.
struct PdfWriter {
    out: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut out = b"%PDF-1.4\n".to_vec();
        // Binary comment marks the file as binary for transfer tools.
        out.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");
        Self {
            out,
            offsets: Vec::new(),
        }
    }

    fn begin(&mut self, number: usize) {
        debug_assert_eq!(number, self.offsets.len() + 1);
        self.offsets.push(self.out.len());
        self.out
            .extend_from_slice(format!("{number} 0 obj\n").as_bytes());
    }

    fn object(&mut self, number: usize, body: &[u8]) {
        self.begin(number);
        self.out.extend_from_slice(body);
        self.out.extend_from_slice(b"\nendobj\n");
    }

    fn stream(&mut self, number: usize, dict_entries: &str, data: &[u8]) {
        self.begin(number);
        let dict = if dict_entries.is_empty() {
            format!("<< /Length {} >>", data.len())
        } else {
            format!("<< {dict_entries} /Length {} >>", data.len())
        };
        self.out.extend_from_slice(dict.as_bytes());
        self.out.extend_from_slice(b"\nstream\n");
        self.out.extend_from_slice(data);
        self.out.extend_from_slice(b"\nendstream\nendobj\n");
    }

    fn finish(mut self, root: usize) -> Vec<u8> {
        let xref_at = self.out.len();
        let size = self.offsets.len() + 1;
        let mut xref = format!("xref\n0 {size}\n0000000000 65535 f \n");
        for offset in &self.offsets {
            xref.push_str(&format!("{offset:010} 00000 n \n"));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {size} /Root {root} 0 R >>\nstartxref\n{xref_at}\n%%EOF\n"
        ));
        self.out.extend_from_slice(xref.as_bytes());
        self.out
    }
}

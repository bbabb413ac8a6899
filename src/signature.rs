//! Firmas binarias que identifican cada formato soportado.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Result, StripError};
use crate::file_type::{DocumentFormat, Format, ImageFormat};

pub const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
pub const GIF87A: &[u8; 6] = b"GIF87a";
pub const GIF89A: &[u8; 6] = b"GIF89a";
pub const BMP_SIGNATURE: &[u8; 2] = b"BM";
pub const TIFF_INTEL: [u8; 4] = [0x49, 0x49, 0x2A, 0x00];
pub const TIFF_MOTOROLA: [u8; 4] = [0x4D, 0x4D, 0x00, 0x2A];
pub const PDF_PREFIX: &[u8; 5] = b"%PDF-";
pub const CFB_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
pub const RTF_PREFIX: &[u8; 5] = b"{\\rtf";
const ZIP_LOCAL_HEADER: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
const ZIP_EMPTY_ARCHIVE: [u8; 4] = [0x50, 0x4B, 0x05, 0x06];

/// Cantidad de bytes iniciales necesarios para validar `format`.
pub fn header_len(format: Format) -> usize {
    match format {
        Format::Image(ImageFormat::Jpeg) => 2,
        Format::Image(ImageFormat::Png) => 8,
        Format::Image(ImageFormat::Gif) => 6,
        Format::Image(ImageFormat::Bmp) => 2,
        Format::Image(ImageFormat::Tiff) => 4,
        Format::Image(ImageFormat::WebP) => 12,
        Format::Pdf => 5,
        Format::Document(DocumentFormat::OfficeOpenXml | DocumentFormat::OpenDocument) => 4,
        Format::Document(DocumentFormat::LegacyOffice) => 8,
        Format::Document(DocumentFormat::Rtf) => 5,
        Format::Document(DocumentFormat::PlainText) => 0,
    }
}

/// Comprueba que `header` empiece con la firma de `format`.
pub fn check(format: Format, header: &[u8]) -> Result<()> {
    let valid = match format {
        Format::Image(ImageFormat::Jpeg) => header.starts_with(&JPEG_SOI),
        Format::Image(ImageFormat::Png) => header.starts_with(&PNG_SIGNATURE),
        Format::Image(ImageFormat::Gif) => header.starts_with(GIF87A) || header.starts_with(GIF89A),
        Format::Image(ImageFormat::Bmp) => header.starts_with(BMP_SIGNATURE),
        Format::Image(ImageFormat::Tiff) => {
            header.starts_with(&TIFF_INTEL) || header.starts_with(&TIFF_MOTOROLA)
        }
        Format::Image(ImageFormat::WebP) => {
            header.len() >= 12 && &header[0..4] == b"RIFF" && &header[8..12] == b"WEBP"
        }
        Format::Pdf => header.starts_with(PDF_PREFIX),
        Format::Document(DocumentFormat::OfficeOpenXml | DocumentFormat::OpenDocument) => {
            header.starts_with(&ZIP_LOCAL_HEADER) || header.starts_with(&ZIP_EMPTY_ARCHIVE)
        }
        Format::Document(DocumentFormat::LegacyOffice) => header.starts_with(&CFB_SIGNATURE),
        Format::Document(DocumentFormat::Rtf) => header.starts_with(RTF_PREFIX),
        Format::Document(DocumentFormat::PlainText) => true,
    };

    if valid {
        Ok(())
    } else {
        Err(StripError::invalid(format, "la firma del archivo no coincide"))
    }
}

/// Lee solo la cabecera de `path` y valida su firma sin modificar nada.
///
/// Un archivo más corto que la cabecera produce un error de E/S.
pub fn verify_file(path: &Path, format: Format) -> Result<()> {
    let len = header_len(format);
    if len == 0 {
        return Ok(());
    }

    let mut header = vec![0_u8; len];
    File::open(path)?.read_exact(&mut header)?;
    check(format, &header)
}

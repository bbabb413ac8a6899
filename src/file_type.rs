//! Clasificación de archivos por extensión.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Familia de formato usada para agrupar estadísticas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Image,
    Pdf,
    Document,
    Unknown,
}

impl FileType {
    pub fn from_extension(extension: &str) -> FileType {
        Format::from_extension(extension)
            .map(Format::file_type)
            .unwrap_or(FileType::Unknown)
    }

    /// Nombre en plural para reportes.
    pub fn label(self) -> &'static str {
        match self {
            FileType::Image => "Images",
            FileType::Pdf => "PDFs",
            FileType::Document => "Documents",
            FileType::Unknown => "Unknown files",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Tiff,
    WebP,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentFormat {
    /// `.docx`, `.xlsx`, `.pptx`
    OfficeOpenXml,
    /// `.odt`, `.ods`, `.odp`
    OpenDocument,
    /// `.doc`, `.xls`, `.ppt` (Compound File Binary)
    LegacyOffice,
    Rtf,
    PlainText,
}

/// Formato concreto que determina qué limpiador se ejecuta.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    Image(ImageFormat),
    Pdf,
    Document(DocumentFormat),
}

const EXTENSION_TABLE: &[(&str, Format)] = &[
    ("jpg", Format::Image(ImageFormat::Jpeg)),
    ("jpeg", Format::Image(ImageFormat::Jpeg)),
    ("png", Format::Image(ImageFormat::Png)),
    ("gif", Format::Image(ImageFormat::Gif)),
    ("bmp", Format::Image(ImageFormat::Bmp)),
    ("tiff", Format::Image(ImageFormat::Tiff)),
    ("tif", Format::Image(ImageFormat::Tiff)),
    ("webp", Format::Image(ImageFormat::WebP)),
    ("pdf", Format::Pdf),
    ("doc", Format::Document(DocumentFormat::LegacyOffice)),
    ("docx", Format::Document(DocumentFormat::OfficeOpenXml)),
    ("xls", Format::Document(DocumentFormat::LegacyOffice)),
    ("xlsx", Format::Document(DocumentFormat::OfficeOpenXml)),
    ("ppt", Format::Document(DocumentFormat::LegacyOffice)),
    ("pptx", Format::Document(DocumentFormat::OfficeOpenXml)),
    ("odt", Format::Document(DocumentFormat::OpenDocument)),
    ("ods", Format::Document(DocumentFormat::OpenDocument)),
    ("odp", Format::Document(DocumentFormat::OpenDocument)),
    ("rtf", Format::Document(DocumentFormat::Rtf)),
    ("txt", Format::Document(DocumentFormat::PlainText)),
];

impl Format {
    /// Busca el formato de una extensión, con o sin punto inicial.
    ///
    /// La comparación ignora mayúsculas.
    pub fn from_extension(extension: &str) -> Option<Format> {
        let normalized = normalize_extension(extension);
        EXTENSION_TABLE
            .iter()
            .find(|(ext, _)| *ext == normalized)
            .map(|&(_, format)| format)
    }

    pub fn file_type(self) -> FileType {
        match self {
            Format::Image(_) => FileType::Image,
            Format::Pdf => FileType::Pdf,
            Format::Document(_) => FileType::Document,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Format::Image(ImageFormat::Jpeg) => "JPEG",
            Format::Image(ImageFormat::Png) => "PNG",
            Format::Image(ImageFormat::Gif) => "GIF",
            Format::Image(ImageFormat::Bmp) => "BMP",
            Format::Image(ImageFormat::Tiff) => "TIFF",
            Format::Image(ImageFormat::WebP) => "WebP",
            Format::Pdf => "PDF",
            Format::Document(DocumentFormat::OfficeOpenXml) => "Office Open XML",
            Format::Document(DocumentFormat::OpenDocument) => "OpenDocument",
            Format::Document(DocumentFormat::LegacyOffice) => "Office binario",
            Format::Document(DocumentFormat::Rtf) => "RTF",
            Format::Document(DocumentFormat::PlainText) => "Texto plano",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub(crate) fn normalize_extension(extension: &str) -> String {
    extension.strip_prefix('.').unwrap_or(extension).to_lowercase()
}

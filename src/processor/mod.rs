//! Despacho de archivos hacia el limpiador de su formato.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::document::strip_document;
use crate::error::{Result, StripError};
use crate::file_type::{Format, normalize_extension};
use crate::image::strip_image;
use crate::pdf::strip_pdf;
use crate::signature;
use crate::stats::MetadataStats;

/// Campo de metadata encontrado y neutralizado por un limpiador.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundMetadata {
    pub field: String,
    pub example: Option<String>,
}

impl FoundMetadata {
    pub fn new(field: impl Into<String>, example: Option<String>) -> Self {
        Self {
            field: field.into(),
            example,
        }
    }
}

/// Aviso de que el formato se validó pero la metadata no se eliminó por completo.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PartialSupport {
    pub format: Format,
    pub reason: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum StripOutcome {
    /// El archivo se reescribió sin su metadata.
    Stripped,
    /// El formato no tiene dónde guardar metadata (texto plano).
    NothingToStrip,
    /// Solo se validó la firma; el llamador debe advertirlo.
    PartialSupport(PartialSupport),
    /// Modo vista previa: el archivo no se tocó.
    Previewed,
}

impl StripOutcome {
    pub fn is_partial(&self) -> bool {
        matches!(self, StripOutcome::PartialSupport(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StripReport {
    pub format: Format,
    pub outcome: StripOutcome,
    pub found: Vec<FoundMetadata>,
}

impl StripReport {
    pub fn new(format: Format, outcome: StripOutcome, found: Vec<FoundMetadata>) -> Self {
        Self {
            format,
            outcome,
            found,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct ProcessorOptions {
    /// Solo clasificar y validar, sin modificar archivos.
    pub preview: bool,
}

/// Limpia un archivo sin acumular estadísticas.
///
/// `extension` se compara sin distinguir mayúsculas y puede llevar el punto
/// inicial. En vista previa solo se lee la firma del archivo.
pub fn strip_file(path: &Path, extension: &str, preview: bool) -> Result<StripReport> {
    let format = Format::from_extension(extension)
        .ok_or_else(|| StripError::UnsupportedFormat(normalize_extension(extension)))?;
    debug!(path = %path.display(), %format, preview, "archivo clasificado");

    if preview {
        signature::verify_file(path, format)?;
        return Ok(StripReport::new(format, StripOutcome::Previewed, Vec::new()));
    }

    match format {
        Format::Image(image) => strip_image(path, image),
        Format::Pdf => strip_pdf(path),
        Format::Document(document) => strip_document(path, document),
    }
}

/// Limpia archivos uno a uno y acumula estadísticas de la ejecución.
///
/// Cada hilo de trabajo debe usar su propio `Processor` y combinar los
/// resultados con [`MetadataStats::merge`].
#[derive(Debug, Default)]
pub struct Processor {
    options: ProcessorOptions,
    stats: MetadataStats,
}

impl Processor {
    pub fn new(options: ProcessorOptions) -> Self {
        Self {
            options,
            stats: MetadataStats::new(),
        }
    }

    pub fn options(&self) -> ProcessorOptions {
        self.options
    }

    /// Limpia `path` y registra el resultado en las estadísticas.
    ///
    /// Los errores se devuelven tal cual; decidir si continuar con el
    /// siguiente archivo es tarea del llamador.
    pub fn process(&mut self, path: &Path, extension: &str) -> Result<StripReport> {
        let report = strip_file(path, extension, self.options.preview)?;

        let file_type = report.format.file_type();
        self.stats.add_file(file_type);
        for item in &report.found {
            self.stats
                .add_metadata(file_type, &item.field, item.example.as_deref().unwrap_or(""));
        }

        Ok(report)
    }

    pub fn stats(&self) -> &MetadataStats {
        &self.stats
    }

    pub fn into_stats(self) -> MetadataStats {
        self.stats
    }
}

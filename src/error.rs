//! Tipos de error compartidos por todos los limpiadores.

use std::io;

use thiserror::Error;

use crate::file_type::Format;

pub type Result<T> = std::result::Result<T, StripError>;

/// Fallos posibles al limpiar un archivo.
///
/// Los avisos de soporte parcial no son errores; se reportan como
/// [`crate::StripOutcome::PartialSupport`].
#[derive(Error, Debug)]
pub enum StripError {
    /// La firma, el prefijo o la estructura no corresponden al formato esperado.
    #[error("{format} inválido: {reason}")]
    FormatValidation { format: Format, reason: String },

    /// Extensión desconocida o sin limpiador asociado.
    #[error("Formato no soportado: {0}")]
    UnsupportedFormat(String),

    #[error("Error de E/S: {0}")]
    Io(#[from] io::Error),
}

impl StripError {
    pub(crate) fn invalid(format: Format, reason: impl Into<String>) -> Self {
        StripError::FormatValidation {
            format,
            reason: reason.into(),
        }
    }

    /// Convierte un error del lector ZIP conservando los fallos de E/S como tales.
    pub(crate) fn from_zip(format: Format, error: zip::result::ZipError) -> Self {
        match error {
            zip::result::ZipError::Io(error) => StripError::Io(error),
            other => StripError::invalid(format, other.to_string()),
        }
    }

    pub fn is_format_validation(&self) -> bool {
        matches!(self, StripError::FormatValidation { .. })
    }
}

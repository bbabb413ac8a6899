//! Limpieza de metadata en documentos de oficina, RTF y texto plano.

mod archive;
mod constants;
mod rtf;
mod sanitize;
mod xml;

pub use rtf::strip_rtf_bytes;

use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::file_type::{DocumentFormat, Format};
use crate::processor::{PartialSupport, StripOutcome, StripReport};
use crate::signature;

const LEGACY_OFFICE_REASON: &str =
    "formato binario de Office: no se eliminó la metadata de SummaryInformation";

/// Elimina la metadata del documento en `path` según `format`.
pub fn strip_document(path: &Path, format: DocumentFormat) -> Result<StripReport> {
    let full_format = Format::Document(format);

    match format {
        DocumentFormat::OfficeOpenXml | DocumentFormat::OpenDocument => {
            signature::verify_file(path, full_format)?;
            let found = archive::rewrite_archive(path, full_format)?;
            debug!(
                path = %path.display(),
                removed = found.len(),
                "propiedades del documento limpiadas"
            );
            Ok(StripReport::new(full_format, StripOutcome::Stripped, found))
        }
        DocumentFormat::LegacyOffice => {
            signature::verify_file(path, full_format)?;
            debug!(path = %path.display(), "documento binario validado sin reescritura");
            Ok(StripReport::new(
                full_format,
                StripOutcome::PartialSupport(PartialSupport {
                    format: full_format,
                    reason: LEGACY_OFFICE_REASON,
                }),
                Vec::new(),
            ))
        }
        DocumentFormat::Rtf => {
            let found = rtf::strip_rtf(path)?;
            debug!(path = %path.display(), removed = found.len(), "RTF limpiado");
            Ok(StripReport::new(full_format, StripOutcome::Stripped, found))
        }
        DocumentFormat::PlainText => Ok(StripReport::new(
            full_format,
            StripOutcome::NothingToStrip,
            Vec::new(),
        )),
    }
}

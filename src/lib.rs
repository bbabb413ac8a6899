//! Motor de limpieza de metadata para imágenes, PDFs y documentos de oficina.
//!
//! El punto de entrada es [`Processor`]: recibe una ruta validada junto con su
//! extensión, identifica el formato, elimina la metadata reescribiendo el
//! archivo en su lugar y acumula estadísticas de lo encontrado. Recorrer
//! directorios, imprimir resultados o registrar logs es responsabilidad del
//! llamador.
//!
//! ```no_run
//! use metastrip::{Processor, ProcessorOptions};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), metastrip::StripError> {
//! let mut processor = Processor::new(ProcessorOptions::default());
//! let report = processor.process(Path::new("foto.jpg"), "jpg")?;
//! if report.outcome.is_partial() {
//!     eprintln!("limpieza parcial: {:?}", report.outcome);
//! }
//! println!("{}", metastrip::stats::render_text_report(processor.stats()));
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod error;
pub mod file_type;
pub mod image;
pub mod pdf;
pub mod processor;
pub mod signature;
pub mod stats;

mod scratch;

pub use error::{Result, StripError};
pub use file_type::{DocumentFormat, FileType, Format, ImageFormat};
pub use processor::{
    FoundMetadata, PartialSupport, Processor, ProcessorOptions, StripOutcome, StripReport,
    strip_file,
};
pub use stats::{MetadataField, MetadataStats};

//! Limpieza de metadata en imágenes.
//!
//! JPEG y PNG se reescriben en una sola pasada hacia un archivo temporal.
//! GIF, BMP, TIFF y WebP solo se validan: su metadata vive en estructuras que
//! este motor no reescribe, por lo que se informan como soporte parcial.

pub mod jpeg;
pub mod png;

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::file_type::{Format, ImageFormat};
use crate::processor::{FoundMetadata, PartialSupport, StripOutcome, StripReport};
use crate::scratch::ScratchFile;
use crate::signature;

pub use jpeg::strip_jpeg;
pub use png::strip_png;

/// Elimina la metadata de la imagen en `path` según `format`.
pub fn strip_image(path: &Path, format: ImageFormat) -> Result<StripReport> {
    match format {
        ImageFormat::Jpeg => rewrite_image(path, format, |reader, writer| strip_jpeg(reader, writer)),
        ImageFormat::Png => rewrite_image(path, format, |reader, writer| strip_png(reader, writer)),
        ImageFormat::Gif => {
            validate_only(path, format, "GIF conserva sus extensiones de comentario")
        }
        ImageFormat::Bmp => validate_only(path, format, "BMP se valida sin reescritura"),
        ImageFormat::Tiff => validate_only(
            path,
            format,
            "TIFF requiere reescribir los IFD; solo se valida la cabecera",
        ),
        ImageFormat::WebP => validate_only(
            path,
            format,
            "WebP requiere reescribir los chunks RIFF; solo se valida la cabecera",
        ),
    }
}

fn rewrite_image<F>(path: &Path, format: ImageFormat, strip: F) -> Result<StripReport>
where
    F: FnOnce(&mut dyn Read, &mut dyn Write) -> Result<Vec<FoundMetadata>>,
{
    let mut reader = BufReader::new(File::open(path)?);
    let mut scratch = ScratchFile::beside(path)?;

    let found = {
        let mut writer = BufWriter::new(scratch.file_mut());
        let found = strip(&mut reader, &mut writer)?;
        writer.flush()?;
        found
    };
    drop(reader);

    scratch.commit()?;
    debug!(path = %path.display(), removed = found.len(), "imagen limpiada");

    Ok(StripReport::new(
        Format::Image(format),
        StripOutcome::Stripped,
        found,
    ))
}

fn validate_only(path: &Path, format: ImageFormat, reason: &'static str) -> Result<StripReport> {
    let format = Format::Image(format);
    signature::verify_file(path, format)?;
    debug!(path = %path.display(), %format, "imagen validada sin reescritura");

    Ok(StripReport::new(
        format,
        StripOutcome::PartialSupport(PartialSupport { format, reason }),
        Vec::new(),
    ))
}

/// Llena `buf` por completo; devuelve `false` si el flujo terminó antes del primer byte.
///
/// Un final a mitad de `buf` es un error `UnexpectedEof`.
pub(crate) fn read_exact_or_eof<R>(reader: &mut R, buf: &mut [u8]) -> io::Result<bool>
where
    R: Read + ?Sized,
{
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => return Err(io::ErrorKind::UnexpectedEof.into()),
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    Ok(true)
}

/// Copia exactamente `len` bytes de `reader` a `writer`.
pub(crate) fn copy_exact<R, W>(reader: &mut R, writer: &mut W, len: u64) -> io::Result<()>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let copied = io::copy(&mut (&mut *reader).take(len), writer)?;
    if copied < len {
        return Err(io::ErrorKind::UnexpectedEof.into());
    }
    Ok(())
}

/// Lee exactamente `len` bytes; el búfer crece con lo leído, no con `len`.
pub(crate) fn read_payload<R>(reader: &mut R, len: u64) -> io::Result<Vec<u8>>
where
    R: Read + ?Sized,
{
    let mut data = Vec::new();
    let read = (&mut *reader).take(len).read_to_end(&mut data)?;
    if (read as u64) < len {
        return Err(io::ErrorKind::UnexpectedEof.into());
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn read_exact_or_eof_distinguishes_clean_and_torn_ends() {
        let mut buf = [0_u8; 4];

        let mut empty = Cursor::new(Vec::<u8>::new());
        assert!(!read_exact_or_eof(&mut empty, &mut buf).unwrap());

        let mut torn = Cursor::new(vec![1_u8, 2]);
        let err = read_exact_or_eof(&mut torn, &mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);

        let mut full = Cursor::new(vec![1_u8, 2, 3, 4, 5]);
        assert!(read_exact_or_eof(&mut full, &mut buf).unwrap());
        assert_eq!(buf, [1, 2, 3, 4]);
    }

    #[test]
    fn read_payload_does_not_trust_the_declared_length() {
        let mut reader = Cursor::new(vec![7_u8; 3]);
        let err = read_payload(&mut reader, u64::from(u32::MAX)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);

        let mut reader = Cursor::new(vec![7_u8; 5]);
        assert_eq!(read_payload(&mut reader, 4).unwrap(), vec![7_u8; 4]);
    }

    #[test]
    fn copy_exact_reports_short_input() {
        let mut reader = Cursor::new(vec![9_u8; 3]);
        let mut out = Vec::new();
        assert!(copy_exact(&mut reader, &mut out, 5).is_err());
    }
}

//! Archivo temporal hermano del original que se renombra sobre él al terminar.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::trace;

use crate::error::Result;

/// Búfer de escritura en el mismo directorio que `target`.
///
/// Si no se llama a [`ScratchFile::commit`], el archivo se elimina al soltarse,
/// de modo que el original nunca queda a medio escribir.
pub(crate) struct ScratchFile {
    inner: NamedTempFile,
    target: PathBuf,
}

impl ScratchFile {
    pub(crate) fn beside(target: &Path) -> Result<Self> {
        let parent = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let stem = target.file_stem().unwrap_or_default().to_string_lossy();
        let extension = target.extension().unwrap_or_default().to_string_lossy();

        let inner = tempfile::Builder::new()
            .prefix(&format!(".{stem}_temp_"))
            .suffix(&format!(".{extension}"))
            .tempfile_in(parent)?;
        trace!(scratch = %inner.path().display(), "archivo temporal creado");

        Ok(Self {
            inner,
            target: target.to_path_buf(),
        })
    }

    pub(crate) fn file_mut(&mut self) -> &mut File {
        self.inner.as_file_mut()
    }

    /// Reemplaza el original con el contenido escrito.
    pub(crate) fn commit(mut self) -> Result<()> {
        self.inner.as_file_mut().flush()?;
        self.inner.as_file().sync_all()?;

        // El temporal nace con permisos restringidos; conservar los del original.
        if let Ok(metadata) = fs::metadata(&self.target) {
            fs::set_permissions(self.inner.path(), metadata.permissions())?;
        }

        let Self { inner, target } = self;
        inner.persist(&target).map_err(|err| err.error)?;
        trace!(target = %target.display(), "archivo reemplazado");
        Ok(())
    }
}

/// Sustituye el contenido de `target` por `bytes` de forma atómica.
pub(crate) fn replace_with_bytes(target: &Path, bytes: &[u8]) -> Result<()> {
    let mut scratch = ScratchFile::beside(target)?;
    scratch.file_mut().write_all(bytes)?;
    scratch.commit()
}

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use tracing::trace;
use zip::write::FileOptions;
use zip::result::ZipError;
use zip::{ZipArchive, ZipWriter};

use crate::error::{Result, StripError};
use crate::file_type::Format;
use crate::processor::FoundMetadata;
use crate::scratch::ScratchFile;

use super::sanitize::{PropertiesMember, sanitize_properties};

/// Reconstruye el contenedor ZIP de `path` limpiando los miembros de propiedades.
///
/// El resto de miembros se copian en crudo, con su compresión original y en el
/// mismo orden. Si ningún miembro cambia, el archivo no se reemplaza.
pub(crate) fn rewrite_archive(path: &Path, format: Format) -> Result<Vec<FoundMetadata>> {
    let zip_err = |e: ZipError| StripError::from_zip(format, e);

    let mut archive = ZipArchive::new(File::open(path)?).map_err(zip_err)?;
    let mut scratch = ScratchFile::beside(path)?;
    let mut writer = ZipWriter::new(scratch.file_mut());

    let mut found = Vec::new();
    let mut modified_any = false;

    for i in 0..archive.len() {
        let name = archive.by_index_raw(i).map_err(zip_err)?.name().to_string();

        let Some(member) = PropertiesMember::from_name(&name) else {
            writer
                .raw_copy_file(archive.by_index_raw(i).map_err(zip_err)?)
                .map_err(zip_err)?;
            continue;
        };

        let (contents, options) = {
            let mut file = archive.by_index(i).map_err(zip_err)?;

            let mut options =
                FileOptions::<'_, ()>::default().compression_method(file.compression());
            if let Some(mode) = file.unix_mode() {
                options = options.unix_permissions(mode);
            }
            if let Some(time) = file.last_modified() {
                options = options.last_modified_time(time);
            }

            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            (contents, options)
        };

        let sanitized = sanitize_properties(format, member, &contents)?;
        found.extend(sanitized.found);

        match sanitized.contents {
            Some(cleaned) => {
                trace!(member = %name, "propiedades reescritas");
                modified_any = true;
                writer.start_file(name, options).map_err(zip_err)?;
                writer.write_all(&cleaned)?;
            }
            None => {
                writer
                    .raw_copy_file(archive.by_index_raw(i).map_err(zip_err)?)
                    .map_err(zip_err)?;
            }
        }
    }

    writer.finish().map_err(zip_err)?;
    drop(archive);

    if modified_any {
        scratch.commit()?;
    }
    Ok(found)
}

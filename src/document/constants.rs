//! Espacios de nombres y reglas de limpieza para propiedades de documentos.

use super::xml::FieldSpec;

pub const DC_NS: &str = "http://purl.org/dc/elements/1.1/";
pub const CP_NS: &str = "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";
pub const APP_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties";
pub const ODF_META_NS: &str = "urn:oasis:names:tc:opendocument:xmlns:meta:1.0";

/// Miembros del contenedor que guardan propiedades del documento.
pub const CORE_MEMBER: &str = "docProps/core.xml";
pub const APP_MEMBER: &str = "docProps/app.xml";
pub const ODF_META_MEMBER: &str = "meta.xml";

const fn field(
    prefix: &'static str,
    local_name: &'static str,
    namespace: &'static str,
) -> FieldSpec<'static> {
    FieldSpec {
        prefix: Some(prefix),
        local_name,
        namespace: Some(namespace),
    }
}

const fn unprefixed(local_name: &'static str, namespace: &'static str) -> FieldSpec<'static> {
    FieldSpec {
        prefix: None,
        local_name,
        namespace: Some(namespace),
    }
}

/// Se aplican a los tres miembros de propiedades.
pub(crate) const COMMON_SANITIZE_FIELDS: [(FieldSpec<'static>, &str); 7] = [
    (field("dc", "creator", DC_NS), ""),
    (field("dc", "title", DC_NS), ""),
    (field("dc", "subject", DC_NS), ""),
    (field("dc", "description", DC_NS), ""),
    (field("cp", "lastModifiedBy", CP_NS), ""),
    (field("cp", "keywords", CP_NS), ""),
    (field("cp", "revision", CP_NS), "1"),
];

pub(crate) const APP_SANITIZE_FIELDS: [(FieldSpec<'static>, &str); 3] = [
    (unprefixed("Application", APP_NS), ""),
    (unprefixed("Company", APP_NS), ""),
    (unprefixed("Manager", APP_NS), ""),
];

pub(crate) const ODF_META_SANITIZE_FIELDS: [(FieldSpec<'static>, &str); 1] =
    [(field("meta", "initial-creator", ODF_META_NS), "")];

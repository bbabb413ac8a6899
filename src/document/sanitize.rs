use std::io::Cursor;

use xmltree::{Element, EmitterConfig};

use crate::error::{Result, StripError};
use crate::file_type::Format;
use crate::processor::FoundMetadata;

use super::constants::{
    APP_MEMBER, APP_SANITIZE_FIELDS, COMMON_SANITIZE_FIELDS, CORE_MEMBER, ODF_META_MEMBER,
    ODF_META_SANITIZE_FIELDS,
};
use super::xml::{FieldSpec, replace_matching_text};

/// Miembro del contenedor con propiedades del documento.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PropertiesMember {
    Core,
    App,
    OdfMeta,
}

impl PropertiesMember {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        if name.contains(CORE_MEMBER) {
            Some(PropertiesMember::Core)
        } else if name.contains(APP_MEMBER) {
            Some(PropertiesMember::App)
        } else if name.contains(ODF_META_MEMBER) {
            Some(PropertiesMember::OdfMeta)
        } else {
            None
        }
    }

    fn extra_fields(self) -> &'static [(FieldSpec<'static>, &'static str)] {
        match self {
            PropertiesMember::Core => &[],
            PropertiesMember::App => &APP_SANITIZE_FIELDS,
            PropertiesMember::OdfMeta => &ODF_META_SANITIZE_FIELDS,
        }
    }
}

/// Resultado de limpiar un miembro: `None` si el XML ya estaba limpio.
pub(crate) struct Sanitized {
    pub(crate) contents: Option<Vec<u8>>,
    pub(crate) found: Vec<FoundMetadata>,
}

/// Vacía los campos de autoría de `contents` según las reglas de `member`.
pub(crate) fn sanitize_properties(
    format: Format,
    member: PropertiesMember,
    contents: &[u8],
) -> Result<Sanitized> {
    let mut root = Element::parse(Cursor::new(contents))
        .map_err(|e| StripError::invalid(format, format!("XML de metadata ilegible: {e}")))?;

    let mut found = Vec::new();
    let mut modified = false;
    for (spec, value) in COMMON_SANITIZE_FIELDS.iter().chain(member.extra_fields()) {
        let mut previous = Vec::new();
        modified |= replace_matching_text(&mut root, spec, value, &mut previous);

        let label = spec.label();
        found.extend(previous.into_iter().map(|old| {
            let example = (!old.is_empty()).then_some(old);
            FoundMetadata::new(label.clone(), example)
        }));
    }

    if !modified {
        return Ok(Sanitized {
            contents: None,
            found,
        });
    }

    let mut output = Vec::new();
    let mut config = EmitterConfig::new();
    config.perform_indent = false;
    config.write_document_declaration = true;
    root.write_with_config(&mut output, config)
        .map_err(|e| StripError::invalid(format, format!("no se pudo escribir el XML: {e}")))?;

    Ok(Sanitized {
        contents: Some(output),
        found,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_type::DocumentFormat;

    const OOXML: Format = Format::Document(DocumentFormat::OfficeOpenXml);

    const CORE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/"><dc:creator>Autor Prueba</dc:creator><cp:lastModifiedBy>Editor Prueba</cp:lastModifiedBy><dc:title>Documento Demo</dc:title><cp:revision>6</cp:revision><dcterms:created>2024-01-01T00:00:00Z</dcterms:created></cp:coreProperties>"#;

    const APP_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>Microsoft Word</Application><Company>Compania Demo</Company><Pages>2</Pages></Properties>"#;

    #[test]
    fn member_names_select_rule_sets() {
        assert_eq!(
            PropertiesMember::from_name("docProps/core.xml"),
            Some(PropertiesMember::Core)
        );
        assert_eq!(
            PropertiesMember::from_name("docProps/app.xml"),
            Some(PropertiesMember::App)
        );
        assert_eq!(
            PropertiesMember::from_name("meta.xml"),
            Some(PropertiesMember::OdfMeta)
        );
        assert_eq!(PropertiesMember::from_name("word/document.xml"), None);
    }

    #[test]
    fn core_properties_are_blanked_and_revision_reset() -> Result<()> {
        let sanitized = sanitize_properties(OOXML, PropertiesMember::Core, CORE_XML.as_bytes())?;
        let xml = String::from_utf8(sanitized.contents.unwrap()).unwrap();

        assert!(!xml.contains("Autor Prueba"));
        assert!(!xml.contains("Editor Prueba"));
        assert!(!xml.contains("Documento Demo"));
        assert!(xml.contains("<cp:revision>1</cp:revision>"));
        assert!(xml.contains("2024-01-01T00:00:00Z"));

        let fields: Vec<_> = sanitized.found.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(
            fields,
            ["dc:creator", "dc:title", "cp:lastModifiedBy", "cp:revision"]
        );
        assert_eq!(sanitized.found[0].example.as_deref(), Some("Autor Prueba"));
        Ok(())
    }

    #[test]
    fn app_rules_only_apply_to_app_member() -> Result<()> {
        let as_core = sanitize_properties(OOXML, PropertiesMember::Core, APP_XML.as_bytes())?;
        assert!(as_core.contents.is_none());

        let as_app = sanitize_properties(OOXML, PropertiesMember::App, APP_XML.as_bytes())?;
        let xml = String::from_utf8(as_app.contents.unwrap()).unwrap();
        assert!(!xml.contains("Microsoft Word"));
        assert!(!xml.contains("Compania Demo"));
        assert!(xml.contains("<Pages>2</Pages>"));
        Ok(())
    }

    #[test]
    fn clean_member_is_left_untouched() -> Result<()> {
        let first = sanitize_properties(OOXML, PropertiesMember::Core, CORE_XML.as_bytes())?;
        let cleaned = first.contents.unwrap();

        let second = sanitize_properties(OOXML, PropertiesMember::Core, &cleaned)?;
        assert!(second.contents.is_none());
        assert!(second.found.is_empty());
        Ok(())
    }

    #[test]
    fn malformed_xml_is_a_format_error() {
        let err = sanitize_properties(OOXML, PropertiesMember::Core, b"<cp:coreProperties>")
            .err()
            .unwrap();
        assert!(err.is_format_validation());
    }
}

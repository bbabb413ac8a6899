//! Limpieza textual de metadata en PDF.
//!
//! No reconstruye el grafo de objetos: neutraliza la referencia `/Info`, borra
//! el primer paquete XMP y vacía los diccionarios de información del
//! documento. La tabla `xref` no se recalcula, así que los desplazamientos
//! posteriores a un cambio de longitud pueden quedar desfasados; la mayoría de
//! los lectores reconstruyen la tabla en ese caso.

use regex::bytes::{Captures, NoExpand, Regex};
use std::borrow::Cow;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

use crate::error::{Result, StripError};
use crate::file_type::Format;
use crate::processor::{FoundMetadata, StripOutcome, StripReport};
use crate::scratch::replace_with_bytes;
use crate::signature::PDF_PREFIX;

const NULL_INFO_REFERENCE: &[u8] = b"/Info 0 0 R";
const EMPTY_DICTIONARY: &[u8] = b"<< >>";

static INFO_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u)/Info\s+(\d+)\s+(\d+)\s+R").unwrap());

static XMP_PACKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s-u)<x:xmpmeta.*?</x:xmpmeta>").unwrap());

/// Diccionario sin anidamiento. Sus valores pueden ser cadenas literales (con
/// `<`, `>` o un nivel de paréntesis balanceados) o hexadecimales.
static DICTIONARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?-u)<<(?:\((?:\\.|[^\\()]|\((?:\\.|[^\\()])*\))*\)|<[0-9A-Fa-f\s]*>|[^<>()])*>>",
    )
    .unwrap()
});

static INFO_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?-u)/(Title|Author|Subject|Keywords|Creator|Producer|CreationDate|ModDate|Trapped)\b",
    )
    .unwrap()
});

static INFO_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?-u)/(Title|Author|Subject|Keywords|Creator|Producer|CreationDate|ModDate|Trapped)\b\s*(\((?:\\.|[^\\)])*\)|<[0-9A-Fa-f\s]*>|/[^\s/<>\[\]()]+)",
    )
    .unwrap()
});

/// Limpia el PDF en `path` y lo reemplaza si cambió algo.
pub fn strip_pdf(path: &Path) -> Result<StripReport> {
    let content = fs::read(path)?;
    if !content.starts_with(PDF_PREFIX) {
        return Err(StripError::invalid(Format::Pdf, "falta la cabecera %PDF-"));
    }

    let found = scan_metadata(&content);
    let cleaned = strip_pdf_bytes(&content);

    if cleaned[..] != content[..] {
        replace_with_bytes(path, &cleaned)?;
    }
    debug!(path = %path.display(), removed = found.len(), "PDF limpiado");

    Ok(StripReport::new(Format::Pdf, StripOutcome::Stripped, found))
}

/// Aplica las tres pasadas de limpieza en orden.
pub fn strip_pdf_bytes(content: &[u8]) -> Vec<u8> {
    let step = neutralize_info_references(content);
    let step = remove_xmp_packet(&step).into_owned();
    blank_document_info(&step).into_owned()
}

/// Sustituye cada `/Info n g R` por `/Info 0 0 R`.
pub fn neutralize_info_references(content: &[u8]) -> Cow<'_, [u8]> {
    INFO_REFERENCE.replace_all(content, NoExpand(NULL_INFO_REFERENCE))
}

/// Elimina el primer bloque `<x:xmpmeta ...>...</x:xmpmeta>`, ambos extremos incluidos.
pub fn remove_xmp_packet(content: &[u8]) -> Cow<'_, [u8]> {
    match XMP_PACKET.find(content) {
        Some(packet) => {
            let mut output = Vec::with_capacity(content.len() - packet.len());
            output.extend_from_slice(&content[..packet.start()]);
            output.extend_from_slice(&content[packet.end()..]);
            Cow::Owned(output)
        }
        None => Cow::Borrowed(content),
    }
}

/// Reemplaza por `<< >>` todo diccionario que contenga claves de información del documento.
pub fn blank_document_info(content: &[u8]) -> Cow<'_, [u8]> {
    DICTIONARY.replace_all(content, |caps: &Captures<'_>| {
        let dictionary = &caps[0];
        if INFO_KEY.is_match(dictionary) {
            EMPTY_DICTIONARY.to_vec()
        } else {
            dictionary.to_vec()
        }
    })
}

/// Lista la metadata que las pasadas de limpieza van a neutralizar.
pub fn scan_metadata(content: &[u8]) -> Vec<FoundMetadata> {
    let mut found = Vec::new();

    for caps in INFO_REFERENCE.captures_iter(content) {
        let object = String::from_utf8_lossy(&caps[1]);
        let generation = String::from_utf8_lossy(&caps[2]);
        if object != "0" {
            found.push(FoundMetadata::new(
                "Info",
                Some(format!("{object} {generation} R")),
            ));
        }
    }

    if let Some(packet) = XMP_PACKET.find(content) {
        found.push(FoundMetadata::new(
            "XMP",
            Some(format!("{} bytes", packet.len())),
        ));
    }

    found.extend(scan_document_info(content));
    found
}

/// Extrae pares `/Clave valor` de los diccionarios de información del documento.
pub fn scan_document_info(content: &[u8]) -> Vec<FoundMetadata> {
    let mut found = Vec::new();
    for dictionary in DICTIONARY.find_iter(content) {
        for caps in INFO_ENTRY.captures_iter(dictionary.as_bytes()) {
            let key = String::from_utf8_lossy(&caps[1]).into_owned();
            let value = decode_pdf_value(&caps[2]);
            found.push(FoundMetadata::new(key, value));
        }
    }
    found
}

fn decode_pdf_value(raw: &[u8]) -> Option<String> {
    let bytes = match raw.first() {
        Some(b'(') => unescape_literal(&raw[1..raw.len() - 1]),
        Some(b'<') => decode_hex(&raw[1..raw.len() - 1]),
        Some(b'/') => raw[1..].to_vec(),
        _ => return None,
    };

    let text = decode_text_string(&bytes);
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn unescape_literal(body: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(body.len());
    let mut bytes = body.iter().copied();
    while let Some(byte) = bytes.next() {
        if byte != b'\\' {
            output.push(byte);
            continue;
        }
        match bytes.next() {
            Some(b'n') => output.push(b'\n'),
            Some(b'r') => output.push(b'\r'),
            Some(b't') => output.push(b'\t'),
            Some(other) => output.push(other),
            None => {}
        }
    }
    output
}

fn decode_hex(body: &[u8]) -> Vec<u8> {
    let digits: Vec<u8> = body
        .iter()
        .filter_map(|&b| (b as char).to_digit(16).map(|d| d as u8))
        .collect();
    digits
        .chunks(2)
        .map(|pair| (pair[0] << 4) | pair.get(1).copied().unwrap_or(0))
        .collect()
}

/// Las cadenas de texto PDF son UTF-16BE con BOM o PDFDocEncoding (tratado como Latin-1).
fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes.iter().map(|&b| char::from(b)).collect()
}

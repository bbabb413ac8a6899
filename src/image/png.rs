//! Limpieza de chunks textuales y de fecha en PNG.

use std::io::{Read, Write};

use tracing::trace;

use crate::error::{Result, StripError};
use crate::file_type::{Format, ImageFormat};
use crate::processor::FoundMetadata;
use crate::signature::PNG_SIGNATURE;

use super::{copy_exact, read_exact_or_eof, read_payload};

const FORMAT: Format = Format::Image(ImageFormat::Png);

/// Chunks que solo transportan metadata.
pub const METADATA_CHUNKS: [&[u8; 4]; 5] = [b"tEXt", b"iTXt", b"zTXt", b"tIME", b"eXIf"];

const MAX_CHUNK_LEN: u32 = 0x7FFF_FFFF;

/// Copia un PNG descartando los chunks de [`METADATA_CHUNKS`].
///
/// La copia termina en `IEND`; cualquier byte posterior se descarta.
pub fn strip_png<R, W>(reader: &mut R, writer: &mut W) -> Result<Vec<FoundMetadata>>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut signature = [0_u8; 8];
    reader.read_exact(&mut signature)?;
    if signature != PNG_SIGNATURE {
        return Err(StripError::invalid(FORMAT, "firma PNG incorrecta"));
    }
    writer.write_all(&signature)?;

    let mut found = Vec::new();
    let mut length_bytes = [0_u8; 4];

    loop {
        if !read_exact_or_eof(reader, &mut length_bytes)? {
            break;
        }
        let length = u32::from_be_bytes(length_bytes);
        if length > MAX_CHUNK_LEN {
            return Err(StripError::invalid(
                FORMAT,
                format!("longitud de chunk fuera de rango: {length}"),
            ));
        }

        let mut chunk_type = [0_u8; 4];
        reader.read_exact(&mut chunk_type)?;

        if METADATA_CHUNKS.contains(&&chunk_type) {
            let data = read_payload(reader, u64::from(length))?;
            let mut crc = [0_u8; 4];
            reader.read_exact(&mut crc)?;

            trace!(chunk = %String::from_utf8_lossy(&chunk_type), length, "chunk descartado");
            found.push(describe_chunk(&chunk_type, &data));
            continue;
        }

        writer.write_all(&length_bytes)?;
        writer.write_all(&chunk_type)?;
        copy_exact(reader, writer, u64::from(length) + 4)?;

        if &chunk_type == b"IEND" {
            break;
        }
    }

    writer.flush()?;
    Ok(found)
}

fn describe_chunk(chunk_type: &[u8; 4], data: &[u8]) -> FoundMetadata {
    match chunk_type {
        b"tEXt" => {
            let (keyword, text) = split_keyword(data);
            FoundMetadata::new(keyword_or(keyword, "tEXt"), non_empty(latin1(text)))
        }
        b"zTXt" => {
            let (keyword, _) = split_keyword(data);
            FoundMetadata::new(keyword_or(keyword, "zTXt"), None)
        }
        b"iTXt" => {
            let (keyword, rest) = split_keyword(data);
            FoundMetadata::new(keyword_or(keyword, "iTXt"), itxt_text(rest))
        }
        b"tIME" => FoundMetadata::new("tIME", format_time(data)),
        _ => FoundMetadata::new("EXIF", Some(format!("{} bytes", data.len()))),
    }
}

fn split_keyword(data: &[u8]) -> (String, &[u8]) {
    match data.iter().position(|&b| b == 0) {
        Some(pos) => (latin1(&data[..pos]), &data[pos + 1..]),
        None => (latin1(data), &data[data.len()..]),
    }
}

fn keyword_or(keyword: String, fallback: &str) -> String {
    if keyword.is_empty() {
        fallback.to_string()
    } else {
        keyword
    }
}

/// Texto de un iTXt sin comprimir: `flag, método, idioma\0, palabra traducida\0, texto`.
fn itxt_text(rest: &[u8]) -> Option<String> {
    let (&compressed, rest) = rest.split_first()?;
    if compressed != 0 {
        return None;
    }
    let rest = rest.get(1..)?;
    let language_end = rest.iter().position(|&b| b == 0)?;
    let rest = &rest[language_end + 1..];
    let translated_end = rest.iter().position(|&b| b == 0)?;
    non_empty(String::from_utf8_lossy(&rest[translated_end + 1..]).into_owned())
}

fn format_time(data: &[u8]) -> Option<String> {
    if data.len() != 7 {
        return None;
    }
    let year = u16::from_be_bytes([data[0], data[1]]);
    Some(format!(
        "{year:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        data[2], data[3], data[4], data[5], data[6]
    ))
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

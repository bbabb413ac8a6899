//! Limpieza de segmentos APPn en JPEG.

use std::io::{self, Read, Write};

use tracing::trace;

use crate::error::{Result, StripError};
use crate::file_type::{Format, ImageFormat};
use crate::processor::FoundMetadata;
use crate::signature::JPEG_SOI;

use super::{copy_exact, read_exact_or_eof};

const FORMAT: Format = Format::Image(ImageFormat::Jpeg);

const APP0: u8 = 0xE0;
const APP15: u8 = 0xEF;
const SOS: u8 = 0xDA;
const EOI: u8 = 0xD9;
const TEM: u8 = 0x01;

/// Segmento APP0 mínimo: JFIF 1.1, sin unidades, densidad 1x1, sin miniatura.
pub const MINIMAL_JFIF_SEGMENT: [u8; 18] = [
    0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x00, 0x00, 0x01, 0x00,
    0x01, 0x00, 0x00,
];

/// Copia un JPEG de `reader` a `writer` descartando los segmentos APP1–APP15.
///
/// El primer APP0 se sustituye por [`MINIMAL_JFIF_SEGMENT`]; los datos
/// comprimidos a partir de SOS se copian sin tocar.
pub fn strip_jpeg<R, W>(reader: &mut R, writer: &mut W) -> Result<Vec<FoundMetadata>>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut soi = [0_u8; 2];
    reader.read_exact(&mut soi)?;
    if soi != JPEG_SOI {
        return Err(StripError::invalid(FORMAT, "falta el marcador SOI"));
    }
    writer.write_all(&soi)?;

    let mut found = Vec::new();
    let mut wrote_jfif = false;
    let mut offset: u64 = 2;
    let mut marker = [0_u8; 2];

    loop {
        if !read_exact_or_eof(reader, &mut marker)? {
            break;
        }
        if marker[0] != 0xFF {
            return Err(StripError::invalid(
                FORMAT,
                format!("marcador inválido en el byte {offset}"),
            ));
        }

        // Bytes de relleno 0xFF antes del código de marcador.
        while marker[1] == 0xFF {
            writer.write_all(&[0xFF])?;
            offset += 1;
            let mut next = [0_u8; 1];
            reader.read_exact(&mut next)?;
            marker[1] = next[0];
        }
        let code = marker[1];
        offset += 2;

        if is_standalone(code) {
            writer.write_all(&marker)?;
            if code == EOI {
                io::copy(reader, writer)?;
                break;
            }
            continue;
        }

        let mut length_bytes = [0_u8; 2];
        reader.read_exact(&mut length_bytes)?;
        let length = u16::from_be_bytes(length_bytes);
        if length < 2 {
            return Err(StripError::invalid(
                FORMAT,
                format!("longitud de segmento {length} en el byte {offset}"),
            ));
        }
        let payload_len = u64::from(length - 2);

        match code {
            APP0..=APP15 => {
                let mut payload = vec![0_u8; usize::from(length - 2)];
                reader.read_exact(&mut payload)?;
                let is_minimal_jfif = code == APP0
                    && !wrote_jfif
                    && length_bytes == [0x00, 0x10]
                    && payload[..] == MINIMAL_JFIF_SEGMENT[4..];
                if !is_minimal_jfif {
                    found.push(classify_app_segment(code, &payload));
                }
                trace!(marker = code, length, "segmento APP descartado");

                if code == APP0 && !wrote_jfif {
                    writer.write_all(&MINIMAL_JFIF_SEGMENT)?;
                    wrote_jfif = true;
                }
            }
            SOS => {
                writer.write_all(&marker)?;
                writer.write_all(&length_bytes)?;
                copy_exact(reader, writer, payload_len)?;
                io::copy(reader, writer)?;
                break;
            }
            _ => {
                writer.write_all(&marker)?;
                writer.write_all(&length_bytes)?;
                copy_exact(reader, writer, payload_len)?;
            }
        }
        offset += u64::from(length);
    }

    writer.flush()?;
    Ok(found)
}

fn is_standalone(code: u8) -> bool {
    matches!(code, 0xD0..=0xD7 | 0xD8 | EOI | TEM)
}

fn classify_app_segment(code: u8, payload: &[u8]) -> FoundMetadata {
    let field = if code == APP0 && payload.starts_with(b"JFIF\0") {
        "JFIF".to_string()
    } else if code == APP0 && payload.starts_with(b"JFXX\0") {
        "JFIF thumbnail".to_string()
    } else if payload.starts_with(b"Exif\0") {
        "EXIF".to_string()
    } else if payload.starts_with(b"http://ns.adobe.com/xap/1.0/") {
        "XMP".to_string()
    } else if payload.starts_with(b"ICC_PROFILE\0") {
        "ICC Profile".to_string()
    } else if payload.starts_with(b"Photoshop 3.0\0") {
        "IPTC".to_string()
    } else if payload.starts_with(b"Adobe") {
        "Adobe".to_string()
    } else {
        format!("APP{}", code - APP0)
    };

    FoundMetadata::new(field, Some(format!("{} bytes", payload.len())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn segment(code: u8, payload: &[u8]) -> Vec<u8> {
        let length = (payload.len() + 2) as u16;
        let mut bytes = vec![0xFF, code];
        bytes.extend_from_slice(&length.to_be_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    fn strip(input: &[u8]) -> Result<(Vec<u8>, Vec<FoundMetadata>)> {
        let mut output = Vec::new();
        let found = strip_jpeg(&mut Cursor::new(input), &mut output)?;
        Ok((output, found))
    }

    fn scan_tail() -> Vec<u8> {
        let mut bytes = segment(SOS, &[0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]);
        bytes.extend_from_slice(&[0x12, 0xFF, 0x00, 0xE1, 0x34, 0xFF, 0xD9]);
        bytes
    }

    #[test]
    fn minimal_jfif_image_is_unchanged() {
        let mut input = JPEG_SOI.to_vec();
        input.extend_from_slice(&MINIMAL_JFIF_SEGMENT);
        input.extend_from_slice(&[0xFF, 0xD9]);

        let (output, found) = strip(&input).unwrap();
        assert_eq!(output, input);
        assert!(found.is_empty());
    }

    #[test]
    fn drops_exif_and_xmp_but_keeps_tables_and_scan() {
        let dqt = segment(0xDB, &[0x00; 65]);
        let mut input = JPEG_SOI.to_vec();
        input.extend(segment(0xE1, b"Exif\0\0MM\0*\0\0\0\x08"));
        input.extend(segment(0xE1, b"http://ns.adobe.com/xap/1.0/\0<x:xmpmeta/>"));
        input.extend(&dqt);
        input.extend(scan_tail());

        let (output, found) = strip(&input).unwrap();

        let mut expected = JPEG_SOI.to_vec();
        expected.extend(&dqt);
        expected.extend(scan_tail());
        assert_eq!(output, expected);

        let fields: Vec<_> = found.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, ["EXIF", "XMP"]);
    }

    #[test]
    fn replaces_custom_app0_with_minimal_jfif() {
        let mut jfif = b"JFIF\0\x01\x02\x01\x00\x48\x00\x48\x02\x01".to_vec();
        jfif.extend_from_slice(&[0x80; 6]);
        let mut input = JPEG_SOI.to_vec();
        input.extend(segment(APP0, &jfif));
        input.extend(segment(APP0, b"JFXX\0\x10thumb"));
        input.extend(segment(0xED, b"Photoshop 3.0\0data"));
        input.extend(scan_tail());

        let (output, found) = strip(&input).unwrap();

        let mut expected = JPEG_SOI.to_vec();
        expected.extend_from_slice(&MINIMAL_JFIF_SEGMENT);
        expected.extend(scan_tail());
        assert_eq!(output, expected);
        assert_eq!(found.len(), 3);
        assert_eq!(found[2].field, "IPTC");
    }

    #[test]
    fn scan_data_is_copied_verbatim_even_with_app_like_bytes() {
        let mut input = JPEG_SOI.to_vec();
        input.extend(scan_tail());
        input.extend_from_slice(&[0xFF, 0xE1, 0x00, 0x04, 0xAA, 0xBB]);

        let (output, found) = strip(&input).unwrap();
        assert_eq!(output, input);
        assert!(found.is_empty());
    }

    #[test]
    fn second_pass_is_idempotent() {
        let mut input = JPEG_SOI.to_vec();
        input.extend(segment(APP0, b"JFIF\0\x01\x02\x00\x00\x01\x00\x01\x00\x00"));
        input.extend(segment(0xE2, b"ICC_PROFILE\0\x01\x01"));
        input.extend(scan_tail());

        let (first, _) = strip(&input).unwrap();
        let (second, found) = strip(&first).unwrap();
        assert_eq!(first, second);
        assert!(found.is_empty());
    }

    #[test]
    fn rejects_missing_soi() {
        let err = strip(&[0x89, 0x50, 0x4E, 0x47]).unwrap_err();
        assert!(err.is_format_validation());
    }

    #[test]
    fn rejects_marker_without_ff_prefix() {
        let input = [0xFF, 0xD8, 0x00, 0xE1, 0x00, 0x02];
        let err = strip(&input).unwrap_err();
        assert!(err.is_format_validation());
    }

    #[test]
    fn truncated_segment_is_an_io_error() {
        let mut input = JPEG_SOI.to_vec();
        input.extend_from_slice(&[0xFF, 0xE1, 0x00, 0x20, b'E', b'x']);

        match strip(&input) {
            Err(StripError::Io(err)) => assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("se esperaba un error de E/S, se obtuvo {other:?}"),
        }
    }

    #[test]
    fn plain_eof_between_segments_ends_successfully() {
        let mut input = JPEG_SOI.to_vec();
        input.extend(segment(0xDB, &[0x00; 4]));

        let (output, _) = strip(&input).unwrap();
        assert_eq!(output, input);
    }
}

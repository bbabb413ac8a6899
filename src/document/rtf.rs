//! Eliminación de grupos de información (`{\author ...}`, `{\creatim ...}`) en RTF.

use regex::bytes::Regex;
use std::borrow::Cow;
use std::fs;
use std::ops::Range;
use std::path::Path;
use std::sync::LazyLock;

use crate::error::{Result, StripError};
use crate::file_type::{DocumentFormat, Format};
use crate::processor::FoundMetadata;
use crate::scratch::replace_with_bytes;
use crate::signature::RTF_PREFIX;

const FORMAT: Format = Format::Document(DocumentFormat::Rtf);

/// Apertura de un grupo de información; el cierre se busca equilibrando llaves.
static INFO_GROUP_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?-u)\{(?:\\\*)?\\(author|title|subject|company|operator|creatim|revtim|manager|keywords|doccomm)\b",
    )
    .unwrap()
});

static TIME_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u)\\(yr|mo|dy|hr|min|sec)(\d+)").unwrap());

struct InfoGroup<'a> {
    word: &'a [u8],
    body: &'a [u8],
    span: Range<usize>,
}

/// Limpia el RTF en `path` y lo reemplaza solo si cambió algo.
pub(crate) fn strip_rtf(path: &Path) -> Result<Vec<FoundMetadata>> {
    let content = fs::read(path)?;
    if !content.starts_with(RTF_PREFIX) {
        return Err(StripError::invalid(FORMAT, "falta el prefijo {\\rtf"));
    }

    let found = scan_info_groups(&content);
    if let Cow::Owned(cleaned) = strip_rtf_bytes(&content) {
        replace_with_bytes(path, &cleaned)?;
    }
    Ok(found)
}

/// Elimina todos los grupos de información reconocidos, subgrupos incluidos.
pub fn strip_rtf_bytes(content: &[u8]) -> Cow<'_, [u8]> {
    let groups = info_groups(content);
    if groups.is_empty() {
        return Cow::Borrowed(content);
    }

    let mut output = Vec::with_capacity(content.len());
    let mut last = 0;
    for group in &groups {
        output.extend_from_slice(&content[last..group.span.start]);
        last = group.span.end;
    }
    output.extend_from_slice(&content[last..]);
    Cow::Owned(output)
}

fn scan_info_groups(content: &[u8]) -> Vec<FoundMetadata> {
    info_groups(content).iter().map(describe_group).collect()
}

/// Grupos completos en orden. Un grupo sin cierre se deja intacto.
fn info_groups(content: &[u8]) -> Vec<InfoGroup<'_>> {
    let mut groups = Vec::new();
    let mut from = 0;
    while let Some(caps) = INFO_GROUP_START.captures_at(content, from) {
        let (Some(open), Some(word)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        match closing_brace(content, open.end()) {
            Some(close) => {
                groups.push(InfoGroup {
                    word: word.as_bytes(),
                    body: &content[open.end()..close],
                    span: open.start()..close + 1,
                });
                from = close + 1;
            }
            None => from = open.end(),
        }
    }
    groups
}

/// Posición de la `}` que cierra el grupo abierto antes de `from`.
/// `\{`, `\}` y `\\` no cuentan como llaves.
fn closing_brace(content: &[u8], from: usize) -> Option<usize> {
    let mut depth = 1_usize;
    let mut index = from;
    while let Some(&byte) = content.get(index) {
        match byte {
            b'\\' => index += 1,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
        index += 1;
    }
    None
}

fn describe_group(group: &InfoGroup<'_>) -> FoundMetadata {
    let (field, example) = match group.word {
        b"creatim" => ("CreationDate", format_time(group.body)),
        b"revtim" => ("ModDate", format_time(group.body)),
        word => (field_label(word), plain_text(group.body)),
    };
    FoundMetadata::new(field, example)
}

fn field_label(word: &[u8]) -> &'static str {
    match word {
        b"author" => "Author",
        b"title" => "Title",
        b"subject" => "Subject",
        b"company" => "Company",
        b"operator" => "Operator",
        b"manager" => "Manager",
        b"keywords" => "Keywords",
        _ => "Comments",
    }
}

fn plain_text(body: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// `\yr2021\mo1\dy1\hr12\min0` → `2021-01-01 12:00`.
fn format_time(body: &[u8]) -> Option<String> {
    let mut parts = [0_u32; 6];
    let mut seen = false;
    for caps in TIME_PART.captures_iter(body) {
        let slot = match &caps[1] {
            b"yr" => 0,
            b"mo" => 1,
            b"dy" => 2,
            b"hr" => 3,
            b"min" => 4,
            _ => 5,
        };
        let value = std::str::from_utf8(&caps[2]).ok()?.parse().ok()?;
        parts[slot] = value;
        seen = true;
    }

    if !seen {
        return plain_text(body);
    }
    let [yr, mo, dy, hr, min, _] = parts;
    Some(format!("{yr:04}-{mo:02}-{dy:02} {hr:02}:{min:02}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r"{\rtf1\ansi\ansicpg1252
{\info
{\author John Doe}
{\title Test Document}
{\subject Test Subject}
{\operator User}
{\*\company ACME Inc.}
{\creatim\yr2021\mo1\dy1\hr12\min0}
{\revtim\yr2021\mo1\dy1\hr13\min0}
}
Some content here.
}";

    #[test]
    fn removes_author_group_and_keeps_surroundings() {
        let input = br"{\rtf1 before {\author Jane Doe} after}";
        let output = strip_rtf_bytes(input);
        assert_eq!(&output[..], &br"{\rtf1 before  after}"[..]);
    }

    #[test]
    fn removes_every_info_group() {
        let output = strip_rtf_bytes(SAMPLE.as_bytes());
        let text = String::from_utf8_lossy(&output);

        for group in [
            r"{\author", r"{\title", r"{\subject", r"{\operator", r"company", r"{\creatim",
            r"{\revtim",
        ] {
            assert!(!text.contains(group), "quedó {group}");
        }
        assert!(text.contains("Some content here."));
        assert!(text.starts_with(r"{\rtf1\ansi"));
    }

    #[test]
    fn escaped_braces_stay_inside_the_group() {
        let input = br"{\rtf1{\title A \} B}x}";
        let output = strip_rtf_bytes(input);
        assert_eq!(&output[..], &br"{\rtf1x}"[..]);
    }

    #[test]
    fn nested_groups_are_removed_with_their_parent() {
        let input = br"{\rtf1{\title {\b Negrita}}x}";
        assert_eq!(&strip_rtf_bytes(input)[..], &br"{\rtf1x}"[..]);

        let input = br"{\rtf1{\info{\title Report {\i draft}}}x}";
        let output = strip_rtf_bytes(input);
        assert_eq!(&output[..], &br"{\rtf1{\info}x}"[..]);
        assert!(!String::from_utf8_lossy(&output).contains("Report"));

        let found = scan_info_groups(input);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].field, "Title");
    }

    #[test]
    fn unterminated_group_is_left_alone() {
        let input = br"{\rtf1{\title sin cierre {\b x}";
        assert!(matches!(strip_rtf_bytes(input), Cow::Borrowed(_)));
    }

    #[test]
    fn escaped_backslash_before_brace_closes_the_group() {
        let input = br"{\rtf1{\author C:\\}x}";
        assert_eq!(&strip_rtf_bytes(input)[..], &br"{\rtf1x}"[..]);
    }

    #[test]
    fn similar_control_words_are_kept() {
        let input = br"{\rtf1{\authorship X}}";
        assert!(matches!(strip_rtf_bytes(input), Cow::Borrowed(_)));
    }

    #[test]
    fn scan_reports_labels_and_times() {
        let found = scan_info_groups(SAMPLE.as_bytes());

        assert!(found.contains(&FoundMetadata::new("Author", Some("John Doe".to_string()))));
        assert!(found.contains(&FoundMetadata::new(
            "Company",
            Some("ACME Inc.".to_string())
        )));
        assert!(found.contains(&FoundMetadata::new(
            "CreationDate",
            Some("2021-01-01 12:00".to_string())
        )));
        assert_eq!(found.len(), 7);
    }
}

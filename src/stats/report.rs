//! Reportes legibles y JSON de las estadísticas acumuladas.

use std::fmt::Write;

use super::MetadataStats;

const MAX_EXAMPLE_CHARS: usize = 50;

/// Resumen en texto plano: totales, archivos por tipo, campos y campos por tipo.
pub fn render_text_report(stats: &MetadataStats) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Resumen de metadata");
    let _ = writeln!(out, "  Archivos procesados: {}", stats.total_files);
    let _ = writeln!(out, "  Metadata encontrada: {}", stats.total_metadata_found);

    if !stats.count_by_file_type.is_empty() {
        let mut by_type: Vec<_> = stats.count_by_file_type.iter().collect();
        by_type.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));

        let _ = writeln!(out, "\nArchivos por tipo");
        for (file_type, count) in by_type {
            let _ = writeln!(out, "  {}: {}", file_type.label(), count);
        }
    }

    if !stats.by_metadata_type.is_empty() {
        let mut fields: Vec<_> = stats.by_metadata_type.values().collect();
        fields.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

        let _ = writeln!(out, "\nCampos de metadata");
        for field in fields {
            let _ = writeln!(out, "  {}: {}", field.name, field.count);
            for example in &field.examples {
                let _ = writeln!(out, "    - {}", truncate_example(example));
            }
        }
    }

    let with_metadata: Vec<_> = stats
        .per_file_type_metadata
        .iter()
        .filter(|(_, fields)| !fields.is_empty())
        .collect();
    if !with_metadata.is_empty() {
        let _ = writeln!(out, "\nMetadata por tipo de archivo");
        for (file_type, fields) in with_metadata {
            let _ = writeln!(out, "  {}", file_type.label());
            let mut fields: Vec<_> = fields.iter().collect();
            fields.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
            for (name, count) in fields {
                let _ = writeln!(out, "    {name}: {count}");
            }
        }
    }

    out
}

/// Serializa las estadísticas completas como JSON con sangría.
pub fn render_json_report(stats: &MetadataStats) -> serde_json::Result<String> {
    serde_json::to_string_pretty(stats)
}

fn truncate_example(example: &str) -> String {
    if example.chars().count() <= MAX_EXAMPLE_CHARS {
        return example.to_string();
    }
    let mut truncated: String = example.chars().take(MAX_EXAMPLE_CHARS - 3).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_type::FileType;

    fn sample_stats() -> MetadataStats {
        let mut stats = MetadataStats::new();
        stats.add_file(FileType::Image);
        stats.add_file(FileType::Image);
        stats.add_file(FileType::Pdf);
        stats.add_metadata(FileType::Image, "EXIF", "120 bytes");
        stats.add_metadata(FileType::Image, "EXIF", "64 bytes");
        stats.add_metadata(FileType::Pdf, "Author", &"x".repeat(80));
        stats
    }

    #[test]
    fn text_report_orders_sections_by_count() {
        let report = render_text_report(&sample_stats());

        assert!(report.contains("Archivos procesados: 3"));
        assert!(report.contains("Metadata encontrada: 3"));

        let images = report.find("  Images: 2").unwrap();
        let pdfs = report.find("  PDFs: 1").unwrap();
        assert!(images < pdfs);

        let exif = report.find("  EXIF: 2").unwrap();
        let author = report.find("  Author: 1").unwrap();
        assert!(exif < author);
        assert!(report.contains("    - 120 bytes\n    - 64 bytes\n"));
    }

    #[test]
    fn long_examples_are_truncated() {
        let report = render_text_report(&sample_stats());
        let expected = format!("    - {}...\n", "x".repeat(47));
        assert!(report.contains(&expected));
        assert!(!report.contains(&"x".repeat(48)));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let example = "ñ".repeat(60);
        let truncated = truncate_example(&example);
        assert_eq!(truncated.chars().count(), MAX_EXAMPLE_CHARS);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncate_example("corto"), "corto");
    }

    #[test]
    fn empty_stats_render_only_the_summary() {
        let report = render_text_report(&MetadataStats::new());
        assert!(report.contains("Archivos procesados: 0"));
        assert!(!report.contains("Archivos por tipo"));
        assert!(!report.contains("Metadata por tipo de archivo"));
    }

    #[test]
    fn json_report_round_trips() -> Result<(), Box<dyn std::error::Error>> {
        let stats = sample_stats();
        let json = render_json_report(&stats)?;
        assert!(json.contains("\"total_files\": 3"));
        assert!(json.contains("\"image\""));

        let parsed: MetadataStats = serde_json::from_str(&json)?;
        assert_eq!(parsed, stats);
        Ok(())
    }
}

//! Estadísticas de la metadata encontrada durante una ejecución.

mod report;

pub use report::{render_json_report, render_text_report};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::file_type::FileType;

/// Máximo de ejemplos distintos que se guardan por campo.
pub const EXAMPLE_CAP: usize = 3;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataField {
    pub name: String,
    pub count: usize,
    pub examples: Vec<String>,
}

impl MetadataField {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            count: 0,
            examples: Vec::with_capacity(EXAMPLE_CAP),
        }
    }

    /// Agrega `example` si queda espacio y no está repetido.
    fn remember(&mut self, example: &str) {
        if example.is_empty() || self.examples.len() >= EXAMPLE_CAP {
            return;
        }
        if !self.examples.iter().any(|existing| existing == example) {
            self.examples.push(example.to_string());
        }
    }
}

/// Contadores por tipo de archivo y por campo de metadata.
///
/// Cada ejecución (o cada hilo) mantiene su propia instancia; las parciales se
/// combinan con [`MetadataStats::merge`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataStats {
    pub total_files: usize,
    pub total_metadata_found: usize,
    pub count_by_file_type: BTreeMap<FileType, usize>,
    pub by_metadata_type: BTreeMap<String, MetadataField>,
    pub per_file_type_metadata: BTreeMap<FileType, BTreeMap<String, usize>>,
}

impl MetadataStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, file_type: FileType) {
        self.total_files += 1;
        *self.count_by_file_type.entry(file_type).or_insert(0) += 1;
        self.per_file_type_metadata.entry(file_type).or_default();
    }

    /// Registra una aparición de `field`; un `example` vacío solo suma al contador.
    pub fn add_metadata(&mut self, file_type: FileType, field: &str, example: &str) {
        self.total_metadata_found += 1;

        let entry = self
            .by_metadata_type
            .entry(field.to_string())
            .or_insert_with(|| MetadataField::new(field));
        entry.count += 1;
        entry.remember(example);

        *self
            .per_file_type_metadata
            .entry(file_type)
            .or_default()
            .entry(field.to_string())
            .or_insert(0) += 1;
    }

    /// Suma los contadores de `other`; los ejemplos propios tienen prioridad al llenarse el cupo.
    pub fn merge(&mut self, other: &MetadataStats) {
        self.total_files += other.total_files;
        self.total_metadata_found += other.total_metadata_found;

        for (file_type, count) in &other.count_by_file_type {
            *self.count_by_file_type.entry(*file_type).or_insert(0) += count;
        }

        for (name, field) in &other.by_metadata_type {
            let existing = self
                .by_metadata_type
                .entry(name.clone())
                .or_insert_with(|| MetadataField::new(name));
            existing.count += field.count;
            for example in &field.examples {
                existing.remember(example);
            }
        }

        for (file_type, fields) in &other.per_file_type_metadata {
            let target = self.per_file_type_metadata.entry(*file_type).or_default();
            for (name, count) in fields {
                *target.entry(name.clone()).or_insert(0) += count;
            }
        }
    }

    pub fn files_of(&self, file_type: FileType) -> usize {
        self.count_by_file_type.get(&file_type).copied().unwrap_or(0)
    }

    pub fn field(&self, name: &str) -> Option<&MetadataField> {
        self.by_metadata_type.get(name)
    }
}

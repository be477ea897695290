//! Raw header → canonical column renaming.

use std::collections::BTreeMap;

use anemia_model::{Field, header_key, normalize_header};

/// How one raw column was named after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRename {
    pub raw: String,
    pub canonical: String,
    /// Set when the column matched a known survey field.
    pub field: Option<Field>,
}

/// Resolves raw headers using configured aliases first, then known fields.
#[derive(Debug, Clone, Default)]
pub struct ColumnMapping {
    aliases: BTreeMap<String, String>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add raw header → target name aliases (keys matched case-insensitively).
    pub fn with_aliases<'a>(
        mut self,
        aliases: impl IntoIterator<Item = (&'a String, &'a String)>,
    ) -> Self {
        for (raw, target) in aliases {
            self.aliases
                .insert(header_key(raw), normalize_header(target));
        }
        self
    }

    /// Canonical name for one raw header.
    pub fn resolve(&self, raw: &str) -> ColumnRename {
        let normalized = normalize_header(raw);
        if let Some(target) = self.aliases.get(&header_key(&normalized)) {
            let field = Field::from_canonical(target);
            let canonical = field.map_or_else(|| target.clone(), |f| f.canonical().to_string());
            return ColumnRename {
                raw: normalized,
                canonical,
                field,
            };
        }
        match Field::from_header(&normalized) {
            Some(field) => ColumnRename {
                raw: normalized,
                canonical: field.canonical().to_string(),
                field: Some(field),
            },
            None => ColumnRename {
                canonical: normalized.clone(),
                raw: normalized,
                field: None,
            },
        }
    }

    /// Resolve every header. When two headers land on the same name, the first
    /// keeps it; later ones fall back to their raw header, suffixed `.1`, `.2`,
    /// ... if that is taken too.
    pub fn resolve_all(&self, headers: &[String]) -> Vec<ColumnRename> {
        let mut resolved: Vec<ColumnRename> = Vec::with_capacity(headers.len());
        for header in headers {
            let mut rename = self.resolve(header);
            if is_taken(&resolved, &rename.canonical) {
                let mut candidate = rename.raw.clone();
                let mut suffix = 1usize;
                while is_taken(&resolved, &candidate) {
                    candidate = format!("{}.{suffix}", rename.raw);
                    suffix += 1;
                }
                tracing::warn!(
                    raw = %rename.raw,
                    canonical = %rename.canonical,
                    renamed = %candidate,
                    "duplicate column after renaming"
                );
                rename.canonical = candidate;
                rename.field = None;
            }
            resolved.push(rename);
        }
        resolved
    }
}

fn is_taken(resolved: &[ColumnRename], name: &str) -> bool {
    resolved
        .iter()
        .any(|existing| existing.canonical.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }

    #[test]
    fn renames_survey_headers() {
        let mapping = ColumnMapping::new();
        let resolved = mapping.resolve_all(&headers(&[
            "Type of place of residence",
            "Wealth index combined",
            "Anemia level",
            "Anemia level.1",
        ]));
        let names: Vec<&str> = resolved.iter().map(|r| r.canonical.as_str()).collect();
        assert_eq!(
            names,
            vec!["Residence", "Wealth", "Anemia_Level", "Anemia level.1"]
        );
        assert_eq!(resolved[2].field, Some(Field::AnemiaLevel));
        assert_eq!(resolved[3].field, None);
    }

    #[test]
    fn aliases_take_precedence() {
        let aliases: BTreeMap<String, String> = [
            ("Hb (g/dl)".to_string(), "hemoglobin".to_string()),
            ("Province".to_string(), "Province_Name".to_string()),
        ]
        .into_iter()
        .collect();
        let mapping = ColumnMapping::new().with_aliases(&aliases);

        let hb = mapping.resolve("HB (G/DL)");
        assert_eq!(hb.canonical, "Hemoglobin");
        assert_eq!(hb.field, Some(Field::Hemoglobin));

        let province = mapping.resolve("province");
        assert_eq!(province.canonical, "Province_Name");
        assert_eq!(province.field, None);
    }

    #[test]
    fn duplicate_targets_keep_first() {
        let mapping = ColumnMapping::new();
        let resolved = mapping.resolve_all(&headers(&["Anemia level", "Anemia_Level"]));
        assert_eq!(resolved[0].canonical, "Anemia_Level");
        assert_eq!(resolved[1].canonical, "Anemia_Level.1");
        assert_eq!(resolved[1].field, None);
    }
}

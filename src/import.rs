//! NCM feed import pipeline (parsing side).
//!
//! Turns the raw MERCOSUL feed into canonical records: codes are normalized
//! to 8 digits, duplicates collapse to the first occurrence, and handling
//! tags are inferred from the description text. Persistence lives in
//! `services::ncm_service`.

use std::collections::HashSet;

use serde::Deserialize;

/// Raw entry from the MERCOSUL NCM feed.
#[derive(Debug, Deserialize)]
pub struct RawNcmRecord {
    pub codigo: String,
    #[serde(default)]
    pub descricao: Option<String>,
}

/// Canonical record ready for upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct NcmRecord {
    pub code: String,
    pub description: String,
    pub classification: String,
    pub tags: Vec<String>,
}

/// Substring rules for tag inference, evaluated independently against the
/// lower-cased description. A rule matches when any of its patterns is
/// contained in the text.
const TAG_RULES: &[(&[&str], &str)] = &[
    (&["explosiv"], "explosive"),
    (&["quím", "quim"], "chemical"),
    (&["radioat"], "radioactive"),
    (&["perec", "carne"], "perishable"),
    (&["líquido", "liquido"], "liquid"),
    (&["gás", "gas"], "gaseous"),
    (&["frágil", "fragil"], "fragile"),
    (&["vivo", "animais"], "live_animal"),
    (&["bebida", "suco"], "beverage"),
];

/// Strip non-digit characters from a raw code. Only exactly-8-digit results
/// are valid NCM codes.
pub fn normalize_code(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() == 8 { Some(digits) } else { None }
}

/// Infer handling tags from a free-text description. An empty result is
/// valid: most NCM descriptions carry no handling keyword.
pub fn infer_tags(description: &str) -> Vec<String> {
    let text = description.to_lowercase();
    let mut tags = Vec::new();

    for (patterns, tag) in TAG_RULES {
        if patterns.iter().any(|p| text.contains(p)) {
            let tag = tag.to_string();
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
    }

    tags
}

/// Collapse the raw feed into canonical records. The first record seen per
/// normalized code wins; malformed codes are dropped silently.
pub fn canonicalize(raw: Vec<RawNcmRecord>) -> Vec<NcmRecord> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut records = Vec::new();

    for item in raw {
        let Some(code) = normalize_code(&item.codigo) else {
            continue;
        };
        if !seen.insert(code.clone()) {
            continue;
        }

        let description = item
            .descricao
            .as_deref()
            .map(str::trim)
            .unwrap_or("")
            .to_string();

        records.push(NcmRecord {
            classification: description.clone(),
            tags: infer_tags(&description),
            code,
            description,
        });
    }

    records
}

/// Load the raw feed from a JSON document on disk.
pub fn load_feed(path: &str) -> Result<Vec<RawNcmRecord>, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read NCM feed '{}': {}", path, e))?;

    serde_json::from_str(&content).map_err(|e| format!("Failed to parse NCM feed '{}': {}", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(codigo: &str, descricao: &str) -> RawNcmRecord {
        RawNcmRecord {
            codigo: codigo.to_string(),
            descricao: Some(descricao.to_string()),
        }
    }

    #[test]
    fn normalize_strips_formatting() {
        assert_eq!(normalize_code("0101.21.00"), Some("01012100".to_string()));
        assert_eq!(normalize_code("01012100"), Some("01012100".to_string()));
    }

    #[test]
    fn normalize_rejects_short_and_non_numeric_codes() {
        assert_eq!(normalize_code("0101"), None);
        assert_eq!(normalize_code("ABC12345"), None);
        assert_eq!(normalize_code(""), None);
        assert_eq!(normalize_code("010121001"), None);
    }

    #[test]
    fn infers_multiple_tags_order_independent() {
        let mut tags = infer_tags("Animais vivos e produtos perecíveis");
        tags.sort();
        assert_eq!(tags, vec!["live_animal", "perishable"]);
    }

    #[test]
    fn infers_no_tags_for_plain_goods() {
        assert!(infer_tags("Parafusos de aço inoxidável").is_empty());
    }

    #[test]
    fn infers_perishable_from_meat() {
        assert_eq!(infer_tags("Carnes de bovino, frescas"), vec!["perishable"]);
    }

    #[test]
    fn infers_tags_without_duplicates() {
        let tags = infer_tags("Carne perecível");
        assert_eq!(tags, vec!["perishable"]);
    }

    #[test]
    fn canonicalize_keeps_first_occurrence_per_code() {
        let records = canonicalize(vec![
            raw("0101.21.00", "Cavalos vivos"),
            raw("01012100", "Duplicata ignorada"),
            raw("0202.30.00", "Carnes desossadas"),
        ]);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].code, "01012100");
        assert_eq!(records[0].description, "Cavalos vivos");
        assert_eq!(records[1].code, "02023000");
    }

    #[test]
    fn canonicalize_drops_malformed_codes() {
        let records = canonicalize(vec![
            raw("0101", "Curto demais"),
            raw("ABC12345", "Não numérico"),
            raw("8501.10.00", "Motores elétricos"),
        ]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code, "85011000");
    }

    #[test]
    fn canonicalize_duplicates_description_into_classification() {
        let records = canonicalize(vec![raw("2202.10.00", "  Bebidas não alcoólicas  ")]);

        assert_eq!(records[0].description, "Bebidas não alcoólicas");
        assert_eq!(records[0].classification, "Bebidas não alcoólicas");
        assert_eq!(records[0].tags, vec!["beverage"]);
    }

    #[test]
    fn canonicalize_accepts_missing_description() {
        let records = canonicalize(vec![RawNcmRecord {
            codigo: "01012100".to_string(),
            descricao: None,
        }]);

        assert_eq!(records[0].description, "");
        assert!(records[0].tags.is_empty());
    }
}

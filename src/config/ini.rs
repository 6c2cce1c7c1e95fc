//! Minimal INI reader for terrain definition files
//!
//! Section and key names are case-insensitive. Lines starting with `;` or `#`
//! are comments. Keys before the first section header land in the unnamed
//! section. When a key repeats inside a section the first value wins.

use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Default)]
pub struct IniDocument {
    sections: FxHashMap<String, FxHashMap<String, String>>,
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

fn unquote(value: &str) -> &str {
    let value = value.trim();
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

pub fn parse_ini(text: &str) -> IniDocument {
    let mut document = IniDocument::default();
    let mut current = String::new();

    for (line_number, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if let Some(header) = line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            current = normalize(header);
            document.sections.entry(current.clone()).or_default();
            continue;
        }

        match line.split_once('=') {
            Some((key, value)) => {
                document
                    .sections
                    .entry(current.clone())
                    .or_default()
                    .entry(normalize(key))
                    .or_insert_with(|| unquote(value).to_string());
            }
            None => log::debug!(
                "[ini::parse_ini] Ignoring line {}: '{}'",
                line_number + 1,
                line
            ),
        }
    }

    document
}

/// Value of `key` in `section`, if present
pub fn ini_get<'a>(document: &'a IniDocument, section: &str, key: &str) -> Option<&'a str> {
    document
        .sections
        .get(&normalize(section))
        .and_then(|entries| entries.get(&normalize(key)))
        .map(String::as_str)
}

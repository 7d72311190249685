//! Manifest shapes inherited from older manifest authoring conventions.

use gshield_types::ids;
use std::collections::BTreeSet;
use toml::{Table, Value};
use tracing::debug;

/// Convert dict-form `sgx.*_files` tables (`name = "file:..."`) into arrays of their values.
///
/// Authoring order of the entries is kept. Lists already in array form are untouched.
pub fn normalize_trust_lists(doc: &mut Table) {
    let Some(Value::Table(sgx)) = doc.get_mut(ids::SECTION_SGX) else {
        return;
    };

    for key in ids::FILE_LIST_KEYS {
        let values: Vec<Value> = match sgx.get_mut(key) {
            Some(Value::Table(entries)) => std::mem::take(entries)
                .into_iter()
                .map(|(_, v)| v)
                .collect(),
            _ => continue,
        };
        debug!(key, entries = values.len(), "converted dict-form file list");
        sgx.insert(key.to_string(), Value::Array(values));
    }
}

/// Every file URI the manifest already lists as trusted, allowed or protected.
pub fn known_file_refs(doc: &Table) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    let Some(sgx) = doc.get(ids::SECTION_SGX).and_then(Value::as_table) else {
        return out;
    };

    for key in ids::FILE_LIST_KEYS {
        let entries: Box<dyn Iterator<Item = &Value>> = match sgx.get(key) {
            Some(Value::Array(items)) => Box::new(items.iter()),
            Some(Value::Table(items)) => Box::new(items.values()),
            _ => continue,
        };
        out.extend(entries.filter_map(Value::as_str).map(str::to_string));
    }
    out
}

/// Whether `sgx.file_check_policy` disables trusted-file checks altogether.
pub fn allows_all_files(doc: &Table) -> bool {
    doc.get(ids::SECTION_SGX)
        .and_then(Value::as_table)
        .and_then(|sgx| sgx.get(ids::KEY_FILE_CHECK_POLICY))
        .and_then(Value::as_str)
        .is_some_and(|policy| policy.contains(ids::POLICY_ALLOW_ALL_BUT_LOG))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Table {
        toml::from_str(text).expect("valid toml")
    }

    #[test]
    fn dict_form_trusted_files_become_array() {
        let mut d = doc("[sgx.trusted_files]\nx = \"file:/bin/a\"");
        normalize_trust_lists(&mut d);
        assert_eq!(d, doc("[sgx]\ntrusted_files = [\"file:/bin/a\"]"));
    }

    #[test]
    fn normalization_keeps_authoring_order() {
        let mut d = doc(
            "[sgx.allowed_files]\nzeta = \"file:/z\"\nalpha = \"file:/a\"\n[sgx.protected_files]\np = \"file:/p\"",
        );
        normalize_trust_lists(&mut d);

        let sgx = d.get("sgx").and_then(Value::as_table).expect("sgx table");
        let allowed: Vec<&str> = sgx
            .get("allowed_files")
            .and_then(Value::as_array)
            .expect("array")
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(allowed, vec!["file:/z", "file:/a"]);
        assert!(sgx.get("protected_files").is_some_and(Value::is_array));
    }

    #[test]
    fn array_form_and_other_sections_untouched() {
        let text = "[sgx]\ntrusted_files = [\"file:/a\"]\n[loader.env]\nHOME = \"/root\"";
        let mut d = doc(text);
        normalize_trust_lists(&mut d);
        assert_eq!(d, doc(text));
    }

    #[test]
    fn known_files_cover_all_three_lists() {
        let d = doc(
            r#"
[sgx]
trusted_files = ["file:/usr/bin/app"]
allowed_files = ["file:/tmp/scratch"]

[sgx.protected_files]
key = "file:/secrets/key"
"#,
        );
        let known = known_file_refs(&d);
        let expected: BTreeSet<String> = ["file:/usr/bin/app", "file:/tmp/scratch", "file:/secrets/key"]
            .into_iter()
            .map(str::to_string)
            .collect();
        assert_eq!(known, expected);
    }

    #[test]
    fn known_files_empty_without_sgx_section() {
        assert!(known_file_refs(&doc("[loader]\nlog_level = \"error\"")).is_empty());
    }

    #[test]
    fn allow_all_but_log_detected() {
        assert!(allows_all_files(&doc(
            "[sgx]\nfile_check_policy = \"allow_all_but_log\""
        )));
        assert!(!allows_all_files(&doc("[sgx]\nfile_check_policy = \"strict\"")));
        assert!(!allows_all_files(&doc("[sgx]\ndebug = true")));
    }
}

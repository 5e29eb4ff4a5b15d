//! Choosing a visit's JSON form file among a container's files.

use tracing::warn;

use crate::qc_log::{parse_qc_log_filename, qc_log_prefix};

fn json_stem(name: &str) -> Option<&str> {
    let (stem, extension) = name.rsplit_once('.')?;
    (extension.eq_ignore_ascii_case("json") && !stem.is_empty()).then_some(stem)
}

/// Pick the JSON form file belonging to a visit.
///
/// A lone JSON file is used as-is. With several, the one whose stem equals
/// the qc-status log's `<ptid>_<date>_<module>` prefix (module compared
/// without case) wins. Anything else is ambiguous and picks nothing.
pub fn select_visit_json<'a>(
    candidates: &'a [String],
    log_filename: Option<&str>,
) -> Option<&'a str> {
    let json_files: Vec<&'a str> = candidates
        .iter()
        .map(String::as_str)
        .filter(|name| json_stem(name).is_some())
        .collect();

    match json_files.as_slice() {
        [] => None,
        [only] => Some(*only),
        many => {
            let prefix = log_filename.and_then(parse_qc_log_filename).and_then(|visit| {
                Some(qc_log_prefix(
                    visit.ptid.as_deref()?,
                    visit.date.as_deref()?,
                    visit.module.as_deref()?,
                ))
            });
            let matching: Vec<&'a str> = match &prefix {
                Some(prefix) => many
                    .iter()
                    .copied()
                    .filter(|name| {
                        json_stem(name).is_some_and(|stem| stem.eq_ignore_ascii_case(prefix))
                    })
                    .collect(),
                None => Vec::new(),
            };
            if let [chosen] = matching.as_slice() {
                return Some(*chosen);
            }
            warn!(
                candidates = many.len(),
                matching = matching.len(),
                "cannot choose a JSON form file for the visit"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn single_json_file_is_used() {
        let files = names(&["P1_2024-01-01_uds_qc-status.log", "form.JSON"]);
        assert_eq!(select_visit_json(&files, None), Some("form.JSON"));
    }

    #[test]
    fn matching_stem_breaks_ties() {
        let files = names(&["P1_2024-01-01_UDS.json", "P1_2023-01-01_uds.json"]);
        assert_eq!(
            select_visit_json(&files, Some("P1_2024-01-01_uds_qc-status.log")),
            Some("P1_2024-01-01_UDS.json")
        );
    }

    #[test]
    fn ambiguous_candidates_pick_nothing() {
        let files = names(&["a.json", "b.json"]);
        assert_eq!(select_visit_json(&files, None), None);
        assert_eq!(
            select_visit_json(&files, Some("P1_2024-01-01_uds_qc-status.log")),
            None
        );
        assert_eq!(select_visit_json(&names(&["notes.txt"]), None), None);
    }
}

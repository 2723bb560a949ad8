//! Small CLI helpers

use std::path::PathBuf;

/// Split list inputs on commas and newlines, trimming entries and dropping
/// empties, so env-provided lists behave like repeated flags.
pub fn normalize_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .flat_map(|item| item.split(['\n', ',']))
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}

/// A non-empty environment variable as a path.
pub fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_commas_and_newlines() {
        let input = vec![" a ,b".to_string(), "c\n\nd ".to_string()];
        assert_eq!(normalize_list(&input), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert!(normalize_list(&[]).is_empty());
        assert!(normalize_list(&[" , ,\n".to_string()]).is_empty());
    }
}

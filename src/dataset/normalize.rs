//! Cell value normalization.

/// Canonical label for a missing cell.
pub const NO_DATA: &str = "Tiada Data";

/// Tokens treated as "no data" after trimming and upper-casing.
const PLACEHOLDERS: [&str; 4] = ["NA", "?", "N/A", "NONE"];

/// Whether a raw cell carries no usable value.
pub fn is_missing(raw: Option<&str>) -> bool {
    match raw {
        None => true,
        Some(value) => {
            let trimmed = value.trim();
            trimmed.is_empty() || PLACEHOLDERS.contains(&trimmed.to_uppercase().as_str())
        }
    }
}

/// Return `default` for missing or placeholder cells, otherwise the value unchanged.
pub fn normalize<'a>(raw: Option<&'a str>, default: &'a str) -> &'a str {
    match raw {
        Some(value) if !is_missing(raw) => value,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_map_to_default() {
        for raw in ["NA", "na", " n/a ", "?", "None", "NONE", ""] {
            assert_eq!(normalize(Some(raw), NO_DATA), NO_DATA, "raw = {raw:?}");
        }
        assert_eq!(normalize(None, NO_DATA), NO_DATA);
    }

    #[test]
    fn test_real_values_pass_through_untouched() {
        assert_eq!(normalize(Some("Johor"), NO_DATA), "Johor");
        assert_eq!(normalize(Some(" Johor "), NO_DATA), " Johor ");
        assert_eq!(normalize(Some("Nan"), NO_DATA), "Nan");
        assert_eq!(normalize(Some("NAS"), "x"), "NAS");
    }

    #[test]
    fn test_custom_default() {
        assert_eq!(normalize(Some("?"), "-"), "-");
    }
}

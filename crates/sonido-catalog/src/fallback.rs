//! The indexed-parameter value-string fallback chain (§4.2 step 6, §9
//! "Indexed-parameter fallback chain").
//!
//! Extracting indexed value strings from arbitrary plug-ins is unreliable:
//! some only populate the strings after processing silent audio, some
//! encode the choices as preset names instead. This module is the single
//! place that precedence is expressed, so two catalog runs over the same
//! plug-in always agree.

use sonido_core::plugin::{IndexedValuesSource, INDEXED_FALLBACK_KEYWORDS};

/// Resolves an indexed parameter's display strings, stopping at the first
/// strategy that yields a non-empty list:
///
/// 1. The plug-in's native value-strings array, if non-empty.
/// 2. If `display_name` matches one of [`INDEXED_FALLBACK_KEYWORDS`]
///    (case-insensitively), the plug-in's factory-preset names.
/// 3. Otherwise `none_found`: only the integer range is known.
#[must_use]
pub fn resolve_indexed_values(
    display_name: &str,
    native_value_strings: Option<&[String]>,
    factory_preset_names: Option<&[String]>,
) -> (Option<Vec<String>>, IndexedValuesSource) {
    if let Some(values) = native_value_strings {
        if !values.is_empty() {
            return (Some(values.to_vec()), IndexedValuesSource::ValueStrings);
        }
    }

    if display_name_suggests_presets(display_name) {
        if let Some(names) = factory_preset_names {
            if !names.is_empty() {
                return (Some(names.to_vec()), IndexedValuesSource::FactoryPresets);
            }
        }
    }

    (None, IndexedValuesSource::NoneFound)
}

fn display_name_suggests_presets(display_name: &str) -> bool {
    let lower = display_name.to_lowercase();
    INDEXED_FALLBACK_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_value_strings_win_when_present() {
        let native = vec!["Clean".to_string(), "Crunch".to_string()];
        let presets = vec!["Ignored".to_string()];
        let (values, source) = resolve_indexed_values("Amp Model", Some(&native), Some(&presets));
        assert_eq!(values, Some(native));
        assert_eq!(source, IndexedValuesSource::ValueStrings);
    }

    #[test]
    fn falls_back_to_factory_presets_when_keyword_matches() {
        let presets = vec!["Lead".to_string(), "Rhythm".to_string()];
        let (values, source) = resolve_indexed_values("Amp Model", None, Some(&presets));
        assert_eq!(values, Some(presets));
        assert_eq!(source, IndexedValuesSource::FactoryPresets);
    }

    #[test]
    fn does_not_fall_back_without_a_matching_keyword() {
        let presets = vec!["Lead".to_string()];
        let (values, source) = resolve_indexed_values("Mix Balance", None, Some(&presets));
        assert_eq!(values, None);
        assert_eq!(source, IndexedValuesSource::NoneFound);
    }

    #[test]
    fn empty_native_list_does_not_count_as_present() {
        let native: Vec<String> = vec![];
        let presets = vec!["Bank A".to_string()];
        let (values, source) = resolve_indexed_values("Bank Select", Some(&native), Some(&presets));
        assert_eq!(values, Some(presets));
        assert_eq!(source, IndexedValuesSource::FactoryPresets);
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        assert!(display_name_suggests_presets("PROGRAM Select"));
        assert!(display_name_suggests_presets("cab sim"));
        assert!(!display_name_suggests_presets("Drive"));
    }

    #[test]
    fn no_strategy_available_records_none_found() {
        let (values, source) = resolve_indexed_values("Waveshape", None, None);
        assert_eq!(values, None);
        assert_eq!(source, IndexedValuesSource::NoneFound);
    }
}

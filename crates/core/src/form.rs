//! Conversion of submitted form fields into positional statement parameters.

/// A positional statement parameter: text, or SQL NULL.
pub type Param = Option<String>;

/// Normalizes a single submitted value.
///
/// An exactly empty value becomes NULL; anything else is trimmed. A whitespace-only value
/// therefore becomes an empty string, not NULL.
pub fn normalize_value(value: &str) -> Param {
    if value.is_empty() {
        None
    } else {
        Some(value.trim().to_string())
    }
}

/// Takes the values of the submitted fields in submission order, ignoring their names.
///
/// The order of the form's fields is the order of the statement's placeholders; nothing binds by
/// name.
pub fn params_from_fields<I, K, V>(fields: I) -> Vec<Param>
where
    I: IntoIterator<Item = (K, V)>,
    V: AsRef<str>,
{
    fields
        .into_iter()
        .map(|(_, value)| normalize_value(value.as_ref()))
        .collect()
}

/// Normalizes bare values, e.g. from the command line.
pub fn params_from_values<I, V>(values: I) -> Vec<Param>
where
    I: IntoIterator<Item = V>,
    V: AsRef<str>,
{
    values
        .into_iter()
        .map(|value| normalize_value(value.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_becomes_null_and_others_are_trimmed() {
        assert_eq!(normalize_value(""), None);
        assert_eq!(normalize_value("  Ayşe "), Some("Ayşe".into()));
        assert_eq!(normalize_value("   "), Some(String::new()));
    }

    #[test]
    fn keeps_submission_order_and_ignores_names() {
        let fields = vec![
            ("tc", "12345678901"),
            ("isim", "Ayşe"),
            ("soyisim", "Kaya"),
            ("cinsiyet", "K"),
            ("adres", ""),
            ("dogum_tarihi", "1990-01-01"),
        ];

        assert_eq!(
            params_from_fields(fields),
            vec![
                Some("12345678901".to_string()),
                Some("Ayşe".to_string()),
                Some("Kaya".to_string()),
                Some("K".to_string()),
                None,
                Some("1990-01-01".to_string()),
            ]
        );
    }

    #[test]
    fn repeated_names_each_become_a_parameter() {
        let fields = vec![("tc".to_string(), "1".to_string()), ("tc".into(), "2".into())];
        assert_eq!(
            params_from_fields(fields),
            vec![Some("1".to_string()), Some("2".to_string())]
        );
    }

    #[test]
    fn bare_values_are_normalized_the_same_way() {
        assert_eq!(
            params_from_values(["", " x "]),
            vec![None, Some("x".to_string())]
        );
    }
}

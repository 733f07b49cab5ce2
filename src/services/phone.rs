const MIN_DIGITS: usize = 8;
const MAX_DIGITS: usize = 15;
const SUBSCRIBER_DIGITS: usize = 9;

/// Normalizes a contact number to `+<country><subscriber>` form.
///
/// Accepted shapes, after dropping spaces, dashes, dots and parentheses:
/// `+<digits>`, `00<digits>`, `<country_code><9 digits>`, `0<9 digits>` and a
/// bare 9-digit subscriber number. Returns `None` for anything else.
pub fn normalize_phone(raw: &str, country_code: &str) -> Option<String> {
    let compact: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();

    let (international, digits) = match compact.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => match compact.strip_prefix("00") {
            Some(rest) => (true, rest),
            None => (false, compact.as_str()),
        },
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let full = if international {
        digits.to_string()
    } else if let Some(local) = digits.strip_prefix('0') {
        if local.len() != SUBSCRIBER_DIGITS {
            return None;
        }
        format!("{country_code}{local}")
    } else if digits.len() == SUBSCRIBER_DIGITS {
        format!("{country_code}{digits}")
    } else if digits.starts_with(country_code)
        && digits.len() == country_code.len() + SUBSCRIBER_DIGITS
    {
        digits.to_string()
    } else {
        return None;
    };

    if !(MIN_DIGITS..=MAX_DIGITS).contains(&full.len()) || full.starts_with('0') {
        return None;
    }
    Some(format!("+{full}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_number_gets_country_code() {
        assert_eq!(
            normalize_phone("0771234567", "256").as_deref(),
            Some("+256771234567")
        );
    }

    #[test]
    fn test_formatting_is_stripped() {
        assert_eq!(
            normalize_phone(" 077-123 (4567) ", "256").as_deref(),
            Some("+256771234567")
        );
        assert_eq!(
            normalize_phone("0771.234.567", "256").as_deref(),
            Some("+256771234567")
        );
    }

    #[test]
    fn test_already_international() {
        assert_eq!(
            normalize_phone("+256 771 234 567", "256").as_deref(),
            Some("+256771234567")
        );
        assert_eq!(
            normalize_phone("00254712345678", "256").as_deref(),
            Some("+254712345678")
        );
        assert_eq!(
            normalize_phone("256771234567", "256").as_deref(),
            Some("+256771234567")
        );
    }

    #[test]
    fn test_bare_subscriber_number() {
        assert_eq!(
            normalize_phone("771234567", "256").as_deref(),
            Some("+256771234567")
        );
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(normalize_phone("abc", "256"), None);
        assert_eq!(normalize_phone("", "256"), None);
        assert_eq!(normalize_phone("+", "256"), None);
        assert_eq!(normalize_phone("077123", "256"), None);
        assert_eq!(normalize_phone("07712345678901", "256"), None);
        assert_eq!(normalize_phone("+1234567890123456", "256"), None);
        assert_eq!(normalize_phone("0771abc567", "256"), None);
    }

    #[test]
    fn test_normalized_output_is_stable() {
        let once = normalize_phone("0771234567", "256").unwrap();
        assert_eq!(normalize_phone(&once, "256"), Some(once));
    }
}

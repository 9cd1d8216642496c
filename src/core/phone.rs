/// Error returned when no normalization rule matches an input number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid phone number: {0}")]
pub struct InvalidPhoneNumber(pub String);

const WIRE_PREFIX: &str = "whatsapp:";

/// Normalizes a phone representation into the canonical wire form
/// `whatsapp:+<countrycode><number>`.
///
/// Separators (whitespace, `-`, `(`, `)`) are stripped first, then the
/// rules run in order, first match wins:
/// 1. already `whatsapp:`-prefixed: the rest must be `+digits` or bare
///    digits (bare digits get `+` prepended)
/// 2. leading `+`: prefixed with `whatsapp:` verbatim
/// 3. `57` followed by 10 digits: a country-code-prefixed Colombian mobile
/// 4. exactly 10 digits: assumed Colombian, `+57` prepended
///
/// The function is pure and idempotent: normalizing an already-normalized
/// value returns it unchanged.
pub fn normalize_whatsapp(value: &str) -> Result<String, InvalidPhoneNumber> {
    let stripped: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect();

    if stripped.is_empty() {
        return Err(InvalidPhoneNumber(value.to_string()));
    }

    if let Some(rest) = stripped.strip_prefix(WIRE_PREFIX) {
        if let Some(digits) = rest.strip_prefix('+') {
            if is_digits(digits) {
                return Ok(format!("{WIRE_PREFIX}+{digits}"));
            }
        } else if is_digits(rest) {
            return Ok(format!("{WIRE_PREFIX}+{rest}"));
        }
        return Err(InvalidPhoneNumber(value.to_string()));
    }

    if stripped.starts_with('+') {
        return Ok(format!("{WIRE_PREFIX}{stripped}"));
    }

    if stripped.len() == 12 && stripped.starts_with("57") && is_digits(&stripped) {
        return Ok(format!("{WIRE_PREFIX}+{stripped}"));
    }

    if stripped.len() == 10 && is_digits(&stripped) {
        return Ok(format!("{WIRE_PREFIX}+57{stripped}"));
    }

    Err(InvalidPhoneNumber(value.to_string()))
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_digit_local_number_gets_colombian_prefix() {
        assert_eq!(
            normalize_whatsapp("3116123189").unwrap(),
            "whatsapp:+573116123189"
        );
    }

    #[test]
    fn country_code_prefixed_mobile_is_accepted() {
        assert_eq!(
            normalize_whatsapp("573026444564").unwrap(),
            "whatsapp:+573026444564"
        );
    }

    #[test]
    fn plus_prefixed_number_is_wrapped_verbatim() {
        assert_eq!(
            normalize_whatsapp("+13055551212").unwrap(),
            "whatsapp:+13055551212"
        );
    }

    #[test]
    fn wire_prefixed_bare_digits_gain_a_plus() {
        assert_eq!(
            normalize_whatsapp("whatsapp:573116123189").unwrap(),
            "whatsapp:+573116123189"
        );
    }

    #[test]
    fn canonical_form_is_returned_unchanged() {
        let canonical = "whatsapp:+573116123189";
        assert_eq!(normalize_whatsapp(canonical).unwrap(), canonical);
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_whatsapp("3007189383").unwrap();
        let twice = normalize_whatsapp(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn separators_are_stripped_before_matching() {
        assert_eq!(
            normalize_whatsapp("(311) 612-3189").unwrap(),
            "whatsapp:+573116123189"
        );
        assert_eq!(
            normalize_whatsapp(" +57 300 718 9383 ").unwrap(),
            "whatsapp:+573007189383"
        );
    }

    #[test]
    fn garbage_inputs_are_rejected() {
        assert!(normalize_whatsapp("abc").is_err());
        assert!(normalize_whatsapp("").is_err());
        assert!(normalize_whatsapp("123").is_err());
        assert!(normalize_whatsapp("whatsapp:+57abc").is_err());
    }

    #[test]
    fn error_carries_the_offending_input() {
        let err = normalize_whatsapp("abc").unwrap_err();
        assert_eq!(err.0, "abc");
    }
}

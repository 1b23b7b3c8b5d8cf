//! Numeric suffix bumping for colliding names.
//!
//! Both identifiers and short names are disambiguated by bumping a trailing
//! number. The rules are small but easy to get subtly wrong, so they live
//! here as pure functions:
//!
//! - A name ending in `9` has its trailing digit run incremented with decimal
//!   carry, growing by one digit when the whole run was nines
//!   (`Foo9` → `Foo10`, `Foo_19` → `Foo_20`).
//! - A name ending in `_<digits>` has those digits incremented (`Foo_1` → `Foo_2`).
//! - Anything else gets a fresh `_1` suffix (`Foo` → `Foo_1`, `Foo18` → `Foo18_1`).

/// Increments a run of ASCII decimal digits, carrying as needed.
///
/// ```
/// use msikit_ident::bump::increment_digits;
/// assert_eq!(increment_digits("1"), "2");
/// assert_eq!(increment_digits("19"), "20");
/// assert_eq!(increment_digits("999"), "1000");
/// assert_eq!(increment_digits(""), "1");
/// ```
pub fn increment_digits(digits: &str) -> String {
    let mut bytes = digits.as_bytes().to_vec();
    for byte in bytes.iter_mut().rev() {
        if *byte == b'9' {
            *byte = b'0';
        } else {
            *byte += 1;
            // Only ever fed ASCII digits, so the bytes stay valid UTF-8.
            return bytes.into_iter().map(char::from).collect();
        }
    }
    // Every digit carried over (or there were none): prepend the new leading one.
    std::iter::once('1').chain(bytes.into_iter().map(char::from)).collect()
}

/// Returns the next candidate after `name` has been found to collide.
///
/// ```
/// use msikit_ident::bump::bump;
/// assert_eq!(bump("Foo9"), "Foo10");
/// assert_eq!(bump("Foo_1"), "Foo_2");
/// assert_eq!(bump("Foo"), "Foo_1");
/// ```
pub fn bump(name: &str) -> String {
    let (stem, digits) = split_digits(name);
    if digits.ends_with('9') {
        return format!("{stem}{}", increment_digits(digits));
    }
    match stem.strip_suffix('_') {
        Some(stem) if !digits.is_empty() => format!("{stem}_{}", increment_digits(digits)),
        _ => format!("{name}_1"),
    }
}

/// Splits a name into the stem and the numeric suffix that [`bump`] manages.
///
/// The suffix is either `_<digits>` or, failing that, the bare trailing digit
/// run. Names without trailing digits have an empty suffix.
pub fn split_suffix(name: &str) -> (&str, &str) {
    let (stem, digits) = split_digits(name);
    if digits.is_empty() {
        return (name, "");
    }
    match stem.strip_suffix('_') {
        Some(stem) => name.split_at(stem.len()),
        None => (stem, digits),
    }
}

/// Squeezes a bumped candidate back under `max_length` by trimming its stem.
///
/// Returns `None` when even the suffix alone doesn't fit, or when trimming
/// would leave a name starting with a digit.
pub fn fit(name: &str, max_length: usize) -> Option<String> {
    if name.len() <= max_length {
        return Some(name.to_string());
    }
    let (stem, suffix) = split_suffix(name);
    let keep = max_length.checked_sub(suffix.len())?;
    let stem = &stem[..stem.floor_char_boundary(keep)];
    if stem.is_empty() && !suffix.starts_with('_') {
        return None;
    }
    Some(format!("{stem}{suffix}"))
}

fn split_digits(name: &str) -> (&str, &str) {
    let stem = name.trim_end_matches(|c: char| c.is_ascii_digit());
    name.split_at(stem.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0", "1")]
    #[case("8", "9")]
    #[case("9", "10")]
    #[case("09", "10")]
    #[case("19", "20")]
    #[case("199", "200")]
    #[case("999", "1000")]
    #[case("", "1")]
    fn test_increment_digits(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(increment_digits(input), expected);
    }

    #[rstest]
    // Trailing nines carry.
    #[case("Foo9", "Foo10")]
    #[case("Foo99", "Foo100")]
    #[case("Foo_9", "Foo_10")]
    #[case("Foo_19", "Foo_20")]
    #[case("Foo_99", "Foo_100")]
    #[case("Foo29", "Foo30")]
    // Existing underscore suffix is incremented.
    #[case("Foo_1", "Foo_2")]
    #[case("Foo_18", "Foo_19")]
    #[case("Foo_0", "Foo_1")]
    // No suffix yet.
    #[case("Foo", "Foo_1")]
    #[case("Foo18", "Foo18_1")]
    #[case("Foo_", "Foo__1")]
    #[case("Foo.bar", "Foo.bar_1")]
    #[case("", "_1")]
    fn test_bump(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(bump(input), expected);
    }

    #[test]
    fn test_bump_never_repeats() {
        let mut seen = std::collections::HashSet::new();
        let mut name = "Foo".to_string();
        for _ in 0..250 {
            assert!(seen.insert(name.clone()), "{name} produced twice");
            name = bump(&name);
        }
    }

    #[rstest]
    #[case("Foo_12", ("Foo", "_12"))]
    #[case("Foo12", ("Foo", "12"))]
    #[case("Foo", ("Foo", ""))]
    #[case("_1", ("", "_1"))]
    #[case("12", ("", "12"))]
    fn test_split_suffix(#[case] input: &str, #[case] expected: (&str, &str)) {
        assert_eq!(split_suffix(input), expected);
    }

    #[rstest]
    #[case("Abcd", 4, Some("Abcd"))]
    #[case("Abcd_1", 4, Some("Ab_1"))]
    #[case("Abc10", 4, Some("Ab10"))]
    #[case("A_100", 4, Some("_100"))]
    #[case("_1000", 4, None)]
    #[case("A1000", 4, None)]
    fn test_fit(#[case] input: &str, #[case] max: usize, #[case] expected: Option<&str>) {
        assert_eq!(fit(input, max).as_deref(), expected);
    }
}

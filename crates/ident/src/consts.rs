use regex::Regex;
use std::sync::LazyLock;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

/// Printable ASCII minus the characters Windows rejects in short names (and the period).
const SHORT_CHAR: &str = r#"[\x21-\x7E&&[^\\?|><:/*",;=\[\].]]"#;

regex!(IDENTIFIER_REGEX, r"^[A-Za-z_][A-Za-z0-9_.]*$");
regex!(SHORT_NAME_REGEX, format!(r"^{SHORT_CHAR}{{1,8}}(?:\.{SHORT_CHAR}{{1,3}})?$").as_str());

/// Characters that never make it into a generated short name.
pub(crate) const SHORT_NAME_DISALLOWED: &[char] =
    &['\\', '?', '|', '>', '<', ':', '/', '*', '"', ',', ';', '=', '[', ']', ' '];

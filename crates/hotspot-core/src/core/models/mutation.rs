use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

static MUTATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Z])(-?\d+[A-Za-z]?)([A-Z])$").expect("mutation pattern is valid")
});

/// A single point substitution, written as `{original}{label}{replacement}`
/// (for example `T52V` or `K27AE`).
///
/// `label` is the source numbering of the residue, including any insertion
/// code, not its pose index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mutation {
    pub original: char,
    pub label: String,
    pub replacement: char,
}

impl Mutation {
    pub fn new(original: char, label: impl Into<String>, replacement: char) -> Self {
        Self {
            original,
            label: label.into(),
            replacement,
        }
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.original, self.label, self.replacement)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("'{0}' is not a mutation of the form <from><residue><to>")]
pub struct ParseMutationError(pub String);

impl FromStr for Mutation {
    type Err = ParseMutationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let caps = MUTATION_PATTERN
            .captures(s)
            .ok_or_else(|| ParseMutationError(s.to_string()))?;
        let first_char = |i: usize| caps[i].chars().next();
        match (first_char(1), first_char(3)) {
            (Some(original), Some(replacement)) => {
                Ok(Mutation::new(original, &caps[2], replacement))
            }
            _ => Err(ParseMutationError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_concatenates_codes_and_label() {
        assert_eq!(Mutation::new('T', "52", 'V').to_string(), "T52V");
        assert_eq!(Mutation::new('K', "27A", 'E').to_string(), "K27AE");
    }

    #[test]
    fn parses_plain_and_insertion_code_labels() {
        assert_eq!("T52V".parse(), Ok(Mutation::new('T', "52", 'V')));
        assert_eq!("K27AE".parse(), Ok(Mutation::new('K', "27A", 'E')));
        assert_eq!(" A-3G ".parse(), Ok(Mutation::new('A', "-3", 'G')));
    }

    #[test]
    fn rejects_malformed_tokens() {
        for token in ["", "52", "T52", "t52v", "TV", "T 52 V"] {
            assert!(token.parse::<Mutation>().is_err(), "accepted '{token}'");
        }
    }
}

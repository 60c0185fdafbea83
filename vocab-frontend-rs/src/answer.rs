/// Whether `input` matches `expected`, ignoring case and surrounding whitespace.
///
/// Accents are significant: "ecole" does not match "école".
pub fn is_correct(input: &str, expected: &str) -> bool {
    input.trim().to_lowercase() == expected.trim().to_lowercase()
}

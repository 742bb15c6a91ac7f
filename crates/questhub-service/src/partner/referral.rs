//! Referral codes issued to approved partners.

/// Letters and digits that cannot be mistaken for one another when read
/// aloud or copied by hand (no `0/O`, `1/I/L`).
const ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Length of an issued code.
pub const CODE_LENGTH: usize = 8;

/// Generate a random referral code.
pub fn generate() -> String {
    (0..CODE_LENGTH)
        .map(|_| char::from(ALPHABET[rand::random_range(0..ALPHABET.len())]))
        .collect()
}

/// Normalise user input for lookup: trimmed and upper-cased.
pub fn normalize(input: &str) -> String {
    input.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_codes_use_the_alphabet() {
        for _ in 0..50 {
            let code = generate();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.bytes().all(|b| ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  ab12cd34 "), "AB12CD34");
    }
}

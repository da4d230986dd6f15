//! Anonymous nickname generator.
//!
//! Twitch lets any `justinfan<digits>` nick join read-only without a token.

use rand::RngExt;

const ANONYMOUS_PREFIX: &str = "justinfan";

/// Generate a read-only nickname like `justinfan48213`.
pub fn generate_anonymous_nickname() -> String {
    let mut rng = rand::rng();
    let num: u32 = rng.random_range(10_000..100_000);
    format!("{}{}", ANONYMOUS_PREFIX, num)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_nickname_shape() {
        for _ in 0..20 {
            let nick = generate_anonymous_nickname();
            let digits = nick.strip_prefix(ANONYMOUS_PREFIX).unwrap();
            assert_eq!(digits.len(), 5);
            assert!(digits.chars().all(|c| c.is_ascii_digit()));
        }
    }
}

/// Masks a secret for display: first 4 and last 4 characters survive,
/// the middle collapses to at most 20 stars. Short strings (8 chars or
/// fewer) are fully starred so nothing useful leaks.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    let stars = std::cmp::min(20, chars.len() - 8);
    format!("{head}{}{tail}", "*".repeat(stars))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_first_and_last_four() {
        let masked = mask_secret("sk-abcdefghijklmnop");
        assert!(masked.starts_with("sk-a"));
        assert!(masked.ends_with("mnop"));
        assert!(!masked.contains("bcdefghijkl"));
    }

    #[test]
    fn short_secrets_are_fully_starred() {
        assert_eq!(mask_secret("abc"), "***");
        assert_eq!(mask_secret("12345678"), "********");
    }

    #[test]
    fn star_run_is_capped() {
        let long = "a".repeat(100);
        let masked = mask_secret(&long);
        assert_eq!(masked.len(), 4 + 20 + 4);
    }
}

//! URL slugs derived from a move's condition.

/// Lowercases `s` and collapses every run of non-alphanumeric characters
/// into a single hyphen. Leading and trailing hyphens are dropped, so the
/// result is stable under repeated application.
pub fn slugify(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_hyphen = false;

    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_punctuation_runs() {
        assert_eq!(slugify("Hack & Slash!!"), "hack-slash");
        assert_eq!(slugify("Defy  Danger"), "defy-danger");
        assert_eq!(slugify("--Go--Aggro--"), "go-aggro");
    }

    #[test]
    fn total_on_degenerate_input() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify("Ünïcode"), "n-code");
    }

    #[test]
    fn idempotent() {
        for input in ["Hack & Slash!!", "Read a Sitch", "  spout  lore ", "x"] {
            let once = slugify(input);
            assert_eq!(slugify(&once), once);
        }
    }
}

//! Tag normalisation.

/// Parses free-form tag input into a normalised, de-duplicated list.
///
/// Every input string is split on whitespace; characters outside
/// `[a-z0-9_-]` are stripped after lowercasing and empty tokens are dropped.
/// The first occurrence of a tag decides its position.
pub fn parse_tags<I, S>(input: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tags: Vec<String> = Vec::new();

    for chunk in input {
        for token in chunk.as_ref().split_whitespace() {
            let tag: String = token
                .chars()
                .map(|c| c.to_ascii_lowercase())
                .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-')
                .collect();
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }
    }

    tags
}

/// Tag lists taken from a URL segment also accept `+` and `,` as separators.
pub fn parse_tag_path(segment: &str) -> Vec<String> {
    let spaced = segment.replace(['+', ','], " ");
    parse_tags([spaced.as_str()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_and_lowercases() {
        assert_eq!(
            parse_tags(["Dungeon-World  AW_2e  #basic!"]),
            vec!["dungeon-world", "aw_2e", "basic"]
        );
    }

    #[test]
    fn accepts_lists_and_drops_duplicates() {
        assert_eq!(
            parse_tags(vec!["combat".to_string(), "COMBAT magic".to_string(), "???".to_string()]),
            vec!["combat", "magic"]
        );
    }

    #[test]
    fn idempotent() {
        let once = parse_tags(["Hack&Slash  peripheral  !!  Hack&Slash"]);
        assert_eq!(parse_tags(&once), once);
    }

    #[test]
    fn path_separators() {
        assert_eq!(parse_tag_path("combat+Magic,basic"), vec!["combat", "magic", "basic"]);
        assert!(parse_tag_path("").is_empty());
    }
}

//! TOML front matter delimited by `+++` lines.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

const DELIMITER: &str = "+++";

#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("missing opening `+++` front matter delimiter")]
    MissingOpening,
    #[error("unterminated front matter block")]
    Unterminated,
    #[error("invalid front matter: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Front matter of an article file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ArticleFrontMatter {
    pub title: String,
    pub date: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub draft: bool,
}

/// Front matter of one language variant of a legal page.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LegalFrontMatter {
    pub title: String,
}

/// Split `source` into parsed front matter and the markdown body that follows it.
pub fn parse<T: DeserializeOwned>(source: &str) -> Result<(T, &str), FrontMatterError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let rest = source
        .strip_prefix(DELIMITER)
        .and_then(|rest| rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n")))
        .ok_or(FrontMatterError::MissingOpening)?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let header = &rest[..offset];
            let body = &rest[offset + line.len()..];
            let parsed = toml::from_str(header)?;
            return Ok((parsed, body));
        }
        offset += line.len();
    }

    Err(FrontMatterError::Unterminated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_article_front_matter_and_body() {
        let source = "+++\ntitle = \"Docker basics\"\ndate = \"2023-02-11\"\ntags = [\"docker\"]\n+++\n# Intro\n";
        let (meta, body): (ArticleFrontMatter, _) = parse(source).expect("front matter");

        assert_eq!(meta.title, "Docker basics");
        assert_eq!(meta.date, "2023-02-11");
        assert_eq!(meta.tags, vec!["docker".to_string()]);
        assert!(!meta.draft);
        assert!(meta.slug.is_none());
        assert_eq!(body, "# Intro\n");
    }

    #[test]
    fn handles_crlf_line_endings() {
        let source = "+++\r\ntitle = \"Impressum\"\r\n+++\r\nText";
        let (meta, body): (LegalFrontMatter, _) = parse(source).expect("front matter");
        assert_eq!(meta.title, "Impressum");
        assert_eq!(body, "Text");
    }

    #[test]
    fn missing_delimiter_is_rejected() {
        let err = parse::<LegalFrontMatter>("title = \"x\"\n").unwrap_err();
        assert!(matches!(err, FrontMatterError::MissingOpening));
    }

    #[test]
    fn unterminated_block_is_rejected() {
        let err = parse::<LegalFrontMatter>("+++\ntitle = \"x\"\n").unwrap_err();
        assert!(matches!(err, FrontMatterError::Unterminated));
    }

    #[test]
    fn missing_required_field_is_a_toml_error() {
        let err = parse::<ArticleFrontMatter>("+++\ntitle = \"x\"\n+++\n").unwrap_err();
        assert!(matches!(err, FrontMatterError::Toml(_)));
    }
}

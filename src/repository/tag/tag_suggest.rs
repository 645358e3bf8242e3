//! Tag Suggestions
//!
//! Autocomplete search over tag names using the configured `LIKE` pattern.

use async_trait::async_trait;
use rusqlite::params;

use crate::config::TERM_PLACEHOLDER;
use crate::domain::{Tag, DomainResult};
use super::super::traits::SearchableRepository;
use super::tag_repo::row_to_tag;

/// Escape `LIKE` wildcards so the term matches literally (escape char `\`)
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Substitute the escaped term into a pattern such as `{term}%`
pub fn build_like_pattern(pattern: &str, term: &str) -> String {
    pattern.replace(TERM_PLACEHOLDER, &escape_like(term))
}

#[async_trait]
impl SearchableRepository<Tag> for super::tag_repo::TagRepository {
    async fn search(&self, term: &str) -> DomainResult<Vec<Tag>> {
        let pattern = build_like_pattern(&self.config.suggest_pattern, term);
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare(&self.sql.search_tags)?;
        let tags = stmt
            .query_map(params![pattern], row_to_tag)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_build_pattern() {
        assert_eq!(build_like_pattern("{term}%", "ru"), "ru%");
        assert_eq!(build_like_pattern("%{term}%", "a_b"), "%a\\_b%");
    }
}

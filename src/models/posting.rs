//! Posting data structures.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::utils::text::truncate_graphemes;

/// A job posting extracted from a source site.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostingRecord {
    /// Posting title as shown on the listing page
    pub title: String,

    /// Absolute URL of the posting detail page
    pub link: String,

    /// Full description text from the detail page (may be empty)
    pub description: String,

    /// Source identifier, e.g. `work.ua`
    pub source: String,

    /// Best-effort publication date for display (may be empty)
    pub published: String,
}

impl PostingRecord {
    /// Format the posting for display using a template.
    ///
    /// Supported placeholders:
    /// - `{title}`, `{description}`, `{date}`, `{source}`, `{link}`
    ///
    /// Title, description and source are HTML-escaped, the description is
    /// cut to `description_limit` graphemes, and the link is attribute-escaped.
    pub fn format(&self, template: &str, description_limit: usize) -> String {
        let description = truncate_graphemes(&self.description, description_limit);
        let fields: [(&str, Cow<'_, str>); 5] = [
            ("{title}", html_escape::encode_text(&self.title)),
            ("{description}", html_escape::encode_text(description)),
            ("{date}", html_escape::encode_text(&self.published)),
            ("{source}", html_escape::encode_text(&self.source)),
            ("{link}", html_escape::encode_double_quoted_attribute(&self.link)),
        ];

        // One pass over the template; substituted text is never rescanned.
        let mut out = String::with_capacity(template.len() + description.len());
        let mut rest = template;
        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            rest = &rest[start..];
            match fields.iter().find(|(key, _)| rest.starts_with(key)) {
                Some((key, value)) => {
                    out.push_str(value);
                    rest = &rest[key.len()..];
                }
                None => {
                    out.push('{');
                    rest = &rest[1..];
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// A row of the seen-postings table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeenEntry {
    /// Hex SHA-256 identity digest
    pub id: String,
    pub source: String,
    pub link: String,
    /// First graphemes of the title, for auditing
    pub title: String,
    /// RFC 3339 UTC timestamp of the first sighting
    pub first_seen: String,
}

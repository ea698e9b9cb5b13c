//! Job card types - the minimal extracted representation of one posting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A card element as read off the rendered result list, before any
/// validation.
///
/// The browser collaborator produces these; it owns the site-specific
/// knowledge of where the id attribute and the posting link live. Text
/// lines are kept in render order (title first, then employer, then
/// whatever else the card shows).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCard {
    /// Posting identifier, if the element carried one
    pub id: Option<String>,

    /// Link to the full posting
    pub link: String,

    /// Visible text lines of the card, in render order
    pub lines: Vec<String>,
}

impl RawCard {
    /// Create a raw card with an id and link.
    pub fn new(id: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            link: link.into(),
            lines: Vec::new(),
        }
    }

    /// Add a visible text line.
    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    /// Add multiple text lines.
    pub fn with_lines(mut self, lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.lines.extend(lines.into_iter().map(|l| l.into()));
        self
    }
}

/// One posting from the result list view. Immutable once extracted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobCard {
    /// Identifier, unique per posting on the source platform
    pub id: String,

    /// Position title as rendered on the card
    pub title: String,

    /// Employer name as rendered on the card
    pub company: String,

    /// Link to the full posting
    pub link: String,

    /// Short snippet: the remaining card text (location, salary teaser,
    /// posted-ago line)
    pub snippet: String,

    /// Posted date, when the card carried one
    pub posted: Option<DateTime<Utc>>,
}

impl JobCard {
    /// Create a card with the required fields.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        company: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            company: company.into(),
            link: link.into(),
            snippet: String::new(),
            posted: None,
        }
    }

    /// Set the snippet.
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = snippet.into();
        self
    }

    /// Set the posted date.
    pub fn with_posted(mut self, posted: DateTime<Utc>) -> Self {
        self.posted = Some(posted);
        self
    }

    /// Build a card from a raw element, or `None` if the element carried
    /// no usable id.
    ///
    /// Line mapping follows the rendered card layout: first line is the
    /// title, second the employer, the rest becomes the snippet.
    pub fn from_raw(raw: &RawCard) -> Option<Self> {
        let id = raw.id.as_deref()?.trim();
        if id.is_empty() {
            return None;
        }

        let mut lines = raw.lines.iter().map(|l| l.trim()).filter(|l| !l.is_empty());
        let title = lines.next().unwrap_or_default().to_string();
        let company = lines.next().unwrap_or_default().to_string();
        let snippet = lines.collect::<Vec<_>>().join(" | ");

        Some(Self {
            id: id.to_string(),
            title,
            company,
            link: raw.link.clone(),
            snippet,
            posted: None,
        })
    }

    /// Render the card-level fields for a Stage-1 prompt.
    pub fn prompt_text(&self) -> String {
        format!(
            "id: {}\ntitle: {}\ncompany: {}\nsnippet: {}",
            self.id, self.title, self.company, self.snippet
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_maps_lines_in_render_order() {
        let raw = RawCard::new("12345", "https://jobs.example.com/view/12345/")
            .with_lines(["Data Scientist II", "Acme Analytics", "Remote", "$120k"]);

        let card = JobCard::from_raw(&raw).unwrap();
        assert_eq!(card.id, "12345");
        assert_eq!(card.title, "Data Scientist II");
        assert_eq!(card.company, "Acme Analytics");
        assert_eq!(card.snippet, "Remote | $120k");
    }

    #[test]
    fn from_raw_rejects_missing_or_blank_id() {
        let no_id = RawCard {
            id: None,
            link: "https://jobs.example.com/x".into(),
            lines: vec!["Engineer".into()],
        };
        assert!(JobCard::from_raw(&no_id).is_none());

        let blank = RawCard::new("  ", "https://jobs.example.com/x");
        assert!(JobCard::from_raw(&blank).is_none());
    }

    #[test]
    fn from_raw_skips_empty_lines() {
        let raw = RawCard::new("1", "https://jobs.example.com/1")
            .with_lines(["", "Analyst", "  ", "Globex", "NYC"]);
        let card = JobCard::from_raw(&raw).unwrap();
        assert_eq!(card.title, "Analyst");
        assert_eq!(card.company, "Globex");
        assert_eq!(card.snippet, "NYC");
    }
}

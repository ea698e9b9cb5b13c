//! Full posting text, fetched lazily for Stage-1 survivors only.

/// The full text body of one posting.
///
/// Owned transiently by the Stage-2 gate; never persisted.
#[derive(Debug, Clone)]
pub struct JobDescription {
    /// URL the body was fetched from
    pub url: String,

    /// Description body, cropped to the posting content
    pub body: String,

    /// Whether the page marked the listing as a repost
    pub reposted: bool,
}

/// Marker that opens the description body on the rendered page.
const BODY_START: &str = "About the job";

/// Marker that opens the trailing boilerplate after the body.
const BODY_END: &str = "\nSee more\nSet alert for similar jobs\n";

impl JobDescription {
    /// Build a description from a fetched page's text.
    ///
    /// Crops to the region between the body markers and checks the
    /// header above the body for a repost tag.
    pub fn from_page(url: impl Into<String>, page_text: &str) -> Self {
        Self {
            url: url.into(),
            body: crop_between(page_text, BODY_START, BODY_END).to_string(),
            reposted: is_repost(page_text),
        }
    }

    /// Length of the cropped body in characters.
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Whether the cropped body is empty.
    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }
}

/// Detect a reposted listing: the tag only counts when it appears in the
/// header region above the description body.
fn is_repost(page_text: &str) -> bool {
    match page_text.find(BODY_START) {
        Some(i) => page_text[..i].to_lowercase().contains("reposted"),
        None => false,
    }
}

/// Crop `text` to the region between two marker phrases.
///
/// Missing markers degrade gracefully: absent start keeps the beginning,
/// absent end keeps the tail, markers in the wrong order keep everything.
fn crop_between<'a>(text: &'a str, start: &str, end: &str) -> &'a str {
    let i = text.find(start);
    let j = text.find(end);

    match (i, j) {
        (Some(i), Some(j)) if i < j => text[i..j].trim(),
        (Some(_), Some(_)) => text.trim(),
        (Some(i), None) => text[i..].trim(),
        (None, Some(j)) => text[..j].trim(),
        (None, None) => text.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crops_between_markers() {
        let page = format!(
            "Header noise\n{}\nWe build rockets.{}Footer noise",
            BODY_START, BODY_END
        );
        let jd = JobDescription::from_page("https://x", &page);
        assert!(jd.body.starts_with(BODY_START));
        assert!(jd.body.contains("We build rockets."));
        assert!(!jd.body.contains("Footer noise"));
        assert!(!jd.body.contains("Header noise"));
    }

    #[test]
    fn missing_markers_keep_whole_text() {
        let jd = JobDescription::from_page("https://x", "  plain body  ");
        assert_eq!(jd.body, "plain body");
    }

    #[test]
    fn missing_end_keeps_tail() {
        let page = format!("noise {} the body continues", BODY_START);
        let jd = JobDescription::from_page("https://x", &page);
        assert!(jd.body.ends_with("the body continues"));
        assert!(!jd.body.starts_with("noise"));
    }

    #[test]
    fn repost_tag_only_counts_above_the_body() {
        let reposted = format!("Acme | Reposted 2 days ago\n{}\nbody", BODY_START);
        assert!(JobDescription::from_page("https://x", &reposted).reposted);

        let in_body = format!("Acme\n{}\nWe reposted our mission statement", BODY_START);
        assert!(!JobDescription::from_page("https://x", &in_body).reposted);

        let no_marker = "Reposted 2 days ago but no body marker";
        assert!(!JobDescription::from_page("https://x", no_marker).reposted);
    }
}

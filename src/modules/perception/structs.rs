use serde::{Serialize, Deserialize};

/// 一条新闻标题 (来自 RSS)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headline {
    pub title: String,
    pub link: String,
}

impl Headline {
    #[allow(dead_code)]
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self { title: title.into(), link: link.into() }
    }

    /// Usable for the teaser: both title and link present.
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && !self.link.trim().is_empty()
    }

    /// Teaser line fed to the model.
    pub fn to_teaser_line(&self) -> String {
        format!("Title: {}, Link: {}\n", self.title, self.link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn teaser_line_carries_title_and_link() {
        let h = Headline::new("Storm hits coast", "https://x/1");
        assert_eq!(h.to_teaser_line(), "Title: Storm hits coast, Link: https://x/1\n");
    }

    #[test]
    fn blank_fields_make_a_headline_invalid() {
        assert!(Headline::new("Markets rally", "https://x/3").is_valid());
        assert!(!Headline::new("  ", "https://x/3").is_valid());
        assert!(!Headline::new("Markets rally", "").is_valid());
    }
}

//! Archive view page rendering module
//!
//! Substitutes an article's title and raw content into the HTML shell
//! template. The template is read-only after initialization, so rendering
//! is safe to call from any number of concurrent requests.

use std::io;
use std::path::Path;

use tokio::fs;

/// Title placeholder in the view template
const TITLE_TOKEN: &str = "${article.title}";
/// Content placeholder in the view template
const CONTENT_TOKEN: &str = "${article.content}";

/// The archive view page template
pub struct ViewPage {
    template: String,
}

impl ViewPage {
    pub const fn new(template: String) -> Self {
        Self { template }
    }

    /// Read the article file at `path` and render it into the template.
    /// The title is supplied by the caller (derived from the request path).
    pub async fn render(&self, path: &Path, title: &str) -> io::Result<String> {
        let content = fs::read_to_string(path).await?;
        Ok(self.substitute(title, &content))
    }

    /// First occurrence of each placeholder is replaced
    fn substitute(&self, title: &str, content: &str) -> String {
        self.template
            .replacen(TITLE_TOKEN, title, 1)
            .replacen(CONTENT_TOKEN, content, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitutes_both_placeholders() {
        let view = ViewPage::new(
            "<h1>${article.title}</h1><pre>${article.content}</pre>".to_string(),
        );
        let page = view.substitute("my-post", "hello world");
        assert_eq!(page, "<h1>my-post</h1><pre>hello world</pre>");
    }

    #[test]
    fn test_replaces_first_occurrence_only() {
        let view = ViewPage::new("${article.title} / ${article.title}".to_string());
        let page = view.substitute("once", "");
        assert_eq!(page, "once / ${article.title}");
    }

    #[tokio::test]
    async fn test_render_reads_article_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("post.txt");
        std::fs::write(&path, "raw body").unwrap();

        let view = ViewPage::new("<title>${article.title}</title>${article.content}".to_string());
        let page = view.render(&path, "post.txt").await.unwrap();
        assert_eq!(page, "<title>post.txt</title>raw body");
    }

    #[tokio::test]
    async fn test_render_missing_file_fails() {
        let view = ViewPage::new(String::new());
        assert!(view.render(Path::new("/no/such/article"), "x").await.is_err());
    }
}

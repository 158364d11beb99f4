use crate::{
    dom::Element,
    extract::{join_posts, ClassMatch, LatexExtractor},
};
use anyhow::{anyhow, Result};
use derive_builder::Builder;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub const DEFAULT_POST_SELECTOR: &str = "div.cmty-post-html";

#[derive(Debug, Builder)]
pub struct AopsScraper {
    #[builder(setter(into))]
    urls: Vec<String>,
    #[builder(setter(into), default = "DEFAULT_POST_SELECTOR.to_string()")]
    post_selector: String,
    #[builder(default)]
    class_match: ClassMatch,
}

/// One forum thread reduced to text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AopsThread {
    pub url: String,
    pub posts: Vec<String>,
    pub statement: String,
}

impl AopsScraper {
    pub async fn scrape(&self) -> Result<Vec<AopsThread>> {
        // fail before any request goes out
        parse_selector(&self.post_selector)?;

        let mut handles = vec![];
        for url in self.urls.clone() {
            let selector = self.post_selector.clone();
            let extractor = self.extractor();
            let handle = tokio::spawn(async move {
                debug!(%url, "fetching thread");
                let html = reqwest::get(&url)
                    .await?
                    .error_for_status()?
                    .text()
                    .await?;

                parse_thread(&url, &html, &selector, &extractor)
            });
            handles.push(handle);
        }

        let mut threads = Vec::with_capacity(handles.len());
        for handle in handles {
            let thread = handle.await??;
            info!(url = %thread.url, posts = thread.posts.len(), "scraped thread");
            threads.push(thread);
        }

        Ok(threads)
    }

    pub fn extractor(&self) -> LatexExtractor {
        LatexExtractor::new(self.class_match)
    }
}

impl AopsThread {
    /// Joins the statements of several threads the same way posts are joined.
    pub fn combine(threads: &[AopsThread]) -> String {
        join_posts(threads.iter().map(|t| t.statement.as_str()))
    }
}

/// Printable view of a community topic, e.g. `c6h3107339p28104298`.
pub fn print_url(topic: &str) -> String {
    format!(
        "https://artofproblemsolving.com/community/{}?print=true",
        topic
    )
}

pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| anyhow!("Invalid selector {:?}: {}", selector, e))
}

/// Selects the post containers of a thread page and extracts each of them.
pub fn parse_thread(
    url: &str,
    html: &str,
    post_selector: &str,
    extractor: &LatexExtractor,
) -> Result<AopsThread> {
    let selector = parse_selector(post_selector)?;
    let document = Html::parse_document(html);
    let posts = document
        .select(&selector)
        .map(|post| extractor.extract(&Element::from(post)))
        .collect::<Vec<_>>();

    if posts.is_empty() {
        warn!(%url, selector = post_selector, "no posts found");
    }

    Ok(AopsThread {
        url: url.to_string(),
        statement: join_posts(&posts),
        posts,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const URL: &str = "https://artofproblemsolving.com/community/c6h3107339p28104298?print=true";

    fn fixture() -> String {
        fs::read_to_string("fixtures/thread.html").unwrap()
    }

    #[test]
    fn parse_thread_should_work() {
        let content = fixture();
        let thread = parse_thread(
            URL,
            &content,
            DEFAULT_POST_SELECTOR,
            &LatexExtractor::default(),
        )
        .unwrap();

        assert_eq!(thread.url, URL);
        assert_eq!(thread.posts.len(), 2);
        assert_eq!(thread.statement, thread.posts.join("\n\n"));

        insta::assert_snapshot!(thread.statement);
    }

    #[test]
    fn parse_thread_with_prefix_match_should_keep_display_math() {
        let content = fixture();
        let thread = parse_thread(
            URL,
            &content,
            DEFAULT_POST_SELECTOR,
            &LatexExtractor::new(ClassMatch::Prefix),
        )
        .unwrap();

        assert!(thread.posts[0].contains(
            "the integer\\[\\lfloor\\alpha\\rfloor +\\lfloor 2\\alpha\\rfloor +\\cdots +\\lfloor n\\alpha\\rfloor\\]is a multiple"
        ));
    }

    #[test]
    fn parse_thread_without_posts_should_be_empty() {
        let thread = parse_thread(
            URL,
            "<html><body><p>nothing here</p></body></html>",
            DEFAULT_POST_SELECTOR,
            &LatexExtractor::default(),
        )
        .unwrap();

        assert!(thread.posts.is_empty());
        assert_eq!(thread.statement, "");
    }

    #[test]
    fn parse_thread_should_reject_invalid_selector() {
        let err = parse_thread(URL, "<p></p>", "div[", &LatexExtractor::default());
        assert!(err.is_err());
    }

    #[test]
    fn parse_thread_should_handle_deep_nesting() {
        let depth = 100_000;
        let html = format!(
            r#"<html><body><div class="cmty-post-html">{}x<img class="latex" alt="$y$">{}</div></body></html>"#,
            "<span>".repeat(depth),
            "</span>".repeat(depth)
        );

        let thread = parse_thread(URL, &html, DEFAULT_POST_SELECTOR, &LatexExtractor::default())
            .unwrap();

        assert_eq!(thread.posts, vec!["x$y$".to_string()]);
        assert_eq!(thread.statement, "x$y$");
    }

    #[test]
    fn builder_should_fill_defaults() {
        let scraper = AopsScraperBuilder::default()
            .urls(vec![print_url("c6h3107339p28104298")])
            .build()
            .unwrap();

        assert_eq!(scraper.urls, vec![URL.to_string()]);
        assert_eq!(scraper.post_selector, DEFAULT_POST_SELECTOR);
        assert_eq!(scraper.class_match, ClassMatch::Exact);
    }

    #[test]
    fn builder_should_require_urls() {
        assert!(AopsScraperBuilder::default().build().is_err());
    }

    #[test]
    fn combine_should_join_threads() {
        let thread = |s: &str| AopsThread {
            url: URL.to_string(),
            posts: vec![s.to_string()],
            statement: s.to_string(),
        };

        assert_eq!(
            AopsThread::combine(&[thread("first"), thread("second")]),
            "first\n\nsecond"
        );
    }
}

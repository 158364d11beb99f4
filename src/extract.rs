//! LaTeX-aware text extraction.
//!
//! AoPS renders inline formulas as `<img class="latex" alt="$...$">`. Walking a
//! post and replacing those images with their `alt` text recovers the problem
//! statement as plain text with literal LaTeX source.

use crate::dom::{DocumentNode, Element};
use strum::{Display, EnumString};

pub const IMAGE_TAG: &str = "img";
pub const LATEX_CLASS: &str = "latex";
pub const ALT_ATTR: &str = "alt";
pub const POST_SEPARATOR: &str = "\n\n";

/// How the `latex` class token is recognised on an image.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ClassMatch {
    /// The class list must contain `latex` itself.
    #[default]
    Exact,
    /// Any class starting with `latex` counts, e.g. `latexcenter` for display math.
    Prefix,
}

impl ClassMatch {
    pub fn matches(&self, class: &str, wanted: &str) -> bool {
        match self {
            Self::Exact => class == wanted,
            Self::Prefix => class.starts_with(wanted),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LatexExtractor {
    class_match: ClassMatch,
}

impl LatexExtractor {
    pub fn new(class_match: ClassMatch) -> Self {
        Self { class_match }
    }

    /// Flattens the children of `element` in document order, substituting
    /// LaTeX images with their alt text. Images without `alt` contribute
    /// nothing.
    pub fn extract(&self, element: &Element) -> String {
        let mut out = String::new();
        let mut stack = vec![element.children.iter()];

        while let Some(children) = stack.last_mut() {
            match children.next() {
                Some(DocumentNode::Text(text)) => out.push_str(text),
                Some(DocumentNode::Element(el)) if self.is_latex_image(el) => {
                    out.push_str(el.attr(ALT_ATTR).unwrap_or_default())
                }
                Some(DocumentNode::Element(el)) => stack.push(el.children.iter()),
                None => {
                    stack.pop();
                }
            }
        }

        out
    }

    /// Extracts every post independently and joins them with a blank line.
    pub fn extract_posts<'a>(&self, posts: impl IntoIterator<Item = &'a Element>) -> String {
        join_posts(posts.into_iter().map(|post| self.extract(post)))
    }

    pub fn is_latex_image(&self, element: &Element) -> bool {
        element.tag == IMAGE_TAG
            && element
                .classes
                .iter()
                .any(|class| self.class_match.matches(class, LATEX_CLASS))
    }
}

/// Extracts with exact `latex` class matching.
pub fn extract_text_with_latex(element: &Element) -> String {
    LatexExtractor::default().extract(element)
}

pub fn join_posts<S: AsRef<str>>(texts: impl IntoIterator<Item = S>) -> String {
    let texts = texts.into_iter().collect::<Vec<_>>();
    texts
        .iter()
        .map(|text| text.as_ref())
        .collect::<Vec<&str>>()
        .join(POST_SEPARATOR)
}

pub mod aops;
pub mod dom;
pub mod extract;
pub mod gemini;
pub mod problem;

pub use dom::{DocumentNode, Element};
pub use extract::{extract_text_with_latex, join_posts, ClassMatch, LatexExtractor};

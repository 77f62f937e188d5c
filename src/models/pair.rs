//! Page pairing for book presentation.

use serde::{Deserialize, Serialize};

/// Logical index of a leaf within a book.
pub type LeafIndex = usize;

/// The (front, back) images of one leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagePair<T> {
    pub front: Option<T>,
    pub back: Option<T>,
}

impl<T> PagePair<T> {
    pub fn new(front: Option<T>, back: Option<T>) -> Self {
        Self { front, back }
    }

    /// A synthetic blank leaf.
    pub fn end_cap() -> Self {
        Self {
            front: None,
            back: None,
        }
    }

    pub fn is_end_cap(&self) -> bool {
        self.front.is_none() && self.back.is_none()
    }
}

impl<T> From<(Option<T>, Option<T>)> for PagePair<T> {
    fn from((front, back): (Option<T>, Option<T>)) -> Self {
        Self { front, back }
    }
}

/// Groups pages two by two into leaves.
///
/// A blank end cap always goes first so the first page starts on the right.
/// Another end cap is appended when the page count is even, so the last page
/// can be turned to rest on the left.
///
/// `[1, 2, 3, 4]` becomes `[(-, -), (1, 2), (3, 4), (-, -)]` and
/// `[1, 2, 3]` becomes `[(-, -), (1, 2), (3, -)]`.
pub fn build_page_pairs<T, I>(pages: I) -> Vec<PagePair<T>>
where
    I: IntoIterator<Item = T>,
{
    let mut pairs = vec![PagePair::end_cap()];

    let mut pages = pages.into_iter();
    while let Some(front) = pages.next() {
        let back = pages.next();
        pairs.push(PagePair::new(Some(front), back));
    }

    if pairs.last().map_or(false, |pair| pair.back.is_some()) {
        pairs.push(PagePair::end_cap());
    }

    pairs
}

use crate::model::Page;

const MIN_CONTENT_CHARS: usize = 50;

/// Shared by planning and the write-time re-check.
///
/// A page is blank when it carries fewer than 50 trimmed characters and no embedded
/// image or form object. Unreadable pages count as blank so a damaged page never
/// ends up splitting a document.
pub fn is_blank(page: &Page) -> bool {
    if page.malformed {
        return true;
    }

    if page.text.trim().chars().count() >= MIN_CONTENT_CHARS {
        return false;
    }

    !page.has_graphics
}

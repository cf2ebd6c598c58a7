//! Page-level access to scan PDFs via lopdf.

use std::path::Path;

use anyhow::{Context, Result};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{info, warn};

use crate::error::ScanFailure;
use crate::model::Page;
use crate::pipeline::{PageStore, duplex_order};

#[cfg(test)]
pub(crate) mod fixtures;
#[cfg(test)]
mod tests;

const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];
const MAX_TREE_DEPTH: usize = 64;

/// A loaded scan. Pages are never mutated in place; selections are written to new files.
#[derive(Debug, Clone)]
pub struct ScanDocument {
    inner: Document,
    page_ids: Vec<ObjectId>,
}

impl ScanDocument {
    pub fn load(path: &Path) -> Result<Self> {
        let inner = Document::load(path).map_err(|err| ScanFailure::MalformedInput {
            message: format!("{}: {err}", path.display()),
        })?;

        let document = Self::from_document(inner);
        info!(path = %path.display(), pages = document.page_count(), "loaded scan");
        Ok(document)
    }

    pub fn from_document(inner: Document) -> Self {
        let page_ids = inner.get_pages().into_values().collect();
        Self { inner, page_ids }
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    pub fn pages(&self) -> Vec<Page> {
        (0..self.page_count())
            .filter_map(|index| self.read_page(index))
            .collect()
    }

    /// Duplex merge of a front-side scan and a back-side scan of the flipped stack.
    pub fn interleave(front: ScanDocument, back: ScanDocument) -> Result<ScanDocument> {
        let ScanDocument {
            inner: mut merged,
            page_ids: front_ids,
        } = front;
        let mut back_document = back.inner;

        if front_ids.len() != back.page_ids.len() {
            warn!(
                fronts = front_ids.len(),
                backs = back.page_ids.len(),
                "front/back page counts differ; unpaired pages are appended"
            );
        }

        back_document.renumber_objects_with(merged.max_id + 1);
        let back_ids = back_document.get_pages().into_values().collect::<Vec<ObjectId>>();
        for page_id in &back_ids {
            flatten_inherited(&mut back_document, *page_id)
                .context("failed to prepare back-side page")?;
        }

        let back_root = back_document
            .trailer
            .get(b"Root")
            .and_then(Object::as_reference)
            .ok();
        merged.max_id = merged.max_id.max(back_document.max_id);
        for (id, object) in back_document.objects {
            if Some(id) != back_root {
                merged.objects.insert(id, object);
            }
        }

        let order = duplex_order(&front_ids, &back_ids);
        rebuild_page_tree(&mut merged, &order)?;
        merged.renumber_objects();

        let document = ScanDocument::from_document(merged);
        info!(pages = document.page_count(), "merged duplex scan");
        Ok(document)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut document = self.inner.clone();
        document
            .save(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    fn read_page(&self, index: usize) -> Option<Page> {
        let page_id = *self.page_ids.get(index)?;
        let page_number = u32::try_from(index + 1).ok()?;

        let text = self.inner.extract_text(&[page_number]);
        let graphics = has_embedded_objects(&self.inner, page_id);

        match (text, graphics) {
            (Ok(text), Ok(has_graphics)) => Some(Page::new(index, text, has_graphics)),
            (Err(err), _) | (_, Err(err)) => {
                warn!(page = index, error = %err, "unreadable page treated as blank");
                Some(Page::malformed(index))
            }
        }
    }
}

impl PageStore for ScanDocument {
    fn page(&self, index: usize) -> Option<Page> {
        self.read_page(index)
    }

    fn write_pages(&self, indices: &[usize], path: &Path) -> Result<()> {
        let order = indices
            .iter()
            .map(|index| {
                self.page_ids
                    .get(*index)
                    .copied()
                    .with_context(|| format!("page {index} is out of range"))
            })
            .collect::<Result<Vec<ObjectId>>>()?;

        let mut document = self.inner.clone();
        rebuild_page_tree(&mut document, &order)?;
        document
            .save(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

/// True when the page's resources hold at least one image or form XObject.
fn has_embedded_objects(document: &Document, page_id: ObjectId) -> lopdf::Result<bool> {
    let Some(resources) = inherited_attribute(document, page_id, b"Resources")? else {
        return Ok(false);
    };
    let resources = resolve(document, resources)?.as_dict()?;

    let Ok(xobjects) = resources.get(b"XObject") else {
        return Ok(false);
    };
    let xobjects = resolve(document, xobjects)?.as_dict()?;
    Ok(!xobjects.is_empty())
}

fn resolve<'a>(document: &'a Document, object: &'a Object) -> lopdf::Result<&'a Object> {
    match object {
        Object::Reference(id) => document.get_object(*id),
        other => Ok(other),
    }
}

/// Looks up `key` on the page, then up the `/Parent` chain.
fn inherited_attribute<'a>(
    document: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> lopdf::Result<Option<&'a Object>> {
    let mut current = page_id;
    for _ in 0..MAX_TREE_DEPTH {
        let node = document.get_dictionary(current)?;
        if let Ok(value) = node.get(key) {
            return Ok(Some(value));
        }

        match node.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => current = parent,
            Err(_) => return Ok(None),
        }
    }
    Ok(None)
}

/// Copies inherited attributes onto the page so it renders the same under a new parent.
fn flatten_inherited(document: &mut Document, page_id: ObjectId) -> lopdf::Result<()> {
    let mut inherited = Vec::<(&[u8], Object)>::new();
    {
        let page = document.get_dictionary(page_id)?;
        for key in INHERITABLE_KEYS {
            if page.has(key) {
                continue;
            }
            if let Some(value) = inherited_attribute(document, page_id, key)? {
                inherited.push((key, value.clone()));
            }
        }
    }

    let page = document.get_object_mut(page_id)?.as_dict_mut()?;
    for (key, value) in inherited {
        page.set(key.to_vec(), value);
    }
    Ok(())
}

fn root_pages_id(document: &Document) -> lopdf::Result<ObjectId> {
    let root_id = document.trailer.get(b"Root")?.as_reference()?;
    let catalog: &Dictionary = document.get_dictionary(root_id)?;
    catalog.get(b"Pages")?.as_reference()
}

/// Makes `order` the complete, flat page list of `document` and drops everything unreachable.
fn rebuild_page_tree(document: &mut Document, order: &[ObjectId]) -> Result<()> {
    let pages_id = root_pages_id(document).context("PDF has no page tree root")?;

    for page_id in order {
        flatten_inherited(document, *page_id).context("failed to flatten page attributes")?;
    }
    for page_id in order {
        document
            .get_object_mut(*page_id)
            .and_then(Object::as_dict_mut)
            .context("page object is not a dictionary")?
            .set("Parent", pages_id);
    }

    let pages = document
        .get_object_mut(pages_id)
        .and_then(Object::as_dict_mut)
        .context("page tree root is not a dictionary")?;
    pages.set(
        "Kids",
        order
            .iter()
            .map(|page_id| Object::Reference(*page_id))
            .collect::<Vec<Object>>(),
    );
    pages.set("Count", order.len() as i64);

    document.prune_objects();
    Ok(())
}

//! Page copying between documents via lopdf
//!
//! A copied page takes every object it references along with it, except
//! the `/Parent` back-links into the source page tree and any other page
//! of the source. Link annotations that jump to a page left behind are
//! dropped. Attributes the page inherited from the tree are written onto
//! the page itself before it is re-parented under the destination's root
//! `Pages` node.

use std::collections::BTreeSet;
use std::path::Path;

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};

use super::error::{PdfError, PdfResult};

/// Page attributes a page may inherit from its ancestors
const INHERITABLE: &[&[u8]] = &[b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Guard against cyclic `/Parent` chains in damaged files
const MAX_TREE_DEPTH: usize = 64;

/// Build a new document holding only page `page` (1-based) of `source`
pub fn extract_page(source: &Path, page: usize) -> PdfResult<Vec<u8>> {
    let mut src = Document::load(source)?;
    let mut out = empty_document();
    graft_page(&mut out, &mut src, page)?;
    save_to_vec(&mut out)
}

/// Append page `page` of `source` to the end of `target`, in memory.
///
/// Returns the serialized target and its new page count. The file at
/// `target` is not touched.
pub fn append_page(source: &Path, page: usize, target: &Path) -> PdfResult<(Vec<u8>, usize)> {
    let mut src = Document::load(source)?;
    let mut dest = Document::load(target)?;
    graft_page(&mut dest, &mut src, page)?;

    let count = dest.get_pages().len();
    let bytes = save_to_vec(&mut dest)?;
    Ok((bytes, count))
}

fn empty_document() -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => Object::Array(Vec::new()),
            "Count" => Object::Integer(0),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc
}

fn save_to_vec(doc: &mut Document) -> PdfResult<Vec<u8>> {
    let mut buf = Vec::new();
    doc.save_to(&mut buf)?;
    Ok(buf)
}

fn pages_root(doc: &Document) -> PdfResult<ObjectId> {
    doc.catalog()?
        .get(b"Pages")
        .and_then(|p| p.as_reference())
        .map_err(|_| PdfError::Malformed("catalog has no page tree".to_string()))
}

fn graft_page(dest: &mut Document, src: &mut Document, page: usize) -> PdfResult<()> {
    let count = src.get_pages().len();
    if page < 1 || page > count {
        return Err(PdfError::PageOutOfRange { page, count });
    }

    // Move the source id space above the destination's so objects can be
    // inserted as-is.
    src.renumber_objects_with(dest.max_id + 1);

    let page_id = src
        .get_pages()
        .get(&(page as u32))
        .copied()
        .ok_or_else(|| PdfError::Malformed(format!("page {} vanished after renumbering", page)))?;

    let mut page_dict = src.get_dictionary(page_id)?.clone();
    for key in INHERITABLE {
        if !page_dict.has(key) {
            if let Some(value) = inherited_attribute(src, page_id, key) {
                page_dict.set(key.to_vec(), value);
            }
        }
    }

    drop_outbound_links(src, &mut page_dict, page_id);

    let dest_pages_id = pages_root(dest)?;
    page_dict.set("Parent", Object::Reference(dest_pages_id));

    let mut needed = BTreeSet::new();
    collect_references(src, &Object::Dictionary(page_dict.clone()), page_id, &mut needed);
    needed.remove(&page_id);

    for id in needed {
        if let Ok(object) = src.get_object(id) {
            dest.objects.insert(id, object.clone());
        }
    }
    dest.objects.insert(page_id, Object::Dictionary(page_dict));
    dest.max_id = dest.max_id.max(src.max_id);

    let pages = dest.get_object_mut(dest_pages_id)?.as_dict_mut()?;
    pages
        .get_mut(b"Kids")?
        .as_array_mut()?
        .push(Object::Reference(page_id));
    let total = pages.get(b"Count").and_then(|c| c.as_i64()).unwrap_or(0);
    pages.set("Count", Object::Integer(total + 1));

    Ok(())
}

fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = parent_of(doc.get_dictionary(page_id).ok()?);

    for _ in 0..MAX_TREE_DEPTH {
        let node = doc.get_dictionary(current?).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        current = parent_of(node);
    }

    None
}

fn parent_of(node: &Dictionary) -> Option<ObjectId> {
    node.get(b"Parent").and_then(|p| p.as_reference()).ok()
}

/// Remove link annotations whose destination is a page other than
/// `page_id`. Named destinations are kept; they resolve through the
/// catalog, not through a page reference.
fn drop_outbound_links(doc: &Document, page_dict: &mut Dictionary, page_id: ObjectId) {
    let annots = match page_dict.get(b"Annots") {
        Ok(annots) => resolve(doc, annots).and_then(|a| a.as_array().ok()).cloned(),
        Err(_) => return,
    };
    let Some(annots) = annots else {
        page_dict.remove(b"Annots");
        return;
    };

    let kept: Vec<Object> = annots
        .into_iter()
        .filter(|annot| match link_target(doc, annot) {
            Some(target) => target == page_id,
            None => true,
        })
        .collect();

    if kept.is_empty() {
        page_dict.remove(b"Annots");
    } else {
        page_dict.set("Annots", Object::Array(kept));
    }
}

/// Page an annotation jumps to through `/Dest` or a `/GoTo` action
fn link_target(doc: &Document, annot: &Object) -> Option<ObjectId> {
    let annot = resolve(doc, annot)?.as_dict().ok()?;

    let dest = match annot.get(b"Dest") {
        Ok(dest) => dest,
        Err(_) => {
            let action = resolve(doc, annot.get(b"A").ok()?)?.as_dict().ok()?;
            if action.get(b"S").and_then(|s| s.as_name()).ok()? != b"GoTo" {
                return None;
            }
            action.get(b"D").ok()?
        }
    };

    match resolve(doc, dest)? {
        Object::Array(items) => items.first()?.as_reference().ok(),
        _ => None,
    }
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn is_page(object: &Object) -> bool {
    object
        .as_dict()
        .and_then(|d| d.get(b"Type"))
        .and_then(|t| t.as_name())
        .map(|name| name == b"Page")
        .unwrap_or(false)
}

/// Collect every object id reachable from `root`, not following `/Parent`
/// and not entering any page other than `keep_page`
fn collect_references(
    doc: &Document,
    root: &Object,
    keep_page: ObjectId,
    seen: &mut BTreeSet<ObjectId>,
) {
    let mut stack = Vec::new();
    push_references(root, &mut stack);

    while let Some(id) = stack.pop() {
        if seen.contains(&id) {
            continue;
        }
        let Ok(object) = doc.get_object(id) else {
            continue;
        };
        if id != keep_page && is_page(object) {
            continue;
        }
        seen.insert(id);
        push_references(object, &mut stack);
    }
}

fn push_references(object: &Object, stack: &mut Vec<ObjectId>) {
    match object {
        Object::Reference(id) => stack.push(*id),
        Object::Array(items) => {
            for item in items {
                push_references(item, stack);
            }
        }
        Object::Dictionary(dict) => push_dictionary_references(dict, stack),
        Object::Stream(stream) => push_dictionary_references(&stream.dict, stack),
        _ => {}
    }
}

fn push_dictionary_references(dict: &Dictionary, stack: &mut Vec<ObjectId>) {
    for (key, value) in dict.iter() {
        if key.as_slice() == b"Parent" {
            continue;
        }
        push_references(value, stack);
    }
}

//! Generated PDF documents for tests

use std::path::{Path, PathBuf};

use lopdf::{dictionary, Document, Object, Stream};

/// A `pages`-page document whose page `n` shows the text `Page n`.
///
/// `MediaBox` (200x300 points) and `Resources` live on the root `Pages`
/// node, so every page inherits them.
pub fn pdf_bytes(pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => Object::Reference(font_id) },
    });

    let mut kids = Vec::with_capacity(pages);
    for n in 1..=pages {
        let content = format!("BT /F1 24 Tf 40 150 Td (Page {}) Tj ET", n);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => Object::Array(kids),
            "Count" => Object::Integer(pages as i64),
            "Resources" => Object::Reference(resources_id),
            "MediaBox" => Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(200),
                Object::Integer(300),
            ]),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("serialize fixture PDF");
    buf
}

/// Write a generated document to `dir/name`
pub fn write_pdf(dir: &Path, name: &str, pages: usize) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, pdf_bytes(pages)).expect("write fixture PDF");
    path
}

/// `pdf_bytes(3)` with three link annotations on page 1: a `/Dest` to
/// page 2, a `/GoTo` action to page 3 and a `/Dest` back to page 1
pub fn linked_pdf_bytes() -> Vec<u8> {
    let mut doc = Document::load_mem(&pdf_bytes(3)).expect("parse fixture PDF");
    let pages = doc.get_pages();
    let (first, second, third) = (pages[&1], pages[&2], pages[&3]);

    let fit = |page| Object::Array(vec![Object::Reference(page), Object::Name(b"Fit".to_vec())]);
    let rect = Object::Array(vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(50),
        Object::Integer(20),
    ]);
    let annots = vec![
        Object::Dictionary(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Link",
            "Rect" => rect.clone(),
            "Dest" => fit(second),
        }),
        Object::Dictionary(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Link",
            "Rect" => rect.clone(),
            "A" => dictionary! { "S" => "GoTo", "D" => fit(third) },
        }),
        Object::Dictionary(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Link",
            "Rect" => rect,
            "Dest" => fit(first),
        }),
    ];

    doc.get_object_mut(first)
        .and_then(Object::as_dict_mut)
        .expect("first page dictionary")
        .set("Annots", Object::Array(annots));

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("serialize fixture PDF");
    buf
}

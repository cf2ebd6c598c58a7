use lopdf::{Document, Object, ObjectId, dictionary};

use super::fixtures::{build_scan, build_text_scan};
use super::*;
use crate::model::PageIndicator;
use crate::pipeline::{IndicatorParser, is_blank};

fn page_widths(scan: &ScanDocument) -> Vec<i64> {
    scan.page_ids
        .iter()
        .map(|page_id| {
            let media_box = inherited_attribute(&scan.inner, *page_id, b"MediaBox")
                .expect("page tree should be readable")
                .expect("page should have a media box");
            media_box.as_array().expect("media box should be an array")[2]
                .as_i64()
                .expect("width should be an integer")
        })
        .collect()
}

#[test]
fn pages_report_embedded_images_and_empty_text_layers() {
    let with_image = ScanDocument::from_document(build_scan(&[100], true));
    let without_image = ScanDocument::from_document(build_scan(&[200], false));

    let image_pages = with_image.pages();
    assert_eq!(image_pages.len(), 1);
    assert!(image_pages[0].has_graphics);
    assert!(!image_pages[0].malformed);
    assert!(!is_blank(&image_pages[0]));

    let bare_pages = without_image.pages();
    assert!(!bare_pages[0].has_graphics);
    assert!(bare_pages[0].text.trim().is_empty());
    assert!(is_blank(&bare_pages[0]));
}

#[test]
fn text_layer_is_extracted_line_by_line() {
    let scan = ScanDocument::from_document(build_text_scan(&[
        "UBS Switzerland AG\nPostfach, 8098 Zürich\nKontoauszug vom 15.03.2024\nSeite 1 von 3",
        "Seite 2",
    ]));

    let pages = scan.pages();
    assert_eq!(pages.len(), 2);

    let letter = &pages[0];
    assert!(!letter.has_graphics);
    assert!(!letter.malformed);
    assert!(letter.text.starts_with("UBS Switzerland AG\nPostfach"));
    assert!(letter.text.contains("Kontoauszug vom 15.03.2024\nSeite 1 von 3"));
    assert!(letter.text.trim().chars().count() >= 50);
    assert!(!is_blank(letter));

    let parser = IndicatorParser::new().expect("indicator parser should build");
    assert_eq!(
        parser.parse(&letter.text),
        Some(PageIndicator {
            number: 1,
            total: 3
        })
    );

    assert_eq!(pages[1].text.trim(), "Seite 2");
    assert!(is_blank(&pages[1]));
}

#[test]
fn interleave_orders_pages_like_a_flipped_stack() {
    let front = ScanDocument::from_document(build_scan(&[100, 101, 102], true));
    let back = ScanDocument::from_document(build_scan(&[200, 201, 202], true));

    let merged = ScanDocument::interleave(front, back).expect("duplex merge should succeed");

    assert_eq!(page_widths(&merged), vec![100, 202, 101, 201, 102, 200]);
    assert!(merged.pages().iter().all(|page| page.has_graphics));
}

#[test]
fn interleave_appends_unpaired_front_pages_in_scan_order() {
    let front = ScanDocument::from_document(build_scan(&[100, 101, 102], false));
    let back = ScanDocument::from_document(build_scan(&[200], false));

    let merged = ScanDocument::interleave(front, back).expect("duplex merge should succeed");

    assert_eq!(page_widths(&merged), vec![100, 200, 101, 102]);
}

#[test]
fn write_pages_writes_selection_in_requested_order() {
    let output = tempfile::tempdir().expect("tempdir should be created");
    let path = output.path().join("selection.pdf");
    let scan = ScanDocument::from_document(build_scan(&[100, 101, 102], true));

    scan.write_pages(&[2, 0], &path)
        .expect("selection should be written");

    let written = ScanDocument::load(&path).expect("written PDF should load");
    assert_eq!(page_widths(&written), vec![102, 100]);
    assert!(written.pages().iter().all(|page| page.has_graphics));
    assert_eq!(scan.page_count(), 3);
}

#[test]
fn write_pages_rejects_out_of_range_indices() {
    let output = tempfile::tempdir().expect("tempdir should be created");
    let scan = ScanDocument::from_document(build_scan(&[100], false));

    let result = scan.write_pages(&[3], &output.path().join("missing.pdf"));
    assert!(result.is_err());
}

#[test]
fn write_pages_copies_inherited_media_box_onto_pages() {
    let mut document = Document::with_version("1.5");
    let pages_id: ObjectId = document.new_object_id();
    let page_id = document.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
    });
    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::from(page_id)],
            "Count" => 1i64,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    document.trailer.set("Root", catalog_id);

    let output = tempfile::tempdir().expect("tempdir should be created");
    let path = output.path().join("inherited.pdf");
    ScanDocument::from_document(document)
        .write_pages(&[0], &path)
        .expect("page should be written");

    let written = ScanDocument::load(&path).expect("written PDF should load");
    let page = written
        .inner
        .get_dictionary(written.page_ids[0])
        .expect("page should be a dictionary");
    assert!(page.has(b"MediaBox"));
    assert_eq!(page_widths(&written), vec![595]);
}

#[test]
fn unreadable_resources_mark_page_as_malformed_and_blank() {
    let mut document = build_scan(&[100], false);
    let page_id = document.get_pages()[&1];
    document
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .expect("page should be a dictionary")
        .set("Resources", Object::Reference((9_999, 0)));

    let pages = ScanDocument::from_document(document).pages();
    assert_eq!(pages.len(), 1);
    assert!(pages[0].malformed);
    assert!(is_blank(&pages[0]));
}

#[test]
fn load_reports_malformed_input_for_non_pdf_files() {
    let output = tempfile::tempdir().expect("tempdir should be created");
    let path = output.path().join("not-a-scan.pdf");
    std::fs::write(&path, b"plain text").expect("file should be written");

    let err = ScanDocument::load(&path).expect_err("garbage should not load");
    let failure = ScanFailure::from_error(err);
    assert_eq!(failure.code(), "malformed_input");
}

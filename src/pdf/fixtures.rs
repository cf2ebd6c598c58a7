use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, StringFormat, dictionary};

const TEXT_ENCODING: &str = "WinAnsiEncoding";
const LINE_HEIGHT: i64 = 14;

/// One page per width; the MediaBox width doubles as a page marker.
pub fn build_scan(widths: &[i64], with_image: bool) -> Document {
    let pages = widths
        .iter()
        .map(|width| (*width, with_image))
        .collect::<Vec<(i64, bool)>>();
    build_scan_pages(&pages)
}

/// Like [`build_scan`], with the image flag chosen per page. Pages carry no text layer.
pub fn build_scan_pages(pages: &[(i64, bool)]) -> Document {
    let mut document = Document::with_version("1.5");
    let pages_id: ObjectId = document.new_object_id();

    let image_id = document.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 1,
            "Height" => 1,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
        },
        vec![0],
    ));

    let mut kids = Vec::<Object>::new();
    for (width, with_image) in pages {
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), (*width).into(), 842.into()],
        };
        if *with_image {
            page.set(
                "Resources",
                dictionary! { "XObject" => dictionary! { "Im1" => image_id } },
            );
        }
        kids.push(document.add_object(page).into());
    }

    finish_page_tree(&mut document, pages_id, kids);
    document
}

/// OCR'd scan: one page per entry, each line set as its own Helvetica text object.
pub fn build_text_scan(texts: &[&str]) -> Document {
    let mut document = Document::with_version("1.5");
    let pages_id: ObjectId = document.new_object_id();

    let font_id = document.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => TEXT_ENCODING,
    });

    let mut kids = Vec::<Object>::new();
    for text in texts {
        let mut operations = Vec::<Operation>::new();
        for (line_number, line) in text.lines().enumerate() {
            let baseline = 800 - LINE_HEIGHT * line_number as i64;
            let encoded = Document::encode_text(Some(TEXT_ENCODING), line);
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 11.into()]));
            operations.push(Operation::new("Td", vec![72.into(), baseline.into()]));
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(encoded, StringFormat::Literal)],
            ));
            operations.push(Operation::new("ET", vec![]));
        }

        let content = Content { operations }
            .encode()
            .expect("content stream should encode");
        let content_id = document.add_object(Stream::new(dictionary! {}, content));

        let page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        };
        kids.push(document.add_object(page).into());
    }

    finish_page_tree(&mut document, pages_id, kids);
    document
}

fn finish_page_tree(document: &mut Document, pages_id: ObjectId, kids: Vec<Object>) {
    let count = kids.len() as i64;
    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    document.trailer.set("Root", catalog_id);
}

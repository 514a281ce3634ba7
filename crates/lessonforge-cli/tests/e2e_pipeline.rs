//! End-to-end pipeline tests: mock provider → engine → document assembly.
//!
//! These exercise the whole generation chain without a network, using the
//! same composition the CLI commands perform.

use std::io::{Cursor, Read, Write};
use std::sync::Arc;

use lessonforge_core::engine::{
    GenerateOptions, Generator, SlidesRequest, TestRequest,
};
use lessonforge_core::error::ToolkitError;
use lessonforge_core::gems::GemStore;
use lessonforge_core::ledger::UsageLedger;
use lessonforge_docs::docx::assemble_test;
use lessonforge_docs::render_deck;
use lessonforge_providers::MockProvider;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

/// Write a minimal template `.docx` with the given body XML.
fn write_template(path: &std::path::Path, body: &str) {
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}<w:sectPr/></w:body></w:document>"#
    );

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, content) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", RELS),
        ("word/document.xml", document.as_str()),
    ] {
        writer.start_file(name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    std::fs::write(path, writer.finish().unwrap().into_inner()).unwrap();
}

fn read_document_xml(bytes: &[u8]) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name("word/document.xml").unwrap();
    let mut text = String::new();
    file.read_to_string(&mut text).unwrap();
    text
}

fn make_generator(dir: &tempfile::TempDir, response: &str) -> Generator {
    let gems = GemStore::load(dir.path().join("gems.json")).unwrap();
    let ledger = UsageLedger::load(dir.path().join("usage.json")).unwrap();
    Generator::new(
        Arc::new(MockProvider::with_fixed_response(response)),
        gems,
        ledger,
        GenerateOptions::default(),
    )
}

fn test_request() -> TestRequest {
    TestRequest {
        subject_title: "Year 7 Science".into(),
        unit_title: "Unit 2 SAC Outcome 1".into(),
        year: "2026".into(),
        topic: "Cells".into(),
        rubric: "Criterion 1: defines key terms.".into(),
        num_mcq: 1,
        marks_mcq: 1,
        num_saq: 1,
        marks_saq: 3,
    }
}

#[tokio::test]
async fn e2e_test_paper() {
    let dir = tempfile::tempdir().unwrap();
    let template_path = dir.path().join("test_template.docx");
    write_template(
        &template_path,
        "<w:p><w:r><w:t>{{SUBJECT_TITLE}} {{YEAR}}</w:t></w:r></w:p>\
         <w:p><w:r><w:t>{{MCQ_SECTION}}</w:t></w:r></w:p>\
         <w:p><w:r><w:t>{{SAQ_SECTION}}</w:t></w:r></w:p>",
    );

    let response = r#"Here is your test:
{"mcqs": [{"question": "What does the cell membrane do?",
           "options": ["Controls entry", "Makes energy", "Stores DNA", "Builds protein"]}],
 "saqs": [{"question": "Explain diffusion.", "marks": 3}]}"#;
    let mut generator = make_generator(&dir, response);

    let req = test_request();
    let (set, warnings) = generator.generate_test(&req).await.unwrap();
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");

    let assembled = assemble_test(&template_path, &req, &set).unwrap();
    assert!(assembled.mcq_success);
    assert!(assembled.saq_success);

    let xml = read_document_xml(&assembled.bytes);
    assert!(xml.contains("Year 7 Science 2026"));
    assert!(xml.contains("What does the cell membrane do?"));
    assert!(xml.contains(">A. Controls entry<"));
    assert!(xml.contains("Explain diffusion."));
    // 3 marks → 9 ruled answer lines, one per paragraph
    assert_eq!(xml.matches(">____").count(), 9);

    assert_eq!(generator.ledger().count("gemini-2.5-flash"), 1);
}

#[tokio::test]
async fn e2e_anchorless_template_degrades_gracefully() {
    let dir = tempfile::tempdir().unwrap();
    let template_path = dir.path().join("test_template.docx");
    write_template(
        &template_path,
        "<w:p><w:r><w:t>{{MCQ_SECTION}}</w:t></w:r></w:p>",
    );

    let response = r#"{"mcqs": [{"question": "2+2?", "options": ["A", "B", "C", "D"]}], "saqs": []}"#;
    let mut generator = make_generator(&dir, response);

    let mut req = test_request();
    req.num_saq = 0;
    req.marks_saq = 0;

    let (set, _) = generator.generate_test(&req).await.unwrap();
    let assembled = assemble_test(&template_path, &req, &set).unwrap();

    assert!(assembled.mcq_success);
    assert!(!assembled.saq_success, "no SAQ anchor in this template");
    let xml = read_document_xml(&assembled.bytes);
    assert!(xml.contains("Question 1: "));
    assert!(xml.contains(">2+2?<"));
}

#[tokio::test]
async fn e2e_missing_template_is_typed_error() {
    let dir = tempfile::tempdir().unwrap();
    let response = r#"{"mcqs": [], "saqs": []}"#;
    let mut generator = make_generator(&dir, response);

    let req = test_request();
    let (set, _) = generator.generate_test(&req).await.unwrap();

    let err = assemble_test(&dir.path().join("absent.docx"), &req, &set).unwrap_err();
    assert!(matches!(err, ToolkitError::MissingTemplateAsset { .. }));
}

#[tokio::test]
async fn e2e_slide_deck() {
    let dir = tempfile::tempdir().unwrap();
    let response = r#"{"slides": [
        {"title": "Cell structure", "body": ["Membrane", "Nucleus"]},
        {"title": "Transport", "body": ["Diffusion", "Osmosis", "Active transport"]}
    ]}"#;
    let mut generator = make_generator(&dir, response);

    let deck = generator
        .generate_slides(&SlidesRequest {
            source_text: "Chapter 3: cells...".into(),
        })
        .await
        .unwrap();
    assert_eq!(deck.slides.len(), 2);

    let bytes = render_deck(&deck).unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
    assert!(archive.by_name("ppt/slides/slide2.xml").is_ok());

    let mut slide1 = String::new();
    archive
        .by_name("ppt/slides/slide1.xml")
        .unwrap()
        .read_to_string(&mut slide1)
        .unwrap();
    assert!(slide1.contains("Cell structure"));
    assert!(slide1.contains("Membrane"));
}

#[tokio::test]
async fn e2e_malformed_response_spends_quota() {
    let dir = tempfile::tempdir().unwrap();
    let mut generator = make_generator(&dir, "Sorry, I cannot help with that.");

    let err = generator.generate_test(&test_request()).await.unwrap_err();
    assert!(matches!(err, ToolkitError::MalformedResponse { .. }));

    // The increment happened before parsing and is not rolled back.
    assert_eq!(generator.ledger().count("gemini-2.5-flash"), 1);
}

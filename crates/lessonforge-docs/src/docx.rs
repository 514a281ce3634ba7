//! `.docx` template engine.
//!
//! A test paper template is an ordinary Word document carrying literal
//! `{{NAME}}` placeholders plus two section anchors, `{{MCQ_SECTION}}` and
//! `{{SAQ_SECTION}}`. Assembly is two passes over `word/document.xml`:
//! placeholder substitution (paragraphs rebuilt as a single run, so keys
//! split across runs still match), then section injection at the anchors.
//!
//! The scan works on paragraph spans of the raw XML string; untouched
//! paragraphs are copied through byte-identical.

use std::io::{Cursor, Read, Write};
use std::ops::Range;
use std::path::Path;

use lessonforge_core::engine::TestRequest;
use lessonforge_core::error::ToolkitError;
use lessonforge_core::model::{McqItem, QuestionSet, SaqItem};

const DOCUMENT_PART: &str = "word/document.xml";

/// Anchor paragraph text that marks where MCQs are injected.
pub const MCQ_ANCHOR: &str = "{{MCQ_SECTION}}";
/// Anchor paragraph text that marks where SAQs are injected.
pub const SAQ_ANCHOR: &str = "{{SAQ_SECTION}}";

const MCQ_HEADER: &str = "Section A: Multiple-Choice Questions";
const MCQ_INSTRUCTION: &str = "Circle the letter of the correct answer for each question.";
const SAQ_HEADER: &str = "Section B: Short-Answer Questions";
const SAQ_INSTRUCTION: &str = "Answer the following questions in the space provided.";

/// One ruled answer line. An SAQ worth M marks gets 3×M of these.
const ANSWER_RULE: &str = "_________________________________________________";
const RULE_LINES_PER_MARK: usize = 3;

/// Escape a string for safe XML insertion.
fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// A template loaded into memory: the zip package entries plus the main
/// document part as a working string. The file on disk is never mutated.
#[derive(Debug)]
pub struct DocxTemplate {
    entries: Vec<(String, Vec<u8>)>,
    document: String,
}

impl DocxTemplate {
    /// Read a template from disk. An absent file is `MissingTemplateAsset`.
    pub fn open(path: &Path) -> Result<Self, ToolkitError> {
        if !path.exists() {
            return Err(ToolkitError::MissingTemplateAsset {
                path: path.to_path_buf(),
            });
        }
        let data = std::fs::read(path).map_err(|e| ToolkitError::BadTemplateAsset {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_bytes(&data, path)
    }

    /// Parse a template already in memory (`path` only labels errors).
    pub fn from_bytes(data: &[u8], path: &Path) -> Result<Self, ToolkitError> {
        let bad = |reason: String| ToolkitError::BadTemplateAsset {
            path: path.to_path_buf(),
            reason,
        };

        let mut archive =
            zip::ZipArchive::new(Cursor::new(data)).map_err(|e| bad(e.to_string()))?;

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i).map_err(|e| bad(e.to_string()))?;
            if file.is_dir() {
                continue;
            }
            let mut bytes = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut bytes).map_err(|e| bad(e.to_string()))?;
            entries.push((file.name().to_string(), bytes));
        }

        let document = entries
            .iter()
            .find(|(name, _)| name == DOCUMENT_PART)
            .map(|(_, bytes)| String::from_utf8_lossy(bytes).into_owned())
            .ok_or_else(|| bad(format!("no {DOCUMENT_PART} part")))?;

        Ok(Self { entries, document })
    }

    /// Pass 1: replace literal placeholder keys in every paragraph,
    /// including paragraphs nested in table cells.
    ///
    /// A paragraph containing any key is rebuilt as a single run holding
    /// the substituted text (Word splits placeholders across runs at
    /// whim). Body paragraphs that held a key are re-centered for the
    /// title page; table-cell paragraphs keep their alignment.
    pub fn substitute(&mut self, replacements: &[(String, String)]) {
        let tables = table_regions(&self.document);
        let mut edits: Vec<(Range<usize>, String)> = Vec::new();

        for span in paragraph_spans(&self.document) {
            let xml = &self.document[span.clone()];
            let text = paragraph_text(xml);
            if !replacements.iter().any(|(key, _)| text.contains(key)) {
                continue;
            }

            let mut new_text = text;
            for (key, value) in replacements {
                new_text = new_text.replace(key, value);
            }

            let in_table = tables.iter().any(|region| region.contains(&span.start));
            let rebuilt = rebuild_paragraph(extract_ppr(xml).as_deref(), &new_text, !in_table);
            edits.push((span, rebuilt));
        }

        // Splice back-to-front so earlier offsets stay valid.
        for (range, xml) in edits.into_iter().rev() {
            self.document.replace_range(range, &xml);
        }
    }

    /// Pass 2a: inject the MCQ section at its anchor.
    ///
    /// Returns false when the anchor is absent; the section is then
    /// silently omitted and the caller decides how loudly to warn.
    pub fn inject_mcqs(&mut self, mcqs: &[McqItem]) -> bool {
        self.inject_at_anchor(MCQ_ANCHOR, &mcq_section_xml(mcqs))
    }

    /// Pass 2b: inject the SAQ section at its anchor.
    pub fn inject_saqs(&mut self, saqs: &[SaqItem]) -> bool {
        self.inject_at_anchor(SAQ_ANCHOR, &saq_section_xml(saqs))
    }

    fn inject_at_anchor(&mut self, anchor: &str, section_xml: &str) -> bool {
        // First occurrence only; the scan stops at the first match.
        for span in paragraph_spans(&self.document) {
            if paragraph_text(&self.document[span.clone()]).contains(anchor) {
                self.document.replace_range(span, section_xml);
                return true;
            }
        }
        false
    }

    /// Repack the document package into an in-memory `.docx` buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ToolkitError> {
        write_package(
            self.entries
                .iter()
                .map(|(name, bytes)| {
                    if name == DOCUMENT_PART {
                        (name.as_str(), self.document.as_bytes())
                    } else {
                        (name.as_str(), bytes.as_slice())
                    }
                }),
        )
    }

    /// The working copy of `word/document.xml`.
    pub fn document_xml(&self) -> &str {
        &self.document
    }
}

/// A fully assembled test paper plus the per-section outcome flags.
#[derive(Debug)]
pub struct AssembledTest {
    pub bytes: Vec<u8>,
    pub mcq_success: bool,
    pub saq_success: bool,
}

/// Run both assembly passes over the template at `template_path`.
pub fn assemble_test(
    template_path: &Path,
    req: &TestRequest,
    set: &QuestionSet,
) -> Result<AssembledTest, ToolkitError> {
    let mut template = DocxTemplate::open(template_path)?;

    template.substitute(&title_replacements(req));
    let mcq_success = template.inject_mcqs(&set.mcqs);
    let saq_success = template.inject_saqs(&set.saqs);
    if !mcq_success {
        tracing::warn!("MCQ_SECTION anchor not found in template; MCQs omitted");
    }
    if !saq_success {
        tracing::warn!("SAQ_SECTION anchor not found in template; SAQs omitted");
    }

    Ok(AssembledTest {
        bytes: template.to_bytes()?,
        mcq_success,
        saq_success,
    })
}

/// The recognized placeholder keys and their values for one request.
/// Alternate spellings absorb the template variants seen in the wild.
pub fn title_replacements(req: &TestRequest) -> Vec<(String, String)> {
    let pairs = [
        ("{{SUBJECT_TITLE}}", req.subject_title.clone()),
        ("{{SUBJECT TITLE}}", req.subject_title.clone()),
        ("{{UNIT_TITLE}}", req.unit_title.clone()),
        ("{{Unit_Title}}", req.unit_title.clone()),
        ("{{YEAR}}", req.year.clone()),
        ("{{MCQ_NUM}}", req.num_mcq.to_string()),
        ("{{MCQ_MARKS}}", req.marks_mcq.to_string()),
        ("{{SAQ_NUM}}", req.num_saq.to_string()),
        ("{{SAQ_MARKS}}", req.marks_saq.to_string()),
        ("{{TOTAL_QUESTIONS}}", req.total_questions().to_string()),
        ("{{TOTAL_MARKS}}", req.total_marks().to_string()),
    ];
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

// ---------------------------------------------------------------------------
// Paragraph scanning
// ---------------------------------------------------------------------------

/// Find the next `<{name}` open tag at or after `from`.
fn find_tag(xml: &str, from: usize, name: &str) -> Option<usize> {
    let needle = format!("<{name}");
    let mut at = from;
    while let Some(rel) = xml[at..].find(&needle) {
        let pos = at + rel;
        // Must be the whole tag name, not a prefix of a longer one.
        match xml.as_bytes().get(pos + needle.len()) {
            Some(b'>') | Some(b' ') | Some(b'/') | Some(b'\t') | Some(b'\n') | Some(b'\r') => {
                return Some(pos)
            }
            _ => at = pos + needle.len(),
        }
    }
    None
}

/// Byte span of the element opening at `start`, close tag included.
/// `w:p` and `w:pPr` do not self-nest, so the next close tag is the match.
fn element_span(xml: &str, start: usize, name: &str) -> Option<Range<usize>> {
    let gt = xml[start..].find('>')? + start;
    if xml.as_bytes()[gt - 1] == b'/' {
        return Some(start..gt + 1);
    }
    let close = format!("</{name}>");
    let end = xml[gt..].find(&close)? + gt + close.len();
    Some(start..end)
}

/// Every paragraph span in document order. Table-cell paragraphs are plain
/// `w:p` elements and fall out of the same linear scan.
fn paragraph_spans(xml: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut at = 0;
    while let Some(start) = find_tag(xml, at, "w:p") {
        match element_span(xml, start, "w:p") {
            Some(span) => {
                at = span.end;
                spans.push(span);
            }
            None => break,
        }
    }
    spans
}

/// Outermost `w:tbl` regions, depth-counted so nested tables fold in.
fn table_regions(xml: &str) -> Vec<Range<usize>> {
    const CLOSE: &str = "</w:tbl>";
    let mut regions = Vec::new();
    let mut depth = 0usize;
    let mut region_start = 0usize;
    let mut at = 0usize;

    loop {
        let open = find_tag(xml, at, "w:tbl");
        let close = xml[at..].find(CLOSE).map(|rel| at + rel);
        match (open, close) {
            (Some(o), Some(c)) if o < c => {
                if depth == 0 {
                    region_start = o;
                }
                depth += 1;
                at = o + "<w:tbl".len();
            }
            (_, Some(c)) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    regions.push(region_start..c + CLOSE.len());
                }
                at = c + CLOSE.len();
            }
            _ => break,
        }
    }
    regions
}

/// Concatenated `w:t` text of one paragraph span, entities unescaped.
fn paragraph_text(span_xml: &str) -> String {
    use quick_xml::events::Event;

    let mut reader = quick_xml::Reader::from_str(span_xml);
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"w:t" => in_text = true,
            Ok(Event::End(ref e)) if e.name().as_ref() == b"w:t" => in_text = false,
            Ok(Event::Text(e)) if in_text => {
                text.push_str(&e.unescape().unwrap_or_default());
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    text
}

/// The paragraph's `w:pPr` element, if it has one.
fn extract_ppr(span_xml: &str) -> Option<String> {
    let start = find_tag(span_xml, 0, "w:pPr")?;
    let span = element_span(span_xml, start, "w:pPr")?;
    Some(span_xml[span].to_string())
}

/// A paragraph rebuilt as a single run. `center` re-applies centered
/// alignment on top of whatever properties the paragraph already had.
fn rebuild_paragraph(ppr: Option<&str>, text: &str, center: bool) -> String {
    let props = if center {
        centered_ppr(ppr)
    } else {
        ppr.unwrap_or_default().to_string()
    };
    format!(
        "<w:p>{props}<w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
        xml_escape(text)
    )
}

fn centered_ppr(ppr: Option<&str>) -> String {
    const JC: &str = "<w:jc w:val=\"center\"/>";
    let Some(ppr) = ppr else {
        return format!("<w:pPr>{JC}</w:pPr>");
    };

    let mut props = ppr.to_string();
    if let Some(jc_start) = props.find("<w:jc") {
        if let Some(rel_end) = props[jc_start..].find("/>") {
            props.replace_range(jc_start..jc_start + rel_end + 2, "");
        }
    }
    match props.rfind("</w:pPr>") {
        Some(pos) => {
            props.insert_str(pos, JC);
            props
        }
        // Self-closing <w:pPr/>
        None => format!("<w:pPr>{JC}</w:pPr>"),
    }
}

// ---------------------------------------------------------------------------
// Section rendering
// ---------------------------------------------------------------------------

fn heading_paragraph(text: &str) -> String {
    format!(
        "<w:p><w:r><w:rPr><w:b/></w:rPr><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
        xml_escape(text)
    )
}

fn plain_paragraph(text: &str) -> String {
    format!(
        "<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
        xml_escape(text)
    )
}

/// Bold `Question N: ` index run, then the question text, then an optional
/// trailing note (mark allocation).
fn question_paragraph(number: usize, text: &str, note: Option<&str>) -> String {
    let mut xml = String::from("<w:p>");
    xml.push_str(&format!(
        "<w:r><w:rPr><w:b/></w:rPr><w:t xml:space=\"preserve\">Question {number}: </w:t></w:r>"
    ));
    xml.push_str(&format!(
        "<w:r><w:t xml:space=\"preserve\">{}</w:t></w:r>",
        xml_escape(text)
    ));
    if let Some(note) = note {
        xml.push_str(&format!(
            "<w:r><w:t xml:space=\"preserve\"> {}</w:t></w:r>",
            xml_escape(note)
        ));
    }
    xml.push_str("</w:p>");
    xml
}

fn option_letter(index: usize) -> char {
    char::from(b'A' + (index % 26) as u8)
}

fn mcq_section_xml(mcqs: &[McqItem]) -> String {
    let mut xml = String::new();
    xml.push_str(&heading_paragraph(MCQ_HEADER));
    xml.push_str(&plain_paragraph(MCQ_INSTRUCTION));
    for (i, mcq) in mcqs.iter().enumerate() {
        xml.push_str(&question_paragraph(i + 1, &mcq.question, None));
        for (j, option) in mcq.options.iter().enumerate() {
            xml.push_str(&plain_paragraph(&format!(
                "{}. {option}",
                option_letter(j)
            )));
        }
        xml.push_str("<w:p/>");
    }
    xml
}

fn saq_section_xml(saqs: &[SaqItem]) -> String {
    let mut xml = String::new();
    xml.push_str(&heading_paragraph(SAQ_HEADER));
    xml.push_str(&plain_paragraph(SAQ_INSTRUCTION));
    for (i, saq) in saqs.iter().enumerate() {
        let note = if saq.marks == 1 {
            "(1 mark)".to_string()
        } else {
            format!("({} marks)", saq.marks)
        };
        xml.push_str(&question_paragraph(i + 1, &saq.question, Some(&note)));
        for _ in 0..(saq.marks as usize * RULE_LINES_PER_MARK) {
            xml.push_str(&plain_paragraph(ANSWER_RULE));
        }
        xml.push_str("<w:p/>");
    }
    xml
}

// ---------------------------------------------------------------------------
// Package writing
// ---------------------------------------------------------------------------

/// Write zip entries into an in-memory buffer.
pub(crate) fn write_package<'a>(
    entries: impl Iterator<Item = (&'a str, &'a [u8])>,
) -> Result<Vec<u8>, ToolkitError> {
    let bad = |reason: String| ToolkitError::BadTemplateAsset {
        path: std::path::PathBuf::from("<in-memory package>"),
        reason,
    };

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    for (name, bytes) in entries {
        writer
            .start_file(name, options)
            .map_err(|e| bad(e.to_string()))?;
        writer.write_all(bytes).map_err(|e| bad(e.to_string()))?;
    }

    let cursor = writer.finish().map_err(|e| bad(e.to_string()))?;
    Ok(cursor.into_inner())
}

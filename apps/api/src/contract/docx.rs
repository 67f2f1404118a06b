//! `.docx` template filling.
//!
//! A template is an ordinary Word document whose text contains `{{name}}`
//! tags. Word often splits a tag over several runs (spell-check marks, edits),
//! so tags are matched against the concatenated text of each paragraph and the
//! replacement is written into the run where the tag starts.

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use std::ops::Range;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const TAG_OPEN: &str = "{{";
const TAG_CLOSE: &str = "}}";
const PRESERVE_TEXT_OPEN: &str = r#"<w:t xml:space="preserve">"#;
const LINE_BREAK: &str = r#"</w:t><w:br/><w:t xml:space="preserve">"#;

lazy_static! {
    // Opening or closing paragraph tag. `<w:pPr>` and friends do not match;
    // self-closing `<w:p .../>` does and is skipped when walking.
    static ref PARAGRAPH_BOUNDARY: Regex = Regex::new(r"<w:p(?:>|\s[^>]*>)|</w:p>").unwrap();
    static ref TEXT_RUN: Regex =
        Regex::new(r"(?s)(<w:t(?:>|\s[^>]*[^/>]>))(.*?)</w:t>").unwrap();
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template file not found: {0}")]
    Missing(String),

    #[error("template file could not be read: {0}")]
    Io(#[from] std::io::Error),

    #[error("template is not a valid .docx archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("template part {0} is not valid UTF-8")]
    Encoding(String),

    #[error("unclosed placeholder near \"{0}\"")]
    Unclosed(String),
}

/// A loaded template. The file is read fully on load, so nothing stays open
/// between loading and rendering.
#[derive(Debug, Clone)]
pub struct DocxTemplate {
    bytes: Vec<u8>,
}

impl DocxTemplate {
    pub async fn load(path: &Path) -> Result<Self, TemplateError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Self::from_bytes(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(TemplateError::Missing(path.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Renders the template with `values` and returns the new document.
    ///
    /// Tags without a value render as an empty string. Non-text parts of the
    /// archive are copied through unchanged.
    pub fn render(&self, values: &BTreeMap<String, String>) -> Result<Vec<u8>, TemplateError> {
        let mut archive = ZipArchive::new(Cursor::new(self.bytes.as_slice()))?;
        let mut writer = ZipWriter::new(Cursor::new(Vec::with_capacity(self.bytes.len())));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            let name = entry.name().to_string();

            if entry.is_dir() {
                writer.add_directory(name, options)?;
                continue;
            }

            let mut content = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut content)?;

            if is_text_part(&name) {
                let xml = String::from_utf8(content)
                    .map_err(|_| TemplateError::Encoding(name.clone()))?;
                content = render_part(&xml, values)?.into_bytes();
            }

            writer.start_file(name, options)?;
            writer.write_all(&content)?;
        }

        Ok(writer.finish()?.into_inner())
    }
}

/// Document body, headers and footers carry user-visible text.
fn is_text_part(name: &str) -> bool {
    name == "word/document.xml"
        || (name.ends_with(".xml")
            && (name.starts_with("word/header") || name.starts_with("word/footer")))
}

/// Fills every paragraph of one XML part.
///
/// Paragraphs nest inside text boxes and `mc:AlternateContent` fallbacks, so
/// each text run belongs to its innermost open paragraph and runs of the outer
/// paragraph on both sides of a nested one still form a single unit.
fn render_part(xml: &str, values: &BTreeMap<String, String>) -> Result<String, TemplateError> {
    let mut edits = Vec::new();
    for runs in paragraph_runs(xml) {
        render_paragraph(xml, &runs, values, &mut edits)?;
    }
    edits.sort_by_key(|edit: &Edit| edit.range.start);

    let mut out = String::with_capacity(xml.len());
    let mut last = 0;
    for edit in edits {
        out.push_str(&xml[last..edit.range.start]);
        out.push_str(&edit.text);
        last = edit.range.end;
    }
    out.push_str(&xml[last..]);
    Ok(out)
}

struct TextRun {
    open: Range<usize>,
    text: Range<usize>,
}

struct Tag {
    start: usize,
    end: usize,
    replacement: String,
}

/// Replacement for a byte range of the part.
struct Edit {
    range: Range<usize>,
    text: String,
}

/// Text runs of `xml` grouped by the innermost paragraph holding them.
/// Runs outside any paragraph are left out.
fn paragraph_runs(xml: &str) -> Vec<Vec<TextRun>> {
    let mut paragraphs: Vec<Vec<TextRun>> = Vec::new();
    let mut open: Vec<usize> = Vec::new();
    let mut boundaries = PARAGRAPH_BOUNDARY.find_iter(xml).peekable();

    for caps in TEXT_RUN.captures_iter(xml) {
        let (Some(tag), Some(text)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        while let Some(boundary) = boundaries.next_if(|b| b.start() < tag.start()) {
            match boundary.as_str() {
                "</w:p>" => {
                    open.pop();
                }
                start if start.ends_with("/>") => {}
                _ => {
                    open.push(paragraphs.len());
                    paragraphs.push(Vec::new());
                }
            }
        }
        if let Some(&current) = open.last() {
            paragraphs[current].push(TextRun {
                open: tag.range(),
                text: text.range(),
            });
        }
    }
    paragraphs
}

fn render_paragraph(
    xml: &str,
    runs: &[TextRun],
    values: &BTreeMap<String, String>,
    edits: &mut Vec<Edit>,
) -> Result<(), TemplateError> {
    let mut full = String::new();
    let mut offsets = Vec::with_capacity(runs.len());
    for run in runs {
        offsets.push(full.len());
        full.push_str(&xml[run.text.clone()]);
    }

    if !full.contains(TAG_OPEN) {
        return Ok(());
    }

    let tags = find_tags(&full, values)?;

    for (run, &offset) in runs.iter().zip(&offsets) {
        let segment = offset..offset + run.text.len();
        let (text, touched) = rewrite_segment(&full, segment, &tags);
        if touched {
            edits.push(Edit {
                range: run.open.start..run.text.end,
                text: format!("{PRESERVE_TEXT_OPEN}{text}"),
            });
        }
    }
    Ok(())
}

fn find_tags(full: &str, values: &BTreeMap<String, String>) -> Result<Vec<Tag>, TemplateError> {
    let mut tags = Vec::new();
    let mut pos = 0;
    while let Some(found) = full[pos..].find(TAG_OPEN) {
        let start = pos + found;
        let inner = start + TAG_OPEN.len();
        let close = full[inner..]
            .find(TAG_CLOSE)
            .ok_or_else(|| TemplateError::Unclosed(full[start..].chars().take(20).collect()))?;
        let end = inner + close + TAG_CLOSE.len();

        let name = full[inner..inner + close].trim();
        let replacement = match values.get(name) {
            Some(value) => xml_text(value),
            None => {
                debug!("Placeholder {name} has no value, rendering empty");
                String::new()
            }
        };

        tags.push(Tag {
            start,
            end,
            replacement,
        });
        pos = end;
    }
    Ok(tags)
}

/// Text of one run after substitution, and whether any tag touched it.
fn rewrite_segment(full: &str, segment: Range<usize>, tags: &[Tag]) -> (String, bool) {
    let mut text = String::new();
    let mut cursor = segment.start;
    let mut touched = false;

    for tag in tags
        .iter()
        .filter(|t| t.start < segment.end && t.end > segment.start)
    {
        touched = true;
        if tag.start > cursor {
            text.push_str(&full[cursor..tag.start]);
        }
        if tag.start >= segment.start {
            text.push_str(&tag.replacement);
        }
        cursor = cursor.max(tag.end.min(segment.end));
    }

    if cursor < segment.end {
        text.push_str(&full[cursor..segment.end]);
    }
    (text, touched)
}

/// Escapes a value for a `<w:t>` body; newlines become Word line breaks.
fn xml_text(value: &str) -> String {
    let escaped = value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;");
    escaped.replace("\r\n", "\n").replace('\n', LINE_BREAK)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

    const WORD_NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    /// Wraps body XML in a minimal but well-formed `.docx` archive.
    pub fn docx_with_body(body: &str) -> Vec<u8> {
        docx_with_parts(body, &[])
    }

    /// Like [`docx_with_body`], with extra `word/` parts such as headers.
    pub fn docx_with_parts(body: &str, parts: &[(&str, &str)]) -> Vec<u8> {
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document {WORD_NS}><w:body>{body}</w:body></w:document>"#
        );
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        writer.start_file("[Content_Types].xml", options).unwrap();
        writer.write_all(CONTENT_TYPES.as_bytes()).unwrap();
        writer.add_directory("word/", options).unwrap();
        writer.start_file("word/document.xml", options).unwrap();
        writer.write_all(document.as_bytes()).unwrap();
        for (name, xml) in parts {
            writer.start_file(*name, options).unwrap();
            writer.write_all(xml.as_bytes()).unwrap();
        }
        writer.start_file("word/media/logo.bin", options).unwrap();
        writer.write_all(&[0u8, 159, 146, 150]).unwrap();
        writer.finish().unwrap().into_inner()
    }

    /// Reads one archive entry back as bytes.
    pub fn read_entry(docx: &[u8], name: &str) -> Vec<u8> {
        let mut archive = ZipArchive::new(Cursor::new(docx)).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut out = Vec::new();
        entry.read_to_end(&mut out).unwrap();
        out
    }

    pub fn document_xml(docx: &[u8]) -> String {
        String::from_utf8(read_entry(docx, "word/document.xml")).unwrap()
    }

    fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn render_body(body: &str, pairs: &[(&str, &str)]) -> String {
        let template = DocxTemplate::from_bytes(docx_with_body(body));
        document_xml(&template.render(&values(pairs)).unwrap())
    }

    #[test]
    fn test_single_run_placeholder() {
        let xml = render_body(
            "<w:p><w:r><w:t>乙方：{{姓名}}</w:t></w:r></w:p>",
            &[("姓名", "王舒惠")],
        );
        assert!(xml.contains(r#"<w:t xml:space="preserve">乙方：王舒惠</w:t>"#), "{xml}");
    }

    #[test]
    fn test_placeholder_split_across_runs() {
        let xml = render_body(
            r#"<w:p><w:r><w:t>岗位：{{</w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>岗</w:t></w:r><w:r><w:t xml:space="preserve">位}} 实习</w:t></w:r></w:p>"#,
            &[("岗位", "软件工程实习生")],
        );
        assert!(xml.contains("岗位：软件工程实习生</w:t>"), "{xml}");
        assert!(xml.contains(r#"<w:t xml:space="preserve"></w:t></w:r><w:r><w:t xml:space="preserve"> 实习</w:t>"#), "{xml}");
        assert!(!xml.contains("{{") && !xml.contains("}}"));
        assert!(xml.contains("<w:rPr><w:b/></w:rPr>"));
    }

    #[test]
    fn test_several_placeholders_in_one_run() {
        let xml = render_body(
            "<w:p><w:r><w:t>{{开始年}}年{{开始月}}月{{开始日}}日</w:t></w:r></w:p>",
            &[("开始年", "2025"), ("开始月", "12"), ("开始日", "1")],
        );
        assert!(xml.contains("2025年12月1日"), "{xml}");
    }

    #[test]
    fn test_tag_whitespace_is_trimmed() {
        let xml = render_body(
            "<w:p><w:r><w:t>{{ 补贴 }}元/天</w:t></w:r></w:p>",
            &[("补贴", "250")],
        );
        assert!(xml.contains("250元/天"), "{xml}");
    }

    #[test]
    fn test_missing_value_renders_empty() {
        let xml = render_body("<w:p><w:r><w:t>学校：{{学校}}。</w:t></w:r></w:p>", &[]);
        assert!(xml.contains("学校：。"), "{xml}");
        assert!(!xml.contains("undefined"));
    }

    #[test]
    fn test_values_are_xml_escaped() {
        let xml = render_body(
            "<w:p><w:r><w:t>{{工作地点}}</w:t></w:r></w:p>",
            &[("工作地点", "A&B <总部>")],
        );
        assert!(xml.contains("A&amp;B &lt;总部&gt;"), "{xml}");
    }

    #[test]
    fn test_newline_becomes_line_break() {
        let xml = render_body(
            "<w:p><w:r><w:t>{{工作时间}}</w:t></w:r></w:p>",
            &[("工作时间", "周一至周五\n10:00-19:00")],
        );
        assert!(xml.contains("周一至周五</w:t><w:br/><w:t xml:space=\"preserve\">10:00-19:00"), "{xml}");
    }

    #[test]
    fn test_plain_paragraphs_are_untouched() {
        let body = r#"<w:p w:rsidR="00AB"><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:t>实习协议</w:t></w:r></w:p><w:p w:rsidR="00AC"/>"#;
        let xml = render_body(body, &[("姓名", "王舒惠")]);
        assert!(xml.contains(body), "{xml}");
    }

    #[test]
    fn test_unclosed_placeholder_is_error() {
        let template = DocxTemplate::from_bytes(docx_with_body(
            "<w:p><w:r><w:t>乙方：{{姓名</w:t></w:r></w:p>",
        ));
        let err = template.render(&BTreeMap::new()).unwrap_err();
        assert!(matches!(err, TemplateError::Unclosed(ref s) if s.starts_with("{{姓名")), "{err}");
    }

    #[test]
    fn test_other_entries_are_copied() {
        let template = DocxTemplate::from_bytes(docx_with_body("<w:p><w:r><w:t>x</w:t></w:r></w:p>"));
        let out = template.render(&BTreeMap::new()).unwrap();
        assert_eq!(read_entry(&out, "word/media/logo.bin"), vec![0u8, 159, 146, 150]);
        assert!(String::from_utf8(read_entry(&out, "[Content_Types].xml"))
            .unwrap()
            .contains("wordprocessingml"));
    }

    #[test]
    fn test_non_zip_bytes_are_archive_error() {
        let template = DocxTemplate::from_bytes(b"not a docx".to_vec());
        let err = template.render(&BTreeMap::new()).unwrap_err();
        assert!(matches!(err, TemplateError::Archive(_)));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = DocxTemplate::load(&dir.path().join("absent.docx"))
            .await
            .unwrap_err();
        assert!(matches!(err, TemplateError::Missing(_)));
    }

    #[tokio::test]
    async fn test_load_then_render_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.docx");
        std::fs::write(
            &path,
            docx_with_body("<w:p><w:r><w:t>{{姓名}}</w:t></w:r></w:p>"),
        )
        .unwrap();

        let template = DocxTemplate::load(&path).await.unwrap();
        let out = template.render(&values(&[("姓名", "王舒惠")])).unwrap();
        assert!(document_xml(&out).contains("王舒惠"));
    }

    #[test]
    fn test_text_box_paragraph_and_trailing_runs_are_filled() {
        let xml = render_body(
            "<w:p><w:r><w:t>乙方：{{姓名}}</w:t></w:r><w:r><w:drawing><w:txbxContent><w:p><w:r><w:t>{{岗位}}</w:t></w:r></w:p></w:txbxContent></w:drawing></w:r><w:r><w:t>补贴{{补贴}}元</w:t></w:r></w:p>",
            &[("姓名", "王舒惠"), ("岗位", "软件工程实习生"), ("补贴", "250")],
        );
        assert!(!xml.contains("{{") && !xml.contains("}}"), "{xml}");
        assert!(xml.contains("乙方：王舒惠</w:t>"), "{xml}");
        assert!(xml.contains("<w:txbxContent><w:p><w:r><w:t xml:space=\"preserve\">软件工程实习生</w:t>"), "{xml}");
        assert!(xml.contains("补贴250元</w:t></w:r></w:p>"), "{xml}");
    }

    #[test]
    fn test_outer_tag_split_around_nested_paragraph() {
        let xml = render_body(
            "<w:p><w:r><w:t>{{姓</w:t></w:r><w:r><w:pict><w:txbxContent><w:p><w:r><w:t>框</w:t></w:r></w:p></w:txbxContent></w:pict></w:r><w:r><w:t>名}}同学</w:t></w:r></w:p>",
            &[("姓名", "王舒惠")],
        );
        assert!(xml.contains("<w:t>框</w:t>"), "{xml}");
        assert!(xml.contains("王舒惠</w:t>"), "{xml}");
        assert!(xml.contains(">同学</w:t>"), "{xml}");
        assert!(!xml.contains("{{") && !xml.contains("}}"), "{xml}");
    }

    #[test]
    fn test_header_part_is_rendered() {
        let header = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:hdr {WORD_NS}><w:p><w:r><w:t>{{{{甲方名称}}}} 实习协议</w:t></w:r></w:p></w:hdr>"#
        );
        let styles = "<w:styles><w:p><w:r><w:t>{{甲方名称}}</w:t></w:r></w:p></w:styles>";
        let template = DocxTemplate::from_bytes(docx_with_parts(
            "<w:p><w:r><w:t>正文</w:t></w:r></w:p>",
            &[("word/header1.xml", header.as_str()), ("word/styles.xml", styles)],
        ));

        let out = template
            .render(&values(&[("甲方名称", "示例科技有限公司")]))
            .unwrap();

        let rendered = String::from_utf8(read_entry(&out, "word/header1.xml")).unwrap();
        assert!(rendered.contains("示例科技有限公司 实习协议"), "{rendered}");
        assert!(rendered.starts_with("<?xml") && rendered.ends_with("</w:hdr>"));
        assert_eq!(read_entry(&out, "word/styles.xml"), styles.as_bytes());
    }

    #[test]
    fn test_runs_outside_paragraphs_are_untouched() {
        let runs = paragraph_runs("<w:r><w:t>{{姓名}}</w:t></w:r><w:p/><w:p><w:r><w:t>a</w:t></w:r><w:r><w:t>b</w:t></w:r></w:p>");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].len(), 2);
    }

    #[test]
    fn test_text_parts() {
        assert!(is_text_part("word/document.xml"));
        assert!(is_text_part("word/header1.xml"));
        assert!(is_text_part("word/footer2.xml"));
        assert!(!is_text_part("word/styles.xml"));
        assert!(!is_text_part("word/_rels/document.xml.rels"));
    }
}

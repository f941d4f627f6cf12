//! OOXML (docx/xlsx/pptx) text extraction
//!
//! All three formats are zip containers holding XML parts. Extraction walks
//! the relevant parts with a streaming XML reader and collects the text
//! nodes: `w:t` runs for Word, shared strings plus cell values for Excel,
//! `a:t` runs for PowerPoint.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::json;
use zip::ZipArchive;

use super::{ExtractError, Extracted};

fn malformed(kind: &'static str, reason: impl ToString) -> ExtractError {
    ExtractError::Malformed {
        kind,
        reason: reason.to_string(),
    }
}

fn open_archive<'a>(
    data: &'a [u8],
    kind: &'static str,
) -> Result<ZipArchive<Cursor<&'a [u8]>>, ExtractError> {
    ZipArchive::new(Cursor::new(data)).map_err(|e| malformed(kind, e))
}

fn read_entry(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
    kind: &'static str,
) -> Result<Option<String>, ExtractError> {
    match archive.by_name(name) {
        Ok(mut entry) => {
            let mut xml = String::new();
            entry
                .read_to_string(&mut xml)
                .map_err(|e| malformed(kind, e))?;
            Ok(Some(xml))
        }
        Err(zip::result::ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(malformed(kind, e)),
    }
}

/// Word document: paragraph text plus a table count.
pub fn extract_docx(data: &[u8]) -> Result<Extracted, ExtractError> {
    let mut archive = open_archive(data, "docx")?;
    let xml = read_entry(&mut archive, "word/document.xml", "docx")?
        .ok_or_else(|| malformed("docx", "missing word/document.xml"))?;

    let mut reader = Reader::from_str(&xml);
    let mut buf = Vec::new();
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text_run = false;
    let mut tables = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = true,
                b"w:tbl" => tables += 1,
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => {
                    paragraphs.push(std::mem::take(&mut current));
                }
                _ => {}
            },
            Ok(Event::Text(t)) if in_text_run => {
                current.push_str(&t.unescape().map_err(|e| malformed("docx", e))?);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed("docx", e)),
            _ => {}
        }
        buf.clear();
    }

    let non_empty = paragraphs.iter().filter(|p| !p.trim().is_empty()).count();
    Ok(Extracted {
        text: paragraphs.join("\n"),
        metadata: json!({ "paragraphs": non_empty, "tables": tables }),
    })
}

/// Excel workbook: every sheet rendered as tab-separated rows, with a
/// `[sheet name]` header line per sheet.
pub fn extract_xlsx(data: &[u8]) -> Result<Extracted, ExtractError> {
    let mut archive = open_archive(data, "xlsx")?;

    let shared = match read_entry(&mut archive, "xl/sharedStrings.xml", "xlsx")? {
        Some(xml) => parse_shared_strings(&xml)?,
        None => Vec::new(),
    };
    let sheet_names = match read_entry(&mut archive, "xl/workbook.xml", "xlsx")? {
        Some(xml) => parse_sheet_names(&xml)?,
        None => Vec::new(),
    };

    let mut sections = Vec::new();
    for (index, name) in sheet_names.iter().enumerate() {
        let path = format!("xl/worksheets/sheet{}.xml", index + 1);
        let Some(xml) = read_entry(&mut archive, &path, "xlsx")? else {
            continue;
        };
        let rows = parse_sheet_rows(&xml, &shared)?;
        sections.push(format!("[{}]\n{}", name, rows.join("\n")));
    }

    Ok(Extracted {
        text: sections.join("\n\n"),
        metadata: json!({ "sheets": sheet_names }),
    })
}

fn parse_shared_strings(xml: &str) -> Result<Vec<String>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"si" => current.clear(),
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"si" => strings.push(std::mem::take(&mut current)),
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                current.push_str(&t.unescape().map_err(|e| malformed("xlsx", e))?);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed("xlsx", e)),
            _ => {}
        }
        buf.clear();
    }
    Ok(strings)
}

fn parse_sheet_names(xml: &str) -> Result<Vec<String>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut names = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e) | Event::Empty(e)) if e.name().as_ref() == b"sheet" => {
                if let Some(attr) = e
                    .try_get_attribute("name")
                    .map_err(|e| malformed("xlsx", e))?
                {
                    let name = attr.unescape_value().map_err(|e| malformed("xlsx", e))?;
                    names.push(name.into_owned());
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed("xlsx", e)),
            _ => {}
        }
        buf.clear();
    }
    Ok(names)
}

fn parse_sheet_rows(xml: &str, shared: &[String]) -> Result<Vec<String>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut rows: Vec<String> = Vec::new();
    let mut cells: Vec<String> = Vec::new();
    let mut value = String::new();
    let mut is_shared = false;
    let mut in_value = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"row" => cells.clear(),
                b"c" => {
                    is_shared = e
                        .try_get_attribute("t")
                        .map_err(|e| malformed("xlsx", e))?
                        .map(|attr| attr.value.as_ref() == b"s")
                        .unwrap_or(false);
                    value.clear();
                }
                b"v" => in_value = true,
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"v" => in_value = false,
                b"c" => {
                    let cell = if is_shared {
                        value
                            .trim()
                            .parse::<usize>()
                            .ok()
                            .and_then(|i| shared.get(i))
                            .cloned()
                            .unwrap_or_default()
                    } else {
                        value.clone()
                    };
                    cells.push(cell);
                }
                b"row" => {
                    if cells.iter().any(|cell| !cell.is_empty()) {
                        rows.push(cells.join("\t"));
                    }
                }
                _ => {}
            },
            Ok(Event::Text(t)) if in_value => {
                value.push_str(&t.unescape().map_err(|e| malformed("xlsx", e))?);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed("xlsx", e)),
            _ => {}
        }
        buf.clear();
    }
    Ok(rows)
}

/// PowerPoint deck: text runs from each slide, slides separated by a blank
/// line, in slide order.
pub fn extract_pptx(data: &[u8]) -> Result<Extracted, ExtractError> {
    let mut archive = open_archive(data, "pptx")?;

    let mut slide_paths: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| {
            let number = name
                .strip_prefix("ppt/slides/slide")?
                .strip_suffix(".xml")?
                .parse()
                .ok()?;
            Some((number, name.to_string()))
        })
        .collect();
    slide_paths.sort();

    let mut slides = Vec::new();
    for (_, path) in &slide_paths {
        let xml = read_entry(&mut archive, path, "pptx")?
            .ok_or_else(|| malformed("pptx", format!("missing {}", path)))?;
        slides.push(parse_slide_text(&xml)?);
    }

    Ok(Extracted {
        text: slides.join("\n\n"),
        metadata: json!({ "slides": slide_paths.len() }),
    })
}

fn parse_slide_text(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut lines = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"a:t" => in_text = true,
            Ok(Event::End(e)) if e.name().as_ref() == b"a:t" => in_text = false,
            Ok(Event::Text(t)) if in_text => {
                lines.push(t.unescape().map_err(|e| malformed("pptx", e))?.into_owned());
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed("pptx", e)),
            _ => {}
        }
        buf.clear();
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_docx_paragraphs_and_tables() {
        let document = r#"<?xml version="1.0"?>
            <w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
              <w:body>
                <w:p><w:r><w:t>First </w:t></w:r><w:r><w:t>paragraph</w:t></w:r></w:p>
                <w:p><w:r><w:t>第二段</w:t></w:r></w:p>
                <w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
              </w:body>
            </w:document>"#;
        let data = build_zip(&[("word/document.xml", document)]);

        let extracted = extract_docx(&data).unwrap();
        assert_eq!(extracted.text, "First paragraph\n第二段\ncell");
        assert_eq!(extracted.metadata["paragraphs"], 3);
        assert_eq!(extracted.metadata["tables"], 1);
    }

    #[test]
    fn test_docx_without_document_part_fails() {
        let data = build_zip(&[("word/other.xml", "<x/>")]);
        assert!(matches!(
            extract_docx(&data),
            Err(ExtractError::Malformed { kind: "docx", .. })
        ));
    }

    #[test]
    fn test_xlsx_shared_strings_and_rows() {
        let workbook = r#"<workbook><sheets><sheet name="Data" sheetId="1"/></sheets></workbook>"#;
        let strings = r#"<sst><si><t>name</t></si><si><t>score</t></si></sst>"#;
        let sheet = r#"<worksheet><sheetData>
            <row><c t="s"><v>0</v></c><c t="s"><v>1</v></c></row>
            <row><c t="s"><v>0</v></c><c><v>42</v></c></row>
        </sheetData></worksheet>"#;
        let data = build_zip(&[
            ("xl/workbook.xml", workbook),
            ("xl/sharedStrings.xml", strings),
            ("xl/worksheets/sheet1.xml", sheet),
        ]);

        let extracted = extract_xlsx(&data).unwrap();
        assert_eq!(extracted.text, "[Data]\nname\tscore\nname\t42");
        assert_eq!(extracted.metadata["sheets"][0], "Data");
    }

    #[test]
    fn test_pptx_slides_in_order() {
        let slide = |text: &str| {
            format!(
                r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">
                    <a:t>{}</a:t></p:sld>"#,
                text
            )
        };
        let first = slide("Title slide");
        let second = slide("Details");
        let data = build_zip(&[
            ("ppt/slides/slide2.xml", second.as_str()),
            ("ppt/slides/slide1.xml", first.as_str()),
        ]);

        let extracted = extract_pptx(&data).unwrap();
        assert_eq!(extracted.text, "Title slide\n\nDetails");
        assert_eq!(extracted.metadata["slides"], 2);
    }

    #[test]
    fn test_not_a_zip_fails() {
        assert!(extract_docx(b"plain bytes, not a zip").is_err());
    }
}

//! Multi-format text extraction for office documents (xlsx, docx, pptx, PDF).
//!
//! Documents are parsed entirely locally; nothing here touches the network.
//! Extraction preserves document structure (sheets/rows, paragraphs/tables,
//! slides/notes, pages) so reports can show the source data alongside the
//! model output. [`ExtractedDocument::render`] flattens the structure into a
//! labelled plain-text block for prompting.

use serde::Serialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Maximum sheets to process in an xlsx workbook.
const XLSX_MAX_SHEETS: usize = 100;
/// Maximum cells to process per sheet (avoids unbounded memory).
const XLSX_MAX_CELLS_PER_SHEET: usize = 100_000;
/// Maximum decompressed bytes to read from a single ZIP entry (zip-bomb protection).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Extraction error. Malformed input never panics; callers decide whether to
/// abort or skip.
#[derive(Debug)]
pub enum ExtractError {
    UnsupportedFormat(String),
    Io(String),
    Pdf(String),
    Ooxml(String),
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::UnsupportedFormat(ext) => {
                write!(f, "unsupported document format: {}", ext)
            }
            ExtractError::Io(e) => write!(f, "failed to read file: {}", e),
            ExtractError::Pdf(e) => write!(f, "PDF extraction failed: {}", e),
            ExtractError::Ooxml(e) => write!(f, "OOXML extraction failed: {}", e),
        }
    }
}

impl std::error::Error for ExtractError {}

/// A worksheet: display name plus rows of cell strings. Empty rows are dropped.
#[derive(Debug, Clone, Serialize)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

/// A presentation slide: shape texts plus optional speaker notes.
#[derive(Debug, Clone, Serialize)]
pub struct Slide {
    pub number: u32,
    pub texts: Vec<String>,
    pub notes: Option<String>,
}

/// A PDF page. Blank pages are dropped.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub number: u32,
    pub text: String,
}

/// Structured content extracted from one document.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentContent {
    Spreadsheet {
        sheets: Vec<Sheet>,
    },
    WordDocument {
        paragraphs: Vec<String>,
        tables: Vec<Vec<Vec<String>>>,
    },
    Presentation {
        slides: Vec<Slide>,
    },
    Pdf {
        pages: Vec<Page>,
    },
}

impl DocumentContent {
    pub fn kind_name(&self) -> &'static str {
        match self {
            DocumentContent::Spreadsheet { .. } => "spreadsheet",
            DocumentContent::WordDocument { .. } => "word document",
            DocumentContent::Presentation { .. } => "presentation",
            DocumentContent::Pdf { .. } => "pdf",
        }
    }
}

/// A parsed document ready for prompting and archival.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedDocument {
    pub file_name: String,
    pub content: DocumentContent,
}

/// Extract a document from disk, dispatching on the lowercase file extension.
pub fn extract_path(path: &Path) -> Result<ExtractedDocument, ExtractError> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let bytes = std::fs::read(path)
        .map_err(|e| ExtractError::Io(format!("{}: {}", path.display(), e)))?;

    let content = extract_bytes(&bytes, &ext)?;
    Ok(ExtractedDocument { file_name, content })
}

/// Extract structured content from in-memory bytes with a known extension.
pub fn extract_bytes(bytes: &[u8], extension: &str) -> Result<DocumentContent, ExtractError> {
    match extension {
        "xlsx" => extract_xlsx(bytes),
        "docx" => extract_docx(bytes),
        "pptx" => extract_pptx(bytes),
        "pdf" => extract_pdf(bytes),
        // Legacy binary formats classify and organize but cannot be parsed
        // by the OOXML path; say so rather than failing with a ZIP error.
        "xls" | "doc" | "ppt" => Err(ExtractError::UnsupportedFormat(format!(
            "{} (legacy format; re-save as {}x)",
            extension, extension
        ))),
        other => Err(ExtractError::UnsupportedFormat(other.to_string())),
    }
}

impl ExtractedDocument {
    /// Flatten the structured content into a labelled plain-text block for
    /// prompts and reports.
    pub fn render(&self) -> String {
        let mut out = vec![
            format!("File: {}", self.file_name),
            format!("Type: {}", self.content.kind_name()),
            "=".repeat(50),
        ];

        match &self.content {
            DocumentContent::Spreadsheet { sheets } => {
                for sheet in sheets {
                    out.push(String::new());
                    out.push(format!("Sheet: {}", sheet.name));
                    out.push("-".repeat(40));
                    for row in &sheet.rows {
                        out.push(row.join(" | "));
                    }
                }
            }
            DocumentContent::WordDocument { paragraphs, tables } => {
                out.push("Paragraphs:".to_string());
                out.push("-".repeat(40));
                for para in paragraphs {
                    out.push(para.clone());
                    out.push(String::new());
                }
                if !tables.is_empty() {
                    out.push("Tables:".to_string());
                    out.push("-".repeat(40));
                    for (i, table) in tables.iter().enumerate() {
                        out.push(format!("Table {}:", i + 1));
                        for row in table {
                            out.push(row.join(" | "));
                        }
                        out.push(String::new());
                    }
                }
            }
            DocumentContent::Presentation { slides } => {
                for slide in slides {
                    out.push(String::new());
                    out.push(format!("Slide {}:", slide.number));
                    out.push("-".repeat(40));
                    for text in &slide.texts {
                        out.push(text.clone());
                    }
                    if let Some(notes) = &slide.notes {
                        out.push(format!("Notes: {}", notes));
                    }
                }
            }
            DocumentContent::Pdf { pages } => {
                for page in pages {
                    out.push(String::new());
                    out.push(format!("Page {}:", page.number));
                    out.push("-".repeat(40));
                    out.push(page.text.clone());
                }
            }
        }

        out.join("\n")
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<DocumentContent, ExtractError> {
    let raw_pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| ExtractError::Pdf(e.to_string()))?;
    let pages = raw_pages
        .into_iter()
        .enumerate()
        .filter_map(|(i, text)| {
            let trimmed = text.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(Page {
                    number: (i + 1) as u32,
                    text: trimmed,
                })
            }
        })
        .collect();
    Ok(DocumentContent::Pdf { pages })
}

fn read_zip_entry_bounded(
    archive: &mut zip::ZipArchive<std::io::Cursor<&[u8]>>,
    name: &str,
    max_bytes: u64,
) -> Result<Vec<u8>, ExtractError> {
    let entry = archive
        .by_name(name)
        .map_err(|e| ExtractError::Ooxml(e.to_string()))?;
    let mut out = Vec::new();
    entry
        .take(max_bytes)
        .read_to_end(&mut out)
        .map_err(|e| ExtractError::Ooxml(e.to_string()))?;
    if out.len() as u64 >= max_bytes {
        return Err(ExtractError::Ooxml(format!(
            "ZIP entry {} exceeds size limit ({} bytes)",
            name, max_bytes
        )));
    }
    Ok(out)
}

fn open_archive<'a>(
    bytes: &'a [u8],
) -> Result<zip::ZipArchive<std::io::Cursor<&'a [u8]>>, ExtractError> {
    zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| ExtractError::Ooxml(e.to_string()))
}

// ============ docx ============

fn extract_docx(bytes: &[u8]) -> Result<DocumentContent, ExtractError> {
    let mut archive = open_archive(bytes)?;
    let doc_xml = read_zip_entry_bounded(&mut archive, "word/document.xml", MAX_XML_ENTRY_BYTES)?;
    parse_docx_body(&doc_xml)
}

/// Walk `word/document.xml`, collecting top-level paragraphs and tables.
/// Paragraph text inside table cells belongs to the cell, not the paragraph
/// list.
fn parse_docx_body(xml: &[u8]) -> Result<DocumentContent, ExtractError> {
    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut paragraphs: Vec<String> = Vec::new();
    let mut tables: Vec<Vec<Vec<String>>> = Vec::new();

    let mut table_depth = 0usize;
    let mut current_table: Vec<Vec<String>> = Vec::new();
    let mut current_row: Vec<String> = Vec::new();
    let mut current_cell = String::new();
    let mut current_para = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => match e.local_name().as_ref() {
                b"tbl" => table_depth += 1,
                b"tr" if table_depth == 1 => current_row = Vec::new(),
                b"tc" if table_depth == 1 => current_cell = String::new(),
                b"p" if table_depth == 0 => current_para = String::new(),
                b"t" => in_text = true,
                _ => {}
            },
            Ok(quick_xml::events::Event::Text(te)) if in_text => {
                let text = te.unescape().unwrap_or_default();
                if table_depth > 0 {
                    current_cell.push_str(&text);
                } else {
                    current_para.push_str(&text);
                }
            }
            Ok(quick_xml::events::Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" if table_depth == 0 => {
                    let trimmed = current_para.trim();
                    if !trimmed.is_empty() {
                        paragraphs.push(trimmed.to_string());
                    }
                    current_para.clear();
                }
                b"tc" if table_depth == 1 => {
                    current_row.push(current_cell.trim().to_string());
                    current_cell.clear();
                }
                b"tr" if table_depth == 1 => {
                    current_table.push(std::mem::take(&mut current_row));
                }
                b"tbl" => {
                    table_depth = table_depth.saturating_sub(1);
                    if table_depth == 0 && !current_table.is_empty() {
                        tables.push(std::mem::take(&mut current_table));
                    }
                }
                _ => {}
            },
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(ExtractError::Ooxml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(DocumentContent::WordDocument { paragraphs, tables })
}

// ============ pptx ============

fn extract_pptx(bytes: &[u8]) -> Result<DocumentContent, ExtractError> {
    let mut archive = open_archive(bytes)?;
    let slide_numbers = numbered_entries(&archive, "ppt/slides/slide");

    let mut slides = Vec::new();
    for number in slide_numbers {
        let name = format!("ppt/slides/slide{}.xml", number);
        let xml = read_zip_entry_bounded(&mut archive, &name, MAX_XML_ENTRY_BYTES)?;
        let texts = parse_slide_shapes(&xml)?;

        // Notes slides pair with slides by number in the archives we see.
        let notes_name = format!("ppt/notesSlides/notesSlide{}.xml", number);
        let notes = if archive.by_name(&notes_name).is_ok() {
            let notes_xml = read_zip_entry_bounded(&mut archive, &notes_name, MAX_XML_ENTRY_BYTES)?;
            let joined = parse_slide_shapes(&notes_xml)?.join("\n");
            let trimmed = joined.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        } else {
            None
        };

        slides.push(Slide {
            number,
            texts,
            notes,
        });
    }

    Ok(DocumentContent::Presentation { slides })
}

/// Entry numbers for `<prefix>N.xml` archive members, sorted ascending.
fn numbered_entries(
    archive: &zip::ZipArchive<std::io::Cursor<&[u8]>>,
    prefix: &str,
) -> Vec<u32> {
    let mut numbers: Vec<u32> = archive
        .file_names()
        .filter(|n| n.starts_with(prefix) && n.ends_with(".xml"))
        .filter_map(|n| {
            n.trim_start_matches(prefix)
                .trim_end_matches(".xml")
                .parse::<u32>()
                .ok()
        })
        .collect();
    numbers.sort_unstable();
    numbers
}

/// Collect per-shape text from a slide (or notes slide): `a:t` runs grouped
/// by enclosing `p:sp` shape element.
fn parse_slide_shapes(xml: &[u8]) -> Result<Vec<String>, ExtractError> {
    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut shapes: Vec<String> = Vec::new();
    let mut current_shape = String::new();
    let mut in_shape = false;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => match e.local_name().as_ref() {
                b"sp" => {
                    in_shape = true;
                    current_shape.clear();
                }
                b"t" if in_shape => in_text = true,
                _ => {}
            },
            Ok(quick_xml::events::Event::Text(te)) if in_text => {
                if !current_shape.is_empty() {
                    current_shape.push(' ');
                }
                current_shape.push_str(te.unescape().unwrap_or_default().as_ref());
            }
            Ok(quick_xml::events::Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"sp" => {
                    in_shape = false;
                    let trimmed = current_shape.trim();
                    if !trimmed.is_empty() {
                        shapes.push(trimmed.to_string());
                    }
                    current_shape.clear();
                }
                _ => {}
            },
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(ExtractError::Ooxml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(shapes)
}

// ============ xlsx ============

fn extract_xlsx(bytes: &[u8]) -> Result<DocumentContent, ExtractError> {
    let mut archive = open_archive(bytes)?;
    let shared_strings = read_shared_strings(&mut archive)?;
    let sheet_files = resolve_sheet_files(&mut archive)?;

    let mut sheets = Vec::new();
    for (name, entry) in sheet_files.into_iter().take(XLSX_MAX_SHEETS) {
        let sheet_xml = read_zip_entry_bounded(&mut archive, &entry, MAX_XML_ENTRY_BYTES)?;
        let rows = parse_sheet_rows(&sheet_xml, &shared_strings)?;
        sheets.push(Sheet { name, rows });
    }

    Ok(DocumentContent::Spreadsheet { sheets })
}

/// Sheet display names and worksheet entries, in workbook declaration order.
/// Names resolve to worksheet parts through `xl/_rels/workbook.xml.rels`, so
/// a reordered workbook keeps the right name on each sheet. Workbooks with no
/// relationship part pair declared names with `sheetN.xml` entries
/// positionally; workbooks with no `xl/workbook.xml` at all fall back to the
/// numbered entries alone.
fn resolve_sheet_files(
    archive: &mut zip::ZipArchive<std::io::Cursor<&[u8]>>,
) -> Result<Vec<(String, String)>, ExtractError> {
    let declared = read_workbook_sheets(archive)?;
    let rels = read_workbook_rels(archive)?;
    let numbered = numbered_entries(archive, "xl/worksheets/sheet");

    if declared.is_empty() {
        return Ok(numbered
            .into_iter()
            .map(|n| (format!("Sheet{}", n), format!("xl/worksheets/sheet{}.xml", n)))
            .collect());
    }

    let mut out = Vec::new();
    for (idx, (name, rid)) in declared.into_iter().enumerate() {
        let target = rid
            .as_deref()
            .and_then(|r| rels.get(r))
            .map(|t| normalize_workbook_target(t));
        let entry = match target {
            Some(entry) => entry,
            None => match numbered.get(idx) {
                Some(n) => format!("xl/worksheets/sheet{}.xml", n),
                None => continue,
            },
        };
        out.push((name, entry));
    }
    Ok(out)
}

/// Relationship targets are relative to `xl/` unless absolute.
fn normalize_workbook_target(target: &str) -> String {
    let target = target.trim_start_matches('/');
    if target.starts_with("xl/") {
        target.to_string()
    } else {
        format!("xl/{}", target)
    }
}

/// `<sheet>` declarations from `xl/workbook.xml`: display name plus the
/// relationship id, in document order.
fn read_workbook_sheets(
    archive: &mut zip::ZipArchive<std::io::Cursor<&[u8]>>,
) -> Result<Vec<(String, Option<String>)>, ExtractError> {
    if archive.by_name("xl/workbook.xml").is_err() {
        return Ok(Vec::new());
    }
    let xml = read_zip_entry_bounded(archive, "xl/workbook.xml", MAX_XML_ENTRY_BYTES)?;
    let mut sheets = Vec::new();
    let mut reader = quick_xml::Reader::from_reader(xml.as_slice());
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) | Ok(quick_xml::events::Event::Empty(e)) => {
                if e.local_name().as_ref() == b"sheet" {
                    let mut name = None;
                    let mut rid = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.local_name().as_ref() {
                            b"name" => {
                                name = Some(String::from_utf8_lossy(&attr.value).into_owned())
                            }
                            b"id" => {
                                rid = Some(String::from_utf8_lossy(&attr.value).into_owned())
                            }
                            _ => {}
                        }
                    }
                    if let Some(name) = name {
                        sheets.push((name, rid));
                    }
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(ExtractError::Ooxml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(sheets)
}

/// `Id` to `Target` map from `xl/_rels/workbook.xml.rels`.
fn read_workbook_rels(
    archive: &mut zip::ZipArchive<std::io::Cursor<&[u8]>>,
) -> Result<HashMap<String, String>, ExtractError> {
    if archive.by_name("xl/_rels/workbook.xml.rels").is_err() {
        return Ok(HashMap::new());
    }
    let xml = read_zip_entry_bounded(archive, "xl/_rels/workbook.xml.rels", MAX_XML_ENTRY_BYTES)?;
    let mut rels = HashMap::new();
    let mut reader = quick_xml::Reader::from_reader(xml.as_slice());
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) | Ok(quick_xml::events::Event::Empty(e)) => {
                if e.local_name().as_ref() == b"Relationship" {
                    let mut id = None;
                    let mut target = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => {
                                id = Some(String::from_utf8_lossy(&attr.value).into_owned())
                            }
                            b"Target" => {
                                target = Some(String::from_utf8_lossy(&attr.value).into_owned())
                            }
                            _ => {}
                        }
                    }
                    if let (Some(id), Some(target)) = (id, target) {
                        rels.insert(id, target);
                    }
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(ExtractError::Ooxml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(rels)
}

fn read_shared_strings(
    archive: &mut zip::ZipArchive<std::io::Cursor<&[u8]>>,
) -> Result<Vec<String>, ExtractError> {
    // Workbooks with no string cells have no sharedStrings.xml at all.
    if archive.by_name("xl/sharedStrings.xml").is_err() {
        return Ok(Vec::new());
    }
    let xml = read_zip_entry_bounded(archive, "xl/sharedStrings.xml", MAX_XML_ENTRY_BYTES)?;
    let mut strings = Vec::new();
    let mut reader = quick_xml::Reader::from_reader(xml.as_slice());
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut in_si = false;
    let mut current = String::new();
    let mut in_text = false;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => match e.local_name().as_ref() {
                b"si" => {
                    in_si = true;
                    current.clear();
                }
                b"t" if in_si => in_text = true,
                _ => {}
            },
            Ok(quick_xml::events::Event::Text(te)) if in_text => {
                current.push_str(te.unescape().unwrap_or_default().as_ref());
            }
            Ok(quick_xml::events::Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"si" => {
                    in_si = false;
                    strings.push(std::mem::take(&mut current));
                }
                _ => {}
            },
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(ExtractError::Ooxml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(strings)
}

#[derive(Clone, Copy, PartialEq)]
enum CellType {
    SharedString,
    InlineString,
    Other,
}

/// Parse `<row>` / `<c>` / `<v>` structure into rows of cell strings.
/// Shared-string, inline-string, and raw (numeric, boolean, formula result)
/// cell values are kept. Cells are placed by their `r` column reference, so
/// blank cells render as empty strings and values stay in their columns.
/// Rows with no non-empty cell are dropped.
fn parse_sheet_rows(
    xml: &[u8],
    shared_strings: &[String],
) -> Result<Vec<Vec<String>>, ExtractError> {
    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut current_row: Vec<String> = Vec::new();
    let mut cell_type = CellType::Other;
    let mut current_col = 0usize;
    let mut next_col = 0usize;
    let mut in_value = false;
    let mut in_inline_text = false;
    let mut cell_count = 0usize;

    loop {
        if cell_count >= XLSX_MAX_CELLS_PER_SHEET {
            break;
        }
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => match e.local_name().as_ref() {
                b"row" => {
                    current_row = Vec::new();
                    next_col = 0;
                }
                b"c" => {
                    cell_type = CellType::Other;
                    current_col = next_col;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"t" => {
                                cell_type = match attr.value.as_ref() {
                                    b"s" => CellType::SharedString,
                                    b"inlineStr" => CellType::InlineString,
                                    _ => CellType::Other,
                                };
                            }
                            b"r" => {
                                if let Some(col) = column_index(&attr.value) {
                                    current_col = col;
                                }
                            }
                            _ => {}
                        }
                    }
                    next_col = current_col + 1;
                }
                b"v" => in_value = true,
                b"t" if cell_type == CellType::InlineString => in_inline_text = true,
                _ => {}
            },
            Ok(quick_xml::events::Event::Text(te)) => {
                let raw = te.unescape().unwrap_or_default();
                let value = raw.trim();
                if in_value && !value.is_empty() {
                    let resolved = if cell_type == CellType::SharedString {
                        value
                            .parse::<usize>()
                            .ok()
                            .and_then(|i| shared_strings.get(i).cloned())
                    } else {
                        Some(value.to_string())
                    };
                    if let Some(text) = resolved {
                        place_cell(&mut current_row, current_col, &text);
                        cell_count += 1;
                    }
                } else if in_inline_text && !value.is_empty() {
                    place_cell(&mut current_row, current_col, value);
                    cell_count += 1;
                }
            }
            Ok(quick_xml::events::Event::End(e)) => match e.local_name().as_ref() {
                b"v" => in_value = false,
                b"t" => in_inline_text = false,
                b"c" => cell_type = CellType::Other,
                b"row" => {
                    if current_row.iter().any(|c| !c.is_empty()) {
                        rows.push(std::mem::take(&mut current_row));
                    } else {
                        current_row.clear();
                    }
                }
                _ => {}
            },
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(ExtractError::Ooxml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(rows)
}

/// Place text at a column, padding skipped columns with empty strings.
/// Multiple text runs for the same cell concatenate.
fn place_cell(row: &mut Vec<String>, col: usize, text: &str) {
    while row.len() < col {
        row.push(String::new());
    }
    if row.len() == col {
        row.push(text.to_string());
    } else {
        row[col].push_str(text);
    }
}

/// Zero-based column index from a cell reference like `C7`.
fn column_index(cell_ref: &[u8]) -> Option<usize> {
    let mut idx = 0usize;
    let mut letters = 0;
    for &b in cell_ref {
        if b.is_ascii_uppercase() {
            idx = idx * 26 + (b - b'A' + 1) as usize;
            letters += 1;
        } else {
            break;
        }
    }
    if letters == 0 {
        None
    } else {
        Some(idx - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn zip_with_entries(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
            for (name, content) in entries {
                zip.start_file(*name, zip::write::SimpleFileOptions::default())
                    .unwrap();
                zip.write_all(content.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        buf
    }

    #[test]
    fn unsupported_extension_returns_error() {
        let err = extract_bytes(b"foo", "csv").unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFormat(_)));
    }

    #[test]
    fn legacy_format_reports_unsupported_not_zip_error() {
        let err = extract_bytes(b"\xd0\xcf\x11\xe0", "xls").unwrap_err();
        match err {
            ExtractError::UnsupportedFormat(msg) => assert!(msg.contains("legacy")),
            other => panic!("expected UnsupportedFormat, got {:?}", other),
        }
    }

    #[test]
    fn invalid_pdf_returns_error() {
        let err = extract_bytes(b"not a pdf", "pdf").unwrap_err();
        assert!(matches!(err, ExtractError::Pdf(_)));
    }

    #[test]
    fn invalid_zip_returns_error_for_docx() {
        let err = extract_bytes(b"not a zip", "docx").unwrap_err();
        assert!(matches!(err, ExtractError::Ooxml(_)));
    }

    #[test]
    fn docx_paragraphs_and_tables_separate() {
        let xml = r#"<?xml version="1.0"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
<w:p><w:r><w:t>Intro paragraph</w:t></w:r></w:p>
<w:tbl>
  <w:tr><w:tc><w:p><w:r><w:t>Plan</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>Premium</w:t></w:r></w:p></w:tc></w:tr>
  <w:tr><w:tc><w:p><w:r><w:t>Gold</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>120</w:t></w:r></w:p></w:tc></w:tr>
</w:tbl>
<w:p><w:r><w:t>Closing </w:t></w:r><w:r><w:t>paragraph</w:t></w:r></w:p>
</w:body></w:document>"#;
        let bytes = zip_with_entries(&[("word/document.xml", xml)]);
        let content = extract_bytes(&bytes, "docx").unwrap();
        match content {
            DocumentContent::WordDocument { paragraphs, tables } => {
                assert_eq!(paragraphs, vec!["Intro paragraph", "Closing paragraph"]);
                assert_eq!(tables.len(), 1);
                assert_eq!(tables[0][0], vec!["Plan", "Premium"]);
                assert_eq!(tables[0][1], vec!["Gold", "120"]);
            }
            other => panic!("expected WordDocument, got {:?}", other),
        }
    }

    #[test]
    fn pptx_slides_with_notes_in_order() {
        let slide = |text: &str| {
            format!(
                r#"<p:sld xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><p:cSld><p:spTree><p:sp><p:txBody><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#,
                text
            )
        };
        let notes = slide("remember the discount");
        let s1 = slide("Opening");
        let s2 = slide("Coverage details");
        let bytes = zip_with_entries(&[
            ("ppt/slides/slide2.xml", &s2),
            ("ppt/slides/slide1.xml", &s1),
            ("ppt/notesSlides/notesSlide1.xml", &notes),
        ]);
        let content = extract_bytes(&bytes, "pptx").unwrap();
        match content {
            DocumentContent::Presentation { slides } => {
                assert_eq!(slides.len(), 2);
                assert_eq!(slides[0].number, 1);
                assert_eq!(slides[0].texts, vec!["Opening"]);
                assert_eq!(slides[0].notes.as_deref(), Some("remember the discount"));
                assert_eq!(slides[1].number, 2);
                assert_eq!(slides[1].texts, vec!["Coverage details"]);
                assert!(slides[1].notes.is_none());
            }
            other => panic!("expected Presentation, got {:?}", other),
        }
    }

    #[test]
    fn xlsx_shared_inline_and_numeric_cells() {
        let workbook = r#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheets><sheet name="Products" sheetId="1" r:id="rId1" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"/></sheets></workbook>"#;
        let shared = r#"<?xml version="1.0"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><si><t>Plan</t></si><si><t>Gold</t></si></sst>"#;
        let sheet = r#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>
<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="inlineStr"><is><t>Premium</t></is></c></row>
<row r="2"><c r="A2" t="s"><v>1</v></c><c r="B2"><v>120.5</v></c></row>
<row r="3"/>
</sheetData></worksheet>"#;
        let bytes = zip_with_entries(&[
            ("xl/workbook.xml", workbook),
            ("xl/sharedStrings.xml", shared),
            ("xl/worksheets/sheet1.xml", sheet),
        ]);
        let content = extract_bytes(&bytes, "xlsx").unwrap();
        match content {
            DocumentContent::Spreadsheet { sheets } => {
                assert_eq!(sheets.len(), 1);
                assert_eq!(sheets[0].name, "Products");
                assert_eq!(sheets[0].rows.len(), 2);
                assert_eq!(sheets[0].rows[0], vec!["Plan", "Premium"]);
                assert_eq!(sheets[0].rows[1], vec!["Gold", "120.5"]);
            }
            other => panic!("expected Spreadsheet, got {:?}", other),
        }
    }

    #[test]
    fn xlsx_blank_cells_keep_column_alignment() {
        let sheet = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>
<row r="1"><c r="A1" t="inlineStr"><is><t>Name</t></is></c><c r="B1"/><c r="C1"><v>120</v></c></row>
<row r="2"><c r="A2" t="inlineStr"><is><t>Gold</t></is></c><c r="D2"><v>7</v></c></row>
</sheetData></worksheet>"#;
        let bytes = zip_with_entries(&[("xl/worksheets/sheet1.xml", sheet)]);
        let content = extract_bytes(&bytes, "xlsx").unwrap();
        match content {
            DocumentContent::Spreadsheet { sheets } => {
                assert_eq!(sheets[0].rows[0], vec!["Name", "", "120"]);
                assert_eq!(sheets[0].rows[1], vec!["Gold", "", "", "7"]);
            }
            other => panic!("expected Spreadsheet, got {:?}", other),
        }
    }

    #[test]
    fn xlsx_sheet_names_follow_workbook_relationships() {
        let workbook = r#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Totals" sheetId="1" r:id="rId9"/><sheet name="Detail" sheetId="2" r:id="rId3"/></sheets></workbook>"#;
        let rels = r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId9" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/></Relationships>"#;
        let sheet = |value: &str| {
            format!(
                r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>{}</t></is></c></row></sheetData></worksheet>"#,
                value
            )
        };
        let s1 = sheet("first");
        let s2 = sheet("second");
        let bytes = zip_with_entries(&[
            ("xl/workbook.xml", workbook),
            ("xl/_rels/workbook.xml.rels", rels),
            ("xl/worksheets/sheet1.xml", &s1),
            ("xl/worksheets/sheet2.xml", &s2),
        ]);
        let content = extract_bytes(&bytes, "xlsx").unwrap();
        match content {
            DocumentContent::Spreadsheet { sheets } => {
                assert_eq!(sheets.len(), 2);
                assert_eq!(sheets[0].name, "Totals");
                assert_eq!(sheets[0].rows, vec![vec!["second".to_string()]]);
                assert_eq!(sheets[1].name, "Detail");
                assert_eq!(sheets[1].rows, vec![vec!["first".to_string()]]);
            }
            other => panic!("expected Spreadsheet, got {:?}", other),
        }
    }

    #[test]
    fn xlsx_without_shared_strings_is_valid() {
        let sheet = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="1"><c r="A1"><v>42</v></c></row></sheetData></worksheet>"#;
        let bytes = zip_with_entries(&[("xl/worksheets/sheet1.xml", sheet)]);
        let content = extract_bytes(&bytes, "xlsx").unwrap();
        match content {
            DocumentContent::Spreadsheet { sheets } => {
                assert_eq!(sheets[0].name, "Sheet1");
                assert_eq!(sheets[0].rows, vec![vec!["42".to_string()]]);
            }
            other => panic!("expected Spreadsheet, got {:?}", other),
        }
    }

    #[test]
    fn render_labels_sheets_and_rows() {
        let doc = ExtractedDocument {
            file_name: "plans.xlsx".to_string(),
            content: DocumentContent::Spreadsheet {
                sheets: vec![Sheet {
                    name: "Q3".to_string(),
                    rows: vec![vec!["Plan".to_string(), "Premium".to_string()]],
                }],
            },
        };
        let rendered = doc.render();
        assert!(rendered.contains("File: plans.xlsx"));
        assert!(rendered.contains("Type: spreadsheet"));
        assert!(rendered.contains("Sheet: Q3"));
        assert!(rendered.contains("Plan | Premium"));
    }

    #[test]
    fn render_word_document_includes_tables() {
        let doc = ExtractedDocument {
            file_name: "brief.docx".to_string(),
            content: DocumentContent::WordDocument {
                paragraphs: vec!["Summary".to_string()],
                tables: vec![vec![vec!["a".to_string(), "b".to_string()]]],
            },
        };
        let rendered = doc.render();
        assert!(rendered.contains("Summary"));
        assert!(rendered.contains("Table 1:"));
        assert!(rendered.contains("a | b"));
    }
}

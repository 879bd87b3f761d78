//! Minimal PDF 1.4 writer for tabular reports.
//!
//! Landscape A4 pages with a title, a metadata block and a fixed-width table
//! set in Courier. Text is encoded as WinAnsi; characters outside Latin-1
//! become `?`. Rows that do not fit continue on a new page with the table
//! header repeated.

const PAGE_WIDTH: f32 = 842.0;
const PAGE_HEIGHT: f32 = 595.0;
const MARGIN: f32 = 36.0;
const TITLE_SIZE: f32 = 16.0;
const META_SIZE: f32 = 9.0;
const TABLE_SIZE: f32 = 8.0;
const LINE_HEIGHT: f32 = 11.0;
const FOOTER_SIZE: f32 = 7.0;

pub const EMPTY_TABLE_TEXT: &str = "Nenhum registro encontrado.";

#[derive(Debug, Clone, Copy)]
enum Font {
    Regular,
    Bold,
    Mono,
}

impl Font {
    const fn resource(self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
            Self::Mono => "F3",
        }
    }
}

#[derive(Debug, Clone)]
struct TextRun {
    font: Font,
    size: f32,
    x: f32,
    y: f32,
    text: String,
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub title: &'static str,
    /// Width in characters.
    pub width: usize,
}

impl Column {
    pub const fn new(title: &'static str, width: usize) -> Self {
        Self { title, width }
    }
}

#[derive(Debug, Clone)]
pub struct PdfReport {
    pub title: String,
    pub metadata: Vec<(String, String)>,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

impl PdfReport {
    pub fn new(title: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            title: title.into(),
            metadata: Vec::new(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn meta(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push((label.into(), value.into()));
        self
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    fn format_row<'a>(&self, cells: impl Iterator<Item = &'a str>) -> String {
        self.columns
            .iter()
            .zip(cells)
            .map(|(column, cell)| fit(cell, column.width))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn header_line(&self) -> String {
        self.format_row(self.columns.iter().map(|c| c.title))
    }

    fn rule_line(&self) -> String {
        let width: usize = self.columns.iter().map(|c| c.width).sum::<usize>()
            + self.columns.len().saturating_sub(1);
        "-".repeat(width)
    }

    fn layout(&self) -> Vec<Vec<TextRun>> {
        let top = PAGE_HEIGHT - MARGIN;
        let bottom = MARGIN + LINE_HEIGHT;
        let mono = |y: f32, text: String| TextRun {
            font: Font::Mono,
            size: TABLE_SIZE,
            x: MARGIN,
            y,
            text,
        };

        let mut pages = Vec::new();
        let mut page = Vec::new();
        let mut y = top - TITLE_SIZE;

        page.push(TextRun {
            font: Font::Bold,
            size: TITLE_SIZE,
            x: MARGIN,
            y,
            text: self.title.clone(),
        });
        y -= TITLE_SIZE;

        for (label, value) in &self.metadata {
            page.push(TextRun {
                font: Font::Regular,
                size: META_SIZE,
                x: MARGIN,
                y,
                text: format!("{label}: {value}"),
            });
            y -= META_SIZE + 3.0;
        }
        y -= LINE_HEIGHT;

        page.push(mono(y, self.header_line()));
        y -= LINE_HEIGHT;
        page.push(mono(y, self.rule_line()));
        y -= LINE_HEIGHT;

        if self.rows.is_empty() {
            page.push(TextRun {
                font: Font::Regular,
                size: META_SIZE,
                x: MARGIN,
                y,
                text: EMPTY_TABLE_TEXT.to_string(),
            });
        }

        for row in &self.rows {
            if y < bottom {
                pages.push(std::mem::take(&mut page));
                y = top - TABLE_SIZE;
                page.push(mono(y, self.header_line()));
                y -= LINE_HEIGHT;
                page.push(mono(y, self.rule_line()));
                y -= LINE_HEIGHT;
            }
            page.push(mono(y, self.format_row(row.iter().map(String::as_str))));
            y -= LINE_HEIGHT;
        }
        pages.push(page);

        let total = pages.len();
        for (index, page) in pages.iter_mut().enumerate() {
            page.push(TextRun {
                font: Font::Regular,
                size: FOOTER_SIZE,
                x: PAGE_WIDTH - MARGIN - 60.0,
                y: MARGIN / 2.0,
                text: format!("Pagina {} de {}", index + 1, total),
            });
        }

        pages
    }

    /// Serializes the report into a complete PDF document.
    pub fn render(&self) -> Vec<u8> {
        let pages = self.layout();
        let mut writer = Writer::new();

        let page_ids: Vec<usize> = (0..pages.len()).map(|i| 6 + 2 * i).collect();
        let kids = page_ids
            .iter()
            .map(|id| format!("{id} 0 R"))
            .collect::<Vec<_>>()
            .join(" ");

        writer.object(1, b"<< /Type /Catalog /Pages 2 0 R >>");
        writer.object(
            2,
            format!(
                "<< /Type /Pages /Kids [{kids}] /Count {} >>",
                page_ids.len()
            )
            .as_bytes(),
        );
        for (id, base) in [(3, "Helvetica"), (4, "Helvetica-Bold"), (5, "Courier")] {
            writer.object(
                id,
                format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /{base} /Encoding /WinAnsiEncoding >>"
                )
                .as_bytes(),
            );
        }

        for (page, page_id) in pages.iter().zip(&page_ids) {
            let content_id = page_id + 1;
            writer.object(
                *page_id,
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                     /Resources << /Font << /F1 3 0 R /F2 4 0 R /F3 5 0 R >> >> \
                     /Contents {content_id} 0 R >>"
                )
                .as_bytes(),
            );

            let stream = content_stream(page);
            let mut body = format!("<< /Length {} >>\nstream\n", stream.len()).into_bytes();
            body.extend_from_slice(&stream);
            body.extend_from_slice(b"\nendstream");
            writer.object(content_id, &body);
        }

        writer.finish()
    }
}

fn content_stream(runs: &[TextRun]) -> Vec<u8> {
    let mut out = Vec::new();
    for run in runs {
        out.extend_from_slice(
            format!(
                "BT /{} {} Tf {:.2} {:.2} Td (",
                run.font.resource(),
                run.size,
                run.x,
                run.y
            )
            .as_bytes(),
        );
        out.extend_from_slice(&encode_text(&run.text));
        out.extend_from_slice(b") Tj ET\n");
    }
    out
}

/// Pads or truncates `text` to exactly `width` characters.
fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        let mut padded = text.to_string();
        padded.extend(std::iter::repeat_n(' ', width - count));
        padded
    } else if width > 3 {
        let mut cut: String = text.chars().take(width - 3).collect();
        cut.push_str("...");
        cut
    } else {
        text.chars().take(width).collect()
    }
}

/// WinAnsi bytes for a PDF literal string, with delimiters escaped.
fn encode_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '(' | ')' | '\\' => {
                out.push(b'\\');
                out.push(ch as u8);
            }
            '\n' | '\r' | '\t' => out.push(b' '),
            c if (c as u32) < 0x20 => {}
            c => out.push(u8::try_from(c as u32).unwrap_or(b'?')),
        }
    }
    out
}

struct Writer {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl Writer {
    fn new() -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self {
            buf,
            offsets: Vec::new(),
        }
    }

    /// Objects must be written in id order starting at 1.
    fn object(&mut self, id: usize, body: &[u8]) {
        debug_assert_eq!(id, self.offsets.len() + 1);
        self.offsets.push(self.buf.len());
        self.buf
            .extend_from_slice(format!("{id} 0 obj\n").as_bytes());
        self.buf.extend_from_slice(body);
        self.buf.extend_from_slice(b"\nendobj\n");
    }

    fn finish(mut self) -> Vec<u8> {
        let xref_offset = self.buf.len();
        let size = self.offsets.len() + 1;

        let mut xref = format!("xref\n0 {size}\n0000000000 65535 f \n");
        for offset in &self.offsets {
            xref.push_str(&format!("{offset:010} 00000 n \n"));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {size} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n"
        ));
        self.buf.extend_from_slice(xref.as_bytes());
        self.buf
    }
}

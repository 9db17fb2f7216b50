use crate::domain::model::{PrinterCommandStream, TicketContent};
use crate::utils::error::{Result, ServiceError};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

pub const DEFAULT_MAX_LINE_WIDTH: usize = 22;

const ESC: u8 = 0x1B;
const GS: u8 = 0x1D;
const LF: u8 = b'\n';

/// `GS !` character size values.
const SIZE_NORMAL: u8 = 0x00;
const SIZE_DOUBLE_HEIGHT: u8 = 0x10;
const SIZE_DOUBLE: u8 = 0x11;

/// Minimal ESC/POS command writer.
#[derive(Debug, Default)]
struct EscPos {
    buf: Vec<u8>,
}

impl EscPos {
    fn reset(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[ESC, b'@']);
        self
    }

    fn center(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[ESC, b'a', 0x01]);
        self
    }

    fn size(&mut self, size: u8) -> &mut Self {
        self.buf.extend_from_slice(&[GS, b'!', size]);
        self
    }

    fn bold(&mut self, on: bool) -> &mut Self {
        self.buf.extend_from_slice(&[ESC, b'E', u8::from(on)]);
        self
    }

    fn line(&mut self, text: &str) -> &mut Self {
        self.buf.extend_from_slice(text.as_bytes());
        self.buf.push(LF);
        self
    }

    fn feed(&mut self, lines: usize) -> &mut Self {
        self.buf.extend(std::iter::repeat(LF).take(lines));
        self
    }

    /// Partial cut after feeding to the cutter.
    fn cut(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[GS, b'V', 0x41, 0x00]);
        self
    }

    fn finish(self) -> PrinterCommandStream {
        PrinterCommandStream::new(self.buf)
    }
}

/// Renders ticket content into an ESC/POS byte stream.
///
/// Pure: no I/O, output depends only on the content and the line width.
#[derive(Debug, Clone)]
pub struct TicketEncoder {
    max_line_width: usize,
}

impl TicketEncoder {
    pub fn new(max_line_width: usize) -> Self {
        Self { max_line_width }
    }

    pub fn encode(&self, content: &TicketContent) -> Result<PrinterCommandStream> {
        if !has_printable_text(&content.student_name) {
            return Err(ServiceError::EncodingFault {
                message: "student name is empty".to_string(),
            });
        }

        let mut out = EscPos::default();
        out.reset().center().feed(1);

        out.size(SIZE_DOUBLE_HEIGHT).bold(true);
        for line in wrap(&printable(&content.student_name), self.max_line_width) {
            out.line(&line);
        }
        out.bold(false).size(SIZE_NORMAL);

        out.feed(1)
            .line(&format_timestamp(content))
            .line(&format!("({})", printable(&content.service_label)))
            .feed(1);

        out.size(SIZE_DOUBLE)
            .bold(true)
            .line(&printable(&content.keyword))
            .bold(false)
            .size(SIZE_NORMAL);

        out.feed(4).cut();
        Ok(out.finish())
    }
}

impl Default for TicketEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_WIDTH)
    }
}

fn format_timestamp(content: &TicketContent) -> String {
    content.timestamp.format("%-d/%-m/%Y %I:%M %p").to_string()
}

/// Decomposes to NFD and drops combining marks, so "Peña" prints as "Pena".
pub fn strip_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Printer-safe ASCII. Diacritics are dropped and control characters become
/// spaces, since the printer would run them as commands. Letters that do not
/// decompose are transliterated; anything else prints as `?`, because the
/// printer's single-byte code page has no glyph for multi-byte UTF-8.
fn printable(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in strip_diacritics(text).chars() {
        match c {
            c if c.is_control() || c.is_whitespace() => out.push(' '),
            c if c.is_ascii() => out.push(c),
            c => out.push_str(transliterate(c).unwrap_or("?")),
        }
    }
    out
}

fn transliterate(c: char) -> Option<&'static str> {
    let ascii = match c {
        'ß' => "ss",
        'Æ' => "AE",
        'æ' => "ae",
        'Œ' => "OE",
        'œ' => "oe",
        'Ø' => "O",
        'ø' => "o",
        'Ł' => "L",
        'ł' => "l",
        'Đ' => "D",
        'đ' => "d",
        'Þ' => "TH",
        'þ' => "th",
        'ı' => "i",
        _ => return None,
    };
    Some(ascii)
}

/// Whether the name still has something to print once it is made printer-safe.
pub fn has_printable_text(text: &str) -> bool {
    !printable(text).trim().is_empty()
}

/// Greedy word wrap on whitespace.
///
/// A word longer than `width` is placed alone on its own line, unsplit.
/// Idempotent: wrapping the joined output again yields the same lines.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

pub fn wrap_text(text: &str, width: usize) -> String {
    wrap(text, width).join("\n")
}

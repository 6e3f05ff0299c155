//! Build log inspector. Pulls the lines containing an error marker, plus a few
//! lines of trailing context, out of a log that may be UTF-8 or UTF-16.

use crate::error::{Result, TransformError};
use serde::Serialize;
use std::path::Path;

pub const DEFAULT_MARKER: &str = "ERROR";
pub const DEFAULT_CONTEXT: usize = 2;
const DIVIDER_WIDTH: usize = 40;

const UTF8_BOM: &[u8] = &[0xef, 0xbb, 0xbf];
const UTF16_LE_BOM: &[u8] = &[0xff, 0xfe];
const UTF16_BE_BOM: &[u8] = &[0xfe, 0xff];

/// A marker line and the context lines after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogExcerpt {
    /// 1-based line number of the marker line.
    pub line: usize,
    pub lines: Vec<String>,
}

/// UTF-8 first, then UTF-16 (little-endian unless a big-endian BOM says otherwise).
pub fn decode_log(bytes: &[u8]) -> Option<String> {
    let utf8 = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if let Ok(text) = std::str::from_utf8(utf8) {
        return Some(text.to_string());
    }

    let (body, big_endian) = if let Some(rest) = bytes.strip_prefix(UTF16_BE_BOM) {
        (rest, true)
    } else {
        (bytes.strip_prefix(UTF16_LE_BOM).unwrap_or(bytes), false)
    };
    if body.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| {
            let pair = [pair[0], pair[1]];
            if big_endian {
                u16::from_be_bytes(pair)
            } else {
                u16::from_le_bytes(pair)
            }
        })
        .collect();
    String::from_utf16(&units).ok()
}

pub fn read_log(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).map_err(|source| TransformError::Read { path: path.to_path_buf(), source })?;
    decode_log(&bytes)
        .ok_or_else(|| TransformError::Decode { path: path.to_path_buf(), encoding: "UTF-8 or UTF-16" })
}

/// Every line containing `marker`, each followed by up to `context` lines.
/// Overlapping excerpts are reported separately.
pub fn find_excerpts(text: &str, marker: &str, context: usize) -> Vec<LogExcerpt> {
    let lines: Vec<&str> = text.lines().collect();
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.contains(marker))
        .map(|(i, _)| {
            let end = (i + 1 + context).min(lines.len());
            LogExcerpt { line: i + 1, lines: lines[i..end].iter().map(|l| l.to_string()).collect() }
        })
        .collect()
}

pub fn render_excerpts(excerpts: &[LogExcerpt]) -> String {
    let divider = "-".repeat(DIVIDER_WIDTH);
    let mut out = String::new();
    for excerpt in excerpts {
        for line in &excerpt.lines {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(&divider);
        out.push('\n');
    }
    out
}

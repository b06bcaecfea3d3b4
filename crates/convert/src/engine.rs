use std::sync::LazyLock;

use bytes::Bytes;
use pulldown_cmark::{Event, Parser, TagEnd, html};
use regex::Regex;
use tracing::debug;

use tessera_core::MediaType;

use crate::codec::{ImageCodec, RasterCodec};
use crate::error::ConvertError;

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("<[^>]*>").expect("valid regex literal"));

/// A conversion result: output bytes plus the output media type.
///
/// The output type always equals the requested target; a conversion
/// never silently returns a different type than asked for.
#[derive(Debug, Clone)]
pub struct Converted {
    pub data: Bytes,
    pub media_type: MediaType,
}

/// The conversion engine: decides legality for a (source, target) pair
/// and performs the transformation.
///
/// Raster image transcoding goes through the injected [`RasterCodec`];
/// everything else is handled in-process. Callers are expected to have
/// negotiated the target against the fragment's format set already,
/// but the engine re-checks and rejects disallowed pairs itself.
pub struct Converter {
    codec: Box<dyn RasterCodec>,
}

impl Converter {
    /// Create a converter with the default `image`-crate codec.
    #[must_use]
    pub fn new() -> Self {
        Self {
            codec: Box::new(ImageCodec::new()),
        }
    }

    /// Create a converter with a custom raster codec.
    #[must_use]
    pub fn with_codec(codec: Box<dyn RasterCodec>) -> Self {
        Self { codec }
    }

    /// Convert `data` from `source` into `target`.
    ///
    /// # Errors
    ///
    /// - [`ConvertError::UnsupportedConversion`] if the pair is not in
    ///   the legality matrix.
    /// - [`ConvertError::Malformed`] if the source bytes do not parse
    ///   as their declared type.
    /// - [`ConvertError::Codec`] on raster codec failure.
    pub fn convert(
        &self,
        source: MediaType,
        data: &[u8],
        target: MediaType,
    ) -> Result<Converted, ConvertError> {
        if !source.can_convert_to(target) {
            return Err(ConvertError::UnsupportedConversion {
                from: source,
                to: target,
            });
        }

        if source == target {
            return Ok(Converted {
                data: Bytes::copy_from_slice(data),
                media_type: target,
            });
        }

        let out = match (source, target) {
            (MediaType::TextMarkdown, MediaType::TextHtml) => markdown_to_html(as_text(data)?),
            (MediaType::TextMarkdown, MediaType::TextPlain) => markdown_to_plain(as_text(data)?),
            (MediaType::TextHtml, MediaType::TextPlain) => strip_html(as_text(data)?),
            // Plain text is served as-is under the requested type; it is
            // already valid Markdown and legal HTML text content.
            (MediaType::TextPlain, MediaType::TextMarkdown | MediaType::TextHtml)
            | (MediaType::TextCsv, MediaType::TextPlain) => data.to_vec(),
            (MediaType::TextCsv, MediaType::Json) => csv_to_json(as_text(data)?)?,
            (MediaType::Json, MediaType::TextPlain) => json_to_pretty(data)?,
            (MediaType::Json, MediaType::Yaml) => json_to_yaml(data)?,
            (MediaType::Yaml, MediaType::Json) => yaml_to_json(as_text(data)?)?,
            (MediaType::Yaml, MediaType::TextPlain) => yaml_to_plain(as_text(data)?)?,
            (from, to) if from.is_image() && to.is_image() => self.codec.transcode(data, to)?,
            (from, to) => {
                // The legality matrix admits no other pairs.
                return Err(ConvertError::UnsupportedConversion { from, to });
            }
        };

        debug!(from = %source, to = %target, size = out.len(), "converted fragment content");

        Ok(Converted {
            data: Bytes::from(out),
            media_type: target,
        })
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

fn as_text(data: &[u8]) -> Result<&str, ConvertError> {
    std::str::from_utf8(data).map_err(|e| ConvertError::Malformed(format!("invalid UTF-8: {e}")))
}

/// Render Markdown source to HTML markup.
fn markdown_to_html(source: &str) -> Vec<u8> {
    let parser = Parser::new(source);
    let mut out = String::with_capacity(source.len() * 2);
    html::push_html(&mut out, parser);
    out.into_bytes()
}

/// Strip Markdown syntax, yielding best-effort plain text.
///
/// Walks the event stream and keeps only text content; formatting loss
/// is accepted.
fn markdown_to_plain(source: &str) -> Vec<u8> {
    let mut out = String::with_capacity(source.len());
    for event in Parser::new(source) {
        match event {
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak | Event::HardBreak => out.push('\n'),
            Event::End(
                TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item | TagEnd::CodeBlock,
            ) => out.push('\n'),
            _ => {}
        }
    }
    out.into_bytes()
}

/// Strip HTML tags, yielding best-effort plain text.
fn strip_html(source: &str) -> Vec<u8> {
    HTML_TAG.replace_all(source, "").into_owned().into_bytes()
}

/// Convert CSV to JSON records.
///
/// The first line is the header row; each subsequent line becomes one
/// object keyed by header names, positionally matched. Ragged rows
/// never fail: missing fields become empty values and extra fields are
/// dropped. Empty input yields `[]`.
fn csv_to_json(source: &str) -> Result<Vec<u8>, ConvertError> {
    let mut lines = source.lines().filter(|line| !line.is_empty());

    let Some(header_line) = lines.next() else {
        return Ok(b"[]".to_vec());
    };
    let headers: Vec<&str> = header_line.split(',').map(str::trim).collect();

    let mut rows = Vec::new();
    for line in lines {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let mut row = serde_json::Map::new();
        for (position, header) in headers.iter().enumerate() {
            let value = fields.get(position).copied().unwrap_or("");
            row.insert(
                (*header).to_owned(),
                serde_json::Value::String(value.to_owned()),
            );
        }
        rows.push(serde_json::Value::Object(row));
    }

    serde_json::to_vec_pretty(&rows).map_err(|e| ConvertError::Malformed(e.to_string()))
}

/// Re-serialize JSON with deterministic human-readable indentation.
fn json_to_pretty(data: &[u8]) -> Result<Vec<u8>, ConvertError> {
    let value: serde_json::Value =
        serde_json::from_slice(data).map_err(|e| ConvertError::Malformed(e.to_string()))?;
    serde_json::to_vec_pretty(&value).map_err(|e| ConvertError::Malformed(e.to_string()))
}

fn json_to_yaml(data: &[u8]) -> Result<Vec<u8>, ConvertError> {
    let value: serde_json::Value =
        serde_json::from_slice(data).map_err(|e| ConvertError::Malformed(e.to_string()))?;
    let yaml =
        serde_yaml_ng::to_string(&value).map_err(|e| ConvertError::Malformed(e.to_string()))?;
    Ok(yaml.into_bytes())
}

fn yaml_to_json(source: &str) -> Result<Vec<u8>, ConvertError> {
    let value: serde_json::Value =
        serde_yaml_ng::from_str(source).map_err(|e| ConvertError::Malformed(e.to_string()))?;
    serde_json::to_vec(&value).map_err(|e| ConvertError::Malformed(e.to_string()))
}

fn yaml_to_plain(source: &str) -> Result<Vec<u8>, ConvertError> {
    let value: serde_json::Value =
        serde_yaml_ng::from_str(source).map_err(|e| ConvertError::Malformed(e.to_string()))?;
    serde_json::to_vec_pretty(&value).map_err(|e| ConvertError::Malformed(e.to_string()))
}

use http::{header, HeaderMap};
use mime::Mime;

use crate::ParseError;

/// Parsed `Content-Disposition` parameters of a part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDisposition {
    /// Value of the `name` parameter.
    pub name: String,
    /// Value of the `filename` parameter, if present.
    pub file_name: Option<String>,
}

/// Headers of a single multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPartHeaders {
    /// Form field name.
    pub field_name: String,
    /// Client filename; `Some` marks a file part.
    pub file_name: Option<String>,
    /// Declared or defaulted content type.
    pub content_type: Mime,
    /// All raw part headers.
    pub headers: HeaderMap,
}

/// Parses a `Content-Disposition: form-data; ...` header value.
pub fn parse_content_disposition(value: &str) -> Result<ContentDisposition, ParseError> {
    let mut params = value.split(';').map(str::trim);
    let kind = params.next().unwrap_or_default();
    if !kind.eq_ignore_ascii_case("form-data") {
        return Err(ParseError::new("Content-Disposition must be form-data"));
    }

    let mut name = None;
    let mut file_name = None;
    for param in params {
        let Some((key, raw)) = param.split_once('=') else {
            continue;
        };
        let value = unquote(raw.trim());
        match key.trim().to_ascii_lowercase().as_str() {
            "name" => name = Some(value),
            "filename" => file_name = Some(value),
            _ => {}
        }
    }

    let name = name.ok_or_else(|| ParseError::new("Content-Disposition is missing a field name"))?;
    Ok(ContentDisposition { name, file_name })
}

/// Parses a part `Content-Type`, defaulting by part kind when absent.
pub fn parse_part_content_type(value: Option<&str>, is_file: bool) -> Result<Mime, ParseError> {
    match value {
        Some(raw) => raw
            .parse::<Mime>()
            .map_err(|_| ParseError::new("invalid part Content-Type")),
        None if is_file => Ok(mime::APPLICATION_OCTET_STREAM),
        None => Ok(mime::TEXT_PLAIN),
    }
}

/// Extracts field name, filename and content type from part headers.
pub fn parse_part_headers(headers: &HeaderMap) -> Result<ParsedPartHeaders, ParseError> {
    let disposition = headers
        .get(header::CONTENT_DISPOSITION)
        .ok_or_else(|| ParseError::new("missing Content-Disposition header"))?
        .to_str()
        .map_err(|_| ParseError::new("Content-Disposition header must be ASCII"))?;
    let ContentDisposition { name, file_name } = parse_content_disposition(disposition)?;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .map(|value| {
            value
                .to_str()
                .map_err(|_| ParseError::new("part Content-Type header must be ASCII"))
        })
        .transpose()?;
    let content_type = parse_part_content_type(content_type, file_name.is_some())?;

    Ok(ParsedPartHeaders {
        field_name: name,
        file_name,
        content_type,
        headers: headers.clone(),
    })
}

fn unquote(value: &str) -> String {
    value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .map(|inner| inner.replace("\\\"", "\""))
        .unwrap_or_else(|| value.to_owned())
}

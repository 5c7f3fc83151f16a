use crate::error::ParseError;

const MAX_BOUNDARY_LEN: usize = 70;
const BOUNDARY_PUNCTUATION: &str = "'()+_,-./:=? ";

/// Extracts and validates the `boundary` parameter from a `Content-Type` value.
pub fn extract_multipart_boundary(content_type: &str) -> Result<String, ParseError> {
    let mime = content_type
        .parse::<mime::Mime>()
        .map_err(|_| ParseError::new("invalid Content-Type header"))?;

    if mime.essence_str() != mime::MULTIPART_FORM_DATA.essence_str() {
        return Err(ParseError::new("Content-Type must be multipart/form-data"));
    }

    let boundary = mime
        .get_param(mime::BOUNDARY)
        .ok_or_else(|| ParseError::new("missing multipart boundary parameter"))?
        .as_str();

    match boundary {
        "" => Err(ParseError::new("multipart boundary cannot be empty")),
        b if b.len() > MAX_BOUNDARY_LEN => Err(ParseError::new(
            "multipart boundary cannot exceed 70 characters",
        )),
        b if b.ends_with(' ') => Err(ParseError::new(
            "multipart boundary cannot end with whitespace",
        )),
        b if !b
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || BOUNDARY_PUNCTUATION.contains(c)) =>
        {
            Err(ParseError::new("multipart boundary contains invalid characters"))
        }
        b => Ok(b.to_owned()),
    }
}

use reqwest::header::{HeaderMap, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

pub const XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Error body the extract server sends instead of a workbook.
#[derive(Deserialize)]
struct ServerReport {
    status: String,
    #[serde(default)]
    message: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePayload {
    Workbook {
        file_name: Option<String>,
        bytes: Vec<u8>,
    },
    ErrorReport {
        message: String,
    },
    Other {
        content_type: Option<String>,
        len: usize,
    },
    /// Headers arrived but the body could not be read to the end.
    Unread {
        content_type: Option<String>,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractResponse {
    pub status: StatusCode,
    pub payload: ResponsePayload,
}

impl ExtractResponse {
    pub fn from_parts(status: StatusCode, headers: &HeaderMap, body: Vec<u8>) -> Self {
        let content_type = header_content_type(headers);
        let parsed = content_type
            .as_deref()
            .and_then(|ct| ct.parse::<mime::Mime>().ok());

        let payload = match parsed {
            Some(m) if m.essence_str() == XLSX_MIME_TYPE => ResponsePayload::Workbook {
                file_name: headers
                    .get(CONTENT_DISPOSITION)
                    .and_then(|v| v.to_str().ok())
                    .and_then(disposition_file_name),
                bytes: body,
            },
            Some(m) if m.subtype() == mime::JSON || m.suffix().map_or(false, |s| s == mime::JSON) => {
                match serde_json::from_slice::<ServerReport>(&body) {
                    Ok(report) if report.status == "error" => ResponsePayload::ErrorReport {
                        message: match report.message {
                            Value::String(s) => s,
                            other => other.to_string(),
                        },
                    },
                    _ => ResponsePayload::Other {
                        content_type,
                        len: body.len(),
                    },
                }
            }
            _ => ResponsePayload::Other {
                content_type,
                len: body.len(),
            },
        };

        Self { status, payload }
    }

    pub fn without_body(status: StatusCode, headers: &HeaderMap, reason: String) -> Self {
        Self {
            status,
            payload: ResponsePayload::Unread {
                content_type: header_content_type(headers),
                reason,
            },
        }
    }

    pub fn workbook(&self) -> Option<&[u8]> {
        match &self.payload {
            ResponsePayload::Workbook { bytes, .. } => Some(bytes.as_slice()),
            _ => None,
        }
    }

    pub fn describe(&self) -> String {
        match &self.payload {
            ResponsePayload::Workbook { file_name, bytes } => format!(
                "{} workbook {} ({} bytes)",
                self.status,
                file_name.as_deref().unwrap_or("<unnamed>"),
                bytes.len()
            ),
            ResponsePayload::ErrorReport { message } => {
                format!("{} server reported error: {}", self.status, message)
            }
            ResponsePayload::Other { content_type, len } => format!(
                "{} {} body ({} bytes)",
                self.status,
                content_type.as_deref().unwrap_or("untyped"),
                len
            ),
            ResponsePayload::Unread {
                content_type,
                reason,
            } => format!(
                "{} {} body left unread: {}",
                self.status,
                content_type.as_deref().unwrap_or("untyped"),
                reason
            ),
        }
    }
}

fn header_content_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Filename from a `Content-Disposition` value. `filename*` (RFC 5987) wins over `filename`.
fn disposition_file_name(value: &str) -> Option<String> {
    let mut plain = None;
    for param in value.split(';').skip(1) {
        let Some((key, raw)) = param.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let raw = raw.trim();
        if key.eq_ignore_ascii_case("filename*") {
            if let Some(name) = extended_value(raw).filter(|n| !n.is_empty()) {
                return Some(name);
            }
        } else if key.eq_ignore_ascii_case("filename") && plain.is_none() {
            let name = raw.trim_matches('"');
            if !name.is_empty() {
                plain = Some(name.to_string());
            }
        }
    }
    plain
}

/// Decodes `charset'lang'pct-encoded`. Only UTF-8 and ISO-8859-1 are understood.
fn extended_value(raw: &str) -> Option<String> {
    let mut fields = raw.splitn(3, '\'');
    let charset = fields.next()?;
    let _lang = fields.next()?;
    let encoded = fields.next()?;
    let bytes = percent_decode(encoded)?;
    if charset.eq_ignore_ascii_case("utf-8") {
        String::from_utf8(bytes).ok()
    } else if charset.eq_ignore_ascii_case("iso-8859-1") {
        Some(bytes.into_iter().map(char::from).collect())
    } else {
        None
    }
}

fn percent_decode(encoded: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(encoded.len());
    let mut bytes = encoded.bytes();
    while let Some(b) = bytes.next() {
        if b == b'%' {
            let hi = (bytes.next()? as char).to_digit(16)?;
            let lo = (bytes.next()? as char).to_digit(16)?;
            out.push((hi * 16 + lo) as u8);
        } else {
            out.push(b);
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(pairs: &[(reqwest::header::HeaderName, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(name.clone(), HeaderValue::from_static(*value));
        }
        map
    }

    #[test]
    fn xlsx_body_is_a_workbook() {
        let map = headers(&[
            (CONTENT_TYPE, XLSX_MIME_TYPE),
            (CONTENT_DISPOSITION, "attachment; filename=output.xlsx"),
        ]);
        let response = ExtractResponse::from_parts(StatusCode::OK, &map, b"PK\x03\x04".to_vec());
        assert_eq!(
            response.payload,
            ResponsePayload::Workbook {
                file_name: Some("output.xlsx".into()),
                bytes: b"PK\x03\x04".to_vec(),
            }
        );
        assert_eq!(response.workbook(), Some(&b"PK\x03\x04"[..]));
    }

    #[test]
    fn unread_body_keeps_status_and_type() {
        let map = headers(&[(CONTENT_TYPE, XLSX_MIME_TYPE)]);
        let response =
            ExtractResponse::without_body(StatusCode::OK, &map, "incomplete body".into());
        assert_eq!(
            response.payload,
            ResponsePayload::Unread {
                content_type: Some(XLSX_MIME_TYPE.into()),
                reason: "incomplete body".into(),
            }
        );
        assert!(response.workbook().is_none());
        assert!(response.describe().contains("left unread: incomplete body"));
    }

    #[test]
    fn quoted_disposition_names_are_unwrapped() {
        assert_eq!(
            disposition_file_name("attachment; filename=\"cvs.xlsx\""),
            Some("cvs.xlsx".into())
        );
        assert_eq!(disposition_file_name("inline"), None);
    }

    #[test]
    fn disposition_keys_ignore_case() {
        assert_eq!(
            disposition_file_name("attachment; FileName=output.xlsx"),
            Some("output.xlsx".into())
        );
        assert_eq!(
            disposition_file_name("Attachment;FILENAME=\"a b.xlsx\""),
            Some("a b.xlsx".into())
        );
    }

    #[test]
    fn extended_filename_is_decoded_and_preferred() {
        assert_eq!(
            disposition_file_name(
                "attachment; filename=\"fallback.xlsx\"; filename*=UTF-8''r%C3%A9sum%C3%A9s.xlsx"
            ),
            Some("résumés.xlsx".into())
        );
        assert_eq!(
            disposition_file_name("attachment; filename*=iso-8859-1'en'caf%E9.xlsx"),
            Some("café.xlsx".into())
        );
        assert_eq!(
            disposition_file_name("attachment; filename*=UTF-8''bad%zz.xlsx; filename=ok.xlsx"),
            Some("ok.xlsx".into())
        );
    }

    #[test]
    fn error_json_becomes_a_report() {
        let map = headers(&[(CONTENT_TYPE, "application/json")]);
        let body = br#"{"status":"error","message":"Excel file not found"}"#.to_vec();
        let response = ExtractResponse::from_parts(StatusCode::OK, &map, body);
        assert_eq!(
            response.payload,
            ResponsePayload::ErrorReport {
                message: "Excel file not found".into()
            }
        );
        assert!(response.workbook().is_none());
    }

    #[test]
    fn non_string_messages_are_rendered_as_json() {
        let map = headers(&[(CONTENT_TYPE, "application/json")]);
        let body = br#"{"status":"error","message":["bad zip"]}"#.to_vec();
        let response = ExtractResponse::from_parts(StatusCode::OK, &map, body);
        assert_eq!(
            response.payload,
            ResponsePayload::ErrorReport {
                message: r#"["bad zip"]"#.into()
            }
        );
    }

    #[test]
    fn anything_else_is_left_unclassified() {
        let map = headers(&[(CONTENT_TYPE, "text/html; charset=utf-8")]);
        let response =
            ExtractResponse::from_parts(StatusCode::INTERNAL_SERVER_ERROR, &map, b"<h1>oops</h1>".to_vec());
        assert_eq!(
            response.payload,
            ResponsePayload::Other {
                content_type: Some("text/html; charset=utf-8".into()),
                len: 13,
            }
        );

        let json_ok = ExtractResponse::from_parts(
            StatusCode::OK,
            &headers(&[(CONTENT_TYPE, "application/json")]),
            br#"{"status":"ok"}"#.to_vec(),
        );
        assert!(matches!(json_ok.payload, ResponsePayload::Other { len: 15, .. }));

        let untyped = ExtractResponse::from_parts(StatusCode::NO_CONTENT, &HeaderMap::new(), Vec::new());
        assert!(untyped.describe().contains("untyped"));
    }
}

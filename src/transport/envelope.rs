use serde::Deserialize;

use super::codec::DataFormat;
use crate::domain::{Carrier, Contact, Folder, Greeting, MessageEntry, VirtualNumber};

/// Structured error body the service returns alongside a non-2xx status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorEnvelope {
    pub status_code: Option<u16>,
    pub errors: Vec<ErrorEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEntry {
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub short_message: Option<String>,
    #[serde(default)]
    pub long_message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonErrorEnvelope {
    #[serde(default)]
    status_code: Option<u16>,
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct XmlErrorEnvelope {
    #[serde(default)]
    status_code: Option<u16>,
    #[serde(default)]
    errors: Option<XmlErrorList>,
}

#[derive(Debug, Deserialize)]
struct XmlErrorList {
    #[serde(default)]
    error: Vec<ErrorEntry>,
}

/// Best-effort parse of an error body. Returns `None` when the body is not an error envelope.
pub fn decode_error_envelope(format: DataFormat, body: &[u8]) -> Option<ErrorEnvelope> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }

    let envelope = match format {
        DataFormat::Json => {
            let parsed: JsonErrorEnvelope = format.decode(body).ok()?;
            ErrorEnvelope {
                status_code: parsed.status_code,
                errors: parsed.errors,
            }
        }
        DataFormat::Xml => {
            let parsed: XmlErrorEnvelope = format.decode(body).ok()?;
            ErrorEnvelope {
                status_code: parsed.status_code,
                errors: parsed.errors.map(|list| list.error).unwrap_or_default(),
            }
        }
    };

    if envelope.status_code.is_none() && envelope.errors.is_empty() {
        return None;
    }
    Some(envelope)
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(rename = "authtoken", alias = "authToken", default)]
    auth_token: Option<String>,
}

/// Extract the session token from a login response. Blank bodies and empty tokens are
/// reported as `None`.
pub fn decode_login_token(
    format: DataFormat,
    body: &[u8],
) -> Result<Option<String>, super::codec::CodecError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let parsed: LoginResponse = format.decode(body)?;
    Ok(parsed
        .auth_token
        .map(|token| token.trim().to_owned())
        .filter(|token| !token.is_empty()))
}

// List responses repeat the singular element name in XML
// (`<response><message/><message/></response>`); JSON may use either key.

#[derive(Debug, Deserialize)]
pub struct MessageList {
    #[serde(rename = "message", alias = "messages", default)]
    pub items: Vec<MessageEntry>,
}

#[derive(Debug, Deserialize)]
pub struct FolderList {
    #[serde(rename = "folder", alias = "folders", default)]
    pub items: Vec<Folder>,
}

#[derive(Debug, Deserialize)]
pub struct GreetingList {
    #[serde(rename = "greeting", alias = "greetings", default)]
    pub items: Vec<Greeting>,
}

#[derive(Debug, Deserialize)]
pub struct ContactList {
    #[serde(rename = "contact", alias = "contacts", default)]
    pub items: Vec<Contact>,
}

#[derive(Debug, Deserialize)]
pub struct CarrierList {
    #[serde(rename = "carrier", alias = "carriers", default)]
    pub items: Vec<Carrier>,
}

#[derive(Debug, Deserialize)]
pub struct VirtualNumberList {
    #[serde(rename = "virtualNumber", alias = "virtualNumbers", default)]
    pub items: Vec<VirtualNumber>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_error_envelope_is_parsed() {
        let body = br#"
        {
          "statusCode": 403,
          "errors": [
            {"errorCode": "AUTH_1", "shortMessage": "Denied", "longMessage": "Bad credentials"}
          ]
        }
        "#;
        let envelope = decode_error_envelope(DataFormat::Json, body).unwrap();
        assert_eq!(envelope.status_code, Some(403));
        assert_eq!(envelope.errors.len(), 1);
        assert_eq!(envelope.errors[0].error_code.as_deref(), Some("AUTH_1"));
        assert_eq!(
            envelope.errors[0].long_message.as_deref(),
            Some("Bad credentials")
        );
    }

    #[test]
    fn xml_error_envelope_is_parsed() {
        let body = b"<response><statusCode>404</statusCode><errors>\
            <error><errorCode>NF</errorCode><shortMessage>Not found</shortMessage></error>\
            </errors></response>";
        let envelope = decode_error_envelope(DataFormat::Xml, body).unwrap();
        assert_eq!(envelope.status_code, Some(404));
        assert_eq!(envelope.errors[0].short_message.as_deref(), Some("Not found"));
        assert_eq!(envelope.errors[0].long_message, None);
    }

    #[test]
    fn non_envelope_bodies_yield_none() {
        assert_eq!(decode_error_envelope(DataFormat::Json, b"oops"), None);
        assert_eq!(decode_error_envelope(DataFormat::Json, b"  "), None);
        assert_eq!(decode_error_envelope(DataFormat::Json, b"{}"), None);
        assert_eq!(decode_error_envelope(DataFormat::Xml, b""), None);
    }

    #[test]
    fn login_token_is_extracted_in_both_formats() {
        let token = decode_login_token(DataFormat::Json, br#"{"authtoken":"abc"}"#).unwrap();
        assert_eq!(token.as_deref(), Some("abc"));

        let token = decode_login_token(
            DataFormat::Xml,
            b"<response><authtoken> xyz </authtoken></response>",
        )
        .unwrap();
        assert_eq!(token.as_deref(), Some("xyz"));
    }

    #[test]
    fn empty_login_token_is_none() {
        let token = decode_login_token(DataFormat::Json, br#"{"authtoken":"  "}"#).unwrap();
        assert_eq!(token, None);
        let token = decode_login_token(DataFormat::Json, b"{}").unwrap();
        assert_eq!(token, None);
    }

    #[test]
    fn blank_login_body_has_no_token() {
        assert_eq!(decode_login_token(DataFormat::Json, b"").unwrap(), None);
        assert_eq!(decode_login_token(DataFormat::Xml, b" \r\n").unwrap(), None);
    }

    #[test]
    fn xml_list_repeats_singular_element() {
        let body = b"<response>\
            <folder><id>1</id><name>Inbox</name><entryCount>3</entryCount></folder>\
            <folder><id>2</id><name>Trash</name></folder>\
            </response>";
        let list: FolderList = DataFormat::Xml.decode(body).unwrap();
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[0].name, "Inbox");
        assert_eq!(list.items[0].entry_count, 3);
        assert_eq!(list.items[1].entry_count, 0);
    }

    #[test]
    fn json_list_accepts_plural_key() {
        let body = br#"{"folders":[{"id":1,"name":"Inbox"}]}"#;
        let list: FolderList = DataFormat::Json.decode(body).unwrap();
        assert_eq!(list.items.len(), 1);
    }
}

use serde::Serialize;

use crate::domain::validation::ValidationError;
use crate::domain::value::{FolderId, MessageId, PageLength, Password, RawPhoneNumber};

/// Filters and paging for `list_messages`.
#[derive(Debug, Clone, Default)]
pub struct MessageQuery {
    pub folder_id: Option<FolderId>,
    pub offset: Option<u32>,
    pub page_length: Option<PageLength>,
    pub include_transcriptions: bool,
    /// Only return entries created after this Unix time in milliseconds.
    pub created_after_ms: Option<i64>,
}

impl MessageQuery {
    /// Query for one folder with service-side default paging.
    pub fn folder(folder_id: FolderId) -> Self {
        Self {
            folder_id: Some(folder_id),
            ..Self::default()
        }
    }

    /// Set the page window. `page_length` is validated against [`PageLength`].
    pub fn page(mut self, offset: u32, page_length: u16) -> Result<Self, ValidationError> {
        self.offset = Some(offset);
        self.page_length = Some(PageLength::new(page_length)?);
        Ok(self)
    }

    pub(crate) fn to_query(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(folder_id) = self.folder_id {
            params.push(("folderId".to_owned(), folder_id.to_string()));
        }
        if let Some(offset) = self.offset {
            params.push(("offset".to_owned(), offset.to_string()));
        }
        if let Some(page_length) = self.page_length {
            params.push((PageLength::FIELD.to_owned(), page_length.value().to_string()));
        }
        if self.include_transcriptions {
            params.push(("includeTranscription".to_owned(), "true".to_owned()));
        }
        if let Some(created_after) = self.created_after_ms {
            params.push(("createdAfter".to_owned(), created_after.to_string()));
        }
        params
    }
}

/// Filters for `list_contacts`.
#[derive(Debug, Clone, Default)]
pub struct ContactQuery {
    /// Only return contacts changed after this Unix time in milliseconds.
    pub updated_since_ms: Option<i64>,
    pub page_length: Option<PageLength>,
    pub include_deleted: bool,
}

impl ContactQuery {
    pub fn updated_since(updated_since_ms: i64) -> Self {
        Self {
            updated_since_ms: Some(updated_since_ms),
            ..Self::default()
        }
    }

    pub(crate) fn to_query(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(since) = self.updated_since_ms {
            params.push(("updatedSince".to_owned(), since.to_string()));
        }
        if let Some(page_length) = self.page_length {
            params.push((PageLength::FIELD.to_owned(), page_length.value().to_string()));
        }
        if self.include_deleted {
            params.push(("includeDeleted".to_owned(), "true".to_owned()));
        }
        params
    }
}

/// New account sign-up data.
#[derive(Debug, Clone)]
pub struct AccountRegistration {
    pub phone_number: RawPhoneNumber,
    pub password: Password,
    pub email_address: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub carrier_id: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccountRegistrationBody<'a> {
    phone_number: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    email_address: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    carrier_id: Option<u32>,
}

impl AccountRegistration {
    pub(crate) fn body(&self) -> AccountRegistrationBody<'_> {
        AccountRegistrationBody {
            phone_number: self.phone_number.raw(),
            password: self.password.as_str(),
            email_address: self.email_address.as_deref(),
            first_name: self.first_name.as_deref(),
            last_name: self.last_name.as_deref(),
            carrier_id: self.carrier_id,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PasswordChangeBody<'a> {
    pub password: &'a str,
}

impl<'a> PasswordChangeBody<'a> {
    pub(crate) fn new(password: &'a Password) -> Self {
        Self {
            password: password.as_str(),
        }
    }
}

/// Folder creation data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFolder {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewFolder {
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::Empty { field: "folder_name" });
        }
        Ok(Self {
            name,
            description: None,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MessageUpdateBody {
    pub id: MessageId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<FolderId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u8>,
}

/// Client platform for push notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PushClientType {
    Android,
    Ios,
    Windows,
}

/// Device registration for push notifications.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushRegistration {
    pub device_id: String,
    pub client_type: PushClientType,
    /// Client application version reported to the service.
    pub version: String,
    /// Lifetime in days; the service applies its own default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_days: Option<u16>,
}

impl PushRegistration {
    pub fn new(
        device_id: impl Into<String>,
        client_type: PushClientType,
        version: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let device_id = device_id.into();
        if device_id.trim().is_empty() {
            return Err(ValidationError::Empty { field: "device_id" });
        }
        Ok(Self {
            device_id,
            client_type,
            version: version.into(),
            valid_days: None,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TranscriptionRequestBody {
    pub message_id: MessageId,
}

/// Report a phone number as spam.
#[derive(Debug, Clone)]
pub struct SpamReport {
    pub phone_number: RawPhoneNumber,
    pub caller_name: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SpamReportBody<'a> {
    phone_number: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    caller_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
}

impl SpamReport {
    pub(crate) fn body(&self) -> SpamReportBody<'_> {
        SpamReportBody {
            phone_number: self.phone_number.raw(),
            caller_name: self.caller_name.as_deref(),
            comment: self.comment.as_deref(),
        }
    }
}

/// Ask for a new virtual number in an area code.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualNumberRequest {
    pub area_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl VirtualNumberRequest {
    pub fn new(area_code: impl Into<String>) -> Result<Self, ValidationError> {
        let area_code = area_code.into();
        if area_code.trim().is_empty() {
            return Err(ValidationError::Empty { field: "area_code" });
        }
        Ok(Self {
            area_code: area_code.trim().to_owned(),
            label: None,
        })
    }
}

use serde::{Deserialize, Serialize};

use crate::domain::value::{ContactId, FolderId, GreetingId, MessageId, PushRegistrationId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub carrier_id: Option<u32>,
    #[serde(default)]
    pub account_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEntry {
    pub id: MessageId,
    #[serde(default)]
    pub folder_id: Option<FolderId>,
    #[serde(default)]
    pub caller_id: Option<String>,
    #[serde(default)]
    pub caller_name: Option<String>,
    /// Creation time, Unix milliseconds.
    #[serde(default)]
    pub created: Option<i64>,
    /// Duration in seconds.
    #[serde(default)]
    pub length: Option<u32>,
    /// 1 = new, 2 = read.
    #[serde(default)]
    pub status: Option<u8>,
    #[serde(default)]
    pub transcript: Option<String>,
}

impl MessageEntry {
    pub fn is_unread(&self) -> bool {
        self.status == Some(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub entry_count: u32,
    #[serde(default)]
    pub new_entry_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Greeting {
    pub id: GreetingId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ContactId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_number: Option<String>,
    /// Greeting played to this contact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greeting_id: Option<GreetingId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Carrier {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub supported: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarrierLookup {
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub carrier: Option<Carrier>,
    #[serde(default)]
    pub is_wireless: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushRegistrationInfo {
    pub id: PushRegistrationId,
    #[serde(default)]
    pub device_id: Option<String>,
    /// Expiry, Unix milliseconds.
    #[serde(default)]
    pub valid_until: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionStatus {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub transcriptions_remaining: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub sms_enabled: bool,
    #[serde(default)]
    pub email_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpamScore {
    #[serde(default)]
    pub phone_number: Option<String>,
    /// 0 = no known risk, higher is worse.
    #[serde(default)]
    pub spam_risk: u8,
    #[serde(default)]
    pub caller_name: Option<String>,
    #[serde(default)]
    pub report_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualNumber {
    pub phone_number: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub active: bool,
}

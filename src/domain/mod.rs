//! Domain layer: strong types with validation and invariants (no I/O).

mod request;
mod response;
mod validation;
mod value;

pub(crate) use request::{
    MessageUpdateBody, PasswordChangeBody, TranscriptionRequestBody,
};
pub use request::{
    AccountRegistration, ContactQuery, MessageQuery, NewFolder, PushClientType, PushRegistration,
    SpamReport, VirtualNumberRequest,
};
pub use response::{
    Carrier, CarrierLookup, Contact, Folder, Greeting, MessageEntry, PushRegistrationInfo,
    SpamScore, TranscriptionSettings, TranscriptionStatus, UserAccount, VirtualNumber,
};
pub use validation::ValidationError;
pub use value::{
    AuthToken, ContactId, FolderId, GreetingId, MessageId, PageLength, Password, PhoneNumber,
    PushRegistrationId, RawPhoneNumber, Username,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rejects_empty_and_trims() {
        assert!(matches!(
            Username::new("   "),
            Err(ValidationError::Empty {
                field: Username::FIELD
            })
        ));
        assert_eq!(Username::new(" 5555551234 ").unwrap().as_str(), "5555551234");
    }

    #[test]
    fn password_rejects_empty_and_header_breaking_input() {
        assert!(matches!(
            Password::new(""),
            Err(ValidationError::Empty {
                field: Password::FIELD
            })
        ));
        assert!(matches!(
            Password::new("abc\r\nX-Injected: 1"),
            Err(ValidationError::InvalidHeaderValue {
                field: Password::FIELD
            })
        ));
        assert_eq!(Password::new(" spaced ").unwrap().as_str(), " spaced ");
    }

    #[test]
    fn secrets_are_redacted_in_debug_output() {
        let password = Password::new("hunter2").unwrap();
        let token = AuthToken::new("secret-token").unwrap();
        assert!(!format!("{password:?}").contains("hunter2"));
        assert!(!format!("{token:?}").contains("secret-token"));
    }

    #[test]
    fn phone_number_parses_with_region_and_normalizes() {
        let pn = PhoneNumber::parse(Some(phonenumber::country::Id::US), " (949) 555-0123 ").unwrap();
        assert_eq!(pn.raw(), "(949) 555-0123");
        let raw: RawPhoneNumber = pn.into();
        assert_eq!(raw.raw(), "+19495550123");
    }

    #[test]
    fn page_length_range_is_enforced() {
        assert!(PageLength::new(0).is_err());
        assert!(PageLength::new(1).is_ok());
        assert!(PageLength::new(500).is_ok());
        assert!(PageLength::new(501).is_err());
    }

    #[test]
    fn message_query_emits_only_set_parameters() {
        let query = MessageQuery::folder(FolderId::new(7))
            .page(20, 50)
            .unwrap()
            .to_query();
        assert_eq!(
            query,
            vec![
                ("folderId".to_owned(), "7".to_owned()),
                ("offset".to_owned(), "20".to_owned()),
                ("pageLength".to_owned(), "50".to_owned()),
            ]
        );
        assert!(MessageQuery::default().to_query().is_empty());
    }

    #[test]
    fn message_query_rejects_oversized_page() {
        let err = MessageQuery::default().page(0, 1000).unwrap_err();
        assert!(matches!(err, ValidationError::PageLengthOutOfRange { .. }));
    }

    #[test]
    fn contact_query_includes_flags() {
        let query = ContactQuery {
            include_deleted: true,
            ..ContactQuery::updated_since(1_700_000_000_000)
        }
        .to_query();
        assert_eq!(
            query,
            vec![
                ("updatedSince".to_owned(), "1700000000000".to_owned()),
                ("includeDeleted".to_owned(), "true".to_owned()),
            ]
        );
    }

    #[test]
    fn request_constructors_validate_required_fields() {
        assert!(NewFolder::new("  ").is_err());
        assert!(PushRegistration::new("", PushClientType::Android, "1.0").is_err());
        assert_eq!(VirtualNumberRequest::new(" 949 ").unwrap().area_code, "949");
    }

    #[test]
    fn unread_flag_follows_status() {
        let entry = MessageEntry {
            id: MessageId::new(1),
            folder_id: None,
            caller_id: None,
            caller_name: None,
            created: None,
            length: None,
            status: Some(1),
            transcript: None,
        };
        assert!(entry.is_unread());
    }
}

//! Typed Rust client for the YouMail voicemail HTTP API.
//!
//! The crate is split into a domain layer of strong types, a transport layer for wire-format
//! details (XML/JSON bodies, URLs, error envelopes), and a client layer. The client layer owns
//! the session: lazy login, one shared reauthentication after a 403, redirect following, and
//! a counter of calls in flight.
//!
//! ```rust,no_run
//! use youmail::{Credentials, MessageQuery, YouMailClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), youmail::YouMailError> {
//!     let client = YouMailClient::new(Credentials::new("5555550100", "secret")?)?;
//!     for message in client.list_messages(&MessageQuery::default()).await? {
//!         println!("{:?} {}", message.caller_name, message.is_unread());
//!     }
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
mod transport;

pub use client::{
    ApiRequest, AuthenticationChanged, BoxFuture, Credentials, HttpMethod, HttpRequest,
    HttpResponse, HttpTransport, PendingOperationEvent, PendingOperations, Protocol,
    ServiceFault, Session, TransportFailure, YouMailClient, YouMailClientBuilder, YouMailError,
};
pub use domain::{
    AccountRegistration, AuthToken, Carrier, CarrierLookup, Contact, ContactId, ContactQuery,
    Folder, FolderId, Greeting, GreetingId, MessageEntry, MessageId, MessageQuery, NewFolder,
    PageLength, Password, PhoneNumber, PushClientType, PushRegistration, PushRegistrationId,
    PushRegistrationInfo, RawPhoneNumber, SpamReport, SpamScore, TranscriptionSettings,
    TranscriptionStatus, UserAccount, Username, ValidationError, VirtualNumber,
    VirtualNumberRequest,
};
pub use transport::{CodecError, DataFormat};

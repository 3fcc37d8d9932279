//! Transport layer: HTTP and wire-format details (serialization/deserialization, URLs).

mod codec;
mod endpoint;
mod envelope;

pub use codec::{CodecError, DataFormat};
pub(crate) use endpoint::{CACHE_BUST_PARAM, build_url, cache_buster, resolve_redirect};
pub(crate) use envelope::{
    CarrierList, ContactList, ErrorEnvelope, FolderList, GreetingList, MessageList,
    VirtualNumberList, decode_error_envelope, decode_login_token,
};

#[cfg(test)]
pub(crate) use envelope::ErrorEntry;

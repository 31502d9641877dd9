//! Helpers shared by the HTTP layer and the admin CLI.
//!
//! - [`token_codec`] - reversible id <-> token encoding
//! - [`url_validator`] - http(s) url checks for submitted links

pub mod token_codec;
pub mod url_validator;

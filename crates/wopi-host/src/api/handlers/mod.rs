//! API request handlers

pub mod access;
pub mod files;

pub use access::{access_document, AccessQuery, AccessResponse, AppState};
pub use files::{check_file_info, get_file, AccessTokenQuery, CheckFileInfo, WopiAction};

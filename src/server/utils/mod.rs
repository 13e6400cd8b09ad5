pub mod header_utils;
pub mod manifest_utils;
pub mod xtream_utils;

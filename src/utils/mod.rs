pub mod constants;
pub mod string_utils;
pub mod timeout;
pub mod url_utils;

pub use constants::*;
pub use string_utils::{collapse_whitespace, safe_truncate_chars};
pub use timeout::with_timeout;
pub use url_utils::{host_matches_suffix, host_of, is_valid_url};

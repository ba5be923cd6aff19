mod utils;

pub use utils::{content_type_from_header, decode_base64, encode_base64, normalize};

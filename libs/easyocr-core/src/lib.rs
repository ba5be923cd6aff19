pub mod common;
pub mod image2text;
pub mod input;
pub mod process;

pub mod decode;
pub mod value;

pub use decode::DecodeError;
pub use value::{Record, Value};

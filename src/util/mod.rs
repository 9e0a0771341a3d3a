mod body;
mod file_bytes_stream;
mod file_response_builder;
mod freshness;
pub(crate) mod negotiate;
mod open_file;
mod preamble;
mod requested_path;

pub use self::body::*;
pub use self::file_bytes_stream::*;
pub use self::file_response_builder::*;
pub use self::freshness::*;
pub use self::preamble::*;

pub(crate) use self::open_file::*;
pub(crate) use self::requested_path::*;

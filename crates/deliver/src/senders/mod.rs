//! Sender variant implementations
//!
//! Contains LongConnSender, ShortConnSender, and LocalFileWriter.

mod local_file;
mod long_conn;
mod short_conn;

pub use self::local_file::LocalFileWriter;
pub use self::long_conn::LongConnSender;
pub use self::short_conn::ShortConnSender;

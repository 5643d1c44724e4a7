pub mod reader;
pub mod writer;

pub use reader::SdfReader;
pub use writer::write;

pub mod reader;
pub mod writer;
pub mod types;
pub mod strings;
pub mod section;
pub mod decoder;
pub mod encoder;

pub use reader::BinaryReader;
pub use writer::{BinaryWriter, latin1_len, wide_len};
pub use types::{Rgb, Vector3, Point3};
pub use strings::StringTable;
pub use section::{Header, Identifier, Section};
pub use decoder::{Decode, Decoder};
pub use encoder::{Encode, Encoder};

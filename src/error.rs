/// Who is at fault for an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input bytes are not a well-formed CkMp file.
    MalformedInput,
    /// The in-memory map cannot be expressed in the file format.
    InvalidModel,
    /// The codec broke one of its own invariants.
    CodecDefect,
    /// The underlying source or sink failed.
    Io,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unexpected end of data at offset {offset:#x}")]
    UnexpectedEof { offset: usize },

    #[error("format violation in {context} at offset {offset:#x}: {message}")]
    FormatViolation {
        context: &'static str,
        offset: usize,
        message: String,
    },

    #[error("unknown {kind} type tag {tag} at offset {offset:#x}")]
    UnknownValueTag {
        kind: &'static str,
        tag: i32,
        offset: usize,
    },

    #[error("invalid string table index: {0}")]
    InvalidIndex(i32),

    #[error("size invariant broken for {entity}: declared {declared} bytes, wrote {actual}")]
    SizeInvariant {
        entity: &'static str,
        declared: usize,
        actual: usize,
    },

    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnexpectedEof { .. }
            | Self::FormatViolation { .. }
            | Self::UnknownValueTag { .. }
            | Self::InvalidIndex(_) => ErrorKind::MalformedInput,
            Self::InvalidModel(_) => ErrorKind::InvalidModel,
            Self::SizeInvariant { .. } => ErrorKind::CodecDefect,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    pub fn is_malformed_input(&self) -> bool {
        self.kind() == ErrorKind::MalformedInput
    }
}

pub type Result<T> = std::result::Result<T, Error>;

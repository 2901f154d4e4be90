pub mod encoder;
pub mod registry;

pub use encoder::{HashEncoder, SentenceEncoder};
pub use registry::{EncoderRegistry, RegistryError, ResolvedEncoder};

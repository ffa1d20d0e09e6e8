mod cmab;
mod errors;
mod etc1;
mod texture;
mod texture_decoder;
mod texture_format;

pub use cmab::{read_c_string, Cmab, TextureEntry};
pub use texture::Texture;
pub use texture_decoder::decode;
pub use texture_format::TextureFormat;

pub use errors::{CmabError, TextureDecodeError};

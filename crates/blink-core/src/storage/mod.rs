//! Image processing and scratch space for media uploads.

mod scratch;
mod thumbnail;

pub use scratch::ScratchFile;
pub use thumbnail::{
    decode_image, encode_jpeg, encode_png, generate_thumbnail, pixels_match, Thumbnail,
    ThumbnailFormat, ThumbnailOptions,
};

#[cfg(test)]
pub(crate) use thumbnail::tests::solid_png;

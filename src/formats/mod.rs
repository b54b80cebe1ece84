// Image file format
pub mod img;
pub mod metadata;

pub use img::{from_bytes, load_img, save_img, to_bytes, ImgError};
pub use metadata::{ImageKind, Metadata};

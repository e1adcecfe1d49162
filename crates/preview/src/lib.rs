//! Preview generation: band normalization and grayscale PNG encoding.

mod normalize;
mod png;

pub use normalize::normalize_band;
pub use png::{encode_gray_png, PNG_CONTENT_TYPE};

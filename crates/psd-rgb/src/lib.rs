/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A Photoshop PSD reader producing RGB pixels
//!
//! The decoder reads the merged composite image stored at the end of a `.psd`
//! file together with the image resources photoshop writes alongside it
//! (resolution, display info, thumbnails, copyright flag and a few more).
//!
//! Layers and masks are skipped, only the flattened image is decoded.
//!
//! Grayscale, duotone, indexed, RGB, CMYK, multichannel and Lab images are
//! supported at 8 and 16 bits per channel, stored raw or PackBits compressed.
//! Every mode is converted to 8 bit RGB.
//!
//! # Example
//! - Reading a psd file
//! ```no_run
//! use psd_rgb::errors::PSDDecodeErrors;
//! use psd_rgb::PSDDecoder;
//! use psd_rgb::zune_core::bytestream::ZCursor;
//!
//! fn main() -> Result<(), PSDDecodeErrors> {
//!     let mut decoder = PSDDecoder::new(ZCursor::new(&[] as &[u8]));
//!     let image = decoder.decode()?;
//!
//!     assert_eq!(image.pixels.len(), image.width * image.height);
//!     println!("Copyrighted: {}", decoder.is_copyrighted());
//!     Ok(())
//! }
//! ```
//!
//! # Features
//! - `std`: Reading from `std::io` sources
//! - `log`: Emit decoder traces via the `log` crate
//! - `serde`: Serialize header and resource metadata

#![forbid(unsafe_code)]
extern crate alloc;
pub extern crate zune_core;

pub use color::{cmyk_to_rgb, lab_to_rgb, PixelDecoder};
pub use color_mode::ColorModeData;
pub use constants::{ColorModes, CompressionMethod};
pub use decoder::PSDDecoder;
pub use errors::{DecodeStage, PSDDecodeErrors};
pub use header::HeaderInfo;
pub use image::DecodedImage;
pub use image_data::PixelBuffer;
pub use resources::{DisplayInfo, ImageResource, ImageResources, ResolutionInfo, ThumbnailInfo};

pub mod color;
pub mod color_mode;
pub mod constants;
pub mod decoder;
pub mod errors;
pub mod header;
mod image;
pub mod image_data;
pub mod resources;
mod serde;
mod utils;

/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use zune_core::bytestream::{ZByteReaderTrait, ZReader};
use zune_core::log::trace;
use zune_core::options::DecoderOptions;

use crate::constants::{ColorModes, MAX_CHANNELS, MAX_DIMENSIONS, PSD_IDENTIFIER_BE};
use crate::errors::PSDDecodeErrors;

/// The fixed 26 byte file header
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct HeaderInfo {
    /// Number of channels including alpha channels, 1 to 24
    pub channels:   u16,
    pub width:      usize,
    pub height:     usize,
    /// Bits per channel as stored in the file, 1, 8, 16 or 32
    pub depth:      u16,
    pub color_mode: ColorModes
}

impl HeaderInfo {
    /// Read the header from a stream positioned at the start of the file
    pub fn read<T: ZByteReaderTrait>(
        stream: &mut ZReader<T>, options: &DecoderOptions
    ) -> Result<HeaderInfo, PSDDecodeErrors> {
        let magic = stream.get_u32_be_err()?;

        if magic != PSD_IDENTIFIER_BE {
            return Err(PSDDecodeErrors::WrongMagicBytes(magic));
        }

        let version = stream.get_u16_be_err()?;

        if version != 1 {
            return Err(PSDDecodeErrors::UnsupportedFileType(version));
        }
        // Skip 6 reserved bytes
        let mut reserved = [0; 6];
        stream.read_exact_bytes(&mut reserved)?;

        let channels = stream.get_u16_be_err()?;
        let height = stream.get_u32_be_err()? as usize;
        let width = stream.get_u32_be_err()? as usize;
        let depth = stream.get_u16_be_err()?;
        let mode = stream.get_u16_be_err()?;

        if channels == 0 || width == 0 || height == 0 {
            return Err(PSDDecodeErrors::ZeroDimensions);
        }
        if channels > MAX_CHANNELS {
            return Err(PSDDecodeErrors::UnsupportedChannelCount(channels));
        }

        let max_width = options.max_width().min(MAX_DIMENSIONS);
        let max_height = options.max_height().min(MAX_DIMENSIONS);

        if width > max_width {
            return Err(PSDDecodeErrors::LargeDimensions(max_width, width));
        }
        if height > max_height {
            return Err(PSDDecodeErrors::LargeDimensions(max_height, height));
        }

        let color_mode =
            ColorModes::from_int(mode).ok_or(PSDDecodeErrors::UnknownColorMode(mode))?;

        trace!("Image width:{}", width);
        trace!("Image height:{}", height);
        trace!("Channels: {}", channels);
        trace!("Bit depth : {}", depth);
        trace!("Color mode: {:?}", color_mode);

        Ok(HeaderInfo {
            channels,
            width,
            height,
            depth,
            color_mode
        })
    }

    /// Number of pixels in the composite image
    pub const fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Bytes a single channel sample takes, 0 for bitmap images
    pub const fn bytes_per_channel(&self) -> usize {
        (self.depth / 8) as usize
    }
}

/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::vec;
use alloc::vec::Vec;

use zune_core::bytestream::{ZByteReaderTrait, ZReader};
use zune_core::log::trace;

use crate::constants::PALETTE_SIZE;
use crate::errors::PSDDecodeErrors;

/// Color mode data section.
///
/// Only indexed images (a 768 byte color table, non-interleaved) and duotone
/// images (an undocumented layout which we keep but don't interpret)
/// carry data here, for other modes the section is empty.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ColorModeData {
    pub data: Vec<u8>
}

impl ColorModeData {
    /// Read the section from a stream positioned at its length field
    pub fn read<T: ZByteReaderTrait>(
        stream: &mut ZReader<T>, stream_len: u64
    ) -> Result<ColorModeData, PSDDecodeErrors> {
        let length = stream.get_u32_be_err()? as usize;
        let available = stream_len.saturating_sub(stream.position()?) as usize;

        if length > available {
            return Err(PSDDecodeErrors::TruncatedFile {
                needed: length,
                available
            });
        }
        trace!("Color mode data length: {}", length);

        let mut data = vec![0; length];
        stream.read_exact_bytes(&mut data)?;

        Ok(ColorModeData { data })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The color table of an indexed image, present only when the
    /// section holds exactly 768 bytes
    pub fn palette(&self) -> Option<&[u8]> {
        if self.data.len() == PALETTE_SIZE {
            return Some(&self.data);
        }
        None
    }
}

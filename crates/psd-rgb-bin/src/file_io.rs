/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::ffi::OsString;
use std::fs::File;
use std::io::BufReader;

use log::trace;
use psd_rgb::{DecodedImage, PSDDecoder};
use zune_core::bit_depth::BitDepth;
use zune_core::bytestream::ZByteWriterTrait;
use zune_core::colorspace::ColorSpace;
use zune_core::options::{DecoderOptions, EncoderOptions};
use zune_ppm::PPMEncoder;

use crate::errors::CliErrors;

pub struct PsdFile {
    file_path: OsString,
    options:   DecoderOptions
}

impl PsdFile {
    pub fn new(file_path: OsString, options: DecoderOptions) -> PsdFile {
        PsdFile { file_path, options }
    }

    /// Open the file and wrap it in a decoder
    pub fn decoder(&self) -> Result<PSDDecoder<BufReader<File>>, CliErrors> {
        let fd = BufReader::new(File::open(&self.file_path)?);

        Ok(PSDDecoder::new_with_options(fd, self.options))
    }
}

/// Write `image` as an 8 bit RGB PPM, returning the bytes written
pub fn write_ppm<T: ZByteWriterTrait>(image: &DecodedImage, sink: T) -> Result<usize, CliErrors> {
    let options = EncoderOptions::new(image.width, image.height, ColorSpace::RGB, BitDepth::Eight);
    let pixels = image.as_rgb_bytes();

    let written = PPMEncoder::new(&pixels, options).encode(sink)?;
    trace!("Wrote {} ppm bytes", written);

    Ok(written)
}

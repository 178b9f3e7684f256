/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The PSD decoding pipeline.
//!
//! Sections are read in file order, each stage leaves the stream
//! right where the next one starts
//!
//! 1. File header
//! 2. Color mode data
//! 3. Image resources
//! 4. Layer and mask information, skipped
//! 5. Image data
//!
//! after which the samples are converted to RGB.
use zune_core::bit_depth::BitDepth;
use zune_core::bytestream::{ZByteReaderTrait, ZReader, ZSeekFrom};
use zune_core::colorspace::ColorSpace;
use zune_core::log::{trace, warn};
use zune_core::options::DecoderOptions;

use crate::color::{compose, PixelDecoder};
use crate::color_mode::ColorModeData;
use crate::constants::CompressionMethod;
use crate::errors::{DecodeStage, PSDDecodeErrors};
use crate::header::HeaderInfo;
use crate::image::DecodedImage;
use crate::image_data::{read_compression, read_pixels, PixelBuffer};
use crate::resources::{DisplayInfo, ImageResources, ThumbnailInfo};

/// A Photoshop PSD reader producing RGB pixels.
///
/// Layers are not composited, the decoder reads the merged
/// image Photoshop stores after the layer section.
pub struct PSDDecoder<T>
where
    T: ZByteReaderTrait
{
    stream:          ZReader<T>,
    options:         DecoderOptions,
    stream_len:      u64,
    decoded_headers: bool,
    header:          Option<HeaderInfo>,
    color_mode_data: ColorModeData,
    resources:       ImageResources,
    compression:     Option<CompressionMethod>
}

impl<T> PSDDecoder<T>
where
    T: ZByteReaderTrait
{
    /// Create a new decoder that reads a photoshop encoded file
    /// from `T` and returns pixels
    ///
    /// # Arguments
    /// - data: Data source, it has to implement the `ZByteReaderTrait`
    pub fn new(data: T) -> PSDDecoder<T> {
        Self::new_with_options(data, DecoderOptions::default())
    }

    /// Creates a new decoder with options that influence decoding routines
    ///
    /// Max width and height are respected alongside the format's own
    /// limit and strict mode rejects resource records not tagged `8BIM`
    ///
    /// # Arguments
    /// - data: Data source
    /// - options: Custom options for the decoder
    pub fn new_with_options(data: T, options: DecoderOptions) -> PSDDecoder<T> {
        PSDDecoder {
            stream: ZReader::new(data),
            options,
            stream_len: 0,
            decoded_headers: false,
            header: None,
            color_mode_data: ColorModeData::default(),
            resources: ImageResources::default(),
            compression: None
        }
    }

    /// Decode everything before the image data.
    ///
    /// This confirms the file is a photoshop image, and reads its header,
    /// color mode data and image resources then skips the layer section.
    ///
    /// Calling it more than once is a no-op
    pub fn decode_headers(&mut self) -> Result<(), PSDDecodeErrors> {
        if self.decoded_headers {
            return Ok(());
        }
        self.stream_len = self.measure_stream()?;

        let header = HeaderInfo::read(&mut self.stream, &self.options)
            .map_err(|e| e.at_stage(DecodeStage::Header))?;
        self.header = Some(header);

        self.color_mode_data = ColorModeData::read(&mut self.stream, self.stream_len)
            .map_err(|e| e.at_stage(DecodeStage::ColorModeData))?;

        let strict = self.options.strict_mode();
        self.resources = ImageResources::read(&mut self.stream, self.stream_len, strict)
            .map_err(|e| e.at_stage(DecodeStage::ImageResources))?;

        self.skip_layer_and_mask()
            .map_err(|e| e.at_stage(DecodeStage::LayerAndMask))?;

        self.decoded_headers = true;

        Ok(())
    }

    /// Total length of the stream, leaving the position untouched
    fn measure_stream(&mut self) -> Result<u64, PSDDecodeErrors> {
        let start = self.stream.position()?;
        let end = self.stream.seek(ZSeekFrom::End(0))?;
        self.stream.seek(ZSeekFrom::Start(start))?;

        trace!("Stream length: {}", end);
        Ok(end)
    }

    fn skip_layer_and_mask(&mut self) -> Result<(), PSDDecodeErrors> {
        let length = u64::from(self.stream.get_u32_be_err()?);
        let position = self.stream.position()?;

        trace!("Layer and mask section length: {}", length);

        if position + length < self.stream_len {
            self.stream.skip(length as usize)?;
        } else {
            warn!(
                "Layer and mask section of {} bytes runs past the end of the stream, not skipping it",
                length
            );
        }
        Ok(())
    }

    /// Decode the image data to interleaved samples without color conversion.
    ///
    /// Samples keep their depth and big endian order, except raw 16 bit RGB
    /// which is narrowed to 8 bits
    pub fn decode_raw(&mut self) -> Result<PixelBuffer, PSDDecodeErrors> {
        self.decode_headers()?;

        let header = self.header.ok_or(PSDDecodeErrors::Generic("Headers not decoded"))?;

        let pixels = read_compression(&mut self.stream)
            .and_then(|method| {
                trace!("Compression method: {:?}", method);
                self.compression = Some(method);
                read_pixels(&mut self.stream, &header, method, self.stream_len)
            })
            .map_err(|e| e.at_stage(DecodeStage::ImageData))?;

        Ok(pixels)
    }

    /// Decode a PSD file to RGB pixels.
    ///
    /// The result always holds exactly `width * height` pixels
    pub fn decode(&mut self) -> Result<DecodedImage, PSDDecodeErrors> {
        let buffer = self.decode_raw()?;
        let header = self.header.ok_or(PSDDecodeErrors::Generic("Headers not decoded"))?;

        let pixels = PixelDecoder::new(&header, &self.color_mode_data, &self.resources, &buffer)
            .and_then(|decoder| compose(&buffer, decoder, header.pixel_count()))
            .map_err(|e| e.at_stage(DecodeStage::ImageData))?;

        Ok(DecodedImage {
            width: header.width,
            height: header.height,
            pixels,
            pixels_per_meter: self.resources.pixels_per_meter()
        })
    }

    /// Get image width and height respectively or None if the
    /// headers haven't been decoded
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.header.map(|header| (header.width, header.height))
    }

    /// Get the bit depth of stored samples or None if the headers
    /// haven't been decoded or the depth isn't 8 or 16
    pub fn bit_depth(&self) -> Option<BitDepth> {
        match self.header?.depth {
            8 => Some(BitDepth::Eight),
            16 => Some(BitDepth::Sixteen),
            _ => None
        }
    }

    /// Bits per channel as stored in the file, including depths
    /// the decoder rejects
    pub fn bits_per_channel(&self) -> Option<u16> {
        self.header.map(|header| header.depth)
    }

    /// Colorspace of decoded pixels, always RGB once headers are decoded
    pub fn colorspace(&self) -> Option<ColorSpace> {
        self.header.map(|_| ColorSpace::RGB)
    }

    pub fn header(&self) -> Option<&HeaderInfo> {
        self.header.as_ref()
    }

    pub const fn resources(&self) -> &ImageResources {
        &self.resources
    }

    pub const fn color_mode_data(&self) -> &ColorModeData {
        &self.color_mode_data
    }

    /// Compression of the image data, known only after pixels were decoded
    pub const fn compression(&self) -> Option<CompressionMethod> {
        self.compression
    }

    pub fn is_copyrighted(&self) -> bool {
        self.resources.is_copyrighted()
    }

    pub fn global_angle(&self) -> i32 {
        self.resources.global_angle()
    }

    pub fn thumbnail(&self) -> Option<&ThumbnailInfo> {
        self.resources.thumbnail.as_ref()
    }

    pub fn display_info(&self) -> Option<&DisplayInfo> {
        self.resources.display.as_ref()
    }

    /// Horizontal resolution in pixels per inch, if the file stores one
    pub fn x_resolution(&self) -> Option<u16> {
        self.resources.resolution.map(|info| info.h_res)
    }

    /// Vertical resolution in pixels per inch, if the file stores one
    pub fn y_resolution(&self) -> Option<u16> {
        self.resources.resolution.map(|info| info.v_res)
    }

    /// Horizontal and vertical pixels per meter
    pub fn pixel_density(&self) -> (u32, u32) {
        self.resources.pixels_per_meter()
    }

    pub fn color_count(&self) -> Option<u16> {
        self.resources.color_count
    }

    pub fn transparent_index(&self) -> Option<u16> {
        self.resources.transparent_index
    }
}

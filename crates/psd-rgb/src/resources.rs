/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Image resource block
//!
//! The block is a sequence of records, each laid out as
//!
//! | Field     | Size                                  |
//! |-----------|---------------------------------------|
//! | signature | 4, `8BIM`                             |
//! | id        | 2                                     |
//! | name      | pascal string padded to an even size  |
//! | size      | 4                                     |
//! | data      | `size` rounded up to an even number   |
//!
//! A handful of ids carry metadata we expose, everything else is skipped.
use alloc::vec;
use alloc::vec::Vec;

use zune_core::bytestream::{ZByteReaderTrait, ZCursor, ZReader};
use zune_core::log::{trace, warn};

use crate::constants::{
    resource_ids, DEFAULT_GLOBAL_ANGLE, DEFAULT_PIXELS_PER_METER, RESOURCE_SIGNATURE_BE,
    THUMBNAIL_HEADER_SIZE
};
use crate::errors::PSDDecodeErrors;
use crate::utils::{pad_to_even, swap_bytes};

/// Smallest possible record, signature, id, empty name and size
const MIN_RECORD_SIZE: usize = 12;

/// Resolution info, resource 1005
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct ResolutionInfo {
    /// Horizontal resolution in pixels per inch
    pub h_res:       u16,
    pub h_res_unit:  u32,
    pub width_unit:  u16,
    /// Vertical resolution in pixels per inch
    pub v_res:       u16,
    pub v_res_unit:  u32,
    pub height_unit: u16
}

impl ResolutionInfo {
    fn read<T: ZByteReaderTrait>(reader: &mut ZReader<T>) -> Result<Self, PSDDecodeErrors> {
        Ok(ResolutionInfo {
            h_res:       reader.get_u16_be_err()?,
            h_res_unit:  reader.get_u32_be_err()?,
            width_unit:  reader.get_u16_be_err()?,
            v_res:       reader.get_u16_be_err()?,
            v_res_unit:  reader.get_u32_be_err()?,
            height_unit: reader.get_u16_be_err()?
        })
    }

    /// Horizontal and vertical density in pixels per meter
    pub fn pixels_per_meter(&self) -> (u32, u32) {
        let to_meter = |res: u16| u32::from(res) * 10000 / 254;

        (to_meter(self.h_res), to_meter(self.v_res))
    }
}

/// Display info, resource 1007
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DisplayInfo {
    pub color_space: u16,
    pub color:       [u16; 4],
    /// 0 to 100
    pub opacity:     u16,
    /// `false` for selected areas, `true` for protected areas
    pub kind:        bool,
    pub padding:     u8
}

impl DisplayInfo {
    fn read<T: ZByteReaderTrait>(reader: &mut ZReader<T>) -> Result<Self, PSDDecodeErrors> {
        let color_space = reader.get_u16_be_err()?;

        let mut color = [0; 4];
        for value in color.iter_mut() {
            *value = reader.get_u16_be_err()?;
        }
        let opacity = match reader.get_u16_be_err()? as i16 {
            value @ 0..=100 => value as u16,
            _ => 100
        };
        let kind = reader.read_u8_err()? != 0;
        let padding = reader.read_u8_err()?;

        Ok(DisplayInfo {
            color_space,
            color,
            opacity,
            kind,
            padding
        })
    }
}

/// Embedded preview image, resources 1033 and 1036
#[derive(Clone, Default, Eq, PartialEq)]
pub struct ThumbnailInfo {
    /// 1 for JPEG, 0 for raw RGB
    pub format:          u32,
    pub width:           u32,
    pub height:          u32,
    /// Padded row bytes
    pub row_stride:      u32,
    pub total_size:      u32,
    pub compressed_size: u32,
    pub bit_depth:       u16,
    pub planes:          u16,
    /// Payload following the thumbnail header, in RGB order
    pub data:            Vec<u8>
}

impl ThumbnailInfo {
    fn read(payload: &[u8], bgr: bool) -> Result<Self, PSDDecodeErrors> {
        if payload.len() < THUMBNAIL_HEADER_SIZE {
            return Err(PSDDecodeErrors::TruncatedFile {
                needed:    THUMBNAIL_HEADER_SIZE,
                available: payload.len()
            });
        }
        let mut reader = ZReader::new(ZCursor::new(payload));

        let mut thumbnail = ThumbnailInfo {
            format:          reader.get_u32_be_err()?,
            width:           reader.get_u32_be_err()?,
            height:          reader.get_u32_be_err()?,
            row_stride:      reader.get_u32_be_err()?,
            total_size:      reader.get_u32_be_err()?,
            compressed_size: reader.get_u32_be_err()?,
            bit_depth:       reader.get_u16_be_err()?,
            planes:          reader.get_u16_be_err()?,
            data:            payload[THUMBNAIL_HEADER_SIZE..].to_vec()
        };

        if bgr {
            thumbnail.data.chunks_exact_mut(3).for_each(swap_bytes);
        }
        Ok(thumbnail)
    }
}

impl core::fmt::Debug for ThumbnailInfo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ThumbnailInfo")
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("row_stride", &self.row_stride)
            .field("total_size", &self.total_size)
            .field("compressed_size", &self.compressed_size)
            .field("bit_depth", &self.bit_depth)
            .field("planes", &self.planes)
            .field("data_len", &self.data.len())
            .finish()
    }
}

/// A decoded image resource
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ImageResource {
    Resolution(ResolutionInfo),
    Display(DisplayInfo),
    Copyright(bool),
    Thumbnail(ThumbnailInfo),
    GlobalAngle(i32),
    IndexedColorCount(u16),
    TransparentIndex(u16),
    /// Anything we don't interpret, skipped by its declared size
    Opaque { id: u16 }
}

impl ImageResource {
    /// Interpret the data of resource `id`.
    ///
    /// `payload` is the whole padded data of the record, fields it doesn't
    /// cover are ignored
    pub fn parse(id: u16, payload: &[u8]) -> Result<ImageResource, PSDDecodeErrors> {
        if payload.is_empty() {
            return Ok(ImageResource::Opaque { id });
        }
        let mut reader = ZReader::new(ZCursor::new(payload));

        let resource = match id {
            resource_ids::RESOLUTION_INFO => {
                ImageResource::Resolution(ResolutionInfo::read(&mut reader)?)
            }
            resource_ids::DISPLAY_INFO => ImageResource::Display(DisplayInfo::read(&mut reader)?),
            resource_ids::COPYRIGHT_FLAG => {
                ImageResource::Copyright(reader.get_u16_be_err()? != 0)
            }
            resource_ids::THUMBNAIL_BGR => {
                ImageResource::Thumbnail(ThumbnailInfo::read(payload, true)?)
            }
            resource_ids::THUMBNAIL_RGB => {
                ImageResource::Thumbnail(ThumbnailInfo::read(payload, false)?)
            }
            resource_ids::GLOBAL_ANGLE => {
                ImageResource::GlobalAngle(reader.get_u32_be_err()? as i32)
            }
            resource_ids::INDEXED_COLOR_COUNT => {
                ImageResource::IndexedColorCount(reader.get_u16_be_err()?)
            }
            resource_ids::TRANSPARENT_INDEX => {
                ImageResource::TransparentIndex(reader.get_u16_be_err()?)
            }
            _ => ImageResource::Opaque { id }
        };
        Ok(resource)
    }
}

/// A single record as framed in the file
struct ResourceRecord {
    signature: u32,
    id:        u16,
    payload:   Vec<u8>,
    /// Bytes the record occupies in the block
    size:      usize
}

impl ResourceRecord {
    fn read<T: ZByteReaderTrait>(
        stream: &mut ZReader<T>, remaining: usize
    ) -> Result<ResourceRecord, PSDDecodeErrors> {
        let signature = stream.get_u32_be_err()?;
        let id = stream.get_u16_be_err()?;

        // pascal string, the length byte and name are padded to even as one
        // field the way photoshop writes it, an empty name takes two bytes.
        // Padding the name alone would misframe every record after an odd one
        let name_length = usize::from(stream.read_u8_err()?);
        let name_field = pad_to_even(name_length + 1);
        let mut name = vec![0; name_field - 1];
        stream.read_exact_bytes(&mut name)?;

        let data_size = pad_to_even(stream.get_u32_be_err()? as usize);
        let size = 4 + 2 + name_field + 4 + data_size;

        if size > remaining {
            return Err(PSDDecodeErrors::CorruptResourceBlock(
                "record extends past the end of the block"
            ));
        }
        let mut payload = vec![0; data_size];
        stream.read_exact_bytes(&mut payload)?;

        Ok(ResourceRecord {
            signature,
            id,
            payload,
            size
        })
    }
}

/// Metadata collected from the image resource block.
///
/// Each resource is taken from its first occurrence in the file
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ImageResources {
    pub resolution:        Option<ResolutionInfo>,
    pub display:           Option<DisplayInfo>,
    pub thumbnail:         Option<ThumbnailInfo>,
    pub copyright:         Option<bool>,
    pub global_angle:      Option<i32>,
    pub color_count:       Option<u16>,
    pub transparent_index: Option<u16>
}

fn set_once<V>(slot: &mut Option<V>, value: V, name: &str) {
    if slot.is_some() {
        warn!("Duplicate {} resource, keeping the first one", name);
        return;
    }
    *slot = Some(value);
}

impl ImageResources {
    /// Read the block from a stream positioned at its length field.
    ///
    /// `stream_len` is the total length of the stream, records with a signature
    /// other than `8BIM` fail when `strict` is set and are skipped otherwise.
    ///
    /// On success the stream is positioned right after the block.
    pub fn read<T: ZByteReaderTrait>(
        stream: &mut ZReader<T>, stream_len: u64, strict: bool
    ) -> Result<ImageResources, PSDDecodeErrors> {
        let block_length = stream.get_u32_be_err()? as usize;
        let start = stream.position()?;
        let available = stream_len.saturating_sub(start) as usize;

        if block_length > available {
            return Err(PSDDecodeErrors::TruncatedFile {
                needed: block_length,
                available
            });
        }
        trace!("Image resource block length: {}", block_length);

        let mut resources = ImageResources::default();
        let mut consumed = 0;

        while consumed < block_length && !stream.eof()? {
            let remaining = block_length - consumed;

            if remaining < MIN_RECORD_SIZE {
                warn!("Ignoring {} trailing bytes in resource block", remaining);
                break;
            }
            let record = ResourceRecord::read(stream, remaining)?;
            consumed += record.size;

            if record.signature != RESOURCE_SIGNATURE_BE {
                if strict {
                    return Err(PSDDecodeErrors::BadResourceSignature(record.signature));
                }
                warn!(
                    "Skipping resource {} with signature {:?}",
                    record.id,
                    record.signature.to_be_bytes()
                );
                continue;
            }
            trace!("Resource {} of {} bytes", record.id, record.payload.len());

            let resource = ImageResource::parse(record.id, &record.payload)?;
            resources.absorb(resource);
        }
        stream.set_position(start as usize + block_length)?;

        Ok(resources)
    }

    fn absorb(&mut self, resource: ImageResource) {
        match resource {
            ImageResource::Resolution(info) => set_once(&mut self.resolution, info, "resolution"),
            ImageResource::Display(info) => set_once(&mut self.display, info, "display info"),
            ImageResource::Thumbnail(info) => set_once(&mut self.thumbnail, info, "thumbnail"),
            ImageResource::Copyright(flag) => set_once(&mut self.copyright, flag, "copyright"),
            ImageResource::GlobalAngle(angle) => {
                set_once(&mut self.global_angle, angle, "global angle")
            }
            ImageResource::IndexedColorCount(count) => {
                set_once(&mut self.color_count, count, "indexed color count")
            }
            ImageResource::TransparentIndex(index) => {
                set_once(&mut self.transparent_index, index, "transparency index")
            }
            ImageResource::Opaque { id } => {
                trace!("Skipped resource {}", id);
            }
        }
    }

    pub fn is_copyrighted(&self) -> bool {
        self.copyright.unwrap_or(false)
    }

    /// Global lighting angle in degrees, 30 if the file doesn't set one
    pub fn global_angle(&self) -> i32 {
        self.global_angle.unwrap_or(DEFAULT_GLOBAL_ANGLE)
    }

    /// Horizontal and vertical pixels per meter, 96 DPI if
    /// the file carries no resolution info
    pub fn pixels_per_meter(&self) -> (u32, u32) {
        self.resolution
            .map(|res| res.pixels_per_meter())
            .unwrap_or((DEFAULT_PIXELS_PER_METER, DEFAULT_PIXELS_PER_METER))
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    fn record(signature: &[u8; 4], id: u16, name: &[u8], data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(signature);
        out.extend_from_slice(&id.to_be_bytes());
        out.push(name.len() as u8);
        out.extend_from_slice(name);
        if (name.len() + 1) % 2 != 0 {
            out.push(0);
        }
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        out.extend_from_slice(data);
        if data.len() % 2 != 0 {
            out.push(0);
        }
        out
    }

    fn block(records: &[Vec<u8>]) -> Vec<u8> {
        let body: Vec<u8> = records.concat();
        let mut out = (body.len() as u32).to_be_bytes().to_vec();
        out.extend_from_slice(&body);
        out
    }

    fn read(data: &[u8], strict: bool) -> Result<(ImageResources, u64), PSDDecodeErrors> {
        let mut stream = ZReader::new(ZCursor::new(data));
        let resources = ImageResources::read(&mut stream, data.len() as u64, strict)?;
        Ok((resources, stream.position()?))
    }

    fn resolution_payload(h_res: u16, v_res: u16) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&h_res.to_be_bytes());
        data.extend_from_slice(&1_u32.to_be_bytes());
        data.extend_from_slice(&2_u16.to_be_bytes());
        data.extend_from_slice(&v_res.to_be_bytes());
        data.extend_from_slice(&1_u32.to_be_bytes());
        data.extend_from_slice(&2_u16.to_be_bytes());
        data
    }

    #[test]
    fn empty_block() {
        let (resources, position) = read(&block(&[]), true).unwrap();

        assert_eq!(resources, ImageResources::default());
        assert_eq!(position, 4);
        assert_eq!(resources.global_angle(), 30);
        assert!(!resources.is_copyrighted());
        assert_eq!(resources.pixels_per_meter(), (3780, 3780));
    }

    #[test]
    fn names_are_padded_with_their_length_byte() {
        // names of length 0 through 4 all must keep the following records aligned
        for name in [&b""[..], &b"a"[..], &b"ab"[..], &b"abc"[..], &b"abcd"[..]] {
            let data = block(&[
                record(b"8BIM", 1034, name, &1_u16.to_be_bytes()),
                record(b"8BIM", 1037, b"", &90_i32.to_be_bytes())
            ]);
            let (resources, position) = read(&data, true).unwrap();

            assert!(resources.is_copyrighted(), "name {name:?}");
            assert_eq!(resources.global_angle(), 90, "name {name:?}");
            assert_eq!(position, data.len() as u64);
        }
    }

    #[test]
    fn resolution_and_density() {
        let data = block(&[record(b"8BIM", 1005, b"", &resolution_payload(72, 300))]);
        let (resources, _) = read(&data, true).unwrap();
        let resolution = resources.resolution.unwrap();

        assert_eq!(resolution.h_res, 72);
        assert_eq!(resolution.v_res, 300);
        assert_eq!(resolution.width_unit, 2);
        assert_eq!(resources.pixels_per_meter(), (2834, 11811));
    }

    #[test]
    fn display_info_clamps_opacity() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&0_u16.to_be_bytes());
        for channel in [1_u16, 2, 3, 4] {
            payload.extend_from_slice(&channel.to_be_bytes());
        }
        payload.extend_from_slice(&150_u16.to_be_bytes());
        payload.extend_from_slice(&[1, 0]);

        let data = block(&[record(b"8BIM", 1007, b"", &payload)]);
        let (resources, _) = read(&data, true).unwrap();
        let display = resources.display.unwrap();

        assert_eq!(display.color, [1, 2, 3, 4]);
        assert_eq!(display.opacity, 100);
        assert!(display.kind);
    }

    #[test]
    fn bgr_thumbnails_are_swapped() {
        let mut payload = Vec::new();
        for field in [0_u32, 2, 1, 8, 6, 6] {
            payload.extend_from_slice(&field.to_be_bytes());
        }
        payload.extend_from_slice(&24_u16.to_be_bytes());
        payload.extend_from_slice(&1_u16.to_be_bytes());
        payload.extend_from_slice(&[1, 2, 3, 4, 5, 6]);

        let data = block(&[record(b"8BIM", 1033, b"", &payload)]);
        let thumbnail = read(&data, true).unwrap().0.thumbnail.unwrap();
        assert_eq!(thumbnail.width, 2);
        assert_eq!(thumbnail.data, [3, 2, 1, 6, 5, 4]);

        let data = block(&[record(b"8BIM", 1036, b"", &payload)]);
        let thumbnail = read(&data, true).unwrap().0.thumbnail.unwrap();
        assert_eq!(thumbnail.data, [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn unknown_and_odd_sized_records_are_skipped() {
        let data = block(&[
            record(b"8BIM", 1039, b"icc", &[9; 5]),
            record(b"8BIM", 1046, b"", &16_u16.to_be_bytes()),
            record(b"8BIM", 1047, b"", &3_u16.to_be_bytes())
        ]);
        let (resources, position) = read(&data, true).unwrap();

        assert_eq!(resources.color_count, Some(16));
        assert_eq!(resources.transparent_index, Some(3));
        assert_eq!(position, data.len() as u64);
    }

    #[test]
    fn first_occurrence_wins() {
        let data = block(&[
            record(b"8BIM", 1037, b"", &45_i32.to_be_bytes()),
            record(b"8BIM", 1037, b"", &(-10_i32).to_be_bytes())
        ]);
        assert_eq!(read(&data, true).unwrap().0.global_angle(), 45);
    }

    #[test]
    fn foreign_signatures() {
        let data = block(&[
            record(b"MeSa", 1037, b"", &45_i32.to_be_bytes()),
            record(b"8BIM", 1034, b"", &1_u16.to_be_bytes())
        ]);

        assert!(matches!(
            read(&data, true),
            Err(PSDDecodeErrors::BadResourceSignature(0x4D65_5361))
        ));

        let (resources, _) = read(&data, false).unwrap();
        assert_eq!(resources.global_angle, None);
        assert!(resources.is_copyrighted());
    }

    #[test]
    fn records_may_not_overrun_the_block() {
        let mut data = block(&[record(b"8BIM", 1037, b"", &45_i32.to_be_bytes())]);
        // shrink the declared block length below the record size
        data[..4].copy_from_slice(&14_u32.to_be_bytes());

        assert!(matches!(
            read(&data, true),
            Err(PSDDecodeErrors::CorruptResourceBlock(_))
        ));
    }

    #[test]
    fn block_longer_than_stream() {
        let mut data = block(&[]);
        data[..4].copy_from_slice(&100_u32.to_be_bytes());

        assert!(matches!(
            read(&data, true),
            Err(PSDDecodeErrors::TruncatedFile { needed: 100, .. })
        ));
    }
}

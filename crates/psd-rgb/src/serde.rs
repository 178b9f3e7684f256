/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

#![cfg(feature = "serde")]
//! Serialization of image metadata

use alloc::format;

use serde::ser::*;

use crate::constants::{ColorModes, CompressionMethod};
use crate::header::HeaderInfo;
use crate::resources::{DisplayInfo, ImageResources, ResolutionInfo, ThumbnailInfo};

impl Serialize for ColorModes {
    #[allow(clippy::uninlined_format_args)]
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        serializer.serialize_str(&format!("{:?}", self))
    }
}

impl Serialize for CompressionMethod {
    #[allow(clippy::uninlined_format_args)]
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        serializer.serialize_str(&format!("{:?}", self))
    }
}

impl Serialize for HeaderInfo {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        let mut state = serializer.serialize_struct("HeaderInfo", 5)?;

        state.serialize_field("channels", &self.channels)?;
        state.serialize_field("width", &self.width)?;
        state.serialize_field("height", &self.height)?;
        state.serialize_field("depth", &self.depth)?;
        state.serialize_field("color_mode", &self.color_mode)?;

        state.end()
    }
}

impl Serialize for ResolutionInfo {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        let mut state = serializer.serialize_struct("ResolutionInfo", 6)?;

        state.serialize_field("h_res", &self.h_res)?;
        state.serialize_field("h_res_unit", &self.h_res_unit)?;
        state.serialize_field("width_unit", &self.width_unit)?;
        state.serialize_field("v_res", &self.v_res)?;
        state.serialize_field("v_res_unit", &self.v_res_unit)?;
        state.serialize_field("height_unit", &self.height_unit)?;

        state.end()
    }
}

impl Serialize for DisplayInfo {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        let mut state = serializer.serialize_struct("DisplayInfo", 4)?;

        state.serialize_field("color_space", &self.color_space)?;
        state.serialize_field("color", &self.color)?;
        state.serialize_field("opacity", &self.opacity)?;
        state.serialize_field("kind", &self.kind)?;

        state.end()
    }
}

impl Serialize for ThumbnailInfo {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        let mut state = serializer.serialize_struct("ThumbnailInfo", 7)?;

        state.serialize_field("format", &self.format)?;
        state.serialize_field("width", &self.width)?;
        state.serialize_field("height", &self.height)?;
        state.serialize_field("row_stride", &self.row_stride)?;
        state.serialize_field("bit_depth", &self.bit_depth)?;
        state.serialize_field("planes", &self.planes)?;
        // payload may be megabytes, only its size is useful in metadata
        state.serialize_field("data_length", &self.data.len())?;

        state.end()
    }
}

impl Serialize for ImageResources {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        let mut state = serializer.serialize_struct("ImageResources", 7)?;

        state.serialize_field("resolution", &self.resolution)?;
        state.serialize_field("display", &self.display)?;
        state.serialize_field("thumbnail", &self.thumbnail)?;
        state.serialize_field("copyright", &self.copyright)?;
        state.serialize_field("global_angle", &self.global_angle)?;
        state.serialize_field("color_count", &self.color_count)?;
        state.serialize_field("transparent_index", &self.transparent_index)?;

        state.end()
    }
}

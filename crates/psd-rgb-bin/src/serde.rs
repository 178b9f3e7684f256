/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::ffi::OsString;

use psd_rgb::{HeaderInfo, ImageResources};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

pub struct Metadata<'a> {
    file:            OsString,
    size:            u64,
    header:          &'a HeaderInfo,
    color_mode_data: usize,
    resources:       &'a ImageResources,
    pixel_density:   (u32, u32)
}

impl<'a> Metadata<'a> {
    pub fn new(
        file: OsString, size: u64, header: &'a HeaderInfo, color_mode_data: usize,
        resources: &'a ImageResources
    ) -> Metadata<'a> {
        Metadata {
            file,
            size,
            header,
            color_mode_data,
            resources,
            pixel_density: resources.pixels_per_meter()
        }
    }
}

impl<'a> Serialize for Metadata<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        let mut state = serializer.serialize_struct("PsdMetadata", 6)?;

        state.serialize_field("file", &self.file.to_string_lossy())?;
        state.serialize_field("file_size", &self.size)?;
        state.serialize_field("header", self.header)?;
        state.serialize_field("color_mode_data_length", &self.color_mode_data)?;
        state.serialize_field("resources", self.resources)?;
        state.serialize_field("pixels_per_meter", &self.pixel_density)?;

        state.end()
    }
}

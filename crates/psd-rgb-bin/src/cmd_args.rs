/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use clap::{value_parser, Arg, ArgAction, Command};

static LENIENT_HELP: &str = "Skip image resources not tagged 8BIM

By default a resource record with a foreign signature aborts decoding.
With this flag such records are skipped with a warning.";

#[rustfmt::skip]
pub fn create_cmd_args() -> Command {
    Command::new("psdrgb")
        .about("Decode Photoshop PSD files to RGB images")
        .arg(Arg::new("in")
            .short('i')
            .help("Input file to read data from")
            .long("input")
            .action(ArgAction::Append)
            .required(true))
        .arg(Arg::new("out")
            .short('o')
            .long("output")
            .help("Write decoded pixels as a binary PPM to this file")
            .action(ArgAction::Append))
        .arg(Arg::new("thumbnail")
            .long("thumbnail")
            .help("Write the embedded thumbnail payload to this file")
            .action(ArgAction::Append))
        .arg(Arg::new("probe")
            .long("probe")
            .action(ArgAction::SetTrue)
            .help("Print header and resource metadata as JSON"))
        .arg(Arg::new("all-yes")
            .short('y')
            .long("yes")
            .action(ArgAction::SetTrue)
            .help("Overwrite existing output files without asking"))
        .arg(Arg::new("debug")
            .long("debug")
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display debug information and higher"))
        .arg(Arg::new("trace")
            .long("trace")
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display very verbose information"))
        .arg(Arg::new("warn")
            .long("warn")
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display warnings and errors"))
        .arg(Arg::new("info")
            .long("info")
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display information about the decoding options"))
        .arg(Arg::new("max-width")
            .long("max-width")
            .help_heading("ADVANCED")
            .help("Maximum width of images to decode")
            .value_parser(value_parser!(usize))
            .default_value("30000"))
        .arg(Arg::new("max-height")
            .long("max-height")
            .help_heading("ADVANCED")
            .help("Maximum height of images to decode")
            .value_parser(value_parser!(usize))
            .default_value("30000"))
        .arg(Arg::new("lenient")
            .long("lenient")
            .action(ArgAction::SetTrue)
            .help_heading("ADVANCED")
            .help("Skip image resources with foreign signatures")
            .long_help(LENIENT_HELP))
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use anyhow::{Context, Result};
use clap::{App, Arg, ArgMatches};
use seamcarve::{dither, energy_to_image, estimate, Config, SeamCarver, TargetSize};
use std::fs;
use std::str::FromStr;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn number<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<Option<T>> {
    match matches.value_of(name) {
        None => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| anyhow::anyhow!("--{} expects a number, got {:?}", name, v)),
    }
}

fn load_config(matches: &ArgMatches) -> Result<Config> {
    let mut config = match matches.value_of("config") {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
            toml::from_str(&text).with_context(|| format!("parsing {}", path))?
        }
        None => Config::default(),
    };
    if let Some(threshold) = number(matches, "sobel")? {
        config = config.with_sobel_threshold(threshold);
    }
    if let Some(radius) = number(matches, "blur")? {
        config = config.with_blur_radius(radius);
    }
    if matches.is_present("debug") {
        config = config.with_debug(true);
    }
    Ok(config)
}

fn target(matches: &ArgMatches) -> Result<TargetSize> {
    let width = number(matches, "width")?.unwrap_or(0);
    let height = number(matches, "height")?.unwrap_or(0);
    Ok(if matches.is_present("square") {
        TargetSize::Square { width, height }
    } else if matches.is_present("percent") {
        TargetSize::Percent { width, height }
    } else {
        TargetSize::Exact { width, height }
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let matches = App::new("seamcarve")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Content-aware image resizing")
        .arg(
            Arg::with_name("input")
                .help("The image to resize")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .help("Where to write the result")
                .required(true)
                .index(2),
        )
        .arg(Arg::with_name("width").long("width").takes_value(true).help("New width (0 keeps it)"))
        .arg(Arg::with_name("height").long("height").takes_value(true).help("New height (0 keeps it)"))
        .arg(Arg::with_name("percent").long("percent").help("Read width and height as percentages"))
        .arg(Arg::with_name("square").long("square").help("Resize to a square on the shorter of width and height"))
        .arg(Arg::with_name("prescale").long("prescale").help("Rescale before carving when both dimensions shrink"))
        .arg(Arg::with_name("sobel").long("sobel").takes_value(true).help("Sobel threshold"))
        .arg(Arg::with_name("blur").long("blur").takes_value(true).help("Blur radius"))
        .arg(Arg::with_name("mask").long("mask").takes_value(true).help("Protect mask image"))
        .arg(Arg::with_name("rmask").long("rmask").takes_value(true).help("Remove mask image"))
        .arg(Arg::with_name("config").long("config").takes_value(true).help("TOML configuration file"))
        .arg(Arg::with_name("debug").long("debug").help("Paint seams instead of hiding them"))
        .arg(Arg::with_name("energy").long("energy").help("Write the energy map instead of resizing"))
        .get_matches();

    let config = load_config(&matches)?;
    let input = matches.value_of("input").context("missing input")?;
    let output = matches.value_of("output").context("missing output")?;
    let image = image::open(input)
        .with_context(|| format!("opening {}", input))?
        .to_rgba8();

    if matches.is_present("energy") {
        let energy = estimate(&image, config.sobel_threshold)?;
        energy_to_image(&energy)
            .save(output)
            .with_context(|| format!("writing {}", output))?;
        return Ok(());
    }

    let (width, height) = target(&matches)?.resolve(image.dimensions())?;

    let mut carver = SeamCarver::new(image, config)?;
    for (flag, protect) in &[("mask", true), ("rmask", false)] {
        if let Some(path) = matches.value_of(flag) {
            let mask = dither(&image::open(path).with_context(|| format!("opening {}", path))?);
            carver = if *protect {
                carver.with_protect_mask(mask)?
            } else {
                carver.with_remove_mask(mask)?
            };
        }
    }

    if matches.is_present("prescale") {
        carver.prescale((width, height))?;
    }
    let from = carver.dimensions();
    carver.resize(width, height)?;
    info!(
        ?from,
        to = ?carver.dimensions(),
        seams = carver.iterations(),
        inserted = carver.history().len(),
        "resized"
    );

    carver
        .into_image()
        .save(output)
        .with_context(|| format!("writing {}", output))?;
    Ok(())
}

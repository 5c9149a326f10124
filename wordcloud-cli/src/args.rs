//! Command-line options.

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use wordcloud_core::LayoutConfig;

pub const USAGE: &str = "\
usage: wordcloud [OPTIONS] [INPUT]

Lay out a JSON word list ([{\"text\": .., \"size\": ..}]) and print the
renderer payload. INPUT defaults to stdin.

options:
  --config PATH       layout configuration (JSON, camelCase keys)
  --width N           canvas width in pixels
  --height N          canvas height in pixels
  --padding N         clearance around each word in pixels
  --font-scale F      font size of the lightest word
  --seed N            rotation seed
  --threads N         mask-building threads
  --deadline-ms N     stop placing words after N milliseconds
  --block             use synthetic block glyphs instead of system fonts
  --out PATH          write the payload here instead of stdout
  --svg PATH          also write an SVG preview
  -h, --help          show this message";

#[derive(Error, Debug, PartialEq)]
pub enum ArgsError {
    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("option '{0}' needs a value")]
    MissingValue(String),

    #[error("invalid value '{value}' for '{option}'")]
    InvalidValue { option: String, value: String },

    #[error("unexpected argument '{0}'")]
    Unexpected(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Options {
    pub input: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub padding: Option<u32>,
    pub font_scale: Option<f32>,
    pub seed: Option<u64>,
    pub threads: Option<usize>,
    pub deadline_ms: Option<u64>,
    pub block: bool,
    pub out: Option<PathBuf>,
    pub svg: Option<PathBuf>,
    pub help: bool,
}

impl Options {
    pub fn parse<I>(args: I) -> Result<Self, ArgsError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = Options::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let mut value = |name: &str| {
                args.next()
                    .ok_or_else(|| ArgsError::MissingValue(name.to_owned()))
            };
            match arg.as_str() {
                "-h" | "--help" => options.help = true,
                "--block" => options.block = true,
                "--config" => options.config = Some(value("--config")?.into()),
                "--out" => options.out = Some(value("--out")?.into()),
                "--svg" => options.svg = Some(value("--svg")?.into()),
                "--width" => options.width = Some(number("--width", value("--width")?)?),
                "--height" => options.height = Some(number("--height", value("--height")?)?),
                "--padding" => options.padding = Some(number("--padding", value("--padding")?)?),
                "--font-scale" => {
                    options.font_scale = Some(number("--font-scale", value("--font-scale")?)?)
                }
                "--seed" => options.seed = Some(number("--seed", value("--seed")?)?),
                "--threads" => options.threads = Some(number("--threads", value("--threads")?)?),
                "--deadline-ms" => {
                    options.deadline_ms = Some(number("--deadline-ms", value("--deadline-ms")?)?)
                }
                "-" => options.input = None,
                flag if flag.starts_with('-') => {
                    return Err(ArgsError::UnknownOption(flag.to_owned()))
                }
                path if options.input.is_none() => options.input = Some(PathBuf::from(path)),
                other => return Err(ArgsError::Unexpected(other.to_owned())),
            }
        }
        Ok(options)
    }

    /// Overlay flags on a loaded configuration.
    pub fn apply(&self, config: &mut LayoutConfig) {
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(padding) = self.padding {
            config.padding = padding;
        }
        if let Some(font_scale) = self.font_scale {
            config.font_scale = font_scale;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.threads.is_some() {
            config.threads = self.threads;
        }
    }
}

fn number<T: FromStr>(option: &str, value: String) -> Result<T, ArgsError> {
    value.parse().map_err(|_| ArgsError::InvalidValue {
        option: option.to_owned(),
        value,
    })
}

//! `wordcloud`: lay out a word list from the command line.
//!
//! Reads the analytics JSON, runs the placement engine and prints the
//! renderer payload.  Logging goes through `env_logger`; set `RUST_LOG=debug`
//! for per-word drop reasons.

mod args;
mod svg;

use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::thread;
use std::time::Duration;

use log::{info, warn};
use wordcloud_core::{ConfigError, LayoutConfig, LayoutResult, SeededRng, Word};
use wordcloud_layout::{bridge, BlockRasterizer, CancelToken, CloudLayout, GlyphRasterizer};
use wordcloud_text::CosmicRasterizer;

use crate::args::{Options, USAGE};

fn read_input(path: Option<&Path>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn load_config(options: &Options) -> Result<LayoutConfig, Box<dyn Error>> {
    let mut config = match &options.config {
        Some(path) => LayoutConfig::from_json(&fs::read_to_string(path)?)?,
        None => LayoutConfig::default(),
    };
    options.apply(&mut config);
    Ok(config)
}

/// Run the engine, arming a timer that cancels it after `deadline`.
fn lay_out<R: GlyphRasterizer>(
    config: LayoutConfig,
    rasterizer: R,
    words: &[Word],
    deadline: Option<Duration>,
) -> Result<LayoutResult, ConfigError> {
    let layout = CloudLayout::new(config, rasterizer)?;
    let cancel = CancelToken::new();
    if let Some(deadline) = deadline {
        let timer = cancel.clone();
        thread::spawn(move || {
            thread::sleep(deadline);
            timer.cancel();
        });
    }
    let mut rng = SeededRng::new(layout.config().seed);
    Ok(layout.run_with(words, &mut rng, &cancel))
}

fn run() -> Result<(), Box<dyn Error>> {
    let options = Options::parse(std::env::args().skip(1))?;
    if options.help {
        println!("{USAGE}");
        return Ok(());
    }

    let config = load_config(&options)?;
    let words = bridge::parse_words(&read_input(options.input.as_deref())?)?;
    let deadline = options.deadline_ms.map(Duration::from_millis);

    let result = if options.block {
        lay_out(config.clone(), BlockRasterizer::new(), &words, deadline)?
    } else {
        let rasterizer = CosmicRasterizer::from_config(&config);
        if rasterizer.has_fonts() {
            lay_out(config.clone(), rasterizer, &words, deadline)?
        } else {
            warn!("No system fonts found, falling back to block glyphs");
            lay_out(config.clone(), BlockRasterizer::new(), &words, deadline)?
        }
    };

    if result.interrupted {
        warn!("Deadline reached before every word was tried");
    }

    let payload = bridge::render_payload(&result, &config);
    let json = serde_json::to_string_pretty(&payload)?;
    match &options.out {
        Some(path) => {
            fs::write(path, json)?;
            info!("Wrote payload to {}", path.display());
        }
        None => println!("{json}"),
    }

    if let Some(path) = &options.svg {
        fs::write(path, svg::render(&payload, &config))?;
        info!("Wrote preview to {}", path.display());
    }

    if let Some(notice) = bridge::dropped_notice(&result) {
        eprintln!("{notice}");
    }
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

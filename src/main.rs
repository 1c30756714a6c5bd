//! Gemswaptui — match-3 gem-swap puzzle game in the terminal.

mod app;
mod board;
mod bombs;
mod deadlock;
mod events;
mod game;
mod input;
mod layout;
mod matches;
mod theme;
mod ui;

#[cfg(test)]
mod testutil;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};

fn main() -> Result<()> {
    let args = Args::parse();
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();
    let overrides = match &args.layout {
        Some(path) => layout::load(path)
            .with_context(|| format!("loading layout {}", path.display()))?,
        None => Vec::new(),
    };
    let game = game::GameState::new(
        args.width as usize,
        args.height as usize,
        &overrides,
        args.colors,
        args.seed,
    )
    .context("setting up the board")?;
    let mut app = App::new(args, overrides, theme, game);
    app.run()?;
    Ok(())
}

/// Match-3 gem-swap puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "gemswaptui",
    version,
    about = "Match-3 gem-swap puzzle in the terminal. Swap adjacent gems to line up three or more.",
    long_about = "Gemswaptui is a terminal match-3 puzzle game.\n\n\
        Swap adjacent gems to line up three or more of a colour. Matched gems vanish, the rest \
        fall, fresh gems drop in, and chains cascade until the board settles. Matches of four or \
        more leave a bomb behind; a deadlocked board reshuffles itself.\n\n\
        CONTROLS:\n  Arrows / hjkl        Move cursor\n  Shift+Arrows / HJKL  Swap in that direction\n  n                    New game           Q / Esc    Quit\n\n\
        Use --layout to punch holes or armour cells, --seed for a reproducible board, and \
        --theme to load a btop-style theme (e.g. onedark.theme)."
)]
pub struct Args {
    /// Board width in columns.
    #[arg(long, default_value = "8", value_name = "COLS")]
    pub width: u16,

    /// Board height in rows.
    #[arg(long, default_value = "8", value_name = "ROWS")]
    pub height: u16,

    /// Number of gem colours in play (3..=6). Fewer colours cascade more.
    #[arg(short, long, default_value = "5", value_name = "N")]
    pub colors: u8,

    /// RNG seed for a reproducible board. Random when not set.
    #[arg(short, long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Path to a layout file: one `x y blank` or `x y breakable <hp>` per line.
    #[arg(short, long, value_name = "FILE")]
    pub layout: Option<std::path::PathBuf>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

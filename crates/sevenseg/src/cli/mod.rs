//! CLI subcommands — display status, segment toggles, configuration.

mod config_cmd;
mod status;
mod toggle;

use std::path::{Path, PathBuf};

use clap::Subcommand;
use serde::Serialize;

pub(super) use sevenseg_lib::codec::{self, BitMask, SegmentIndex};
pub(super) use sevenseg_lib::config::Config;
pub(super) use sevenseg_lib::device::{DeviceChannel, FileChannel};
pub(super) use sevenseg_lib::error::Result;
pub(super) use sevenseg_lib::state::DisplayState;

const PADDING: usize = 2;

/// Flags shared by every subcommand.
pub struct GlobalOpts {
    pub json: bool,
    pub device: Option<String>,
    pub config: Option<PathBuf>,
}

/// Compute alignment width for a command's key-value output.
/// Ensures at least PADDING spaces after the longest key in either level,
/// with top-level and indent values aligned to the same column.
pub(super) fn kv_width(top: &[&str], indent: &[&str]) -> usize {
    let top_max = top.iter().map(|k| k.len()).max().unwrap_or(0);
    let indent_max = indent.iter().map(|k| k.len()).max().unwrap_or(0);
    let top_need = if top.is_empty() { 0 } else { top_max + PADDING };
    // Indent keys lose 2 chars of inner width to the "  " prefix
    let indent_need = if indent.is_empty() {
        0
    } else {
        indent_max + PADDING + 2
    };
    top_need.max(indent_need)
}

pub(super) fn format_kv(key: &str, value: impl std::fmt::Display, w: usize) -> String {
    format!("{key:<width$}{value}", width = w)
}

pub(super) fn kv(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("{}", format_kv(key, value, w));
}

pub(super) fn kv_indent(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("  {key:<width$}{value}", width = w - 2);
}

/// `0b11001100 (204)`
pub(super) fn format_mask(mask: BitMask) -> String {
    format!("{mask} ({})", mask.bits())
}

pub(super) fn on_off(lit: bool) -> &'static str {
    if lit { "on" } else { "off" }
}

/// Load config from `--config` or the platform path, then apply the
/// environment and `--device` overrides, in that order.
pub(super) fn load_config(opts: &GlobalOpts) -> Config {
    let config = match opts.config.as_deref() {
        Some(path) => {
            let (config, warnings) = Config::load_from(path);
            for w in &warnings {
                log::warn!("{w}");
            }
            config
        }
        None => Config::load(),
    };
    config
        .apply_env()
        .with_device_override(opts.device.as_deref())
}

/// Path of the config file in effect (custom or platform default).
pub(super) fn config_file_path(opts: &GlobalOpts) -> Option<PathBuf> {
    opts.config.clone().or_else(Config::path)
}

/// Read the display once. Any failure here is fatal for the command.
pub(super) fn open_display(config: &Config) -> Result<DisplayState<FileChannel>> {
    let channel = config.channel()?;
    log::debug!("opening {}", channel.describe());
    Ok(DisplayState::initialize(channel)?)
}

pub(super) fn print_json(value: &impl Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

// ── JSON output structs ──

#[derive(Serialize)]
pub(super) struct SegmentJson {
    pub index: SegmentIndex,
    pub label: char,
    pub lit: bool,
}

impl SegmentJson {
    pub fn all(mask: BitMask) -> Vec<SegmentJson> {
        SegmentIndex::ALL
            .into_iter()
            .map(|s| SegmentJson {
                index: s,
                label: s.label(),
                lit: mask.is_lit(s),
            })
            .collect()
    }
}

#[derive(Serialize)]
pub(super) struct StatusOutput {
    pub version: String,
    pub device: String,
    pub mask: BitMask,
    pub frame: String,
    pub segments: Vec<SegmentJson>,
}

#[derive(Serialize)]
pub(super) struct ToggleStepJson {
    pub index: SegmentIndex,
    pub label: char,
    pub lit: bool,
    pub mask: BitMask,
    pub frame: String,
    pub persisted: bool,
    pub error: Option<String>,
}

#[derive(Serialize)]
pub(super) struct ToggleOutput {
    pub device: String,
    pub initial: BitMask,
    pub mask: BitMask,
    pub steps: Vec<ToggleStepJson>,
}

#[derive(Serialize)]
pub(super) struct ConfigOutput {
    pub config_file: Option<String>,
    pub config_file_exists: bool,
    pub settings: Config,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the display state read from the device
    Status,

    /// Toggle one or more segments (1-7 or A-G), in order
    Toggle {
        /// Segments to toggle, e.g. `1 g C`
        #[arg(required = true, value_name = "SEGMENT")]
        segments: Vec<SegmentIndex>,
    },

    /// Show current configuration and file paths
    Config,
}

pub fn run(cmd: Command, opts: &GlobalOpts) -> Result<()> {
    match cmd {
        Command::Status => status::cmd_status(opts),
        Command::Toggle { segments } => toggle::cmd_toggle(&segments, opts),
        Command::Config => config_cmd::cmd_config(opts),
    }
}

/// Does the file at `path` exist?
pub(super) fn exists(path: Option<&Path>) -> bool {
    path.is_some_and(|p| p.exists())
}

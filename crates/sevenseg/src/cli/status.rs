//! `status` subcommand — show the display state read from the device.

use super::{
    DeviceChannel, GlobalOpts, Result, SegmentJson, StatusOutput, codec, format_mask, kv,
    kv_indent, kv_width, load_config, on_off, open_display, print_json,
};

pub(super) fn cmd_status(opts: &GlobalOpts) -> Result<()> {
    let config = load_config(opts);
    let display = open_display(&config)?;
    let mask = display.current();
    let device = display.channel().describe();

    if opts.json {
        return print_json(&StatusOutput {
            version: env!("CARGO_PKG_VERSION").to_string(),
            device,
            mask,
            frame: codec::encode(mask).to_string(),
            segments: SegmentJson::all(mask),
        });
    }

    let w = kv_width(&["Device:", "State:", "Frame:", "Segments:"], &["A:"]);
    kv("Device:", &device, w);
    kv("State:", format_mask(mask), w);
    kv("Frame:", codec::encode(mask), w);
    println!("Segments:");
    for seg in SegmentJson::all(mask) {
        kv_indent(&format!("{}:", seg.label), on_off(seg.lit), w);
    }
    Ok(())
}

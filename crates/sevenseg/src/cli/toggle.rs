//! `toggle` subcommand — flip segments and persist each new state.

use super::{
    DeviceChannel, GlobalOpts, Result, SegmentIndex, ToggleOutput, ToggleStepJson, codec,
    format_mask, load_config, on_off, open_display, print_json,
};

/// Toggle `segments` in order, one device write each.
///
/// A failed write doesn't stop the sequence or fail the command: the state
/// keeps the flip and the failure is logged and reported per step.
pub(super) fn cmd_toggle(segments: &[SegmentIndex], opts: &GlobalOpts) -> Result<()> {
    let config = load_config(opts);
    let display = open_display(&config)?;
    let initial = display.current();

    let steps: Vec<ToggleStepJson> = segments
        .iter()
        .map(|&seg| {
            let t = display.toggle(seg);
            ToggleStepJson {
                index: seg,
                label: seg.label(),
                lit: t.mask.is_lit(seg),
                mask: t.mask,
                frame: codec::encode(t.mask).to_string(),
                persisted: t.persisted(),
                error: t.write_error.map(|e| e.to_string()),
            }
        })
        .collect();

    if opts.json {
        return print_json(&ToggleOutput {
            device: display.channel().describe(),
            initial,
            mask: display.current(),
            steps,
        });
    }

    for step in &steps {
        let note = if step.persisted { "" } else { "  (not persisted)" };
        println!(
            "Segment {}: {:<3}  {}{note}",
            step.label,
            on_off(step.lit),
            format_mask(step.mask)
        );
    }
    Ok(())
}

//! `config` subcommand — show current configuration and file paths.

use super::{
    ConfigOutput, GlobalOpts, Result, config_file_path, exists, kv, kv_indent, kv_width,
    load_config, print_json,
};

pub(super) fn cmd_config(opts: &GlobalOpts) -> Result<()> {
    let config = load_config(opts);
    let config_path = config_file_path(opts);
    let config_exists = exists(config_path.as_deref());

    if opts.json {
        return print_json(&ConfigOutput {
            config_file: config_path.as_ref().map(|p| p.display().to_string()),
            config_file_exists: config_exists,
            settings: config,
        });
    }

    let w = kv_width(&["Config file:"], &["device_path:", "io_timeout_ms:"]);

    match &config_path {
        Some(p) => {
            if config_exists {
                kv("Config file:", format_args!("{} (loaded)", p.display()), w);
            } else {
                kv(
                    "Config file:",
                    format_args!("{} (not found, using defaults)", p.display()),
                    w,
                );
            }
        }
        None => kv("Config file:", "(no config directory)", w),
    }
    println!();

    println!("Settings:");
    kv_indent("device_path:", &config.device_path, w);
    let timeout = if config.io_timeout_ms == 0 {
        "0 (disabled)".to_string()
    } else {
        format!("{} ms", config.io_timeout_ms)
    };
    kv_indent("io_timeout_ms:", timeout, w);
    Ok(())
}

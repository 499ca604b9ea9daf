//! Build script for lanedodge-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates game.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Keys accepted in each section, with their allowed integer range.
/// `None` marks a string key.
const SCHEMA: &[(&str, &[(&str, Option<(i64, i64)>)])] = &[
    (
        "playfield",
        &[
            ("width", Some((4, 16))),
            ("player_column", Some((0, 13))),
            ("start_lane", None),
        ],
    ),
    (
        "spawn",
        &[
            ("min_ticks", Some((1, 255))),
            ("max_ticks", Some((1, 255))),
            ("top_lane_percent", Some((0, 100))),
        ],
    ),
    ("input", &[("debounce_ticks", Some((0, 255)))]),
    (
        "clock",
        &[
            ("tick_hz", Some((1, u32::MAX as i64))),
            ("frame_ms", Some((1, u32::MAX as i64))),
        ],
    ),
    (
        "link",
        &[
            ("baudrate", Some((1, u32::MAX as i64))),
            ("scan_timeout_ms", Some((1, u32::MAX as i64))),
        ],
    ),
    (
        "display",
        &[
            ("columns", Some((1, 40))),
            ("hud_column", Some((0, 40))),
            ("flourish_flashes", Some((0, 255))),
            ("flourish_period_ms", Some((0, u16::MAX as i64))),
        ],
    ),
];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate game.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=game.toml");

    let config_path = Path::new("game.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: game.toml not found!                                     ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds a game.toml board configuration file.       ║\n\
            ║  Please create one in the lanedodge-firmware directory.          ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read game.toml                                 ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in game.toml                         ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_schema(&config, &mut errors);
    validate_relations(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid settings in game.toml                            ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=game.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Every section and key must be known, integers in range, strings valid
fn validate_schema(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        errors.push("Top level must be a table".to_string());
        return;
    };

    for (section, value) in root {
        let Some((_, keys)) = SCHEMA.iter().find(|(name, _)| name == section) else {
            errors.push(format!("Unknown section [{}]", section));
            continue;
        };
        let Some(table) = value.as_table() else {
            errors.push(format!("[{}] must be a table", section));
            continue;
        };

        for (key, value) in table {
            let Some((_, range)) = keys.iter().find(|(name, _)| name == key) else {
                errors.push(format!("Unknown key {}.{}", section, key));
                continue;
            };
            match (range, value) {
                (Some((min, max)), toml::Value::Integer(n)) => {
                    if n < min || n > max {
                        errors.push(format!("{}.{} must be {}..={}", section, key, min, max));
                    }
                }
                (Some(_), _) => errors.push(format!("{}.{} must be an integer", section, key)),
                (None, toml::Value::String(s)) => {
                    if s != "top" && s != "bottom" {
                        errors.push(format!("{}.{} must be \"top\" or \"bottom\"", section, key));
                    }
                }
                (None, _) => errors.push(format!("{}.{} must be a string", section, key)),
            }
        }
    }
}

fn get_int(config: &toml::Value, section: &str, key: &str, default: i64) -> i64 {
    config
        .get(section)
        .and_then(|s| s.get(key))
        .and_then(|v| v.as_integer())
        .unwrap_or(default)
}

/// Checks that span keys, mirroring `GameConfig::validate`
fn validate_relations(config: &toml::Value, errors: &mut Vec<String>) {
    let width = get_int(config, "playfield", "width", 12);
    let player_column = get_int(config, "playfield", "player_column", 1);
    if player_column >= width - 2 {
        errors.push("playfield.player_column must be left of the spawn zone".to_string());
    }

    let min_ticks = get_int(config, "spawn", "min_ticks", 3);
    let max_ticks = get_int(config, "spawn", "max_ticks", 7);
    if max_ticks < min_ticks {
        errors.push("spawn.max_ticks must be >= spawn.min_ticks".to_string());
    }

    let columns = get_int(config, "display", "columns", 16);
    let hud_column = get_int(config, "display", "hud_column", width);
    if hud_column < width || hud_column + 4 > columns {
        errors.push("display.hud_column must fit 4 digits right of the playfield".to_string());
    }
}

// tools/src/main.rs
//
// inspect_layout: developer tool for poking at the softkey core.
// - `specs`: split and parse a more-keys spec list, dump the result as JSON
// - `demo`: build a demo QWERTY keyboard and dump its geometry; optionally
//   resolve a touch point through the proximity index

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use softkey_core::{
    keyspec, ElementId, Key, Keyboard, KeyboardId, KeyboardParams, KeyboardRow, MoreKeySpec,
};

#[derive(Parser)]
#[command(name = "inspect_layout", about = "Inspect softkey specs and layouts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a comma-separated more-keys spec list
    Specs {
        /// The spec list, e.g. "à,á,â" or "a,b\\,c,x|!code/shift"
        text: String,
        /// Title-case labels/codes as a shifted keyboard would
        #[arg(long)]
        upcase: bool,
        /// Locale tag used for case rules
        #[arg(long, default_value = "en")]
        locale: String,
    },
    /// Build a demo QWERTY layout and dump its geometry
    Demo {
        /// Resolve this "x,y" touch point through the proximity index
        #[arg(long)]
        touch: Option<String>,
    },
}

#[derive(Serialize)]
struct SpecDump {
    spec: String,
    code: i32,
    label: String,
    output_text: Option<String>,
}

#[derive(Serialize)]
struct KeyDump {
    label: Option<String>,
    code: i32,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    hit_box: [i32; 4],
}

#[derive(Serialize)]
struct KeyboardDump {
    locale: String,
    keys: Vec<KeyDump>,
    most_common_key_width: i32,
    most_common_key_height: i32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Specs {
            text,
            upcase,
            locale,
        } => dump_specs(&text, upcase, &locale),
        Command::Demo { touch } => dump_demo(touch.as_deref()),
    }
}

fn dump_specs(text: &str, upcase: bool, locale: &str) -> Result<()> {
    let Some(specs) = keyspec::split_key_specs(text) else {
        println!("no specs");
        return Ok(());
    };
    for spec in specs {
        match MoreKeySpec::new(&spec, upcase, locale) {
            Ok(parsed) => {
                let dump = SpecDump {
                    spec,
                    code: parsed.code,
                    label: parsed.label,
                    output_text: parsed.output_text,
                };
                println!("{}", serde_json::to_string(&dump)?);
            }
            Err(err) => eprintln!("skipping {spec:?}: {err}"),
        }
    }
    Ok(())
}

fn dump_demo(touch: Option<&str>) -> Result<()> {
    let keyboard = demo_keyboard()?;
    let dump = KeyboardDump {
        locale: keyboard.id.locale.clone(),
        keys: keyboard
            .sorted_keys()
            .iter()
            .map(|key| KeyDump {
                label: key.label().map(str::to_string),
                code: key.code(),
                x: key.x(),
                y: key.y(),
                width: key.width(),
                height: key.height(),
                hit_box: [
                    key.hit_box().left,
                    key.hit_box().top,
                    key.hit_box().right,
                    key.hit_box().bottom,
                ],
            })
            .collect(),
        most_common_key_width: keyboard.most_common_key_width,
        most_common_key_height: keyboard.most_common_key_height,
    };
    println!("{}", serde_json::to_string_pretty(&dump)?);

    if let Some(touch) = touch {
        let (x, y) = parse_touch(touch)?;
        let labels: Vec<_> = keyboard
            .nearest_keys(x, y)
            .map(|key| key.label().unwrap_or("?").to_string())
            .collect();
        println!("nearest keys at ({x}, {y}): {labels:?}");
    }
    Ok(())
}

fn parse_touch(text: &str) -> Result<(i32, i32)> {
    let (x, y) = text
        .split_once(',')
        .context("touch point must be \"x,y\"")?;
    Ok((
        x.trim().parse().context("bad x coordinate")?,
        y.trim().parse().context("bad y coordinate")?,
    ))
}

fn demo_keyboard() -> Result<Keyboard> {
    const ROW_HEIGHT: i32 = 54;
    let mut params = KeyboardParams::new(KeyboardId::new("en", ElementId::Alphabet));
    params.base_width = 360;
    params.base_height = 162;
    params.occupied_width = 360;
    params.occupied_height = 162;
    params.horizontal_gap = 4;
    params.vertical_gap = 6;
    params.default_row_height = ROW_HEIGHT;
    params.grid_width = 12;
    params.grid_height = 3;

    for (row_index, letters) in ["qwertyuiop", "asdfghjkl", "zxcvbnm"].iter().enumerate() {
        let y = row_index as i32 * ROW_HEIGHT;
        let mut row = KeyboardRow::new(&params, y, ROW_HEIGHT);
        row.set_default_key_width(36.0);
        // Center the shorter rows.
        let count = letters.chars().count() as f32;
        row.set_x_pos((360.0 - count * 36.0) / 2.0);
        let mut keys = Vec::new();
        for ch in letters.chars() {
            let spec = ch.to_string();
            keys.push(
                Key::from_spec(Some(spec.as_str()), &params, &mut row)
                    .context("building demo key")?,
            );
        }
        if let Some(first) = keys.first_mut() {
            first.mark_as_left_edge(&params);
        }
        if let Some(last) = keys.last_mut() {
            last.mark_as_right_edge(&params);
        }
        if row_index == 0 {
            for key in &mut keys {
                key.mark_as_top_edge(&params);
            }
        }
        for key in keys {
            params.add_key(key);
        }
    }
    Ok(Keyboard::new(params))
}

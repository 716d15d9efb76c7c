//! CLI tool for tplview - renders one preview frame as JSON
//!
//! Usage:
//!   tplview_cli <template.json>                          # Frame JSON to stdout
//!   tplview_cli <template.json> --inputs inputs.json     # With unit data
//!   tplview_cli <template.json> --unit 1 --page 2        # Pager actions
//!   tplview_cli <template.json> --scroll 1200            # Scroll event
//!   tplview_cli <template.json> --width 1024 --height 768 --config cfg.json -o out.json
//!
//! Log verbosity follows `RUST_LOG` (e.g. `RUST_LOG=tplview=debug`).

#![allow(clippy::exit)]

use std::env;
use std::fs;
use std::io::{self, Write};
use std::process;

use tracing::info;
use tracing_subscriber::EnvFilter;

use tplview::schema::SchemaMaterializer;
use tplview::{InputRecord, InputSet, Preview, PreviewConfig, Size, Template, TemplateSchemas};

const USAGE: &str = "Usage: tplview_cli <template.json> [--inputs inputs.json] [--width W] \
[--height H] [--unit N] [--page N] [--scroll TOP] [--config cfg.json] [-o output.json]";

#[derive(Debug, Default)]
struct Args {
    template: String,
    inputs: Option<String>,
    config: Option<String>,
    output: Option<String>,
    width: Option<f64>,
    height: Option<f64>,
    unit: Option<usize>,
    page: Option<usize>,
    scroll: Option<f64>,
}

fn parse_args(raw: &[String]) -> Result<Args, String> {
    let mut iter = raw.iter();
    let mut args = Args::default();
    let mut template = None;

    while let Some(arg) = iter.next() {
        let mut value = |name: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("{name} needs a value"))
        };
        match arg.as_str() {
            "--inputs" => args.inputs = Some(value("--inputs")?),
            "--config" => args.config = Some(value("--config")?),
            "-o" => args.output = Some(value("-o")?),
            "--width" => args.width = Some(parse_number(&value("--width")?)?),
            "--height" => args.height = Some(parse_number(&value("--height")?)?),
            "--scroll" => args.scroll = Some(parse_number(&value("--scroll")?)?),
            "--unit" => args.unit = Some(parse_index(&value("--unit")?)?),
            "--page" => args.page = Some(parse_index(&value("--page")?)?),
            other if other.starts_with('-') => return Err(format!("unknown option {other}")),
            other if template.is_none() => template = Some(other.to_string()),
            other => return Err(format!("unexpected argument {other}")),
        }
    }

    args.template = template.ok_or_else(|| "missing template path".to_string())?;
    Ok(args)
}

fn parse_number(s: &str) -> Result<f64, String> {
    s.parse().map_err(|_| format!("not a number: {s}"))
}

fn parse_index(s: &str) -> Result<usize, String> {
    s.parse().map_err(|_| format!("not an index: {s}"))
}

fn read(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {}: {}", path, e);
            process::exit(1);
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let raw: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&raw) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("{USAGE}");
            process::exit(1);
        }
    };

    let template = match Template::from_json(&read(&args.template)) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error parsing template: {}", e);
            process::exit(1);
        }
    };

    let inputs: InputSet = match args.inputs.as_deref().map(|p| serde_json::from_str(&read(p))) {
        None => vec![InputRecord::new()],
        Some(Ok(inputs)) => inputs,
        Some(Err(e)) => {
            eprintln!("Error parsing inputs: {}", e);
            process::exit(1);
        }
    };

    let config = match args.config.as_deref().map(|p| PreviewConfig::from_json(&read(p))) {
        None => PreviewConfig::default(),
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            eprintln!("Error parsing config: {}", e);
            process::exit(1);
        }
    };

    let viewport = Size::new(args.width.unwrap_or(800.0), args.height.unwrap_or(600.0));
    let mut preview = match Preview::new(template, inputs, viewport).with_config(config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error applying config: {}", e);
            process::exit(1);
        }
    };

    let request = preview.request_schemas();
    let result = pollster::block_on(TemplateSchemas.materialize(&request.template));
    preview.apply_schemas(request.generation, result);
    if let Some(error) = preview.schema_error() {
        eprintln!("Warning: {}", error);
    }

    if let Some(unit) = args.unit {
        preview.set_unit_cursor(unit);
    }
    if let Some(page) = args.page {
        if let Some(command) = preview.go_to_page(page) {
            info!(top = command.top, "scrolled to page");
        }
    }
    if let Some(top) = args.scroll {
        preview.handle_scroll(top);
    }

    let json = match serde_json::to_string_pretty(&preview.frame()) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Error serializing JSON: {}", e);
            process::exit(1);
        }
    };

    match args.output {
        Some(path) => {
            if let Err(e) = fs::write(&path, &json) {
                eprintln!("Error writing {}: {}", path, e);
                process::exit(1);
            }
            eprintln!("Written: {}", path);
        }
        None => {
            let mut stdout = io::stdout();
            if stdout
                .write_all(json.as_bytes())
                .and_then(|()| stdout.write_all(b"\n"))
                .is_err()
            {
                process::exit(1);
            }
        }
    }
}

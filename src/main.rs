//! hisym - highlight symbols in a file from the command line
//!
//! Opens FILE, highlights every SYMBOL given after it the way an editor
//! session would, reports each symbol's style, occurrence count and first
//! position, and prints the file with the highlights painted in.

use std::env;
use std::io;
use std::path::PathBuf;
use std::process;

use hisym::buffer::Workspace;
use hisym::display::KeywordTable;
use hisym::timer::PolledScheduler;
use hisym::{Config, HighlightSymbol, Result, TextView};

fn main() {
    hisym::logging::init();
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Parsed command line
#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    no_paint: bool,
    write_config: bool,
    file: Option<PathBuf>,
    symbols: Vec<String>,
}

fn parse_args() -> std::result::Result<Option<Args>, String> {
    let mut args = Args::default();
    let mut iter = env::args().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(None);
            }
            "--version" | "-V" => {
                print_version();
                return Ok(None);
            }
            "--config" | "-c" => {
                let path = iter.next().ok_or("--config needs a path")?;
                args.config = Some(PathBuf::from(path));
            }
            "--no-paint" => args.no_paint = true,
            "--write-config" => args.write_config = true,
            s if s.starts_with('-') && s.len() > 1 => {
                return Err(format!("unknown option: {}", s));
            }
            _ if args.file.is_none() => args.file = Some(PathBuf::from(&arg)),
            _ => args.symbols.push(arg.clone()),
        }
    }

    Ok(Some(args))
}

fn run() -> Result<()> {
    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => return Ok(()),
        Err(msg) => {
            eprintln!("hisym: {}", msg);
            print_usage();
            process::exit(2);
        }
    };
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if args.write_config {
        match &args.config {
            Some(path) => config.save_to(path)?,
            None => config.save()?,
        }
        if args.file.is_none() {
            return Ok(());
        }
    }

    let Some(file) = args.file else {
        print_usage();
        process::exit(2);
    };

    let mut workspace = Workspace::new();
    let buffer = workspace.open_file(&file)?;
    let mut session = HighlightSymbol::new(config, workspace, KeywordTable::new(), PolledScheduler::new())?;
    session.on_buffer_opened(buffer)?;

    for symbol in &args.symbols {
        if let Err(e) = session.toggle_symbol(symbol) {
            eprintln!("{}: {}", symbol, e);
            continue;
        }
        session.take_messages();
    }

    let text = session.view().text(buffer)?;
    let opened = session.view().buffer(buffer)?;
    for (name, style) in session.list_highlighted() {
        let matches = session
            .matcher()
            .pattern_for(&name)
            .map(|p| p.find_all(text))
            .unwrap_or_default();
        let first = matches.first().map_or_else(|| "-".to_string(), |m| opened.position(m.start));
        println!("{}\t{}\t{}\t{}", name, style, matches.len(), first);
    }

    if !args.no_paint {
        if !args.symbols.is_empty() {
            println!();
        }
        let mut out = io::stdout().lock();
        session.renderer().paint(buffer, text, &mut out)?;
    }

    Ok(())
}

fn print_usage() {
    println!("hisym {} - symbol highlighting with stable colors", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: hisym [OPTIONS] FILE [SYMBOL...]");
    println!("       hisym --write-config [-c PATH]");
    println!();
    println!("Options:");
    println!("  -h, --help           Show this help message");
    println!("  -V, --version        Show version information");
    println!("  -c, --config PATH    Read settings from PATH instead of ~/.hisym.toml");
    println!("      --no-paint       Only report symbols, don't print the file");
    println!("      --write-config   Write the settings in use back to the config file");
    println!();
    println!("Set RUST_LOG=debug for diagnostics.");
}

fn print_version() {
    println!("hisym {}", env!("CARGO_PKG_VERSION"));
}

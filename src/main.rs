use std::env;
use std::process;

use fretwise::{
    format_frets, DefinitionTable, FretError, ProgressionItem, Settings, TablatureState,
};

const USAGE: &str = "\
Usage: fretwise [--config <settings.yaml>] chord <id> <root> [--position N]
       fretwise [--config <settings.yaml>] voicings <id> <root>
       fretwise [--config <settings.yaml>] place <note>...";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let mut args: Vec<String> = env::args().skip(1).collect();

    // Parse flags
    let settings = match take_option(&mut args, "--config") {
        Some(path) => match Settings::from_file(&path) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("Error loading '{}': {}", path, e);
                process::exit(1);
            }
        },
        None => Settings::default(),
    };

    if args.is_empty() {
        eprintln!("{}", USAGE);
        process::exit(1);
    }

    let command = args.remove(0);
    let result = match command.as_str() {
        "chord" => chord(&mut args, &settings),
        "voicings" => voicings(&args, &settings),
        "place" => place(&args, &settings),
        _ => {
            eprintln!("Unknown command '{}'", command);
            eprintln!("{}", USAGE);
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Remove `--flag value` from `args`, returning the value.
fn take_option(args: &mut Vec<String>, flag: &str) -> Option<String> {
    let index = args.iter().position(|a| a == flag)?;
    if index + 1 >= args.len() {
        eprintln!("{} needs a value", flag);
        process::exit(1);
    }
    let value = args.remove(index + 1);
    args.remove(index);
    Some(value)
}

fn id_and_root(args: &[String]) -> (&str, &str) {
    match args {
        [id, root, ..] => (id.as_str(), root.as_str()),
        _ => {
            eprintln!("{}", USAGE);
            process::exit(1);
        }
    }
}

fn chord(args: &mut Vec<String>, settings: &Settings) -> Result<(), FretError> {
    let position = match take_option(args, "--position") {
        Some(p) => p.parse::<u8>().unwrap_or_else(|_| {
            eprintln!("Invalid position '{}'", p);
            process::exit(1);
        }),
        None => 1,
    };
    let (id, root) = id_and_root(args);

    let table = DefinitionTable::builtin();
    let canonical = table.canonical_chord_id(id);
    if table.lookup_chord(id).is_none() {
        eprintln!("Unknown chord '{}'", id);
        process::exit(1);
    }

    let fixed = fretwise::chord_frets(id, root, position, settings)?;
    let optimal = fretwise::optimal_frets(id, root, position, settings)?;
    println!("{} {} (position {})", root, canonical, position);
    println!("  shape:   {}", format_frets(&fixed));
    println!("  nearest: {}", format_frets(&optimal));
    Ok(())
}

fn voicings(args: &[String], settings: &Settings) -> Result<(), FretError> {
    let (id, root) = id_and_root(args);
    let voicings = fretwise::voicings(id, root, settings)?;
    if voicings.is_empty() {
        eprintln!("No voicings found for {} {}", root, id);
        return Ok(());
    }
    for v in voicings {
        println!(
            "fret {:>2}  {:<20} difficulty {:.1}",
            v.position,
            format_frets(&v.frets),
            v.difficulty
        );
    }
    Ok(())
}

fn place(args: &[String], settings: &Settings) -> Result<(), FretError> {
    if args.is_empty() {
        eprintln!("{}", USAGE);
        process::exit(1);
    }
    let mut tab = TablatureState::new(settings);
    let items: Vec<ProgressionItem> = args.iter().cloned().map(ProgressionItem::Name).collect();
    tab.drop_progression_at(&items, 0);

    let labels: Vec<String> = settings.tuning.strings().iter().map(|n| n.to_string()).collect();
    println!("{}", tab.current_measure_data().to_ascii(&labels));
    Ok(())
}

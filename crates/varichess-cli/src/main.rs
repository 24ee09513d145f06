use std::fs::File;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode, WriteLogger};
use varichess_core::{
    divide, move_to_uci, parse_uci, perft, validate_fen, Position, Value, Variant, VariantMap,
};

const USAGE: &str = "\
usage: varichess <perft|divide|moves|fen|variants> [options] [moves...]

options:
  --variant <name>   variant to load (default: chess)
  --fen <fen>        start from this position instead of the variant start
  --depth <n>        perft/divide depth (default: 3)
  --config <file>    load extra variant definitions
  --log <file>       write log output to a file instead of stderr
  -v, -vv            raise log verbosity";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Perft,
    Divide,
    Moves,
    Fen,
    Variants,
}

#[derive(Debug)]
struct Options {
    command: Command,
    variant: String,
    fen: Option<String>,
    depth: u32,
    config: Option<String>,
    log: Option<String>,
    verbosity: u8,
    moves: Vec<String>,
}

fn parse_command(s: &str) -> Option<Command> {
    match s {
        "perft" => Some(Command::Perft),
        "divide" => Some(Command::Divide),
        "moves" => Some(Command::Moves),
        "fen" => Some(Command::Fen),
        "variants" => Some(Command::Variants),
        _ => None,
    }
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut iter = args.iter();
    let command = iter
        .next()
        .ok_or_else(|| "missing command".to_string())
        .and_then(|s| parse_command(s).ok_or_else(|| format!("unknown command '{s}'")))?;

    let mut options = Options {
        command,
        variant: "chess".to_string(),
        fen: None,
        depth: 3,
        config: None,
        log: None,
        verbosity: 0,
        moves: Vec::new(),
    };

    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("{flag} needs a value"))
        };
        match arg.as_str() {
            "--variant" => options.variant = value("--variant")?,
            "--fen" => options.fen = Some(value("--fen")?),
            "--depth" => {
                let raw = value("--depth")?;
                options.depth = raw
                    .parse()
                    .map_err(|_| format!("invalid depth '{raw}'"))?;
            }
            "--config" => options.config = Some(value("--config")?),
            "--log" => options.log = Some(value("--log")?),
            "-v" => options.verbosity = options.verbosity.saturating_add(1),
            "-vv" => options.verbosity = options.verbosity.saturating_add(2),
            flag if flag.starts_with('-') => return Err(format!("unknown option '{flag}'")),
            mv => options.moves.push(mv.to_string()),
        }
    }
    Ok(options)
}

fn init_logging(options: &Options) {
    let level = match options.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let installed = match &options.log {
        Some(path) => match File::create(path) {
            Ok(file) => WriteLogger::init(level, Config::default(), file).is_ok(),
            Err(err) => {
                eprintln!("cannot create log file {path}: {err}");
                false
            }
        },
        None => TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto).is_ok(),
    };
    if installed {
        log::debug!("logger installed at {level}");
    }
}

fn load_variants(options: &Options) -> Result<VariantMap, String> {
    let mut map = VariantMap::builtin();
    if let Some(path) = &options.config {
        let text = std::fs::read_to_string(path).map_err(|e| format!("cannot read {path}: {e}"))?;
        let warnings = map.load(&text).map_err(|e| format!("{path}: {e}"))?;
        for warning in warnings {
            eprintln!("{path}: {warning}");
        }
        log::info!("loaded variant config {path}");
    }
    Ok(map)
}

fn setup_position(var: Arc<Variant>, options: &Options) -> Result<Position, String> {
    let mut pos = match &options.fen {
        Some(fen) => {
            let code = validate_fen(&var, fen);
            if !code.is_ok() {
                log::warn!("fen validation returned {:?} ({})", code, code.code());
            }
            Position::from_fen(var, fen)
        }
        None => Position::new(var),
    }
    .map_err(|e| e.to_string())?;

    for text in &options.moves {
        let m = parse_uci(&pos, text).map_err(|e| e.to_string())?;
        pos.do_move(m);
    }
    Ok(pos)
}

fn result_name(value: Value) -> &'static str {
    if value > Value::DRAW {
        "win for the side to move"
    } else if value < Value::DRAW {
        "loss for the side to move"
    } else {
        "draw"
    }
}

fn run(options: &Options) -> Result<(), String> {
    let map = load_variants(options)?;
    if options.command == Command::Variants {
        for name in map.names() {
            println!("{name}");
        }
        return Ok(());
    }

    let var = map
        .get(&options.variant)
        .ok_or_else(|| format!("unknown variant '{}'", options.variant))?;
    let mut pos = setup_position(var, options)?;

    match options.command {
        Command::Perft => {
            let started = Instant::now();
            let nodes = perft(&mut pos, options.depth);
            let elapsed = started.elapsed();
            let nps = nodes as f64 / elapsed.as_secs_f64().max(1e-9);
            println!("nodes {nodes}");
            eprintln!("depth {} in {:.3}s ({nps:.0} nps)", options.depth, elapsed.as_secs_f64());
        }
        Command::Divide => {
            let split = divide(&mut pos, options.depth);
            let total: u64 = split.iter().map(|(_, n)| n).sum();
            for (mv, nodes) in &split {
                println!("{mv}: {nodes}");
            }
            println!();
            println!("moves {}", split.len());
            println!("nodes {total}");
        }
        Command::Moves => {
            let names: Vec<String> = pos
                .legal_moves()
                .iter()
                .map(|m| move_to_uci(&pos, *m))
                .collect();
            println!("{}", names.join(" "));
        }
        Command::Fen => {
            println!("{}", pos.fen());
            if let Some(value) = pos.game_result() {
                println!("result {}", result_name(value));
            }
        }
        Command::Variants => {}
    }
    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{err}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };
    init_logging(&options);

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

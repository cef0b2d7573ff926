use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use clap::Parser;
use tmsim::{DefinitionLoader, MachineDefinition, SimulationResult, Simulator};

#[derive(Parser)]
#[clap(author, version, about = "Deterministic Turing machine simulator", long_about = None, arg_required_else_help = true)]
struct Cli {
    /// Machine definition file
    machine: PathBuf,

    /// Print the execution trace for every word
    #[clap(long)]
    trace: bool,

    /// Read words from a file (one per line) instead of stdin
    #[clap(long)]
    words: Option<PathBuf>,

    /// Report symbols outside the input alphabet on stderr
    #[clap(long)]
    strict: bool,

    /// Step limit per simulation (0 = unbounded)
    #[clap(long, default_value_t = 1000)]
    max_steps: usize,

    /// Print machine information and exit
    #[clap(long)]
    info: bool,
}

fn main() {
    let cli = Cli::parse();
    std::process::exit(run(&cli));
}

fn run(cli: &Cli) -> i32 {
    let machine = match DefinitionLoader::load_from_path(&cli.machine) {
        Ok(machine) => machine,
        Err(error) => {
            eprintln!("[load error] {error}");
            return 2;
        }
    };

    if cli.info {
        println!("{machine}");
        return 0;
    }

    let mut reader: Box<dyn BufRead> = match &cli.words {
        Some(path) => match File::open(path) {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(error) => {
                eprintln!("[error] cannot open word file {}: {error}", path.display());
                return 3;
            }
        },
        None => Box::new(BufReader::new(io::stdin())),
    };
    let interactive = cli.words.is_none() && atty::is(atty::Stream::Stdin);

    let mut simulator = Simulator::new(&machine);
    let mut line = String::new();

    loop {
        if interactive {
            print!("word> ");
            io::stdout().flush().ok();
        }

        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(error) => {
                eprintln!("[error] {error}");
                return 3;
            }
        }

        // An all-whitespace line is the empty word.
        let word: String = line.chars().filter(|c| !c.is_whitespace()).collect();
        run_word(&machine, &mut simulator, &word, cli);
    }

    0
}

fn run_word(machine: &MachineDefinition, simulator: &mut Simulator, word: &str, cli: &Cli) {
    // Alphabet policy lives here, not in the engine: a word outside the
    // input alphabet is simply not in the language.
    if let Some(symbol) = word.chars().find(|&c| !machine.is_input_symbol(c)) {
        if cli.strict {
            eprintln!("[word error] symbol '{symbol}' in \"{word}\" is outside the input alphabet");
        }
        println!("{}", SimulationResult::Rejected);
        return;
    }

    let result = simulator.simulate(word, cli.trace, cli.max_steps);
    println!("{result}");

    let tapes = simulator.current_configuration().tapes();
    if machine.tape_count() == 1 {
        println!("final tape: {}", tapes.tape(0).render(20));
    } else {
        println!("final tapes:");
        for index in 0..machine.tape_count() {
            println!("  tape {index}: {}", tapes.tape(index).render(20));
        }
    }

    if cli.trace {
        println!("\n=== trace for \"{word}\" ===");
        for configuration in simulator.trace() {
            println!("{}", configuration.describe(10));
        }
        println!("=== end of trace ===\n");
    }

    match result {
        SimulationResult::Infinite => {
            if simulator.is_infinite_loop_detected() {
                println!("[info] stopped: repeated configuration detected");
            } else {
                println!("[info] stopped: step limit reached ({})", cli.max_steps);
            }
        }
        SimulationResult::Error => {
            if let Some(error) = simulator.last_error() {
                eprintln!("[simulation error] {error}");
            }
        }
        _ => {}
    }
}

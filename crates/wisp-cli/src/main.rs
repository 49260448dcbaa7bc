use std::{
    env, fs,
    io::{self, BufRead, Write},
    process::ExitCode,
};

use wisp::Interpreter;

const BANNER: &str = "Supported commands:\n  $quit   exit the program";

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    match args.get(1) {
        Some(path) => run_file(path),
        None => run_repl(),
    }
}

fn run_file(path: &str) -> ExitCode {
    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(_) => {
            println!("IOError: Failed to open file '{path}'");
            return ExitCode::FAILURE;
        }
    };

    match Interpreter::new().run(file, &mut io::stdout()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            println!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run_repl() -> ExitCode {
    println!("{BANNER}");

    let mut interpreter = Interpreter::new();
    let stdin = io::stdin();
    let mut out = io::stdout();

    loop {
        print!("\n>> ");
        let _ = out.flush();

        let mut line = String::new();
        let bytes_read = match stdin.lock().read_line(&mut line) {
            Ok(n) => n,
            Err(_) => break,
        };
        if bytes_read == 0 {
            println!("Quitted");
            break;
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line == "quit" || line == "exit" {
            println!("Use $quit to exit the program.");
            continue;
        }

        if let Some(command) = line.strip_prefix('$') {
            if command.is_empty() {
                println!("No command.");
                continue;
            }

            let mut words = command.split_whitespace();
            match words.next() {
                Some("quit") => {
                    println!("Quitted");
                    break;
                }
                Some(other) => println!("CommandError: Unknown command '{other}'"),
                None => println!("No command."),
            }
            continue;
        }

        if let Err(err) = interpreter.run(line.as_bytes(), &mut out) {
            println!("{err}");
        }
    }

    ExitCode::SUCCESS
}

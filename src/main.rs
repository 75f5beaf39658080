use argh::FromArgs;
use minish::Interpreter;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(FromArgs)]
/// A line-oriented command interpreter: `;`-separated statements,
/// `&`-terminated background commands, built-in `cd` and `exit`.
struct Options {
    /// file to read commands from instead of standard input
    #[argh(positional)]
    script: Option<PathBuf>,
}

fn main() {
    let options: Options = argh::from_env();
    let mut interpreter = Interpreter::default();

    let result = match &options.script {
        Some(path) => {
            let file = match File::open(path) {
                Ok(file) => file,
                Err(e) => {
                    eprintln!("Failed to open input file {}: {}", path.display(), e);
                    std::process::exit(1);
                }
            };
            interpreter.run_script(BufReader::new(file), &mut std::io::stdout())
        }
        None => interpreter.repl(),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(1);
        }
    }
}

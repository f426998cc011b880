use nimble::compiler;
use std::env;
use std::process;

fn main() {
    env_logger::init();

    let command = compiler::Command::new();

    match command.run(env::args()) {
        Ok(output) => {
            println!("{}", output.trim_end())
        }
        Err(err) => {
            eprintln!("error: {}", err);
            process::exit(1);
        }
    };
}

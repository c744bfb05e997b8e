use clap::Parser;
use dirs::home_dir;
use log::{debug, info};
use nu_ansi_term::{Color, Style};
use reedline::{DefaultHinter, FileBackedHistory, Reedline, Signal};
use std::{fs, io, path::PathBuf};
use tanglish::{
    cli::{Args, Commands},
    driver::run,
    environment::Environment,
    error::Result,
    extensions::ResultExtensions,
    interpreter::execute,
    repl::{REPLPrompt, REPLValidator, SyntaxHighlighter},
    tokenizer::tokenize,
};

fn run_file(file: PathBuf) -> Result<()> {
    let source = fs::read_to_string(file)?;
    run(&source);

    Ok(())
}

fn check_file(file: PathBuf) -> Result<()> {
    let source = fs::read_to_string(file)?;

    for token in tokenize(&source)? {
        println!("{}", token.listing());
    }

    Ok(())
}

fn run_repl() -> Result<()> {
    let mut line_editor = Reedline::create()
        .with_hinter(Box::new(
            DefaultHinter::default().with_style(Style::new().italic().fg(Color::LightGray)),
        ))
        .with_highlighter(Box::new(SyntaxHighlighter))
        .with_validator(Box::new(REPLValidator));

    // Add file-backed history if possible
    if let Some(history) = home_dir()
        .map(|home| home.join(".tanglish_history"))
        .and_then(|path| FileBackedHistory::with_file(20, path).ok())
        .map(Box::new)
    {
        line_editor = line_editor.with_history(history);
    } else {
        eprintln!("NOTE: Failed to load history. Persistence is now disabled.")
    }

    let mut prompt = REPLPrompt::new();
    let mut env = Environment::new();

    loop {
        match line_editor.read_line(&prompt)? {
            Signal::Success(buffer) => {
                Result::pure(())
                    .and_then(|_| tokenize(&buffer))
                    .and_then(|tokens| execute(&tokens, &mut env, io::stdout().lock()))
                    .report_to(io::stderr());
                prompt.next_entry();
            }
            Signal::CtrlD | Signal::CtrlC => {
                break Ok(());
            }
        }
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let result = match args.command {
        Commands::Run { file } => {
            info!("FILE MODE");
            debug!("file: {:?}", file);

            run_file(file)
        }
        Commands::Check { file } => {
            info!("CHECK MODE");
            debug!("file: {:?}", file);

            check_file(file)
        }
        Commands::Repl => {
            info!("REPL MODE");

            run_repl()
        }
    };

    result.report_to(io::stderr());
}

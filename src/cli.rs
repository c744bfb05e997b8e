use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(about = "Interpreter for the Tanglish scripting language", version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a source file
    Run {
        /// Path to the source file
        file: PathBuf,
    },

    /// Tokenize a source file and list its tokens
    Check {
        /// Path to the source file to check
        file: PathBuf,
    },

    /// Start an interactive REPL session
    Repl,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        let args = Args::try_parse_from(["tanglish", "run", "hello.tg"]).ok();
        assert!(matches!(
            args.map(|a| a.command),
            Some(Commands::Run { file }) if file == PathBuf::from("hello.tg")
        ));

        let args = Args::try_parse_from(["tanglish", "repl"]).ok();
        assert!(matches!(args.map(|a| a.command), Some(Commands::Repl)));

        assert!(Args::try_parse_from(["tanglish", "check"]).is_err());
    }
}

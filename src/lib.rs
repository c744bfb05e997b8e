pub mod cli;
pub mod driver;
pub mod environment;
pub mod error;
pub mod extensions;
pub mod interpreter;
pub mod repl;
pub mod runtime;
pub mod tokenizer;

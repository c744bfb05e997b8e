use std::{fmt::Display, io::Write};

pub trait ResultExtensions<T, E> {
    fn pure(item: T) -> Result<T, E> {
        Ok(item)
    }

    /// Writes the error, if any, as an `Error: ` line and discards it.
    fn report_to<W: Write>(self, out: W) -> Option<T>;
}

impl<T, E: Display> ResultExtensions<T, E> for Result<T, E> {
    fn report_to<W: Write>(self, mut out: W) -> Option<T> {
        self.inspect_err(|err| {
            writeln!(out, "Error: {}", err).ok();
        })
        .ok()
    }
}

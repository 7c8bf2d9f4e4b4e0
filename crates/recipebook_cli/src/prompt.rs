//! Line-oriented prompting over any reader/writer pair.
//!
//! # Invariants
//! - End of input surfaces as `io::ErrorKind::UnexpectedEof`.
//! - `ask_until` keeps asking until the parser accepts the line.

use std::fmt::Display;
use std::io::{self, BufRead, Write};

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Output sink for free-form messages.
    pub fn out(&mut self) -> &mut W {
        &mut self.output
    }

    /// Prints `prompt` and returns the trimmed reply.
    pub fn ask(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed",
            ));
        }
        Ok(line.trim().to_string())
    }

    /// Re-asks until `parse` accepts the reply, printing each rejection.
    pub fn ask_until<T, E, F>(&mut self, prompt: &str, mut parse: F) -> io::Result<T>
    where
        E: Display,
        F: FnMut(&str) -> Result<T, E>,
    {
        loop {
            let reply = self.ask(prompt)?;
            match parse(&reply) {
                Ok(value) => return Ok(value),
                Err(err) => writeln!(self.output, "{err}")?,
            }
        }
    }
}

/// Parses a positive whole number.
pub fn parse_positive(reply: &str) -> Result<usize, &'static str> {
    match reply.parse::<usize>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err("Please enter a positive number."),
    }
}

/// Parses space-separated 1-based choices, each within `1..=max`.
pub fn parse_choices(reply: &str, max: usize) -> Result<Vec<usize>, &'static str> {
    let mut choices = Vec::new();
    for part in reply.split_whitespace() {
        let number = part
            .parse::<usize>()
            .map_err(|_| "Invalid input. Please enter numbers only.")?;
        if number == 0 || number > max {
            return Err("One or more selected numbers are out of range.");
        }
        choices.push(number);
    }
    Ok(choices)
}

/// Parses the edit field selection, e.g. `1,3`.
pub fn parse_field_selection(reply: &str) -> Result<Vec<u8>, &'static str> {
    let parts = reply
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>();
    if parts.is_empty() {
        return Err("Input cannot be empty. Please enter 1, 2, or 3, separated by commas.");
    }

    let mut fields = Vec::with_capacity(parts.len());
    for part in parts {
        let field = match part {
            "1" => 1,
            "2" => 2,
            "3" => 3,
            _ => return Err("Only 1, 2, or 3 are allowed. Please try again."),
        };
        if fields.contains(&field) {
            return Err("Duplicate columns are not allowed. Please try again.");
        }
        fields.push(field);
    }
    Ok(fields)
}

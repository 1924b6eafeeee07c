//! Terminal questions for the setup wizard and for commands missing a secret.
//!
//! Every answer is checked before it is accepted. A rejected answer repeats
//! the question with the reason; a blank answer takes the default shown.

use anyhow::{bail, Result};
use solar_sync::validation;
use std::io::{self, BufRead, Write};
use std::time::Duration;

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

pub type Terminal = Prompter<io::StdinLock<'static>, io::Stdout>;

impl Terminal {
    pub fn stdio() -> Self {
        Prompter::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn line(&mut self) -> Result<String> {
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            bail!("input closed before an answer was given");
        }
        Ok(buf.trim().to_string())
    }

    /// Ask until `check` accepts the answer
    pub fn ask<T>(
        &mut self,
        question: &str,
        default: Option<&str>,
        check: impl Fn(&str) -> Result<T, String>,
    ) -> Result<T> {
        loop {
            match default {
                Some(d) => write!(self.output, "❓ {question} [{d}]: ")?,
                None => write!(self.output, "❓ {question}: ")?,
            }
            self.output.flush()?;

            let answer = self.line()?;
            let answer = match (answer.is_empty(), default) {
                (true, Some(d)) => d.to_string(),
                _ => answer,
            };
            match check(&answer) {
                Ok(value) => return Ok(value),
                Err(reason) => writeln!(self.output, "❌ {reason}")?,
            }
        }
    }

    /// Backend root; must be http(s) and always ends with `/`
    pub fn base_url(&mut self, question: &str, default: &str) -> Result<String> {
        self.ask(question, Some(default), |raw| {
            if !(raw.starts_with("http://") || raw.starts_with("https://")) {
                return Err("the URL must start with http:// or https://".into());
            }
            Ok(if raw.ends_with('/') { raw.to_string() } else { format!("{raw}/") })
        })
    }

    /// Whole seconds, at least one
    pub fn seconds(&mut self, question: &str, default: Duration) -> Result<Duration> {
        let shown = default.as_secs().max(1).to_string();
        self.ask(question, Some(&shown), |raw| match raw.parse::<u64>() {
            Ok(0) => Err("the interval must be at least 1 second".into()),
            Ok(secs) => Ok(Duration::from_secs(secs)),
            Err(_) => Err(format!("'{raw}' is not a number of seconds")),
        })
    }

    pub fn rows_per_page(&mut self, question: &str, default: usize) -> Result<usize> {
        self.ask(question, Some(&default.to_string()), |raw| match raw.parse::<usize>() {
            Ok(0) => Err("a page holds at least one row".into()),
            Ok(rows) => Ok(rows),
            Err(_) => Err(format!("'{raw}' is not a row count")),
        })
    }

    pub fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        self.ask(question, Some(hint), |raw| match raw.to_ascii_lowercase().as_str() {
            "y" | "yes" => Ok(true),
            "n" | "no" => Ok(false),
            "y/n" => Ok(default),
            _ => Err("answer y or n".into()),
        })
    }

    /// One of `options` (key, description), matched case-insensitively
    pub fn pick(
        &mut self,
        question: &'static str,
        options: &[(&'static str, &str)],
        default: &'static str,
    ) -> Result<&'static str> {
        for (key, description) in options {
            let marker = if *key == default { "►" } else { " " };
            writeln!(self.output, "  {marker} {key} - {description}")?;
        }
        let keys: Vec<&'static str> = options.iter().map(|(key, _)| *key).collect();
        self.ask(question, Some(default), |raw| {
            validation::choice(question, raw, &keys).map_err(|e| e.to_string())
        })
    }

    /// Non-empty secret; the console has no raw terminal mode, so it echoes
    pub fn secret(&mut self, question: &str) -> Result<String> {
        self.ask(&format!("{question} (visible)"), None, |raw| {
            validation::required("password", raw)
                .map(str::to_string)
                .map_err(|e| e.to_string())
        })
    }

    /// New password plus confirmation, repeated until both pass the form rules
    pub fn new_password(&mut self) -> Result<(String, String)> {
        loop {
            let password = self.secret("New password")?;
            let confirm = self.secret("Confirm password")?;
            match validation::new_password(&password, &confirm) {
                Ok(()) => return Ok((password, confirm)),
                Err(e) => writeln!(self.output, "❌ {e}")?,
            }
        }
    }
}

/// Use the flag when given, otherwise ask on the terminal
pub fn secret_or_ask(value: Option<String>, question: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => Terminal::stdio().secret(question),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answering(lines: &str) -> Prompter<&[u8], Vec<u8>> {
        Prompter::new(lines.as_bytes(), Vec::new())
    }

    #[test]
    fn blank_answer_takes_the_default() {
        let mut p = answering("\n\n");
        assert_eq!(p.seconds("Alerts", Duration::from_secs(10)).unwrap(), Duration::from_secs(10));
        assert!(p.confirm("Save?", true).unwrap());
    }

    #[test]
    fn zero_cadence_is_asked_again() {
        let mut p = answering("0\nsoon\n7\n");
        assert_eq!(p.seconds("Alerts", Duration::from_secs(10)).unwrap(), Duration::from_secs(7));
        let shown = String::from_utf8(p.output).unwrap();
        assert_eq!(shown.matches("❌").count(), 2);
    }

    #[test]
    fn base_url_gets_its_trailing_slash() {
        let mut p = answering("ftp://plant\nhttp://plant.local/api\n");
        assert_eq!(p.base_url("API", "http://127.0.0.1:8000/api/").unwrap(), "http://plant.local/api/");
    }

    #[test]
    fn pick_accepts_any_case_and_returns_the_key() {
        let mut p = answering("wipe\nCLEAR\n");
        let options = [("keep-stale", "keep rows"), ("clear", "empty the table")];
        assert_eq!(p.pick("on_error", &options, "keep-stale").unwrap(), "clear");
    }

    #[test]
    fn new_password_repeats_until_valid() {
        let mut p = answering("short\nshort\nlongenough\nmismatch!\nlongenough\nlongenough\n");
        let (password, confirm) = p.new_password().unwrap();
        assert_eq!(password, "longenough");
        assert_eq!(password, confirm);
    }

    #[test]
    fn closed_input_is_an_error() {
        let mut p = answering("");
        assert!(p.secret("Password").is_err());
    }
}

use std::io::{self, BufRead, Write};
use std::process::{Command, Stdio};
use log::warn;

/// Ways of asking the operator something.
pub trait Prompt {
    /// `None` when the operator backed out.
    fn secret(&self, label: &str) -> io::Result<Option<String>>;
    fn confirm(&self, question: &str) -> io::Result<bool>;
}

/// Plain stdin/stderr prompts.
pub struct Terminal;

impl Terminal {
    fn read_line(&self, prompt: &str) -> io::Result<Option<String>> {
        let mut stderr = io::stderr();
        write!(stderr, "{}", prompt)?;
        stderr.flush()?;
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_owned()))
    }
}

impl Prompt for Terminal {
    fn secret(&self, label: &str) -> io::Result<Option<String>> {
        self.read_line(&format!("{}: ", label))
    }

    fn confirm(&self, question: &str) -> io::Result<bool> {
        let answer = self.read_line(&format!("{} [y/N] ", question))?;
        Ok(is_yes(answer.as_deref().unwrap_or("")))
    }
}

/// dmenu at the bottom of the screen; secrets are typed black on black.
pub struct Dmenu;

impl Prompt for Dmenu {
    fn secret(&self, label: &str) -> io::Result<Option<String>> {
        dmenu("", ["-b", "-p", label, "-nb", "black", "-nf", "black"].to_vec())
    }

    fn confirm(&self, question: &str) -> io::Result<bool> {
        let choice = dmenu("No\nYes", ["-b", "-i", "-p", question].to_vec())?;
        Ok(is_yes(choice.as_deref().unwrap_or("")))
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn dmenu(input: &str, args: Vec<&str>) -> io::Result<Option<String>> {
    let mut dmenu = Command::new("dmenu")
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    if let Some(mut stdin) = dmenu.stdin.take() {
        stdin.write_all(input.as_bytes())?;
    }

    let output = dmenu.wait_with_output()?;
    if !output.status.success() {
        warn!("Dmenu process cancelled with exit code {:?}", output.status.code());
        return Ok(None);
    }
    let choice = String::from_utf8_lossy(&output.stdout);
    Ok(Some(choice.trim().to_owned()))
}

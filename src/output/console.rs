// src/output/console.rs
//! Human-readable run narration on stdout

use colored::Colorize;
use std::io::{self, Write};

/// Console progress writer, colored when attached to a terminal
pub struct Console {
    writer: Box<dyn Write + Send>,
    use_colors: bool,
}

impl Console {
    /// Create a new Console that writes to stdout
    pub fn new() -> Self {
        Self {
            writer: Box::new(io::stdout()),
            use_colors: is_terminal::is_terminal(std::io::stdout()),
        }
    }

    /// Create a Console over any writer, without colors
    pub fn to_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer,
            use_colors: false,
        }
    }

    /// Console that discards everything
    pub fn silent() -> Self {
        Self::to_writer(Box::new(io::sink()))
    }

    /// Section header, e.g. "== ReconPilot - Passive run =="
    pub fn rule(&mut self, title: &str) -> anyhow::Result<()> {
        if self.use_colors {
            writeln!(self.writer, "{} {} {}", "==".dimmed(), title.bold(), "==".dimmed())?;
        } else {
            writeln!(self.writer, "== {} ==", title)?;
        }
        Ok(())
    }

    /// Labelled value, e.g. "Org: Acme"
    pub fn field(&mut self, label: &str, value: &str) -> anyhow::Result<()> {
        if self.use_colors {
            writeln!(self.writer, "{} {}", format!("{}:", label).bold(), value)?;
        } else {
            writeln!(self.writer, "{}: {}", label, value)?;
        }
        Ok(())
    }

    /// Pipeline step, e.g. "ct: querying crt.sh for example.com..."
    pub fn step(&mut self, stage: &str, msg: &str) -> anyhow::Result<()> {
        if self.use_colors {
            writeln!(self.writer, "{} {}", format!("{}:", stage).cyan(), msg)?;
        } else {
            writeln!(self.writer, "{}: {}", stage, msg)?;
        }
        Ok(())
    }

    /// Indented detail under the last step
    pub fn detail(&mut self, msg: &str) -> anyhow::Result<()> {
        writeln!(self.writer, "  {}", msg)?;
        Ok(())
    }

    /// Highlighted finding line
    pub fn finding(&mut self, msg: &str) -> anyhow::Result<()> {
        if self.use_colors {
            writeln!(self.writer, "  {} {}", "[!]".yellow().bold(), msg)?;
        } else {
            writeln!(self.writer, "  [!] {}", msg)?;
        }
        Ok(())
    }

    /// Completion line, e.g. "✔ Wrote report -> runs/run-.../casefile.md"
    pub fn success(&mut self, msg: &str) -> anyhow::Result<()> {
        if self.use_colors {
            writeln!(self.writer, "{} {}", "✔".green().bold(), msg)?;
        } else {
            writeln!(self.writer, "✔ {}", msg)?;
        }
        Ok(())
    }

    pub fn blank(&mut self) -> anyhow::Result<()> {
        writeln!(self.writer)?;
        Ok(())
    }

    pub fn flush(&mut self) -> anyhow::Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

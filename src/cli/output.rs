//! Colored output helpers for CLI
//!
//! Provides consistent, colored terminal output for the Scholar CLI.

use crate::debate::{DebateEvent, DebateRole, Decision};
use crate::feeds::format_paper;
use crate::types::{CatchyTitle, Paper};
use owo_colors::OwoColorize;

/// Greedy word wrap to `width` columns. Existing line breaks are kept.
pub fn wrap_text(text: &str, width: usize) -> String {
    let width = width.max(1);
    let mut out = String::with_capacity(text.len() + text.len() / width.max(1));

    for (i, line) in text.lines().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let mut col = 0;
        for word in line.split_whitespace() {
            let len = word.chars().count();
            if col > 0 && col + 1 + len > width {
                out.push('\n');
                col = 0;
            } else if col > 0 {
                out.push(' ');
                col += 1;
            }
            out.push_str(word);
            col += len;
        }
    }
    out
}

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a step message (for multi-step operations)
    pub fn step(&self, step_num: u32, total: u32, message: &str) {
        if self.colored {
            println!(
                "  {} {}",
                format!("[{}/{}]", step_num, total).dimmed(),
                message.bright_white()
            );
        } else {
            println!("  [{}/{}] {}", step_num, total, message);
        }
    }

    /// Print a header for a section
    pub fn section(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// Print a block of model output, wrapped
    pub fn body(&self, text: &str, width: usize) {
        println!("{}", wrap_text(text, width));
    }

    /// Print one debate event as it arrives
    pub fn debate_event(&self, event: &DebateEvent, width: usize) {
        match event {
            DebateEvent::Start {
                debate_id,
                points_per_side,
            } => {
                self.section("Debate");
                self.kv("id", &debate_id.to_string());
                self.kv("points per side", &points_per_side.to_string());
            }
            DebateEvent::Point(message) => {
                let heading = format!(
                    "{}, point {}",
                    message.agent_role.label(),
                    message.round_number
                );
                self.speaker(message.agent_role, &heading);
                self.body(&message.message, width);
            }
            DebateEvent::Conclusion(conclusion) => {
                let heading = format!("{} conclusion", conclusion.agent_role.label());
                self.speaker(conclusion.agent_role, &heading);
                self.body(&conclusion.message, width);
            }
            DebateEvent::Verdict(verdict) => {
                self.section("Verdict");
                self.kv("winner", verdict.winner.label());
                let decision = match verdict.final_decision {
                    Decision::Pass => "PASS",
                    Decision::Fail => "FAIL",
                };
                self.kv("decision", decision);
                self.kv("score", &format!("{:.0}/100", verdict.final_score));
                self.body(&verdict.winning_reasoning, width);
            }
            DebateEvent::Done {
                total_rounds,
                debate_duration_seconds,
            } => {
                println!();
                self.success(&format!(
                    "Debate finished: {} rounds in {:.1}s",
                    total_rounds, debate_duration_seconds
                ));
            }
            DebateEvent::Error { error } => self.error(error),
        }
    }

    fn speaker(&self, role: DebateRole, heading: &str) {
        if self.colored {
            match role {
                DebateRole::Opponent => println!("\n{}", heading.red().bold()),
                DebateRole::Proponent => println!("\n{}", heading.green().bold()),
            }
        } else {
            println!("\n{}", heading);
        }
    }

    /// Print a digest paper block
    pub fn paper(&self, paper: &Paper, preview_chars: usize) {
        println!("{}", format_paper(paper, preview_chars));
    }

    /// Print rewritten titles
    pub fn catchy_titles(&self, titles: &[CatchyTitle]) {
        self.section("Catchy Titles");
        for title in titles {
            if self.colored {
                println!("\n    {}", title.catchy.bright_cyan().bold());
                println!("    {}", title.original.dimmed());
            } else {
                println!("\n    {}", title.catchy);
                println!("    ({})", title.original);
            }
        }
    }

    /// Print newline
    pub fn newline(&self) {
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debate::{DebateConclusion, DebateMessage, DebateVerdict};

    #[test]
    fn test_output_new() {
        let output = Output::new();
        assert!(output.colored);
    }

    #[test]
    fn test_output_no_color() {
        let output = Output::no_color();
        assert!(!output.colored);
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("aaa bbb ccc", 7), "aaa bbb\nccc");
        assert_eq!(wrap_text("one\ntwo three", 80), "one\ntwo three");
        assert_eq!(wrap_text("averyveryverylongword x", 5), "averyveryverylongword\nx");
        assert_eq!(wrap_text("", 10), "");
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "lorem ipsum dolor sit amet ".repeat(20);
        for line in wrap_text(&text, 30).lines() {
            assert!(line.chars().count() <= 30);
        }
    }

    #[test]
    fn test_output_methods_no_panic() {
        // Smoke test - ensure none of the output methods panic
        for output in [Output::no_color(), Output::new()] {
            output.success("test success");
            output.info("test info");
            output.warning("test warning");
            output.error("test error");
            output.step(1, 3, "step message");
            output.section("Test Header");
            output.kv("key", "value");
            output.body("some text to wrap", 5);
            output.newline();
        }
    }

    #[test]
    fn test_debate_events_no_panic() {
        let output = Output::no_color();
        let events = vec![
            DebateEvent::Start {
                debate_id: uuid::Uuid::nil(),
                points_per_side: 2,
            },
            DebateEvent::Point(DebateMessage {
                agent_role: DebateRole::Opponent,
                message: "The sample is small.".into(),
                round_number: 1,
                timestamp: 0,
            }),
            DebateEvent::Conclusion(DebateConclusion {
                agent_role: DebateRole::Proponent,
                message: "The method is sound.".into(),
            }),
            DebateEvent::Verdict(DebateVerdict {
                winner: DebateRole::Proponent,
                final_decision: Decision::Pass,
                final_score: 72.0,
                winning_reasoning: "Better evidence.".into(),
            }),
            DebateEvent::Done {
                total_rounds: 2,
                debate_duration_seconds: 1.2,
            },
            DebateEvent::Error {
                error: "boom".into(),
            },
        ];
        for event in &events {
            output.debate_event(event, 40);
        }
    }
}

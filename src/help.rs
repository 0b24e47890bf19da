//! Economic explanations for each model, aimed at students.

use std::fmt::{self, Display, Formatter};

const WIDTH: usize = 66;

/// A short lesson on an economic concept.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EconomicHelp {
    pub title: &'static str,
    pub description: &'static str,
    /// The model's simplifying assumptions.
    pub assumptions: &'static [&'static str],
    /// Courses where the concept is taught.
    pub courses: &'static [&'static str],
}

impl Display for EconomicHelp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let inner = WIDTH - 2;
        let heading = format!("OIKOS - {}", self.title.to_uppercase());

        writeln!(f, "╔{}╗", "═".repeat(inner))?;
        writeln!(f, "║{:^width$}║", heading, width = inner)?;
        writeln!(f, "╚{}╝", "═".repeat(inner))?;
        writeln!(f)?;
        writeln!(f, "{}", self.description)?;

        if !self.assumptions.is_empty() {
            writeln!(f)?;
            writeln!(f, "ASSUMPTIONS:")?;
            for (i, assumption) in self.assumptions.iter().enumerate() {
                writeln!(f, "   {}. {}", i + 1, assumption)?;
            }
        }

        if !self.courses.is_empty() {
            writeln!(f)?;
            writeln!(f, "USED IN:")?;
            for course in self.courses {
                writeln!(f, "   • {}", course)?;
            }
        }

        writeln!(f)?;
        write!(f, "{}", "─".repeat(WIDTH))
    }
}

/// Models which can explain the economics behind them.
pub trait Explain {
    fn help() -> EconomicHelp
    where
        Self: Sized;

    /// The general lesson plus anything specific to this instance.
    fn explain(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELP: EconomicHelp = EconomicHelp {
        title: "Market",
        description: "Buyers and sellers meet.",
        assumptions: &["perfect competition", "flexible prices"],
        courses: &["Microeconomics I"],
    };

    #[test]
    fn help_is_drawn_in_a_box() {
        let got = HELP.to_string();
        let lines: Vec<&str> = got.lines().collect();

        assert_eq!(lines[0].chars().count(), WIDTH);
        assert_eq!(lines[1].chars().count(), WIDTH);
        assert!(lines[1].contains("OIKOS - MARKET"));
        assert_eq!(lines[4], "Buyers and sellers meet.");
        assert!(got.contains("   1. perfect competition\n   2. flexible prices"));
        assert!(got.contains("   • Microeconomics I"));
        assert!(got.ends_with(&"─".repeat(WIDTH)));
    }

    #[test]
    fn empty_sections_are_skipped() {
        let help = EconomicHelp {
            assumptions: &[],
            courses: &[],
            ..HELP
        };

        let got = help.to_string();

        assert!(!got.contains("ASSUMPTIONS"));
        assert!(!got.contains("USED IN"));
    }
}

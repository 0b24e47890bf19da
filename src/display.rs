//! Presenting results as notebook maths or plain terminal text.

use indexmap::IndexMap;
use smol_str::SmolStr;
use std::fmt::{self, Display, Formatter, Write};

/// Named results, in the order they should be shown.
pub type Results = IndexMap<SmolStr, f64>;

/// Something which can summarise itself as a set of [`Results`].
pub trait Report {
    fn results(&self) -> Results;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DisplayMode {
    /// An evcxr Jupyter kernel, which renders LaTeX.
    Notebook,
    Terminal,
}

impl DisplayMode {
    pub fn detect() -> Self {
        if std::env::var_os("EVCXR_IS_RUNTIME").is_some() {
            DisplayMode::Notebook
        } else {
            DisplayMode::Terminal
        }
    }
}

const BANNER_WIDTH: usize = 50;

pub fn render(
    results: &Results,
    title: Option<&str>,
    mode: DisplayMode,
) -> String {
    Rendered {
        results,
        title,
        mode,
    }
    .to_string()
}

/// Print the results using whichever [`DisplayMode`] suits the current
/// environment.
pub fn write(results: &Results, title: Option<&str>) {
    print!(
        "{}",
        Rendered {
            results,
            title,
            mode: DisplayMode::detect(),
        }
    );
}

/// A set of [`Results`] laid out for a particular [`DisplayMode`].
#[derive(Debug, Copy, Clone)]
pub struct Rendered<'a> {
    pub results: &'a Results,
    pub title: Option<&'a str>,
    pub mode: DisplayMode,
}

impl Display for Rendered<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Rendered {
            results,
            title,
            mode,
        } = *self;

        match mode {
            DisplayMode::Notebook => write_notebook(f, results, title),
            DisplayMode::Terminal => write_terminal(f, results, title),
        }
    }
}

fn write_notebook<W: Write>(
    out: &mut W,
    results: &Results,
    title: Option<&str>,
) -> fmt::Result {
    writeln!(out, "EVCXR_BEGIN_CONTENT text/latex")?;

    if let Some(title) = title {
        writeln!(out, "$$\\textbf{{{}}}$$", title)?;
    }

    for (key, value) in results {
        writeln!(out, "$${} = {}$$", latex_key(key), format_value(*value))?;
    }

    writeln!(out, "EVCXR_END_CONTENT")
}

fn write_terminal<W: Write>(
    out: &mut W,
    results: &Results,
    title: Option<&str>,
) -> fmt::Result {
    let banner = "=".repeat(BANNER_WIDTH);
    let width = results.keys().map(|k| k.chars().count()).max().unwrap_or(0);

    if let Some(title) = title {
        writeln!(out, "\n{}\n  {}\n{}", banner, title, banner)?;
    }

    for (key, value) in results {
        writeln!(
            out,
            "  {:<width$} = {}",
            key.as_str(),
            format_value(*value),
            width = width
        )?;
    }

    if title.is_some() {
        writeln!(out, "{}\n", banner)?;
    }

    Ok(())
}

/// `P*` is written `P^{*}` in LaTeX.
fn latex_key(key: &str) -> String {
    match key.strip_suffix('*') {
        Some(base) => format!("{}^{{*}}", base),
        None => key.to_string(),
    }
}

/// At most 4 decimal places, without trailing zeroes.
fn format_value(value: f64) -> String {
    let rounded = format!("{:.4}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');

    match trimmed {
        "-0" => String::from("0"),
        other => other.to_string(),
    }
}

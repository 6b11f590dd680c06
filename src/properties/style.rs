//! Draw options of one `\draw` / `\node` command
//!
//! Reads the option list in brackets after the command name into typed
//! settings and writes settings back. Options this module does not manage
//! are kept in place.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::domain::ByteSpan;
use crate::extract::{format_number, parse_literal};

/// Bare color names recognised as a draw color token
pub const COLOR_NAMES: [&str; 10] = [
    "black", "blue", "red", "green", "orange", "magenta", "brown", "cyan", "gray", "yellow",
];

/// Line dash pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    DenselyDashed,
    LooselyDashed,
    Dotted,
    DenselyDotted,
    LooselyDotted,
    DashDotted,
    DenselyDashDotted,
    LooselyDashDotted,
}

impl LineStyle {
    pub const ALL: [LineStyle; 10] = [
        LineStyle::LooselyDashDotted,
        LineStyle::DenselyDashDotted,
        LineStyle::DashDotted,
        LineStyle::LooselyDashed,
        LineStyle::DenselyDashed,
        LineStyle::Dashed,
        LineStyle::LooselyDotted,
        LineStyle::DenselyDotted,
        LineStyle::Dotted,
        LineStyle::Solid,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LineStyle::Solid => "solid",
            LineStyle::Dashed => "dashed",
            LineStyle::DenselyDashed => "densely dashed",
            LineStyle::LooselyDashed => "loosely dashed",
            LineStyle::Dotted => "dotted",
            LineStyle::DenselyDotted => "densely dotted",
            LineStyle::LooselyDotted => "loosely dotted",
            LineStyle::DashDotted => "dashdotted",
            LineStyle::DenselyDashDotted => "densely dashdotted",
            LineStyle::LooselyDashDotted => "loosely dashdotted",
        }
    }
}

/// Stroke width keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Thickness {
    UltraThin,
    VeryThin,
    #[default]
    Thin,
    Semithick,
    Thick,
    VeryThick,
    UltraThick,
}

impl Thickness {
    pub const ALL: [Thickness; 7] = [
        Thickness::UltraThick,
        Thickness::VeryThick,
        Thickness::UltraThin,
        Thickness::VeryThin,
        Thickness::Semithick,
        Thickness::Thick,
        Thickness::Thin,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Thickness::UltraThin => "ultra thin",
            Thickness::VeryThin => "very thin",
            Thickness::Thin => "thin",
            Thickness::Semithick => "semithick",
            Thickness::Thick => "thick",
            Thickness::VeryThick => "very thick",
            Thickness::UltraThick => "ultra thick",
        }
    }
}

/// Decoration at one end of a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cap {
    #[default]
    None,
    Arrow,
    Bar,
}

/// Arrow tip tokens and the caps they stand for
const ENDPOINTS: [(&str, Cap, Cap); 8] = [
    ("<->", Cap::Arrow, Cap::Arrow),
    ("|->", Cap::Bar, Cap::Arrow),
    ("<-|", Cap::Arrow, Cap::Bar),
    ("|-|", Cap::Bar, Cap::Bar),
    ("->", Cap::None, Cap::Arrow),
    ("<-", Cap::Arrow, Cap::None),
    ("-|", Cap::None, Cap::Bar),
    ("|-", Cap::Bar, Cap::None),
];

/// Which command the options belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Draw,
    Node,
}

/// Style of one command as shown and edited through properties
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleSettings {
    /// Stroke color (`draw=`), or text color for nodes
    pub color: String,
    pub line_style: LineStyle,
    pub thickness: Thickness,
    /// Ignored for nodes
    pub start_cap: Cap,
    /// Ignored for nodes
    pub end_cap: Cap,
    pub draw_opacity: f64,
    /// `None` writes `fill=none`
    pub fill: Option<String>,
    pub fill_opacity: f64,
}

impl Default for StyleSettings {
    fn default() -> Self {
        Self {
            color: "black".to_string(),
            line_style: LineStyle::Solid,
            thickness: Thickness::Thin,
            start_cap: Cap::None,
            end_cap: Cap::None,
            draw_opacity: 1.0,
            fill: None,
            fill_opacity: 1.0,
        }
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex")
}

/// A whole drawing command up to its terminating `;`
fn command_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"\\(?:draw|node)(?:\s*\[[^\]]*\])?(?s:.)*?;"))
}

/// Command name and its optional bracketed options
fn head_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"^(\s*\\(?:draw|node))(?:\s*(\[[^\]]*\]))?"))
}

/// Span of the drawing command that contains byte offset `anchor`
pub fn command_span(text: &str, anchor: usize) -> Option<ByteSpan> {
    command_pattern()
        .find_iter(text)
        .find(|m| m.start() <= anchor && anchor < m.end())
        .map(|m| ByteSpan::new(m.start(), m.end()))
}

/// Head of a command: name, kind and trimmed option list
struct Head<'a> {
    name: &'a str,
    len: usize,
    kind: CommandKind,
    options: Vec<String>,
}

fn parse_head(command: &str) -> Option<Head<'_>> {
    let caps = head_pattern().captures(command)?;
    let name = caps.get(1)?.as_str();
    let options = caps
        .get(2)
        .map(|m| {
            let inner = &m.as_str()[1..m.as_str().len() - 1];
            inner
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    Some(Head {
        name,
        len: caps.get(0)?.end(),
        kind: if name.contains("\\node") {
            CommandKind::Node
        } else {
            CommandKind::Draw
        },
        options,
    })
}

fn prefixed<'a>(options: &'a [String], prefix: &str) -> Option<&'a str> {
    options
        .iter()
        .find_map(|v| v.strip_prefix(prefix))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn has(options: &[String], token: &str) -> bool {
    options.iter().any(|v| v == token)
}

/// Opacity as shown: clamped to `[0.1, 1]` and rounded to one decimal
fn shown_opacity(value: Option<&str>) -> f64 {
    let value = value.and_then(parse_literal).unwrap_or(1.0);
    (value.clamp(0.1, 1.0) * 10.0).round() / 10.0
}

/// Kind and style of a command, read from its option list
pub fn read_style(command: &str) -> Option<(CommandKind, StyleSettings)> {
    let head = parse_head(command)?;
    let opts = &head.options;

    let explicit = match head.kind {
        CommandKind::Node => prefixed(opts, "text=").or_else(|| prefixed(opts, "color=")),
        CommandKind::Draw => prefixed(opts, "draw="),
    };
    let color = explicit
        .or_else(|| COLOR_NAMES.into_iter().find(|c| has(opts, c)))
        .unwrap_or("black")
        .to_string();

    let line_style = LineStyle::ALL
        .into_iter()
        .find(|s| has(opts, s.name()))
        .unwrap_or_default();
    let thickness = Thickness::ALL
        .into_iter()
        .find(|t| has(opts, t.name()))
        .unwrap_or_default();
    let (start_cap, end_cap) = match head.kind {
        CommandKind::Node => (Cap::None, Cap::None),
        CommandKind::Draw => ENDPOINTS
            .into_iter()
            .find(|(token, ..)| has(opts, token))
            .map(|(_, start, end)| (start, end))
            .unwrap_or_default(),
    };
    let fill = prefixed(opts, "fill=")
        .filter(|f| *f != "none")
        .map(str::to_string);

    Some((
        head.kind,
        StyleSettings {
            color,
            line_style,
            thickness,
            start_cap,
            end_cap,
            draw_opacity: shown_opacity(prefixed(opts, "draw opacity=")),
            fill,
            fill_opacity: shown_opacity(prefixed(opts, "fill opacity=")),
        },
    ))
}

/// Written opacity; non-finite values fall back to opaque
fn opacity(value: f64) -> String {
    format_number(if value.is_finite() { value.clamp(0.0, 1.0) } else { 1.0 })
}

fn remove(opts: &mut Vec<String>, tokens: &[&str]) {
    opts.retain(|v| !tokens.contains(&v.as_str()));
}

fn remove_prefix(opts: &mut Vec<String>, prefix: &str) {
    opts.retain(|v| !v.starts_with(prefix));
}

/// The command with its option list rewritten to `style`
pub fn restyle_command(command: &str, style: &StyleSettings) -> Option<String> {
    let head = parse_head(command)?;
    let mut opts = head.options;

    remove(&mut opts, &COLOR_NAMES);
    match head.kind {
        CommandKind::Node => {
            remove_prefix(&mut opts, "text=");
            remove_prefix(&mut opts, "color=");
            opts.push(format!("text={}", style.color));
        }
        CommandKind::Draw => {
            remove_prefix(&mut opts, "draw=");
            opts.push(format!("draw={}", style.color));

            let tokens: Vec<&str> = ENDPOINTS.iter().map(|(t, ..)| *t).chain(["-"]).collect();
            remove(&mut opts, &tokens);
            if let Some((token, ..)) = ENDPOINTS
                .iter()
                .find(|(_, start, end)| (*start, *end) == (style.start_cap, style.end_cap))
            {
                opts.push((*token).to_string());
            }
        }
    }

    let styles: Vec<&str> = LineStyle::ALL.iter().map(|s| s.name()).collect();
    remove(&mut opts, &styles);
    if style.line_style != LineStyle::Solid {
        opts.push(style.line_style.name().to_string());
    }

    let widths: Vec<&str> = Thickness::ALL.iter().map(|t| t.name()).collect();
    remove(&mut opts, &widths);
    opts.push(style.thickness.name().to_string());

    remove_prefix(&mut opts, "draw opacity=");
    opts.push(format!("draw opacity={}", opacity(style.draw_opacity)));

    remove_prefix(&mut opts, "fill=");
    opts.push(format!("fill={}", style.fill.as_deref().unwrap_or("none")));

    remove_prefix(&mut opts, "fill opacity=");
    opts.push(format!("fill opacity={}", opacity(style.fill_opacity)));

    Some(format!("{}[{}]{}", head.name, opts.join(","), &command[head.len..]))
}

//! Terminal markdown rendering for assistant replies.
//!
//! Prose goes through `termimad`; fenced code blocks are highlighted with
//! `syntect`. Headers and bold text take the active persona's accent color.

use crossterm::style::Color;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::as_24_bit_terminal_escaped;
use termimad::MadSkin;

use chatguru_types::persona::Persona;

const CODE_THEME: &str = "base16-ocean.dark";

pub struct ChatRenderer {
    skin: MadSkin,
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl ChatRenderer {
    pub fn new(persona: Persona) -> Self {
        let mut renderer = Self {
            skin: MadSkin::default_dark(),
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        };
        renderer.set_accent(persona_accent(persona));
        renderer
    }

    /// Recolor headers and bold text.
    pub fn set_accent(&mut self, color: Color) {
        let tc = to_termimad_color(color);
        self.skin.bold.set_fg(tc);
        self.skin.headers[0].set_fg(tc);
        self.skin.headers[1].set_fg(tc);
        self.skin
            .inline_code
            .set_fg(termimad::crossterm::style::Color::Yellow);
    }

    /// Render a complete markdown reply.
    pub fn render_final(&self, markdown: &str) -> String {
        let mut output = String::new();
        let mut code: Option<(String, String)> = None;

        for line in markdown.lines() {
            if line.trim_start().starts_with("```") {
                match code.take() {
                    None => {
                        let lang = line.trim().trim_start_matches('`').trim().to_string();
                        code = Some((lang, String::new()));
                    }
                    Some((lang, buf)) => {
                        output.push_str(&self.highlight_code(&buf, &lang));
                        output.push('\n');
                    }
                }
            } else if let Some((_, buf)) = code.as_mut() {
                buf.push_str(line);
                buf.push('\n');
            } else {
                output.push_str(&self.skin.term_text(line).to_string());
            }
        }

        // Unterminated fence
        if let Some((lang, buf)) = code {
            if !buf.is_empty() {
                output.push_str(&self.highlight_code(&buf, &lang));
            }
        }

        output
    }

    /// Footer after a reply: "| {tokens} tokens · {time}s · {model}".
    pub fn print_stats_footer(&self, tokens: u32, response_ms: u64, model: &str) {
        let seconds = response_ms as f64 / 1000.0;
        println!(
            "\n  {} {} tokens {} {:.1}s {} {}",
            console::style("|").dim(),
            console::style(tokens).dim(),
            console::style("\u{00b7}").dim(),
            console::style(seconds).dim(),
            console::style("\u{00b7}").dim(),
            console::style(model).dim(),
        );
    }

    fn highlight_code(&self, code: &str, lang: &str) -> String {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .filter(|_| !lang.is_empty())
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let mut output = format!("  {}\n", console::style(format!("--- {lang} ---")).dim());
        let Some(theme) = self.theme_set.themes.get(CODE_THEME) else {
            for line in code.lines() {
                output.push_str(&format!("  {line}\n"));
            }
            return output;
        };

        let mut h = HighlightLines::new(syntax, theme);
        for line in code.lines() {
            let ranges: Vec<(Style, &str)> = h
                .highlight_line(line, &self.syntax_set)
                .unwrap_or_default();
            let escaped = as_24_bit_terminal_escaped(&ranges[..], false);
            output.push_str(&format!("  {escaped}\x1b[0m\n"));
        }
        output
    }
}

/// Accent color per persona.
pub fn persona_accent(persona: Persona) -> Color {
    match persona {
        Persona::General => Color::Cyan,
        Persona::KitchenHelper => Color::Yellow,
        Persona::TravelPlanner => Color::Blue,
        Persona::PersonalTrainer => Color::Green,
        Persona::TechSupport => Color::Magenta,
        Persona::CreativeWriter => Color::Rgb { r: 255, g: 135, b: 95 },
    }
}

fn to_termimad_color(color: Color) -> termimad::crossterm::style::Color {
    use termimad::crossterm::style::Color as T;
    match color {
        Color::Cyan => T::Cyan,
        Color::Green => T::Green,
        Color::Yellow => T::Yellow,
        Color::Magenta => T::Magenta,
        Color::Blue => T::Blue,
        Color::Red => T::Red,
        Color::Rgb { r, g, b } => T::Rgb { r, g, b },
        _ => T::Cyan,
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use include_dir::{Dir, include_dir};
use ratatui::style::Color;
use serde::Deserialize;

const LOCAL_THEME_DIR: &str = "themes";
static EMBEDDED_THEMES: Dir = include_dir!("$CARGO_MANIFEST_DIR/themes");

#[derive(Debug, Clone)]
pub(crate) struct Theme {
    pub(crate) name: String,
    pub(crate) theme_type: String,
    pub(crate) bg: Color,
    pub(crate) bg_alt: Color,
    pub(crate) fg: Color,
    pub(crate) fg_muted: Color,
    pub(crate) border: Color,
    pub(crate) accent: Color,
    pub(crate) selection: Color,
    pub(crate) error: Color,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ThemeFile {
    pub(crate) name: String,
    #[serde(rename = "type")]
    pub(crate) theme_type: String,
    pub(crate) colors: ThemeColors,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ThemeColors {
    pub(crate) background: String,
    #[serde(rename = "backgroundAlt")]
    pub(crate) background_alt: String,
    pub(crate) foreground: String,
    #[serde(rename = "foregroundMuted")]
    pub(crate) foreground_muted: String,
    pub(crate) border: String,
    pub(crate) accent: String,
    pub(crate) selection: String,
    #[serde(default)]
    pub(crate) error: Option<String>,
}

pub(crate) fn color_from_hex(input: &str, fallback: Color) -> Color {
    let s = input.trim();
    if let Some(stripped) = s.strip_prefix('#')
        && stripped.len() == 6
    {
        let r = u8::from_str_radix(&stripped[0..2], 16).ok();
        let g = u8::from_str_radix(&stripped[2..4], 16).ok();
        let b = u8::from_str_radix(&stripped[4..6], 16).ok();
        if let (Some(r), Some(g), Some(b)) = (r, g, b) {
            return Color::Rgb(r, g, b);
        }
    }
    fallback
}

pub(crate) fn theme_from_file(tf: ThemeFile) -> Theme {
    let c = &tf.colors;
    Theme {
        bg: color_from_hex(&c.background, Color::Rgb(30, 30, 30)),
        bg_alt: color_from_hex(&c.background_alt, Color::Rgb(37, 37, 38)),
        fg: color_from_hex(&c.foreground, Color::Rgb(212, 212, 212)),
        fg_muted: color_from_hex(&c.foreground_muted, Color::Rgb(136, 136, 136)),
        border: color_from_hex(&c.border, Color::Rgb(60, 60, 60)),
        accent: color_from_hex(&c.accent, Color::Rgb(0, 123, 255)),
        selection: color_from_hex(&c.selection, Color::Rgb(38, 79, 120)),
        error: c
            .error
            .as_ref()
            .map_or(Color::Rgb(255, 68, 68), |e| {
                color_from_hex(e, Color::Rgb(255, 68, 68))
            }),
        name: tf.name,
        theme_type: tf.theme_type,
    }
}

fn fallback_theme() -> Theme {
    Theme {
        name: "Fallback".to_string(),
        theme_type: "dark".to_string(),
        bg: Color::Reset,
        bg_alt: Color::Reset,
        fg: Color::White,
        fg_muted: Color::Gray,
        border: Color::DarkGray,
        accent: Color::Blue,
        selection: Color::DarkGray,
        error: Color::Red,
    }
}

fn parse_theme(raw: &str) -> Option<Theme> {
    serde_json::from_str::<ThemeFile>(raw)
        .ok()
        .map(theme_from_file)
}

fn local_themes(dir: &Path) -> Vec<Theme> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut paths: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e == "json"))
        .collect();
    paths.sort();
    paths
        .iter()
        .filter_map(|p| fs::read_to_string(p).ok())
        .filter_map(|raw| parse_theme(&raw))
        .collect()
}

fn embedded_themes() -> Vec<Theme> {
    let mut files: Vec<_> = EMBEDDED_THEMES
        .files()
        .filter(|f| f.path().extension().is_some_and(|e| e == "json"))
        .collect();
    files.sort_by_key(|f| f.path());
    files
        .into_iter()
        .filter_map(|f| f.contents_utf8())
        .filter_map(parse_theme)
        .collect()
}

/// Local `themes/` JSON files win over the embedded set. Never empty; dark
/// themes sort first.
pub(crate) fn load_themes() -> Vec<Theme> {
    let mut themes = local_themes(Path::new(LOCAL_THEME_DIR));
    if themes.is_empty() {
        themes = embedded_themes();
    }
    if themes.is_empty() {
        themes.push(fallback_theme());
    }
    themes.sort_by_key(|t| (t.theme_type != "dark", t.name.to_ascii_lowercase()));
    themes
}

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use encoding_rs::Encoding;
use serde::Deserialize;

use crate::content::builtin_heroes;
use crate::Hero;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Json,
    Yaml,
}

impl SheetFormat {
    /// `.json` files are JSON; everything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SheetFormat::Json,
            _ => SheetFormat::Yaml,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SheetConfig {
    #[serde(default)]
    pub hero_path: Option<String>,
    #[serde(default)]
    pub hero_id: Option<String>,
    /// Run derived-data preparation after loading.
    #[serde(default = "default_resolve")]
    pub resolve: bool,
}

fn default_resolve() -> bool {
    true
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            hero_path: None,
            hero_id: None,
            resolve: default_resolve(),
        }
    }
}

/// Load a hero from a file or a built-in sheet, resolving derived data when asked.
pub fn load_sheet(cfg: SheetConfig) -> Result<Hero> {
    let mut hero = match (&cfg.hero_path, &cfg.hero_id) {
        (Some(path), None) => load_hero_file(Path::new(path))?,
        (None, Some(id)) => load_builtin_hero(id)?,
        (Some(_), Some(_)) => bail!("give either hero_path or hero_id, not both"),
        (None, None) => bail!("no hero_path or hero_id given"),
    };
    if cfg.resolve {
        hero.prepare_derived()
            .with_context(|| format!("failed to resolve hero '{}'", hero.name))?;
    }
    Ok(hero)
}

pub fn load_hero_file(path: &Path) -> Result<Hero> {
    let text = read_text_auto(path)?;
    let hero = parse_hero(&text, SheetFormat::from_path(path))
        .with_context(|| format!("failed to parse hero sheet: {}", path.display()))?;
    tracing::info!(hero = %hero.name, path = %path.display(), "loaded hero sheet");
    Ok(hero)
}

/// Reads `path` as text, honouring a UTF-8 or UTF-16 byte order mark.
fn read_text_auto(path: &Path) -> Result<String> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read hero sheet: {}", path.display()))?;
    if let Some((enc, bom_len)) = Encoding::for_bom(&bytes) {
        let (text, _, _) = enc.decode(&bytes[bom_len..]);
        Ok(text.into_owned())
    } else {
        String::from_utf8(bytes)
            .with_context(|| format!("hero sheet is not UTF-8: {}", path.display()))
    }
}

pub fn load_builtin_hero(id: &str) -> Result<Hero> {
    let heroes = builtin_heroes();
    let text = heroes
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("no built-in hero '{}'", id))?;
    parse_hero(text, SheetFormat::Json)
        .with_context(|| format!("failed to parse built-in hero '{}'", id))
}

pub fn parse_hero(text: &str, format: SheetFormat) -> Result<Hero> {
    let hero = match format {
        SheetFormat::Json => serde_json::from_str(text)?,
        SheetFormat::Yaml => serde_yaml::from_str(text)?,
    };
    Ok(hero)
}

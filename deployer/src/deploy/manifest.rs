//! Space manifest (`README.md` with YAML front matter)

use std::fmt;

use api_models::{Hardware, SpaceSdk};

use crate::github::profile::{is_open_webui, open_webui_env_vars, open_webui_warnings};

pub const MANIFEST_FILE: &str = "README.md";

const EMOJI: &str = "🚀";
const COLOR_FROM: &str = "blue";
const COLOR_TO: &str = "green";
const OPEN_WEBUI_PORT: u16 = 8080;

/// Values written into a synthesized manifest
#[derive(Debug, Clone)]
pub struct ManifestInput<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub port: Option<u16>,
    pub hardware: Hardware,
    pub tags: &'a [String],
    /// `owner/repo`
    pub repo_full_name: &'a str,
    pub repo_url: &'a str,
    pub repo_name: &'a str,
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Render the manifest document
pub fn render_manifest(input: &ManifestInput<'_>) -> String {
    Manifest { input }.to_string()
}

struct Manifest<'a, 'b> {
    input: &'b ManifestInput<'a>,
}

impl fmt::Display for Manifest<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let input = self.input;
        let open_webui = is_open_webui(input.repo_name);
        let port = input.port.or(open_webui.then_some(OPEN_WEBUI_PORT));

        writeln!(f, "---")?;
        writeln!(f, "title: {}", quoted(input.title))?;
        writeln!(f, "emoji: {}", EMOJI)?;
        writeln!(f, "colorFrom: {}", COLOR_FROM)?;
        writeln!(f, "colorTo: {}", COLOR_TO)?;
        writeln!(f, "sdk: {}", SpaceSdk::Docker.as_str())?;
        if let Some(port) = port {
            writeln!(f, "app_port: {}", port)?;
        }
        writeln!(f, "pinned: false")?;
        if input.hardware != Hardware::CpuBasic {
            writeln!(f, "suggested_hardware: {}", input.hardware)?;
        }
        if !input.tags.is_empty() {
            writeln!(f, "tags:")?;
            for tag in input.tags {
                writeln!(f, "  - {}", quoted(tag))?;
            }
        }
        writeln!(f, "---")?;
        writeln!(f)?;
        writeln!(f, "# {}", input.title)?;
        writeln!(f)?;
        writeln!(
            f,
            "{}",
            input
                .description
                .filter(|d| !d.trim().is_empty())
                .unwrap_or("Deployed from GitHub using GH2HF Deployer")
        )?;
        writeln!(f)?;
        writeln!(
            f,
            "Source repository: [{}]({})",
            input.repo_full_name, input.repo_url
        )?;

        if open_webui {
            write_open_webui_notes(f)?;
        }
        Ok(())
    }
}

/// Operator notes for Open WebUI Spaces
fn write_open_webui_notes(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "## Required configuration")?;
    writeln!(f)?;
    writeln!(
        f,
        "Set the following variables and secrets in the Space settings before first use:"
    )?;
    writeln!(f)?;
    for (key, example) in open_webui_env_vars() {
        writeln!(f, "- `{}` (example: `{}`)", key, example)?;
    }
    writeln!(f)?;
    writeln!(f, "### Warnings")?;
    writeln!(f)?;
    for warning in open_webui_warnings() {
        writeln!(f, "- {}", warning)?;
    }
    Ok(())
}

//! webgenius: export a saved project and work with component templates
//! outside the browser.

mod file_store;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use file_store::FileStore;
use wg_core::gateway::{
    GenerateRequest, GenerateResponse, ImproveStyleRequest, ImproveStyleResponse,
    decode_generate_output,
};
use wg_core::{
    ComponentGateway, ComponentTemplate, ExportConfig, FontChoice, GatewayError, LintSeverity,
    PropertyKind, apply_property_edit, lint_template, render,
};
use wg_editor::{Editor, GeneratorSession};

#[derive(Parser)]
#[command(name = "webgenius")]
#[command(version, about = "WebGenius project and template tools", long_about = None)]
#[command(after_help = "EXAMPLES:
    webgenius export --store project.json            Write website.html
    webgenius export --store project.json -o -       Print the page
    webgenius render hero.json --text title=Hello    Render with an edit
    webgenius lint hero.json                         Check a template")]
struct Cli {
    /// Log debug output (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export a saved project as a standalone HTML page
    Export {
        /// Storage dump (JSON object of keyed entries)
        #[arg(long, value_name = "FILE")]
        store: PathBuf,

        /// Output file, or `-` for stdout [default: website.html]
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Document title
        #[arg(long)]
        title: Option<String>,

        /// Document language
        #[arg(long)]
        lang: Option<String>,

        /// Body font: alegreya (serif) or belleza (sans-serif)
        #[arg(long, value_parser = parse_font)]
        font: Option<FontChoice>,
    },

    /// Render a template with property edits applied
    Render {
        /// Template file (`{ code, properties }`)
        template: PathBuf,

        /// Set a text property: ID=VALUE
        #[arg(long = "text", value_name = "ID=VALUE", value_parser = parse_assignment)]
        texts: Vec<(String, String)>,

        /// Set an image URL property: ID=URL
        #[arg(long = "image", value_name = "ID=URL", value_parser = parse_assignment)]
        images: Vec<(String, String)>,

        /// Set a link URL property: ID=URL
        #[arg(long = "link", value_name = "ID=URL", value_parser = parse_assignment)]
        links: Vec<(String, String)>,

        /// Set a color property: --custom-prop=VALUE
        #[arg(long = "color", value_name = "ID=VALUE", value_parser = parse_assignment)]
        colors: Vec<(String, String)>,
    },

    /// Check a template for markers and colors that edits cannot reach
    Lint {
        /// Template file (`{ code, properties }`)
        template: PathBuf,

        /// Print findings as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a generated template and save it to a project's library
    Save {
        /// Generator output (`{ code, properties }`, optionally fenced)
        template: PathBuf,

        /// Library name
        #[arg(long)]
        name: String,

        /// Storage dump to add it to
        #[arg(long, value_name = "FILE")]
        store: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Export {
            store,
            output,
            title,
            lang,
            font,
        } => {
            let mut config = ExportConfig::default();
            if let Some(title) = title {
                config.title = title;
            }
            if let Some(lang) = lang {
                config.lang = lang;
            }
            if let Some(font) = font {
                config.font = font;
            }
            export(&store, output, &config)
        }
        Command::Render {
            template,
            texts,
            images,
            links,
            colors,
        } => {
            let edits = texts
                .into_iter()
                .map(|(id, v)| (PropertyKind::Text, id, v))
                .chain(images.into_iter().map(|(id, v)| (PropertyKind::ImageUrl, id, v)))
                .chain(links.into_iter().map(|(id, v)| (PropertyKind::LinkUrl, id, v)))
                .chain(colors.into_iter().map(|(id, v)| (PropertyKind::Color, id, v)))
                .collect::<Vec<_>>();
            read(&template)
                .and_then(|json| render_template(&json, &edits))
                .map(|html| println!("{html}"))
        }
        Command::Lint { template, json } => read(&template).and_then(|text| lint(&text, json)),
        Command::Save {
            template,
            name,
            store,
        } => read(&template).and_then(|raw| save(&raw, &name, &template, &store)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

// ─── Commands ────────────────────────────────────────────────────────────

fn export(store: &Path, output: Option<PathBuf>, config: &ExportConfig) -> Result<(), String> {
    let store = FileStore::open(store).map_err(|e| e.to_string())?;
    let editor = Editor::load(store);
    log::info!(
        "exporting {} elements from {}",
        editor.scene().len(),
        editor.store().path().display()
    );
    let html = editor.export(config);

    let output = output.unwrap_or_else(|| PathBuf::from(&config.file_name));
    if output.as_os_str() == "-" {
        let mut stdout = std::io::stdout().lock();
        return writeln!(stdout, "{html}").map_err(|e| e.to_string());
    }
    fs::write(&output, html).map_err(|e| format!("{}: {e}", output.display()))?;
    eprintln!("wrote {}", output.display());
    Ok(())
}

fn render_template(json: &str, edits: &[(PropertyKind, String, String)]) -> Result<String, String> {
    let template: ComponentTemplate =
        serde_json::from_str(json).map_err(|e| format!("invalid template: {e}"))?;
    if edits.is_empty() {
        return Ok(render(&template.base_code, &template.properties));
    }

    let mut base_code = template.base_code;
    let mut properties = template.properties;
    let mut rendered = String::new();
    for (kind, id, value) in edits {
        let edit = apply_property_edit(&base_code, &properties, id, *kind, value)
            .map_err(|e| e.to_string())?;
        base_code = edit.base_code;
        properties = edit.properties;
        rendered = edit.rendered;
    }
    Ok(rendered)
}

fn lint(json: &str, as_json: bool) -> Result<(), String> {
    let template: ComponentTemplate =
        serde_json::from_str(json).map_err(|e| format!("invalid template: {e}"))?;
    let diags = lint_template(&template);

    if as_json {
        let out = serde_json::to_string_pretty(&diags).map_err(|e| e.to_string())?;
        println!("{out}");
    } else {
        for d in &diags {
            let severity = match d.severity {
                LintSeverity::Warning => "warning",
                LintSeverity::Info => "info",
            };
            match &d.property_id {
                Some(id) => println!("{severity}[{}] {id}: {}", d.rule, d.message),
                None => println!("{severity}[{}] {}", d.rule, d.message),
            }
        }
    }

    let warnings = diags
        .iter()
        .filter(|d| d.severity == LintSeverity::Warning)
        .count();
    if warnings > 0 {
        return Err(format!("{warnings} warning(s)"));
    }
    Ok(())
}

fn save(raw: &str, name: &str, source: &Path, store: &Path) -> Result<(), String> {
    let store = FileStore::open(store).map_err(|e| e.to_string())?;
    let mut editor = Editor::load(store);
    let mut session = GeneratorSession::new();
    let gateway = ReplayGateway { output: raw };
    session
        .run(&gateway, &format!("imported from {}", source.display()))
        .map_err(|e| e.to_string())?;
    let id = editor
        .save_generated(&mut session, name)
        .map_err(|e| e.to_string())?;
    eprintln!("saved '{}' as {}", name.trim(), id.as_str());
    Ok(())
}

/// Answers generation with output captured earlier.
struct ReplayGateway<'a> {
    output: &'a str,
}

impl ComponentGateway for ReplayGateway<'_> {
    fn generate(&self, _request: &GenerateRequest) -> Result<GenerateResponse, GatewayError> {
        decode_generate_output(self.output)
    }

    fn improve_style(
        &self,
        _request: &ImproveStyleRequest,
    ) -> Result<ImproveStyleResponse, GatewayError> {
        Err(GatewayError::Transport(
            "no style suggestions offline".to_string(),
        ))
    }
}

// ─── Argument parsing ────────────────────────────────────────────────────

fn read(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))
}

/// Split `ID=VALUE` at the first `=`. The value may be empty.
fn parse_assignment(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((id, value)) if !id.is_empty() => Ok((id.to_string(), value.to_string())),
        _ => Err(format!("expected ID=VALUE, got '{s}'")),
    }
}

fn parse_font(s: &str) -> Result<FontChoice, String> {
    FontChoice::parse(s).ok_or_else(|| format!("unknown font '{s}' (alegreya, belleza)"))
}

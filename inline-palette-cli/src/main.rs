use clap::{Parser, Subcommand, ValueEnum};
use inline_palette::{
    Channel, ColorChoice, ColorTool, Document, EditError, Range, StyleOutcome, ToolConfig,
};
use std::fmt::Display;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ChannelArg {
    Text,
    Background,
}

impl From<ChannelArg> for Channel {
    fn from(arg: ChannelArg) -> Self {
        match arg {
            ChannelArg::Text => Channel::Text,
            ChannelArg::Background => Channel::Background,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Colours graphemes start..end of an inline HTML snippet
    Apply {
        #[arg(long, value_enum)]
        channel: ChannelArg,
        #[arg(long)]
        color: String,
        #[arg(long)]
        start: usize,
        #[arg(long)]
        end: usize,
        /// Read HTML from a file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Clears a colour channel over graphemes start..end
    Reset {
        #[arg(long, value_enum)]
        channel: ChannelArg,
        #[arg(long)]
        start: usize,
        #[arg(long)]
        end: usize,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Prints the colour palette
    Palette {
        /// JSON tool configuration
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Apply {
            channel,
            color,
            start,
            end,
            file,
        } => edit_command(file.as_deref(), *start, *end, |doc, range| {
            doc.apply_style(range, (*channel).into(), color)
        }),
        Commands::Reset {
            channel,
            start,
            end,
            file,
        } => edit_command(file.as_deref(), *start, *end, |doc, range| {
            doc.reset_style(range, (*channel).into())
        }),
        Commands::Palette { config, json } => palette_command(config.as_deref(), *json),
    }
}

fn or_exit<T, E: Display>(result: Result<T, E>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}

fn read_input(file: Option<&Path>) -> std::io::Result<String> {
    let mut html = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let trimmed = html.trim_end_matches(['\n', '\r']).len();
    html.truncate(trimmed);
    Ok(html)
}

fn edit_command<F>(file: Option<&Path>, start: usize, end: usize, edit: F)
where
    F: FnOnce(&mut Document, &mut Range) -> Result<StyleOutcome, EditError>,
{
    let html = or_exit(read_input(file));
    let mut doc = or_exit(Document::from_html(&html));
    let mut range = or_exit(doc.range(start, end));
    or_exit(edit(&mut doc, &mut range));
    println!("{}", doc.to_html());
}

fn palette_command(config: Option<&Path>, json: bool) {
    let config = match config {
        Some(path) => or_exit(ToolConfig::from_path(path)),
        None => ToolConfig::default(),
    };
    let mut tool = ColorTool::new(&config);
    let title = tool.title().to_string();
    let shortcut = tool.shortcut().to_string();
    let panel = tool.render_actions();

    if json {
        let output = serde_json::json!({
            "title": title,
            "shortcut": shortcut,
            "sections": panel.sections,
        });
        println!("{}", or_exit(serde_json::to_string_pretty(&output)));
        return;
    }

    println!("{title} ({shortcut})");
    for section in &panel.sections {
        let items: Vec<&str> = section
            .items
            .iter()
            .map(|item| match &item.choice {
                ColorChoice::Clear => item.label.as_deref().unwrap_or_default(),
                ColorChoice::Color(color) => color.as_str(),
            })
            .collect();
        println!("{}: {}", section.label, items.join(" "));
    }
}

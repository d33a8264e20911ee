use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "verseart", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a verse card to PNG or JPEG.
    Render(RenderArgs),
    /// Print the fitted card layout as JSON (built-in glyph metrics).
    Layout(LayoutArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Render config JSON.
    #[arg(long)]
    config: PathBuf,

    /// Output image path.
    #[arg(long)]
    out: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = FormatChoice::Png)]
    format: FormatChoice,

    /// JPEG quality (1-100).
    #[arg(long)]
    quality: Option<u8>,

    /// Regular font file (TTF/OTF). Overrides VERSEART_FONT_REGULAR.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Bold font file used for the reference line. Overrides VERSEART_FONT_BOLD.
    #[arg(long)]
    bold_font: Option<PathBuf>,

    /// Branding caption. Overrides VERSEART_BRANDING.
    #[arg(long)]
    branding: Option<String>,

    /// Device pixel density of the backing surface.
    #[arg(long, default_value_t = 1.0)]
    pixel_density: f32,

    /// How long to wait for fonts before rendering with built-in glyphs.
    #[arg(long, default_value_t = 5000)]
    font_timeout_ms: u64,
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// Render config JSON.
    #[arg(long)]
    config: PathBuf,

    /// Branding caption.
    #[arg(long, default_value = verseart::worker::opts::DEFAULT_BRANDING)]
    branding: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Png,
    Jpeg,
}

impl From<FormatChoice> for verseart::ExportFormat {
    fn from(choice: FormatChoice) -> Self {
        match choice {
            FormatChoice::Png => Self::Png,
            FormatChoice::Jpeg => Self::Jpeg,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Layout(args) => cmd_layout(args),
    }
}

fn read_config(path: &Path) -> anyhow::Result<verseart::RenderConfig> {
    let config = verseart::RenderConfig::from_path(path)
        .with_context(|| format!("load render config '{}'", path.display()))?;
    config.validate()?;
    Ok(config)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let config = read_config(&args.config)?;

    let mut opts = verseart::RendererOpts::from_env()?;
    let mut fonts = opts.fonts().clone();
    if let Some(p) = args.font {
        fonts.regular = Some(verseart::FontSource::Path(p));
    }
    if let Some(p) = args.bold_font {
        fonts.bold = Some(verseart::FontSource::Path(p));
    }
    opts = opts.with_fonts(fonts);
    if let Some(b) = args.branding {
        opts = opts.with_branding(b);
    }

    let mut element = verseart::VisualElement::new(config.width, config.height)?
        .with_pixel_density(args.pixel_density)?;
    let mut controller = verseart::RenderController::new(opts)?;
    controller.init_surface(&mut element)?;
    if !controller.wait_for_fonts(Duration::from_millis(args.font_timeout_ms)) {
        eprintln!("fonts still loading; rendering with built-in glyphs");
    }

    controller.request_render(config);
    let image = controller
        .export_image_with_quality(args.format.into(), args.quality)
        .wait()
        .context("export image")?;

    let status = controller.status();
    if let Some(frame) = &status.last_frame {
        eprintln!(
            "fitted {} line(s) at {:.1}px{}",
            frame.lines,
            frame.font_size,
            if frame.fallback_glyphs {
                " (built-in glyphs)"
            } else {
                ""
            }
        );
    }
    controller.teardown();

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &image.bytes)
        .with_context(|| format!("write image '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} ({}x{} {})",
        args.out.display(),
        image.width,
        image.height,
        image.format.mime_type()
    );
    Ok(())
}

fn cmd_layout(args: LayoutArgs) -> anyhow::Result<()> {
    let config = read_config(&args.config)?;
    let geometry = verseart::CardGeometry::new(config.width, config.height);
    let plan = verseart::plan_card(
        &mut verseart::FallbackFace,
        &geometry,
        &config.text,
        &config.reference,
        &config.version_label,
        &args.branding,
    )?;
    let out = serde_json::json!({
        "geometry": geometry,
        "plan": plan,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

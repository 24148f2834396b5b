use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use viewbox::{
    ClipMethod, CpuBackend, CpuBackendOpts, DEMO_CANVAS, DemoOpts, DemoScene, FboSizing,
    FrameReport, Renderer, SceneDoc, SceneGraph,
};

#[derive(Parser, Debug)]
#[command(name = "viewbox", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the stacked-viewbox demo scene as a PNG.
    Demo(DemoArgs),
    /// Render a JSON scene document as a PNG.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct DemoArgs {
    /// Clip method of the two halves (none, viewport, fbo).
    #[arg(long, default_value = "fbo")]
    outer: ClipMethod,

    /// Clip method of the four quarters (none, viewport, fbo).
    #[arg(long, default_value = "viewport")]
    inner: ClipMethod,

    /// Offscreen buffer scale for FBO-clipped viewboxes.
    #[arg(long)]
    fbo_scale: Option<f64>,

    #[arg(long, default_value_t = DEMO_CANVAS.0)]
    width: u32,

    #[arg(long, default_value_t = DEMO_CANVAS.1)]
    height: u32,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Write the frame report as JSON.
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Write the frame report as JSON.
    #[arg(long)]
    report: Option<PathBuf>,
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
        Command::Demo(args) => cmd_demo(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn cmd_demo(args: DemoArgs) -> anyhow::Result<()> {
    let mut opts = DemoOpts::default().with_methods(args.outer, args.inner);
    if let Some(factor) = args.fbo_scale {
        opts = opts
            .with_fbo_sizing(FboSizing::Scale { factor })
            .context("invalid --fbo-scale")?;
    }
    let demo = DemoScene::build(opts).context("build demo scene")?;
    let backend_opts = CpuBackendOpts::from_env().with_clear_rgba(Some([0, 0, 0, 255]));
    render_to_files(
        &demo.graph,
        (args.width, args.height),
        backend_opts,
        &args.out,
        args.report.as_deref(),
    )
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let file = std::fs::File::open(&args.in_path)
        .with_context(|| format!("open scene '{}'", args.in_path.display()))?;
    let doc = SceneDoc::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("parse scene '{}'", args.in_path.display()))?;
    let graph = doc.build().context("build scene graph")?;
    let backend_opts = CpuBackendOpts::from_env().with_clear_rgba(doc.clear_rgba());
    render_to_files(
        &graph,
        doc.canvas_size(),
        backend_opts,
        &args.out,
        args.report.as_deref(),
    )
}

fn render_to_files(
    graph: &SceneGraph,
    size: (u32, u32),
    opts: CpuBackendOpts,
    out: &Path,
    report_path: Option<&Path>,
) -> anyhow::Result<()> {
    let mut backend = CpuBackend::new(opts);
    let report = Renderer::new()
        .render(graph, size, &mut backend)
        .context("render frame")?;
    let mut frame = backend
        .take_frame()
        .context("backend finished without a frame")?;
    frame.unpremultiply();

    create_parent(out)?;
    image::save_buffer_with_format(
        out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", out.display()))?;
    eprintln!("wrote {}", out.display());

    if let Some(path) = report_path {
        write_report(&report, path)?;
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn write_report(report: &FrameReport, path: &Path) -> anyhow::Result<()> {
    create_parent(path)?;
    let json = serde_json::to_string_pretty(report).context("serialize frame report")?;
    std::fs::write(path, json).with_context(|| format!("write report '{}'", path.display()))
}

fn create_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

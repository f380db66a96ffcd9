use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use cops::{
    ComposeOptions, EncodeOptions, EntitleOptions, Gravity, ImageSource, Operation, Output,
    PositionSpec, Recipe, ResizeOptions, Rgba8, Sink, UnitValue, run_pipeline,
};

#[derive(Parser, Debug)]
#[command(name = "cops", version, about = "Resize, compose and caption images")]
struct Cli {
    /// More logging on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resize an image. <SIZE> is `WxH` (e.g. `200x100`, `50%x25%`), `N%` or `N[px]`.
    Resize(ResizeArgs),
    /// Compose one or more comma-separated overlays on top of an image.
    Compose(ComposeArgs),
    /// Write text on an image.
    Entitle(EntitleArgs),
    /// Run a JSON recipe.
    Run(RunArgs),
}

#[derive(Parser, Debug)]
struct ResizeArgs {
    /// Input image, or `-` for stdin.
    image: String,
    size: String,
    /// Output path; PNG on stdout when omitted.
    output: Option<PathBuf>,

    /// Keep the aspect ratio and fill the bars with this color.
    #[arg(short = 'L', long, num_args = 0..=1, default_missing_value = "black")]
    letterbox: Option<String>,

    /// Keep the aspect ratio, cover the frame and orient the image.
    #[arg(short = 'p', long, num_args = 0..=1, default_missing_value = "center")]
    preserve_aspect_ratio: Option<String>,
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Input image, or `-` for stdin.
    image: String,
    /// `a.png,b.png@southeast`; `@gravity` overrides the placement for one overlay.
    overlays: String,
    /// Output path; PNG on stdout when omitted.
    output: Option<PathBuf>,

    /// Named position (`center`, `southeast`) or `x,y` (`10,20`, `50%,75%`).
    #[arg(short, long)]
    position: Option<String>,

    /// Place relative to this anchor, like ImageMagick's `-gravity`.
    #[arg(short, long)]
    gravity: Option<String>,
}

#[derive(Parser, Debug)]
struct EntitleArgs {
    /// Input image, or `-` for stdin.
    image: String,
    text: String,
    /// Output path; PNG on stdout when omitted.
    output: Option<PathBuf>,

    /// CSS font shorthand, e.g. `100px Helvetica`.
    #[arg(short, long)]
    font: Option<String>,

    /// Named (`green`) or hex (`#ffcc00`) color.
    #[arg(short = 'c', long)]
    color: Option<String>,

    /// `left`, `center` or `right`.
    #[arg(short, long)]
    align: Option<String>,

    /// Named position or `x,y`.
    #[arg(short, long)]
    position: Option<String>,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Recipe JSON file.
    recipe: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Resize(args) => cmd_resize(args).await,
        Command::Compose(args) => cmd_compose(args).await,
        Command::Entitle(args) => cmd_entitle(args).await,
        Command::Run(args) => cmd_run(args).await,
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

async fn cmd_resize(args: ResizeArgs) -> anyhow::Result<()> {
    let (width, height) = parse_size(&args.size)?;
    let mut opts = ResizeOptions::new(width, height);
    if let Some(color) = &args.letterbox {
        opts.letterbox = Some(color.parse::<Rgba8>()?);
    }
    if let Some(orient) = &args.preserve_aspect_ratio {
        opts.preserve_aspect_ratio = Some(orient.parse::<Gravity>()?);
    }
    let ops = vec![Operation::resize(opts)?];
    run(&args.image, args.output, &ops).await?;
    eprintln!("done resizing");
    Ok(())
}

async fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let position = args
        .position
        .as_deref()
        .map(str::parse::<PositionSpec>)
        .transpose()?;
    let gravity = args
        .gravity
        .as_deref()
        .map(str::parse::<Gravity>)
        .transpose()?;

    let mut ops = Vec::new();
    for overlay in args.overlays.split(',').filter(|s| !s.is_empty()) {
        let opts = match overlay.rsplit_once('@') {
            Some((file, anchor)) => ComposeOptions::new(file).with_gravity(anchor.parse()?),
            None => ComposeOptions {
                image: Some(ImageSource::from(overlay)),
                position: position.clone(),
                gravity,
            },
        };
        ops.push(Operation::compose(opts)?);
    }
    run(&args.image, args.output, &ops).await?;
    eprintln!("done composing");
    Ok(())
}

async fn cmd_entitle(args: EntitleArgs) -> anyhow::Result<()> {
    let mut opts = EntitleOptions::new(args.text);
    if let Some(font) = args.font {
        opts.font = font;
    }
    if let Some(color) = args.color {
        opts.fill = color;
    }
    if let Some(align) = args.align {
        opts.align = align;
    }
    if let Some(position) = &args.position {
        opts.position = position.parse()?;
    }
    let ops = vec![Operation::entitle(opts)?];
    run(&args.image, args.output, &ops).await?;
    eprintln!("done drawing text");
    Ok(())
}

async fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let recipe = Recipe::from_path(&args.recipe)?;
    let out = recipe
        .run()
        .await
        .with_context(|| format!("run recipe '{}'", args.recipe.display()))?;
    eprintln!("done ({}x{})", out.width(), out.height());
    Ok(())
}

async fn run(input: &str, output: Option<PathBuf>, ops: &[Operation]) -> anyhow::Result<()> {
    let source = match input {
        "-" => ImageSource::stdin(),
        path => ImageSource::from(path),
    };
    let sink = match output {
        Some(path) if path.as_os_str() != "-" => Sink::File(path),
        _ => Sink::stdout(),
    };
    let output = Output::new(sink, EncodeOptions::default())?;
    run_pipeline(source, ops, output)
        .await
        .with_context(|| format!("process '{input}'"))?;
    Ok(())
}

/// `WxH`, or a single value for both axes. The `x` of a `px` suffix is not a separator; a
/// trailing separator is rejected.
fn parse_size(size: &str) -> anyhow::Result<(UnitValue, UnitValue)> {
    let sep = size
        .char_indices()
        .find(|&(i, c)| c == 'x' && !size[..i].ends_with('p'))
        .map(|(i, _)| i);
    match sep {
        Some(i) if i + 1 < size.len() => Ok((
            UnitValue::from(&size[..i]),
            UnitValue::from(&size[i + 1..]),
        )),
        Some(_) => anyhow::bail!("unable to parse size '{size}'"),
        None => Ok((UnitValue::from(size), UnitValue::from(size))),
    }
}

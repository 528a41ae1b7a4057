use std::io::{Read as _, Write as _};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use flamefold_core::model::CallTree;
use flamefold_core::parsers::{self, FoldReport};
use flamefold_core::{ColorMode, FlameError, FlameOptions, FrameOrder, svg, views};

/// Turn sampled stack traces into an interactive SVG flame graph.
///
/// Reads raw stack blocks (one frame per line, blank-line separated) or
/// collapsed `frame;frame;... count` lines, from files or stdin.
#[derive(Parser)]
#[command(name = "flamefold", version, about)]
struct Args {
    /// Input files; stdin when omitted. Multiple files fold in parallel
    /// and merge.
    inputs: Vec<PathBuf>,

    /// Output file; stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// What to emit: the rendered SVG or the intermediate folded text.
    #[arg(long, value_enum, default_value = "svg")]
    emit: Emit,

    /// Force the input flavor instead of auto-detecting.
    #[arg(long, value_enum, default_value = "auto")]
    format: InputFormat,

    /// Frame order of raw stack blocks.
    #[arg(long, value_enum, default_value = "root-first")]
    order: Order,

    /// Canvas width in pixels.
    #[arg(long, default_value_t = 1200.0)]
    width: f64,

    /// Document height; derived from stack depth when omitted.
    #[arg(long)]
    height: Option<f64>,

    #[arg(long, default_value_t = 16.0)]
    frame_height: f64,

    #[arg(long, default_value_t = 12.0)]
    font_size: f64,

    /// Rectangles narrower than this many pixels keep no label.
    #[arg(long, default_value_t = 0.1)]
    min_width: f64,

    #[arg(long, value_enum, default_value = "by-function")]
    colors: Colors,

    #[arg(long, default_value = "Flame Graph")]
    title: String,

    #[arg(long)]
    subtitle: Option<String>,

    /// Icicle orientation: root row at the top, stacks growing down.
    #[arg(long)]
    inverted: bool,

    /// Fill color for search matches.
    #[arg(long, default_value = "#e600e6")]
    search_color: String,

    /// Abort if the call tree exceeds this many nodes.
    #[arg(long)]
    max_nodes: Option<usize>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    Svg,
    Folded,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    Auto,
    Folded,
    Raw,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Order {
    RootFirst,
    LeafFirst,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Colors {
    ByFunction,
    ByDepth,
    ByPackage,
}

impl Args {
    fn options(&self) -> FlameOptions {
        FlameOptions {
            width: self.width,
            height: self.height,
            frame_height: self.frame_height,
            font_size: self.font_size,
            min_width: self.min_width,
            color_mode: match self.colors {
                Colors::ByFunction => ColorMode::ByFunction,
                Colors::ByDepth => ColorMode::ByDepth,
                Colors::ByPackage => ColorMode::ByPackage,
            },
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            inverted: self.inverted,
            search_color: self.search_color.clone(),
            frame_order: match self.order {
                Order::RootFirst => FrameOrder::RootFirst,
                Order::LeafFirst => FrameOrder::LeafFirst,
            },
            max_nodes: self.max_nodes,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let opts = args.options();

    let report = fold_inputs(&args.inputs, args.format, opts.frame_order)?;
    if report.skipped > 0 {
        tracing::warn!(skipped = report.skipped, "malformed input blocks were dropped");
    }

    // Everything fatal happens before the output file is touched, so a
    // failed run leaves no artifact behind.
    match args.emit {
        Emit::Folded => write_output(args.output.as_deref(), &report.stacks.to_collapsed()),
        Emit::Svg => {
            let tree = CallTree::build(&report.stacks)?;
            let rects = views::flame::layout_flame(&tree, &opts)?;
            let doc = svg::render_svg(&rects, tree.root.total_count, &opts);
            write_output(args.output.as_deref(), &doc)
        }
    }
}

/// Fold every input shard and merge the partial results.
///
/// Shards are independent and count-merging is additive, so files fold
/// in scoped worker threads; this is the only parallel stage of the
/// pipeline.
fn fold_inputs(paths: &[PathBuf], format: InputFormat, order: FrameOrder) -> Result<FoldReport> {
    if paths.is_empty() {
        let mut data = Vec::new();
        std::io::stdin()
            .read_to_end(&mut data)
            .context("reading stdin")?;
        return fold_shard(&data, format, order);
    }

    let shards: Vec<(PathBuf, Vec<u8>)> = paths
        .iter()
        .map(|p| {
            let data = std::fs::read(p).with_context(|| format!("reading {}", p.display()))?;
            Ok((p.clone(), data))
        })
        .collect::<Result<_>>()?;

    let partials: Vec<Result<FoldReport>> = std::thread::scope(|scope| {
        let handles: Vec<_> = shards
            .iter()
            .map(|(path, data)| {
                scope.spawn(move || {
                    fold_shard(data, format, order)
                        .with_context(|| format!("folding {}", path.display()))
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|_| Err(anyhow!("fold worker panicked"))))
            .collect()
    });

    let mut merged = FoldReport::default();
    for partial in partials {
        merged.merge(partial?);
    }
    Ok(merged)
}

fn fold_shard(data: &[u8], format: InputFormat, order: FrameOrder) -> Result<FoldReport> {
    let report = match format {
        InputFormat::Auto => parsers::parse_auto(data, order)?,
        InputFormat::Folded => parsers::collapsed::parse_collapsed(data)?,
        InputFormat::Raw => parsers::raw::fold_raw(data, order),
    };
    Ok(report)
}

fn write_output(path: Option<&Path>, contents: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, contents).map_err(|source| FlameError::RenderTarget {
                path: path.to_path_buf(),
                source,
            })?;
        }
        None => {
            std::io::stdout()
                .write_all(contents.as_bytes())
                .context("writing to stdout")?;
        }
    }
    Ok(())
}

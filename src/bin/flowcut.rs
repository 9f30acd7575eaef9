use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use flowcut::{CompileOptions, Graph, RenderMode, UnknownNodePolicy};

#[derive(Parser, Debug)]
#[command(name = "flowcut", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a graph and render it with the system `ffmpeg`.
    Render(RenderArgs),
    /// Compile a graph and print the stage list without executing it.
    Check(CheckArgs),
    /// Print the operation catalog as JSON.
    Catalog,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input graph JSON.
    #[arg(long = "graph")]
    graph_path: PathBuf,

    /// Render mode: preview (3s excerpt, fast preset) or full.
    #[arg(long, default_value = "preview")]
    mode: RenderMode,

    /// Directory the output artifact is written into.
    #[arg(long, default_value = "outputs")]
    out_dir: PathBuf,

    /// Pass unknown node types through to the engine instead of rejecting
    /// them.
    #[arg(long, default_value_t = false)]
    passthrough_unknown: bool,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Input graph JSON.
    #[arg(long = "graph")]
    graph_path: PathBuf,

    /// Render mode to compile for.
    #[arg(long, default_value = "preview")]
    mode: RenderMode,

    /// Pass unknown node types through to the engine instead of rejecting
    /// them.
    #[arg(long, default_value_t = false)]
    passthrough_unknown: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Check(args) => cmd_check(args),
        Command::Catalog => cmd_catalog(),
    }
}

fn load_graph(path: &PathBuf) -> anyhow::Result<Graph> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read graph '{}'", path.display()))?;
    Ok(Graph::parse(&raw)?)
}

fn policy(passthrough: bool) -> UnknownNodePolicy {
    if passthrough {
        UnknownNodePolicy::Passthrough
    } else {
        UnknownNodePolicy::Reject
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let graph = load_graph(&args.graph_path)?;
    let mut opts = CompileOptions {
        out_dir: args.out_dir,
        ..CompileOptions::default()
    };
    opts.resolve.unknown_nodes = policy(args.passthrough_unknown);

    let artifact = flowcut::compile_and_execute(&graph, args.mode, &opts)?;
    println!("{}", artifact.display());
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let graph = load_graph(&args.graph_path)?;
    let mut opts = CompileOptions::default();
    opts.resolve.unknown_nodes = policy(args.passthrough_unknown);

    let pipeline = flowcut::compile_graph(&graph, args.mode, &opts)?;
    println!("decode {}", pipeline.decode.source.display());
    for op in &pipeline.filters {
        println!("filter {}", op.render());
    }
    let clamp = match pipeline.encode.duration_limit {
        Some(t) => format!(", t={t}"),
        None => String::new(),
    };
    println!(
        "encode {} ({}, preset={}, pix_fmt={}{clamp})",
        pipeline.encode.out_path.display(),
        pipeline.encode.codec,
        pipeline.encode.preset,
        pipeline.encode.pixel_format,
    );
    Ok(())
}

fn cmd_catalog() -> anyhow::Result<()> {
    let catalog = flowcut::operation_catalog();
    println!("{}", serde_json::to_string_pretty(&catalog)?);
    Ok(())
}

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::Context as _;
use clap::{ArgAction, Parser, Subcommand};
use tracing::Level;

use flipbook::media::probe::is_ffprobe_on_path;
use flipbook::media::render::is_ffmpeg_on_path;
use flipbook::{
    EncodeOpts, FfmpegAtlasRenderer, FfprobeProber, FrameRate, FrameSize, ImageSink,
    ManualTicker, Manifest, PlaybackMode, Player, RecordingSink, TickOutcome,
};

#[derive(Parser, Debug)]
#[command(name = "flipbook", version, about = "Convert videos into flipbook atlases")]
struct Cli {
    /// More log output (repeatable).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode videos into `<stem>.flipb/` folders (requires `ffmpeg` and `ffprobe` on PATH).
    Encode(EncodeArgs),
    /// Print the atlas plan for a video's dimensions and timing, without encoding.
    Plan(PlanArgs),
    /// Extract one frame from an encoded flipbook as a PNG.
    Frame(FrameArgs),
    /// Simulate a step traversal and print every displayed frame.
    Play(PlayArgs),
}

#[derive(Parser, Debug)]
struct EncodeArgs {
    /// Input video files.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Encode files concurrently.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Fail instead of replacing an existing manifest.
    #[arg(long, default_value_t = false)]
    no_overwrite: bool,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Frame width in pixels.
    #[arg(long)]
    width: u32,

    /// Frame height in pixels.
    #[arg(long)]
    height: u32,

    /// Frame rate as `num/den` (or a bare integer).
    #[arg(long)]
    fps: FrameRate,

    /// Source duration in milliseconds.
    #[arg(long)]
    duration_ms: f64,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Flipbook manifest (`toc.json`).
    #[arg(long)]
    manifest: PathBuf,

    /// Frame index (clamped into range).
    #[arg(long, allow_hyphen_values = true)]
    frame: i64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// Flipbook manifest (`toc.json`).
    #[arg(long)]
    manifest: PathBuf,

    /// Comma-separated frame for each step.
    #[arg(long, value_delimiter = ',', required = true)]
    steps: Vec<u64>,

    /// Step to start at (negative means before the first step).
    #[arg(long, allow_hyphen_values = true, default_value_t = -1)]
    from: i64,

    /// Step to move to.
    #[arg(long, allow_hyphen_values = true)]
    to: i64,

    /// Simulated display refresh interval.
    #[arg(long, default_value_t = 16.0)]
    interval_ms: f64,

    /// Give up after this many ticks.
    #[arg(long, default_value_t = 1_000_000)]
    max_ticks: usize,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    match cli.cmd {
        Command::Encode(args) => cmd_encode(args),
        Command::Plan(args) => cmd_plan(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Play(args) => cmd_play(args),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn cmd_encode(args: EncodeArgs) -> anyhow::Result<()> {
    if !is_ffprobe_on_path() {
        anyhow::bail!("ffprobe not found on PATH");
    }
    if !is_ffmpeg_on_path() {
        anyhow::bail!("ffmpeg not found on PATH");
    }

    let opts = EncodeOpts {
        overwrite: !args.no_overwrite,
        parallel: args.parallel,
        threads: args.threads,
        ..EncodeOpts::default()
    };

    let started = Instant::now();
    let outcomes =
        flipbook::encode_files(&args.files, &opts, &FfprobeProber, &FfmpegAtlasRenderer)?;

    let total = outcomes.len();
    let mut failed = 0usize;
    for (i, outcome) in outcomes.iter().enumerate() {
        match &outcome.result {
            Ok(summary) => println!(
                "({}/{total}) {} -> {} ({} atlases, {} frames) in {}",
                i + 1,
                outcome.source_path.display(),
                summary.output_dir.display(),
                summary.atlas_count,
                summary.total_frames,
                format_hms(summary.elapsed)
            ),
            Err(e) => {
                failed += 1;
                println!(
                    "({}/{total}) {} failed: {e}",
                    i + 1,
                    outcome.source_path.display()
                );
            }
        }
    }
    println!(
        "encoded {} of {total} files in {}",
        total - failed,
        format_hms(started.elapsed())
    );

    if failed > 0 {
        anyhow::bail!("{failed} of {total} files failed");
    }
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let frame = FrameSize::new(args.width, args.height)?;
    let bound = flipbook::compute_max_tile_bound(frame)?;
    let frame_duration_ms = flipbook::atlas::plan::frame_duration_ms(args.fps);
    let total_frames = flipbook::atlas::plan::total_frames(args.duration_ms, frame_duration_ms);
    let atlases = flipbook::plan_atlases(total_frames, frame_duration_ms, bound)?;

    let out = serde_json::json!({
        "bound": bound,
        "frameRate": args.fps.to_string(),
        "frameDurationMs": frame_duration_ms,
        "totalFrames": total_frames,
        "framesPerAtlas": bound.capacity(),
        "atlases": atlases,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&out).context("serialize plan")?
    );
    Ok(())
}

fn load_manifest(path: &Path) -> anyhow::Result<(Manifest, PathBuf)> {
    let manifest = Manifest::from_path(path)?;
    manifest
        .validate()
        .with_context(|| format!("invalid manifest '{}'", path.display()))?;
    let base_dir = path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    Ok((manifest, base_dir))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (manifest, base_dir) = load_manifest(&args.manifest)?;

    let mut player = Player::new(
        manifest,
        PlaybackMode::FrameControlled { frame: args.frame },
        ImageSink::new(),
        ManualTicker::new(),
    );
    player.preload_atlases(&base_dir)?;
    player.wait_for_atlases();

    let shown = player.state().current_frame;
    let img = player
        .sink_mut()
        .take_frame()
        .with_context(|| format!("atlas for frame {shown} could not be loaded"))?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    img.save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {} (frame {shown})", args.out.display());
    Ok(())
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let (manifest, _) = load_manifest(&args.manifest)?;

    let completed = Rc::new(RefCell::new(Vec::<i64>::new()));
    let on_complete = Rc::clone(&completed);
    let mode = PlaybackMode::StepControlled {
        steps: args.steps,
        current_step: args.from,
        on_complete: Some(Box::new(move |step| on_complete.borrow_mut().push(step))),
    };
    let mut player = Player::new(manifest, mode, RecordingSink::new(), ManualTicker::new());
    println!("start frame {}", player.state().current_frame);

    player.set_step(args.to, 0.0)?;
    if !player.is_animating() {
        println!("jump frame {}", player.state().current_frame);
        return Ok(());
    }
    println!("begin frame {}", player.state().current_frame);

    let outcomes = player.run_until_idle(0.0, args.interval_ms, args.max_ticks);
    for (i, outcome) in outcomes.iter().enumerate() {
        let ts = i as f64 * args.interval_ms;
        match outcome {
            TickOutcome::Advanced { frame } | TickOutcome::Completed { frame, .. } => {
                println!("{ts:.1}ms frame {frame}");
            }
            TickOutcome::Ignored => {}
        }
    }
    for step in completed.borrow().iter() {
        println!("completed step {step}");
    }
    if player.is_animating() {
        anyhow::bail!("traversal did not finish within {} ticks", args.max_ticks);
    }
    Ok(())
}

fn format_hms(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

//! `presence replay` — runs recorded landmark frames through a session,
//! printing every emitted signal. The main calibration tool: capture a
//! JSONL trace from the detector, tweak a thresholds TOML, replay until
//! the trace classifies the way it should.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Deserialize;

use presence_core::{
    random_tasks, Frame, GestureKind, GuideRegion, Landmark, LandmarkSet, LivenessSession,
    SessionPhase, Signal, SignalKind, Thresholds,
};

#[derive(Args)]
pub struct ReplayArgs {
    /// JSON Lines file; each line is {"landmarks": [[x, y, z], ...]}.
    pub frames: PathBuf,

    /// Number of random tasks to queue (ignored with --task-list).
    #[arg(long, default_value_t = 3)]
    pub tasks: usize,

    /// Explicit comma-separated task list, e.g. "blink,turn_right,smile".
    #[arg(long, value_delimiter = ',')]
    pub task_list: Option<Vec<String>>,

    /// RNG seed for reproducible task selection.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Thresholds TOML overriding classifier defaults.
    #[arg(long)]
    pub thresholds: Option<PathBuf>,

    /// Frame width the guide geometry is computed against.
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Frame height.
    #[arg(long, default_value_t = 720)]
    pub height: u32,
}

#[derive(Deserialize)]
struct FrameRecord {
    landmarks: Vec<[f32; 3]>,
}

pub fn run(args: ReplayArgs) -> Result<()> {
    let thresholds = match &args.thresholds {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read thresholds file {}", path.display()))?;
            toml::from_str::<Thresholds>(&contents)
                .with_context(|| format!("invalid thresholds file {}", path.display()))?
        }
        None => Thresholds::default(),
    };

    let tasks = match &args.task_list {
        Some(names) => names
            .iter()
            .map(|name| name.parse::<GestureKind>())
            .collect::<Result<Vec<_>, _>>()?,
        None => {
            let mut rng = crate::rng_from(args.seed);
            random_tasks(&mut rng, args.tasks)?
        }
    };

    let guide = GuideRegion::new(args.width, args.height);
    let mut session = LivenessSession::with_thresholds(guide, thresholds);

    session.subscribe(SignalKind::TaskStarted, |signal| {
        if let Signal::TaskStarted { task } = signal {
            println!("task-started     {task}  ({})", task.instruction());
        }
    });
    session.subscribe(SignalKind::TaskPassed, |signal| {
        if let Signal::TaskPassed { task, .. } = signal {
            println!("task-passed      {task}");
        }
    });
    session.subscribe(SignalKind::AllTasksPassed, |_| {
        println!("all-tasks-passed");
    });
    // Placement flips are the interesting part; skip the per-frame spam.
    let mut last_inside = None;
    session.subscribe(SignalKind::FacePlaceStatus, move |signal| {
        if let Signal::FacePlaceStatus { inside } = signal {
            if last_inside != Some(*inside) {
                println!("face-inside      {inside}");
                last_inside = Some(*inside);
            }
        }
    });

    let total = tasks.len();
    session.start(tasks)?;

    let file = File::open(&args.frames)
        .with_context(|| format!("failed to open {}", args.frames.display()))?;
    let mut fed = 0usize;
    let mut skipped = 0usize;

    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: FrameRecord = match serde_json::from_str(&line) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(line = line_no + 1, error = %err, "skipping malformed line");
                skipped += 1;
                continue;
            }
        };
        let set = match LandmarkSet::new(
            record
                .landmarks
                .into_iter()
                .map(|[x, y, z]| Landmark::new(x, y, z))
                .collect(),
        ) {
            Ok(set) => set,
            Err(err) => {
                tracing::warn!(line = line_no + 1, error = %err, "skipping frame");
                skipped += 1;
                continue;
            }
        };
        session.process_frame(&Frame::new(set));
        fed += 1;
    }

    let passed = session.pass_history().len();
    println!();
    println!("replayed {fed} frame(s) ({skipped} skipped), passed {passed}/{total} task(s)");

    if session.phase() != SessionPhase::Completed {
        bail!(
            "session incomplete: still awaiting '{}'",
            session
                .current_task()
                .map(|t| t.to_string())
                .unwrap_or_default()
        );
    }
    Ok(())
}

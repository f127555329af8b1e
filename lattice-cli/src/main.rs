//! lattice — plays a Markov walk over a preset pitch lattice.
//!
//! Events go to stdout, logs to stderr (`RUST_LOG`, default `info`).

mod midi;

use lattice_engine::pitch::note_name;
use lattice_engine::{Event, Player, PlayerConfig, PresetBook, Sink, Tick};
use midi::MidiRecorder;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_PRESET: &str = "TETRAHEDRON";
const DEFAULT_STEPS: usize = 32;

#[derive(Debug, Default)]
struct Args {
    list_presets: bool,
    dump_graph: bool,
    realtime: bool,
    preset: Option<String>,
    presets_file: Option<String>,
    seed: Option<u64>,
    steps: Option<usize>,
    velocity: Option<f32>,
    start: Option<usize>,
    midi: Option<String>,
}

fn parse_args() -> Args {
    let mut a = Args::default();
    for s in std::env::args().skip(1) {
        if s == "--list-presets" { a.list_presets = true; continue; }
        if s == "--dump-graph"   { a.dump_graph = true;   continue; }
        if s == "--realtime"     { a.realtime = true;     continue; }
        if let Some(rest) = s.strip_prefix("--preset=")       { a.preset       = Some(rest.to_string()); continue; }
        if let Some(rest) = s.strip_prefix("--presets-file=") { a.presets_file = Some(rest.to_string()); continue; }
        if let Some(rest) = s.strip_prefix("--seed=")         { a.seed         = rest.parse().ok();      continue; }
        if let Some(rest) = s.strip_prefix("--steps=")        { a.steps        = rest.parse().ok();      continue; }
        if let Some(rest) = s.strip_prefix("--velocity=")     { a.velocity     = rest.parse().ok();      continue; }
        if let Some(rest) = s.strip_prefix("--start=")        { a.start        = rest.parse().ok();      continue; }
        if let Some(rest) = s.strip_prefix("--midi=")         { a.midi         = Some(rest.to_string()); continue; }
        warn!("unknown arg: {s}");
    }
    a
}

/// Prints events and forwards them to the optional MIDI recorder.
struct CliSink {
    recorder: Option<MidiRecorder>,
}

impl Sink for CliSink {
    fn emit(&mut self, event: &Event) {
        match *event {
            Event::NoteOn { pitch, velocity, timestamp, duration } => {
                println!("{timestamp:>9.3}  on   {:<4} ({pitch:>3})  vel {velocity:.2}  dur {duration:.3}", note_name(pitch));
            }
            Event::NoteOff { pitch, timestamp } => {
                println!("{timestamp:>9.3}  off  {:<4} ({pitch:>3})", note_name(pitch));
            }
            Event::WalkTerminated { at_node } => {
                println!("          end  walk terminated at node {at_node}");
            }
        }
        if let Some(rec) = self.recorder.as_mut() {
            rec.emit(event);
        }
    }

    fn release_all(&mut self, timestamp: f64) {
        if let Some(rec) = self.recorder.as_mut() {
            rec.release_all(timestamp);
        }
    }
}

fn list_presets(book: &PresetBook) {
    println!("Available presets:");
    for p in book.iter() {
        let labels: Vec<String> = p.pitches.iter().map(|&n| note_name(n)).collect();
        println!("- {:<12} {} vertices  [{}]", p.name, p.vertices(), labels.join(" "));
    }
}

/// Number of ticks to run; `None` means realtime until interrupted.
///
/// The MIDI file is written after the loop, which an interrupt never reaches,
/// so `--midi` needs a bounded run.
fn step_limit(args: &Args) -> Result<Option<usize>, String> {
    match (args.realtime, args.steps) {
        (_, Some(n)) => Ok(Some(n)),
        (true, None) if args.midi.is_some() => {
            Err("--midi with --realtime needs --steps=N so the file can be written".to_string())
        }
        (true, None) => Ok(None),
        (false, None) => Ok(Some(DEFAULT_STEPS)),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let args = parse_args();

    let book = match args.presets_file.as_deref() {
        Some(path) => PresetBook::load(Path::new(path))?,
        None => PresetBook::default(),
    };

    if args.list_presets {
        list_presets(&book);
        return Ok(());
    }

    let preset = book.get(args.preset.as_deref().unwrap_or(DEFAULT_PRESET))?;
    let mut config = PlayerConfig { start_node: args.start, ..PlayerConfig::default() };
    if let Some(v) = args.velocity { config.velocity = v; }

    let mut player = match args.seed {
        Some(seed) => Player::seeded(config, seed),
        None => Player::from_entropy(config),
    };
    let graph = player.select_preset(preset)?;

    if args.dump_graph {
        println!("{}", serde_json::to_string_pretty(graph)?);
        return Ok(());
    }

    println!("lattice — Markov walk over {} ({} nodes, {} edges)", preset.name, graph.len(), graph.edge_count());
    if let Some((lo, hi)) = graph.pitch_range() {
        println!("Range: {} .. {}", note_name(lo), note_name(hi));
    }
    let max_steps = step_limit(&args)?;
    if args.realtime { println!("Realtime playback; press Ctrl+C to stop…\n"); } else { println!(); }

    let mut sink = CliSink { recorder: args.midi.as_ref().map(|_| MidiRecorder::new()) };
    player.play()?;

    let mut taken = 0usize;
    while max_steps.map_or(true, |n| taken < n) {
        match player.tick(&mut sink)? {
            Tick::Continue { wait_secs } => {
                taken += 1;
                if args.realtime {
                    std::thread::sleep(Duration::from_secs_f64(wait_secs));
                }
            }
            Tick::Terminated { at_node } => {
                warn!(at_node, "no further transitions; reselect a preset to continue");
                taken += 1;
                break;
            }
            Tick::Paused => break,
        }
    }
    player.stop(&mut sink);
    info!(steps = taken, "walk finished");

    if let (Some(path), Some(rec)) = (args.midi.as_deref(), sink.recorder.as_ref()) {
        rec.write(Path::new(path))?;
        info!(path, notes = rec.len(), "wrote MIDI file");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_defaults_to_fixed_step_count() {
        assert_eq!(step_limit(&Args::default()), Ok(Some(DEFAULT_STEPS)));
        let a = Args { steps: Some(5), midi: Some("out.mid".into()), ..Args::default() };
        assert_eq!(step_limit(&a), Ok(Some(5)));
    }

    #[test]
    fn unbounded_realtime_cannot_record_midi() {
        let a = Args { realtime: true, ..Args::default() };
        assert_eq!(step_limit(&a), Ok(None));

        let a = Args { realtime: true, midi: Some("out.mid".into()), ..Args::default() };
        assert!(step_limit(&a).is_err());

        let a = Args { realtime: true, steps: Some(64), midi: Some("out.mid".into()), ..Args::default() };
        assert_eq!(step_limit(&a), Ok(Some(64)));
    }
}

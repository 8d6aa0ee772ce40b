use std::env;
use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{bail, Context};
use wavedance::playback::{ClockBackend, PlaybackBackend};
use wavedance::visualization::{render_snapshot, Canvas, InputEvent, VolumeSnapshot};
use wavedance::{PlaybackPosition, PlayerConfig, Sound, TerminalCanvas, TextFormatter};

const WINDOW_SIZE: u32 = 300;
const WINDOW_TITLE: &str = "Dancing Man!";

#[derive(Debug, Default)]
struct Args {
    file: Option<String>,
    config: Option<String>,
    export: Option<String>,
    dump_envelope: Option<String>,
    stride: usize,
    no_play: bool,
    silent: bool,
}

fn print_usage() {
    eprintln!(
        "Usage:\n  wavedance [options] [file.wav]\n\nOptions:\n  --config <file.json>       Load player configuration\n  --export <out.wav>         Write the adjusted sound to a WAV file\n  --dump-envelope <out.csv>  Write volume envelopes as CSV\n  --stride <n>               Only dump every n-th frame (default 1)\n  --no-play                  Skip playback\n  --silent                   Simulate playback without an audio device{}\n  -h, --help                 Show this help\n",
        if cfg!(feature = "streaming") {
            ""
        } else {
            " (always on: built without the \"streaming\" feature)"
        }
    );
}

fn parse_args() -> anyhow::Result<Option<Args>> {
    let mut parsed = Args {
        stride: 1,
        ..Args::default()
    };

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(None);
            }
            "--config" => parsed.config = Some(args.next().context("--config requires a path")?),
            "--export" => parsed.export = Some(args.next().context("--export requires a path")?),
            "--dump-envelope" => {
                parsed.dump_envelope =
                    Some(args.next().context("--dump-envelope requires a path")?)
            }
            "--stride" => {
                let value = args.next().context("--stride requires a number")?;
                parsed.stride = value
                    .parse()
                    .with_context(|| format!("invalid stride '{}'", value))?;
            }
            "--no-play" => parsed.no_play = true,
            "--silent" => parsed.silent = true,
            _ if arg.starts_with('-') => {
                print_usage();
                bail!("Unknown flag: {}", arg);
            }
            _ => parsed.file = Some(arg),
        }
    }

    Ok(Some(parsed))
}

/// Ask for a filename; `None` once input is exhausted
fn prompt_filename(input: &mut impl BufRead) -> anyhow::Result<Option<String>> {
    print!("\nTo begin, please type the name of a wave file: ");
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Load `first` (if given), then keep prompting until a file loads
fn load_until_valid(
    sound: &mut Sound,
    first: Option<String>,
    input: &mut impl BufRead,
) -> anyhow::Result<String> {
    let mut candidate = first;
    loop {
        let filename = match candidate.take() {
            Some(file) => file,
            None => match prompt_filename(input)? {
                Some(file) => file,
                None => bail!("No wave file could be loaded"),
            },
        };
        if filename.is_empty() {
            continue;
        }
        match sound.load(&filename) {
            Ok(()) => return Ok(filename),
            Err(e) => println!("File not in directory (or it's the wrong format): {}", e),
        }
    }
}

/// Read one-letter commands until `P` (or end of input)
fn user_adjust(sound: &mut Sound, config: &PlayerConfig, input: &mut impl BufRead) -> anyhow::Result<()> {
    let mut speed = 1.0f32;
    let mut is_reversed = false;
    let echo = config.echo();

    println!("Press + (to speed up), - (to slow down) or R (to reverse).");
    println!("Press M to modify the amplitude data with an echo.");
    println!("Press the enter key after each command.");
    println!("When you're done adjusting things, please press P to play.");

    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(());
        }
        let Some(command) = line.trim().chars().next() else {
            continue;
        };

        match command.to_ascii_uppercase() {
            '+' => {
                sound.change_speed(config.speed_step);
                speed *= config.speed_step;
                println!("Speed is now {:.3}", speed);
            }
            '-' => {
                sound.change_speed(1.0 / config.speed_step);
                speed /= config.speed_step;
                println!("Speed is now {:.3}", speed);
            }
            'R' => {
                sound.reverse();
                is_reversed = !is_reversed;
                if is_reversed {
                    println!("Direction is reversed.");
                } else {
                    println!("Direction is forward.");
                }
            }
            'M' => {
                sound.modify_with(&echo);
                println!("The echo has been applied!");
            }
            'P' => return Ok(()),
            other => println!("Unknown command '{}'", other),
        }
    }
}

fn backend(silent: bool) -> Box<dyn PlaybackBackend> {
    #[cfg(feature = "streaming")]
    {
        if !silent {
            return Box::new(wavedance::RodioBackend);
        }
    }
    #[cfg(not(feature = "streaming"))]
    let _ = silent;
    Box::new(ClockBackend)
}

fn play(sound: &mut Sound, config: &PlayerConfig, silent: bool) -> anyhow::Result<()> {
    let formatter = TextFormatter::new(3, config.bar_width);

    // Forward typed keys to the canvas; a line starting with q stops playback
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if let Some(key) = line.trim().chars().next() {
                if tx.send(key).is_err() {
                    break;
                }
            }
        }
    });

    let mut canvas = TerminalCanvas::new(io::stdout(), formatter).with_input(rx);
    canvas.open_window(WINDOW_SIZE, WINDOW_SIZE, WINDOW_TITLE)?;

    let backend = backend(silent);
    sound
        .start_play(backend.as_ref())
        .context("Failed to start playback")?;

    loop {
        let snapshot = VolumeSnapshot::capture(sound);
        render_snapshot(&mut canvas, &formatter, &snapshot)?;
        if snapshot.position == PlaybackPosition::Stopped {
            break;
        }
        if let Some(InputEvent::Quit) = canvas.poll_input() {
            sound.stop_play();
            break;
        }
        std::thread::sleep(Duration::from_millis(config.poll_interval_ms));
    }

    println!("Done Playing");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let Some(args) = parse_args()? else {
        return Ok(());
    };

    let config = match &args.config {
        Some(path) => PlayerConfig::from_json_file(path)?,
        None => PlayerConfig::default(),
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();

    let mut sound = Sound::with_window(config.window_policy());
    let filename = load_until_valid(&mut sound, args.file.clone(), &mut input)?;

    if let Some(format) = sound.format() {
        println!(
            "Loaded {}: {} frames at {} Hz ({:.1}s)",
            filename,
            sound.sample_count(),
            format.sample_rate,
            sound.duration_seconds()
        );
    }

    user_adjust(&mut sound, &config, &mut input)?;
    drop(input);

    #[cfg(feature = "export")]
    {
        if let Some(path) = &args.export {
            wavedance::export_to_wav(&sound, path)
                .with_context(|| format!("Failed to export '{}'", path))?;
            println!("Wrote {}", path);
        }
        if let Some(path) = &args.dump_envelope {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create '{}'", path))?;
            let rows = wavedance::write_envelope_csv(&sound, io::BufWriter::new(file), args.stride)?;
            println!("Wrote {} envelope rows to {}", rows, path);
        }
    }
    #[cfg(not(feature = "export"))]
    {
        if args.export.is_some() || args.dump_envelope.is_some() {
            eprintln!("Export requires the \"export\" feature; skipping.");
        }
    }

    if !args.no_play {
        play(&mut sound, &config, args.silent)?;
    }

    Ok(())
}

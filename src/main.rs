use std::ops::ControlFlow;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, ensure, Context, Result};
use console::{Key, Term};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use slide_solver::{solve, Direction, Generator, GeneratorConfig, Map, Session};

const USAGE: &str = "\
Usage:
    slide-solver play <map>
    slide-solver solve <map>...
    slide-solver generate <moves> [--seed N] [--attempts N] [--size WxH] [--timeout SECS] [--out FILE]";

enum Action {
    Exit,
    Go(Direction),
    Reset,
}

impl TryFrom<Key> for Action {
    type Error = ();

    fn try_from(key: Key) -> Result<Self, Self::Error> {
        Ok(match key {
            Key::ArrowLeft | Key::Char('a') => Self::Go(Direction::Left),
            Key::ArrowRight | Key::Char('d') => Self::Go(Direction::Right),
            Key::ArrowUp | Key::Char('w') => Self::Go(Direction::Up),
            Key::ArrowDown | Key::Char('s') => Self::Go(Direction::Down),
            Key::Escape | Key::Char('q') => Self::Exit,
            Key::Char('r') => Self::Reset,
            _ => return Err(()),
        })
    }
}

fn load_map(path: &str) -> Result<Map> {
    let data = std::fs::read_to_string(path).context("Failed to read the map")?;
    let map = if Path::new(path).extension().is_some_and(|ext| ext == "json") {
        Map::from_json(&data)
    } else {
        data.parse::<Map>()
    };
    map.context("Failed to parse the map")
}

fn fmt_path(path: &[Direction]) -> String {
    path.iter().map(|dir| dir.to_string()).collect()
}

fn play(path: &str) -> Result<()> {
    let map = load_map(path)?;
    let mut session = Session::new(&map);

    let term = Term::stderr();
    loop {
        eprintln!("{session}");

        let action = loop {
            if let Ok(action) = Action::try_from(term.read_key()?) {
                break action;
            }
        };

        match action {
            Action::Exit => break,
            Action::Go(dir) => {
                if let Err(err) = session.go(dir) {
                    eprintln!("{err}, press r to retry");
                }
            }
            Action::Reset => session.reset(),
        }
    }

    Ok(())
}

fn solve_all(paths: &[String]) -> Result<()> {
    let results = paths
        .par_iter()
        .map(|path| load_map(path).map(|map| solve(&map)))
        .collect::<Vec<_>>();

    let mut failed_cnt = 0;
    for (path, result) in paths.iter().zip(results) {
        match result {
            Ok(result) if result.solvable => println!(
                "{path}: {} moves: {}",
                result.min_moves,
                fmt_path(&result.optimal_path)
            ),
            Ok(_) => println!("{path}: unsolvable"),
            Err(err) => {
                eprintln!("{path}: {err:?}");
                failed_cnt += 1;
            }
        }
    }
    ensure!(failed_cnt == 0, "{failed_cnt}/{} maps failed", paths.len());
    Ok(())
}

fn generate(args: &[String]) -> Result<()> {
    let mut args = args.iter();
    let target_moves = args
        .next()
        .context("Missing move count")?
        .parse::<usize>()
        .context("Invalid move count")?;

    let mut config = GeneratorConfig::default();
    let mut seed = None;
    let mut out = None;
    while let Some(flag) = args.next() {
        let value = args
            .next()
            .with_context(|| format!("Missing value for {flag}"))?;
        match flag.as_str() {
            "--seed" => seed = Some(value.parse::<u64>().context("Invalid seed")?),
            "--attempts" => config.max_attempts = value.parse().context("Invalid attempt count")?,
            "--size" => {
                let (width, height) = value.split_once('x').context("Expecting WxH")?;
                config.width = width.parse().context("Invalid width")?;
                config.height = height.parse().context("Invalid height")?;
            }
            "--timeout" => {
                let secs = value.parse::<f64>().context("Invalid timeout")?;
                config.time_limit = Some(Duration::try_from_secs_f64(secs)?);
            }
            "--out" => out = Some(value),
            _ => bail!("Unknown option {flag:?}\n{USAGE}"),
        }
    }

    let mut generator = Generator::new(config, seed);
    let bar = ProgressBar::new(generator.config().max_attempts.into());
    bar.set_style(ProgressStyle::with_template(
        "{spinner} attempt {pos}/{len} [{elapsed_precise}] {msg}",
    )?);
    bar.set_message(format!("seed {}", generator.seed()));
    let result = generator.run(target_moves, |attempt| {
        bar.set_position(attempt.into());
        ControlFlow::Continue(())
    });
    bar.finish_and_clear();
    let map = result?;

    print!("{map}");
    println!("seed: {}", generator.seed());
    println!("path: {}", fmt_path(map.optimal_path().unwrap_or_default()));
    if let Some(out) = out {
        std::fs::write(out, map.to_json()?).context("Failed to write the map")?;
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    match args.split_first() {
        Some((cmd, [path])) if cmd == "play" => play(path),
        Some((cmd, paths)) if cmd == "solve" && !paths.is_empty() => solve_all(paths),
        Some((cmd, rest)) if cmd == "generate" => generate(rest),
        _ => bail!("{USAGE}"),
    }
}

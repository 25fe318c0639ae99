use anyhow::{bail, Context, Result};
use mapgate::{
    data::geojson::GeoJson,
    headless::{HeadlessLocationControl, HeadlessMap, HeadlessUi, MapCommand, UiCommand},
    prelude::Instant,
    CityMap, KeyValueStorage, MapConfig, MapEvent, MemoryStorage,
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, rc::Rc, time::Duration};

/// A recorded session: what the page looked like and what happened on it
#[derive(Debug, Deserialize)]
struct Scenario {
    /// Layers the style carries before the subsystem adds its own
    #[serde(default)]
    style_layers: Vec<String>,
    /// Points of interest, as a GeoJSON feature collection
    #[serde(default)]
    points_of_interest: Option<GeoJson>,
    /// Storage contents at page load
    #[serde(default)]
    storage: Vec<(String, String)>,
    #[serde(default)]
    compact: bool,
    events: Vec<TimedEvent>,
}

#[derive(Debug, Deserialize)]
struct TimedEvent {
    /// Milliseconds since the start of the session
    at_ms: u64,
    #[serde(flatten)]
    event: MapEvent,
}

/// One line of output
#[derive(Debug, Serialize)]
#[serde(tag = "target", rename_all = "snake_case")]
enum Output<'a> {
    Map { at_ms: u64, command: &'a MapCommand },
    Ui { at_ms: u64, command: &'a UiCommand },
}

struct Args {
    scenario: PathBuf,
    config: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut scenario = None;
    let mut config = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                config = Some(PathBuf::from(args.next().context("--config needs a path")?));
            }
            "--help" | "-h" => {
                println!("usage: mapgate-replay [--config CONFIG.json] SCENARIO.json");
                std::process::exit(0);
            }
            _ if scenario.is_none() => scenario = Some(PathBuf::from(arg)),
            _ => bail!("unexpected argument {arg}"),
        }
    }
    Ok(Args {
        scenario: scenario.context("missing scenario file")?,
        config,
    })
}

fn load_config(path: Option<&PathBuf>) -> Result<MapConfig> {
    let Some(path) = path else {
        return Ok(MapConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    MapConfig::from_json_str(&raw).with_context(|| format!("invalid config {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();

    let args = parse_args()?;
    let config = load_config(args.config.as_ref())?;
    let raw = std::fs::read_to_string(&args.scenario)
        .with_context(|| format!("reading scenario {}", args.scenario.display()))?;
    let mut scenario: Scenario = serde_json::from_str(&raw).context("parsing scenario")?;
    scenario.events.sort_by_key(|e| e.at_ms);

    let storage = Rc::new(MemoryStorage::new());
    for (key, value) in &scenario.storage {
        storage.set_item(key, value)?;
    }

    let mut map = HeadlessMap::default();
    for layer in &scenario.style_layers {
        map.add_style_layer(layer);
    }
    let ui = if scenario.compact {
        HeadlessUi::compact()
    } else {
        HeadlessUi::default()
    };

    let mut city = CityMap::new(config, map, HeadlessLocationControl::default(), ui, storage)?;
    if let Some(pois) = &scenario.points_of_interest {
        city.load_points_of_interest(pois);
    }

    let start = Instant::now();
    let mut stdout = std::io::stdout().lock();
    let mut emit = |city: &mut Replay, at_ms: u64| -> Result<()> {
        for command in city.map_mut().take_commands() {
            serde_json::to_writer(&mut stdout, &Output::Map { at_ms, command: &command })?;
            newline(&mut stdout)?;
        }
        for command in city.ui_mut().take_commands() {
            serde_json::to_writer(&mut stdout, &Output::Ui { at_ms, command: &command })?;
            newline(&mut stdout)?;
        }
        Ok(())
    };

    let mut clock_ms = 0;
    for timed in scenario.events {
        advance(&mut city, start, &mut clock_ms, timed.at_ms, &mut emit)?;
        log::info!("t={}ms {:?}", timed.at_ms, timed.event);
        if let Err(e) = city.handle(timed.event, start + Duration::from_millis(timed.at_ms)) {
            log::error!("event at {}ms failed: {}", timed.at_ms, e);
        }
        emit(&mut city, timed.at_ms)?;
    }

    // Let pending timers and animations finish
    while let Some(due) = city.next_timer_due() {
        let due_ms = (due.duration_since(start).as_millis() as u64).max(clock_ms + 1);
        advance(&mut city, start, &mut clock_ms, due_ms, &mut emit)?;
    }
    let end_ms = clock_ms + 1000;
    advance(&mut city, start, &mut clock_ms, end_ms, &mut emit)?;

    log::info!(
        "replay finished: tracking {:?}, {} active filters",
        city.tracking_state(),
        city.filters().active_categories().len()
    );
    Ok(())
}

type Replay = CityMap<HeadlessMap, HeadlessLocationControl, HeadlessUi>;

/// Ticks the map at 60 Hz up to `target_ms`
fn advance(
    city: &mut Replay,
    start: Instant,
    clock_ms: &mut u64,
    target_ms: u64,
    emit: &mut impl FnMut(&mut Replay, u64) -> Result<()>,
) -> Result<()> {
    const FRAME_MS: u64 = 16;
    while *clock_ms < target_ms {
        *clock_ms = (*clock_ms + FRAME_MS).min(target_ms);
        city.tick(start + Duration::from_millis(*clock_ms));
        emit(city, *clock_ms)?;
    }
    Ok(())
}

fn newline(out: &mut impl std::io::Write) -> Result<()> {
    out.write_all(b"\n")?;
    Ok(())
}

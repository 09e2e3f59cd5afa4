//! Keel Runtime
//!
//! Replays a JSON state script through a state context backed by a
//! recording driver and reports how much of each frame reached the driver.
//!
//! ```text
//! keel [--settings FILE] [--probe-gpu] [SCRIPT]
//! ```

mod report;
mod script;
mod settings;

use anyhow::{bail, Context as _, Result};
use keel_core::DeviceCaps;
use keel_gfx::{Context, Driver, RecordingDriver};
use report::{FrameReport, Reporter, Summary};
use script::{Scene, Script};
use settings::{LoggingSettings, Settings};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    script: Option<PathBuf>,
    settings: Option<PathBuf>,
    probe_gpu: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--settings" => {
                let path = args.next().context("--settings needs a file")?;
                parsed.settings = Some(path.into());
            }
            "--probe-gpu" => parsed.probe_gpu = true,
            flag if flag.starts_with("--") => bail!("unknown flag {flag}"),
            _ if parsed.script.is_some() => bail!("only one script can be replayed"),
            path => parsed.script = Some(path.into()),
        }
    }
    Ok(parsed)
}

fn init_logging(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn device_caps(probe_gpu: bool) -> Result<DeviceCaps> {
    if !probe_gpu {
        return Ok(RecordingDriver::default().capabilities());
    }
    let report = keel_render::probe_default_adapter().context("probing GPU")?;
    tracing::info!(
        adapter = %report.name,
        backend = ?report.backend,
        vendor = ?report.caps.vendor,
        texunits = report.caps.limits.texunits,
        "using probed capabilities"
    );
    Ok(report.caps)
}

fn replay(script: &Script, caps: DeviceCaps, settings: &Settings) -> Result<Summary> {
    let mut config = settings.context.clone();
    if let Some(window) = script.window {
        config.window = window;
    }
    let mut ctx = Context::new(RecordingDriver::new(caps), config).context("creating state context")?;
    let scene = Scene::build(&script.resources);
    let mut reporter = Reporter::new(settings.report.window, settings.report.per_frame);

    let mut index = 0;
    for frame in &script.frames {
        for _ in 0..frame.repeat {
            for op in &frame.ops {
                scene
                    .run(&mut ctx, op)
                    .with_context(|| format!("frame {index}: {}", op.name()))?;
            }
            if ctx.config().verify_states && !ctx.check_states() {
                tracing::warn!(frame = index, "mirror diverged from driver");
            }
            let report = FrameReport::take(&mut ctx, index, frame.label.clone(), frame.ops.len());
            reporter.record(&report);
            index += 1;
        }
    }
    Ok(reporter.summary())
}

fn main() -> Result<()> {
    let args = parse_args(std::env::args().skip(1))?;
    let settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    init_logging(&settings.logging);

    tracing::info!("Keel v{}", keel_core::VERSION);
    let caps = device_caps(args.probe_gpu)?;

    let Some(path) = args.script else {
        if args.probe_gpu {
            return Ok(());
        }
        bail!("usage: keel [--settings FILE] [--probe-gpu] SCRIPT");
    };
    let script = Script::load(&path).with_context(|| format!("loading {}", path.display()))?;
    tracing::info!(script = %path.display(), frames = script.frame_count(), "replaying");

    let summary = replay(&script, caps, &settings)?;
    tracing::info!(
        frames = summary.frames,
        requested = summary.requested,
        driver_calls = summary.driver_calls,
        filtered_pct = summary.filtered_ratio() * 100.0,
        recent_average = summary.recent_average,
        recent_min = summary.recent_min,
        recent_max = summary.recent_max,
        "replay finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn flags_and_script() {
        let parsed = args(&["--probe-gpu", "--settings", "keel.json", "frame.json"]).unwrap();
        assert!(parsed.probe_gpu);
        assert_eq!(parsed.settings, Some(PathBuf::from("keel.json")));
        assert_eq!(parsed.script, Some(PathBuf::from("frame.json")));
    }

    #[test]
    fn bad_arguments() {
        assert!(args(&["--verbose"]).is_err());
        assert!(args(&["--settings"]).is_err());
        assert!(args(&["a.json", "b.json"]).is_err());
    }

    #[test]
    fn bundled_script_replays() {
        let script = Script::parse(include_str!("../scripts/gbuffer.json")).unwrap();
        let summary = replay(&script, RecordingDriver::default().capabilities(), &Settings::default()).unwrap();
        assert_eq!(summary.frames, script.frame_count());
        assert!(summary.driver_calls < summary.requested);
    }
}

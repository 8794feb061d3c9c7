use anyhow::{anyhow, Result};
use serde::Serialize;

use scrollreel_core::timeline::{StepSpan, Track};
use scrollreel_core::{AppConfig, Site, Timeline};

/// Master timeline as printed with `--json`
#[derive(Serialize)]
struct Schedule<'a> {
    delay: f64,
    duration: f64,
    total_duration: f64,
    steps: &'a [StepSpan],
    tracks: &'a [Track],
}

impl<'a> From<&'a Timeline> for Schedule<'a> {
    fn from(tl: &'a Timeline) -> Self {
        Self {
            delay: tl.delay(),
            duration: tl.duration(),
            total_duration: tl.total_duration(),
            steps: tl.steps(),
            tracks: tl.tracks(),
        }
    }
}

pub fn run(config: AppConfig, seed: Option<u64>, json: bool) -> Result<()> {
    let mut site = match seed {
        Some(seed) => Site::seeded(config, seed),
        None => Site::landing(config),
    };
    site.fonts_ready()?;
    let preloader = site
        .preloader()
        .ok_or_else(|| anyhow!("preloader did not start"))?;
    let tl = preloader.timeline();

    if json {
        println!("{}", serde_json::to_string_pretty(&Schedule::from(tl))?);
        return Ok(());
    }

    print!("{}", tl);
    println!("\nTracks ({}):\n", tl.tracks().len());
    for track in tl.tracks() {
        let step = tl
            .steps()
            .get(track.step)
            .map(|s| s.name.as_str())
            .unwrap_or("?");
        println!(
            "  {:>6.2}s {:>5.2}s  {:<15} #{:<4} {:<16} -> {:<8} {}",
            tl.delay() + track.start,
            track.duration,
            step,
            track.target.0,
            track.property.to_string(),
            track.to.to_string(),
            track.ease
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_json_lists_every_track() {
        let mut site = Site::seeded(AppConfig::default(), 7);
        site.fonts_ready().unwrap();
        let tl = site.preloader().unwrap().timeline();

        let json = serde_json::to_value(Schedule::from(tl)).unwrap();
        assert_eq!(json["delay"], 0.5);
        assert_eq!(json["tracks"].as_array().unwrap().len(), tl.tracks().len());
        assert_eq!(json["steps"][0]["name"], "logo-in");
        assert_eq!(json["tracks"][0]["ease"], "power4.inOut");
    }
}

use anyhow::{anyhow, Result};

use scrollreel_core::trigger::{TriggerEventKind, TriggerId};
use scrollreel_core::{AppConfig, Property, Site, StyleSink};

const FPS: f64 = 60.0;
/// Give up settling after this many simulated seconds
const MAX_SECONDS: f64 = 120.0;
/// Wheel input closer than this to the target counts as delivered
const SETTLE_PX: f64 = 1e-6;

fn describe(kind: TriggerEventKind) -> String {
    match kind {
        TriggerEventKind::Update(p) => format!("progress {:.3}", p),
        TriggerEventKind::Enter => "enter".to_string(),
        TriggerEventKind::Leave => "leave".to_string(),
        TriggerEventKind::EnterBack => "enter-back".to_string(),
        TriggerEventKind::LeaveBack => "leave-back".to_string(),
    }
}

pub fn run(config: AppConfig, to_vh: f64, step: f64, seed: Option<u64>) -> Result<()> {
    let vh = config.page.viewport_height;
    let mut site = match seed {
        Some(seed) => Site::seeded(config, seed),
        None => Site::landing(config),
    };
    site.dom_ready()?;

    let target = (to_vh * vh).clamp(0.0, site.triggers().max_scroll());
    println!(
        "Scrolling to {:.0}px of {:.0}px in {:.0}px wheel steps\n",
        target,
        site.triggers().max_scroll(),
        step
    );

    let frames = settle(&mut site, target, step, |site, report| {
        let observer = site
            .choreographer()
            .and_then(|c| c.observer(report.id))
            .map(|o| o.to_string())
            .unwrap_or_else(|| report.id.to_string());
        println!(
            "frame {:>5}  scroll {:>8.1}px  {:<12} {}",
            report.frame,
            site.scroll_position(),
            observer,
            describe(report.kind)
        );
    })?;

    let choreographer = site
        .choreographer()
        .ok_or_else(|| anyhow!("choreography not set up"))?;
    let styles = site.styles();
    println!("\nSettled at {:.1}px after {} frames\n", site.scroll_position(), frames);
    for (index, card) in choreographer.cards().iter().enumerate() {
        println!(
            "card {}  {:?}  wrapper scale {} opacity {}  image scale {}  radius {}  pin {}",
            index,
            card.latch,
            styles.computed(card.wrapper, Property::Scale),
            styles.computed(card.wrapper, Property::Opacity),
            styles.computed(card.image, Property::Scale),
            styles.computed(card.image_wrapper, Property::BorderRadius),
            styles.computed(card.element, Property::PinY),
        );
    }

    Ok(())
}

/// One trigger event seen during a simulated scroll
struct EventLine {
    frame: u64,
    id: TriggerId,
    kind: TriggerEventKind,
}

/// Wheel toward `target` at most `step` px per frame until the page settles
///
/// Steps are in scrolled px; the configured wheel multiplier is divided out
/// before each wheel input. Returns the number of frames run.
fn settle<F>(site: &mut Site, target: f64, step: f64, mut on_event: F) -> Result<u64>
where
    F: FnMut(&Site, &EventLine),
{
    if step <= 0.0 {
        return Err(anyhow!("--step must be positive"));
    }
    let multiplier = site.config().scroll.wheel_multiplier;
    if multiplier <= 0.0 {
        return Err(anyhow!("scroll.wheel_multiplier must be positive"));
    }

    let mut fed = 0.0;
    let mut frame = 0u64;
    loop {
        frame += 1;
        let remaining = target - fed;
        if remaining.abs() > SETTLE_PX {
            let delta = remaining.clamp(-step, step);
            site.wheel(delta / multiplier);
            fed += delta;
        }

        let report = site.frame(frame as f64 / FPS);
        for event in &report.events {
            let line = EventLine {
                frame: report.frame.index,
                id: event.id,
                kind: event.kind,
            };
            on_event(site, &line);
        }

        let settled =
            (target - fed).abs() <= SETTLE_PX && !site.is_scrolling() && site.animator().is_idle();
        if settled || frame as f64 / FPS > MAX_SECONDS {
            return Ok(frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready(config: AppConfig) -> Site {
        let mut site = Site::seeded(config, 3);
        site.dom_ready().unwrap();
        site
    }

    #[test]
    fn test_settles_at_target() {
        let mut site = ready(AppConfig::default());
        let target = site.config().page.viewport_height * 1.5;

        let mut events = 0;
        let frames = settle(&mut site, target, 120.0, |_, _| events += 1).unwrap();

        assert!((frames as f64) < MAX_SECONDS * FPS);
        assert!((site.scroll_position() - target).abs() < 1e-6);
        assert!(events > 0);
    }

    #[test]
    fn test_wheel_multiplier_does_not_shift_destination() {
        let mut config = AppConfig::default();
        config.scroll.wheel_multiplier = 2.5;
        let mut site = ready(config);
        let target = site.config().page.viewport_height;

        settle(&mut site, target, 120.0, |_, _| {}).unwrap();
        assert!((site.scroll_position() - target).abs() < 1e-6);
    }

    #[test]
    fn test_non_positive_step_is_rejected() {
        let mut site = ready(AppConfig::default());
        assert!(settle(&mut site, 100.0, 0.0, |_, _| {}).is_err());
    }
}

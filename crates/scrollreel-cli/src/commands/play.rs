use anyhow::Result;
use tokio::time::{Duration, Instant};
use tracing::info;

use scrollreel_core::{AppConfig, FrameScheduler, Site};

pub const DEFAULT_SECONDS: f64 = 12.0;
pub const DEFAULT_WHEEL: f64 = 8.0;

/// Drive the page from a real-time frame clock
///
/// The preloader plays first; once it finished, `wheel` px of input are fed
/// every frame until the end of the page.
pub async fn run(config: AppConfig, seconds: f64, wheel: f64) -> Result<()> {
    let interval = FrameScheduler::new(&config.ticker).interval();
    let mut site = Site::landing(config);
    site.dom_ready()?;
    site.fonts_ready()?;

    println!("Playing for {:.1}s (Ctrl+C to stop)...", seconds);

    let mut ticker = tokio::time::interval(interval);
    let start = Instant::now();
    let deadline = Duration::from_secs_f64(seconds.max(0.0));
    let mut next_log = 0.0;
    let mut frames = 0u64;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
                break;
            }
            _ = ticker.tick() => {
                let elapsed = start.elapsed();
                if elapsed >= deadline {
                    break;
                }
                let now = elapsed.as_secs_f64();

                let preloading = site.preloader().map_or(false, |p| !p.is_finished());
                if !preloading && site.scroll_position() < site.triggers().max_scroll() {
                    site.wheel(wheel);
                }
                let report = site.frame(now);
                frames += 1;

                if now >= next_log {
                    next_log += 1.0;
                    let preloader = site.preloader().map_or(1.0, |p| p.progress());
                    info!(
                        time = report.frame.time,
                        preloader,
                        scroll = site.scroll_position(),
                        tweens = site.animator().active_tracks(),
                        "Frame {}",
                        report.frame.index
                    );
                }
            }
        }
    }

    println!(
        "Stopped after {} frames at {:.0}px of {:.0}px.",
        frames,
        site.scroll_position(),
        site.triggers().max_scroll()
    );

    Ok(())
}

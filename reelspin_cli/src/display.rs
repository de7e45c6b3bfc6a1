use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clap::ValueEnum;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::runtime::Handle;
use tokio::time::{interval, sleep_until, Instant, MissedTickBehavior};

use reelspin_core::animation::{progress, random_face, FLICKER_INTERVAL, FRAME_INTERVAL};
use reelspin_core::{
    CancelSignal, Credits, Drum, ReelHandle, ReelRenderer, ReelTiming, RotorPlan, SymbolId, SymbolTable,
    REEL_COUNT,
};
use reelspin_shared::{Notice, StyleHint};

/// Which machine to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Variant {
    /// Reel windows flicker through random symbols, then settle.
    Flicker,
    /// Reels are drums that turn and ease out onto the result.
    Rotor,
}

impl Variant {
    pub fn timing(self) -> ReelTiming {
        match self {
            Variant::Flicker => ReelTiming::flicker(),
            Variant::Rotor => ReelTiming::rotor(),
        }
    }

    /// Lights shown for a winning notice, if this machine has any.
    fn win_lights(self, style: StyleHint) -> Option<WinLights> {
        match (self, style) {
            (Variant::Flicker, StyleHint::Jackpot) => Some(WinLights {
                duration: Duration::from_millis(1000),
                blink: None,
            }),
            (Variant::Rotor, StyleHint::Jackpot | StyleHint::Match) => Some(WinLights {
                duration: Duration::from_millis(2000),
                blink: Some(Duration::from_millis(100)),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WinLights {
    duration: Duration,
    /// Toggle period; `None` keeps the lights on steadily.
    blink: Option<Duration>,
}

fn ansi(style: StyleHint) -> &'static str {
    match style {
        StyleHint::Alert => "\x1b[31m",
        StyleHint::Spinning | StyleHint::Neutral => "\x1b[35m",
        StyleHint::Jackpot => "\x1b[33m",
        StyleHint::Match => "\x1b[36m",
    }
}

#[derive(Debug, Clone)]
struct Screen {
    reels: [char; REEL_COUNT],
    rotations: [f64; REEL_COUNT],
    credits: Credits,
    notice: Option<Notice>,
    lit: bool,
    /// Bumped by each win so an older light show stops touching `lit`.
    show: u64,
}

impl Screen {
    fn line(&self) -> String {
        let [a, b, c] = self.reels;
        let window = format!("[ {a} | {b} | {c} ]");
        let mut line = if self.lit {
            format!("\x1b[7m{window}\x1b[0m")
        } else {
            window
        };
        line.push_str(&format!("  credits: {:>5}", self.credits));
        if let Some(notice) = &self.notice {
            line.push_str(&format!("  {}{}\x1b[0m", ansi(notice.style), notice.message));
        }
        line
    }
}

/// Draws the machine on one terminal line, rewritten in place.
pub struct TerminalRenderer {
    variant: Variant,
    table: SymbolTable,
    drum: Drum,
    screen: Arc<Mutex<Screen>>,
    rng: Mutex<StdRng>,
}

fn draw(screen: &Mutex<Screen>, f: impl FnOnce(&mut Screen)) {
    let mut screen = screen.lock();
    f(&mut screen);
    let mut out = io::stdout().lock();
    // A closed stdout only loses the picture.
    let _ = write!(out, "\r\x1b[2K{}", screen.line());
    let _ = out.flush();
}

impl TerminalRenderer {
    pub fn new(variant: Variant, table: SymbolTable) -> Self {
        let drum = Drum::new(&table);
        let start = table.ids().next().map_or('?', SymbolId::label);
        Self {
            variant,
            table,
            drum,
            screen: Arc::new(Mutex::new(Screen {
                reels: [start; REEL_COUNT],
                rotations: [0.0; REEL_COUNT],
                credits: 0,
                notice: None,
                lit: false,
                show: 0,
            })),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    fn update(&self, f: impl FnOnce(&mut Screen)) {
        draw(&self.screen, f);
    }

    /// Runs the light show in the background; outside a runtime there is
    /// nothing to drive it, so the win goes unlit.
    fn celebrate(&self, lights: WinLights) {
        let Ok(runtime) = Handle::try_current() else {
            return;
        };
        let screen = Arc::clone(&self.screen);
        let show = {
            let mut s = screen.lock();
            s.show += 1;
            s.show
        };
        runtime.spawn(async move {
            let until = Instant::now() + lights.duration;
            match lights.blink {
                None => {
                    draw(&screen, |s| s.lit = true);
                    sleep_until(until).await;
                }
                Some(period) => {
                    let mut ticks = interval(period);
                    while Instant::now() < until {
                        ticks.tick().await;
                        draw(&screen, |s| {
                            if s.show == show {
                                s.lit = !s.lit;
                            }
                        });
                    }
                }
            }
            draw(&screen, |s| {
                if s.show == show {
                    s.lit = false;
                }
            });
        });
    }

    async fn flicker(&self, reel: ReelHandle, duration: Duration, mut cancel: CancelSignal) {
        let deadline = Instant::now() + duration;
        let mut ticks = interval(FLICKER_INTERVAL);
        loop {
            tokio::select! {
                _ = sleep_until(deadline) => break,
                _ = cancel.cancelled() => break,
                _ = ticks.tick() => {
                    let face = random_face(&self.table, &mut *self.rng.lock());
                    self.update(|s| s.reels[reel.0] = face.label());
                }
            }
        }
    }

    async fn rotor(&self, reel: ReelHandle, target: SymbolId, duration: Duration, mut cancel: CancelSignal) {
        let start = self.screen.lock().rotations[reel.0];
        let plan = RotorPlan::new(&self.drum, start, target);
        let started = Instant::now();
        let mut frames = interval(FRAME_INTERVAL);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = frames.tick() => {
                    let p = progress(started.elapsed(), duration);
                    let rotation = plan.rotation_at(p);
                    let face = self.drum.face_at(rotation);
                    self.update(|s| {
                        s.rotations[reel.0] = rotation;
                        s.reels[reel.0] = face.label();
                    });
                    if p >= 1.0 {
                        break;
                    }
                }
            }
        }
        self.update(|s| s.rotations[reel.0] = plan.end());
    }
}

#[async_trait]
impl ReelRenderer for TerminalRenderer {
    async fn animate_reel(&self, reel: ReelHandle, target: SymbolId, duration: Duration, cancel: CancelSignal) {
        match self.variant {
            Variant::Flicker => self.flicker(reel, duration, cancel).await,
            Variant::Rotor => self.rotor(reel, target, duration, cancel).await,
        }
        self.update(|s| s.reels[reel.0] = target.label());
        tracing::trace!(%reel, %target, "reel settled");
    }

    fn notify(&self, notice: Notice) {
        let lights = self.variant.win_lights(notice.style);
        self.update(|s| s.notice = Some(notice));
        if let Some(lights) = lights {
            self.celebrate(lights);
        }
    }

    fn credits_changed(&self, credits: Credits) {
        self.update(|s| s.credits = credits);
    }
}

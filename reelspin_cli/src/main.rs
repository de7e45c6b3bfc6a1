mod display;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use reelspin_core::{
    derive_hash_hex, spin_with_seeds, CancelHandle, CancelSignal, GameConfig, ProvablyFairSource,
    ReelRenderer, ScriptedSource, Session, SessionHandle, SpinAttempt, SpinCoordinator, SpinResult,
    SymbolSource, WeightedSource,
};
use reelspin_shared::VerifyReport;

use crate::display::{TerminalRenderer, Variant};

#[derive(Parser)]
#[command(name = "reelspin", about = "Three-reel slot machine for the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Machine config as JSON; the flags below override it
    #[arg(long, global = true, env = "REELSPIN_CONFIG")]
    config: Option<PathBuf>,
    /// Starting credits (default 100)
    #[arg(long, global = true, env = "REELSPIN_CREDITS")]
    credits: Option<u64>,
    /// Credits staked per spin (default 10)
    #[arg(long, global = true, env = "REELSPIN_STAKE")]
    stake: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play interactively: Enter spins, `s` skips the animation, `q` quits
    Play {
        #[arg(long, value_enum, default_value_t = Variant::Rotor)]
        variant: Variant,
        /// Seed the symbol draws for a repeatable session
        #[arg(long, conflicts_with_all = ["server_seed", "force"])]
        seed: Option<u64>,
        /// Play provably fair spins with this secret seed
        #[arg(long, requires = "client_seed", conflicts_with = "force")]
        server_seed: Option<String>,
        #[arg(long)]
        client_seed: Option<String>,
        /// Land every spin on these symbols, e.g. 3,3,3
        #[arg(long)]
        force: Option<SpinResult>,
    },
    /// Play many spins without animation and report the return to player
    Simulate {
        #[arg(long, default_value_t = 100_000)]
        spins: u64,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        json: bool,
    },
    /// Recompute a provably fair spin from its revealed seeds
    Verify {
        #[arg(long)]
        server_seed: String,
        #[arg(long)]
        client_seed: String,
        #[arg(long)]
        nonce: u64,
        /// Reported reels to check against, e.g. 3,3,3
        #[arg(long)]
        expect: Option<SpinResult>,
        #[arg(long)]
        json: bool,
    },
    /// Print the SHA-256 commitment of a server seed
    Hash { server_seed: String },
}

fn load_config(cli: &Cli) -> anyhow::Result<GameConfig> {
    let mut config = match &cli.config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => GameConfig::default(),
    };
    if let Some(credits) = cli.credits {
        config.starting_credits = credits;
    }
    if let Some(stake) = cli.stake {
        config.stake = stake;
    }
    Ok(config)
}

fn symbol_source(
    seed: Option<u64>,
    server_seed: Option<String>,
    client_seed: Option<String>,
    force: Option<SpinResult>,
) -> anyhow::Result<Box<dyn SymbolSource>> {
    if let Some(result) = force {
        return Ok(Box::new(ScriptedSource::new(result.symbols().to_vec())?));
    }
    if let Some(server_seed) = server_seed {
        let source = ProvablyFairSource::new(server_seed, client_seed.unwrap_or_default(), 0);
        println!("server seed hash: {}", source.server_seed_hash_hex());
        return Ok(Box::new(source));
    }
    Ok(match seed {
        Some(seed) => Box::new(WeightedSource::seeded(seed)),
        None => Box::new(WeightedSource::from_entropy()),
    })
}

/// The spin started from the keyboard, if any.
#[derive(Default)]
struct SpinSlot {
    running: Option<(JoinHandle<SpinAttempt>, CancelHandle)>,
}

impl SpinSlot {
    /// Spawns a spin unless the previous one is still running.
    fn start<R>(&mut self, machine: &Arc<SpinCoordinator<R>>, session: &SessionHandle) -> bool
    where
        R: ReelRenderer + 'static,
    {
        if let Some((running, _)) = &self.running {
            if !running.is_finished() {
                debug!("start while spinning, ignored");
                return false;
            }
        }
        let (cancel, signal) = CancelSignal::pair();
        let machine = Arc::clone(machine);
        let session = session.clone();
        let task = tokio::spawn(async move { machine.spin_with_cancel(&session, signal).await });
        self.running = Some((task, cancel));
        true
    }

    fn skip(&self) {
        if let Some((_, cancel)) = &self.running {
            cancel.cancel();
        }
    }

    /// Waits for the running spin, if there is one.
    async fn finish(&mut self) -> anyhow::Result<Option<SpinAttempt>> {
        match self.running.take() {
            Some((running, _)) => Ok(Some(running.await?)),
            None => Ok(None),
        }
    }
}

async fn play(config: GameConfig, variant: Variant, source: Box<dyn SymbolSource>) -> anyhow::Result<()> {
    let session = SessionHandle::new(Session::new(config.starting_credits, source));
    let renderer = TerminalRenderer::new(variant, config.symbols.clone());
    let machine = Arc::new(SpinCoordinator::new(config.engine(), renderer, variant.timing()));

    eprintln!("Enter: spin ({} credits)   s: skip animation   q: quit", config.stake);
    machine.renderer().credits_changed(session.credits());

    let mut slot = SpinSlot::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "q" | "quit" => break,
            "s" | "skip" => slot.skip(),
            _ => {
                slot.start(&machine, &session);
            }
        }
    }
    if let Some(SpinAttempt::Completed(record)) = slot.finish().await? {
        debug!(report = %serde_json::to_string(&record.report())?, "last spin");
    }

    let stats = session.stats();
    println!();
    println!(
        "spins: {}  staked: {}  paid: {}  credits: {}",
        stats.spins,
        stats.total_staked,
        stats.total_paid,
        session.credits()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Play {
            variant,
            seed,
            server_seed,
            client_seed,
            force,
        } => {
            let source = symbol_source(seed, server_seed, client_seed, force)?;
            play(config, variant, source).await?;
        }
        Commands::Simulate { spins, seed, json } => {
            let mut source = match seed {
                Some(seed) => WeightedSource::seeded(seed),
                None => WeightedSource::from_entropy(),
            };
            info!(spins, stake = config.stake, "simulating");
            let report = config.engine().simulate(spins, &mut source);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("spins: {}  staked: {}  paid: {}", report.spins, report.total_staked, report.total_paid);
                println!("rtp: {:.4}", report.rtp);
                println!(
                    "jackpots: {}  matches: {}  no win: {}",
                    report.jackpots, report.matches, report.no_wins
                );
                for s in &report.symbols {
                    println!("  {} {:>10} draws  {:.4}", s.symbol, s.draws, s.share);
                }
            }
        }
        Commands::Verify {
            server_seed,
            client_seed,
            nonce,
            expect,
            json,
        } => {
            let result = spin_with_seeds(&server_seed, &client_seed, nonce, &config.symbols);
            let report = VerifyReport {
                server_seed_hash: derive_hash_hex(server_seed.as_bytes()),
                client_seed,
                nonce,
                reels: result.labels(),
                matches_expected: expect.map(|expected| expected == result),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("hash={} nonce={} reels={}", report.server_seed_hash, report.nonce, result);
                if let Some(ok) = report.matches_expected {
                    println!("{}", if ok { "verified" } else { "MISMATCH" });
                }
            }
            if report.matches_expected == Some(false) {
                anyhow::bail!("reported reels do not match the seeds");
            }
        }
        Commands::Hash { server_seed } => {
            println!("{}", derive_hash_hex(server_seed.as_bytes()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use reelspin_core::{PayoutEngine, ReelHandle, ReelTiming, SymbolId, SymbolTable};
    use reelspin_shared::Notice;

    use super::*;

    struct Quiet;

    #[async_trait]
    impl ReelRenderer for Quiet {
        async fn animate_reel(&self, _: ReelHandle, _: SymbolId, duration: Duration, mut cancel: CancelSignal) {
            tokio::select! {
                _ = tokio::time::sleep(duration) => {}
                _ = cancel.cancelled() => {}
            }
        }

        fn notify(&self, _: Notice) {}
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from(["reelspin", "--credits", "5", "simulate", "--spins", "10"]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.starting_credits, 5);
        assert_eq!(config.stake, 10);
    }

    #[test]
    fn force_parses_reels() {
        let cli = Cli::parse_from(["reelspin", "play", "--force", "3,3,3"]);
        let Commands::Play { force, .. } = cli.command else {
            panic!("expected play");
        };
        assert_eq!(force, Some(SpinResult::new(SymbolId::Three, SymbolId::Three, SymbolId::Three)));
    }

    #[test]
    fn forced_source_repeats_triple() {
        let force = "2,2,5".parse().ok();
        let mut source = symbol_source(None, None, None, force).unwrap();
        let table = SymbolTable::classic();
        let drawn: Vec<_> = (0..6).map(|_| source.next_symbol(&table)).collect();
        assert_eq!(drawn[3..], drawn[..3]);
        assert_eq!(drawn[2], SymbolId::Five);
    }

    #[tokio::test(start_paused = true)]
    async fn keyboard_start_waits_for_running_spin() {
        let source = ScriptedSource::new(vec![SymbolId::Two]).unwrap();
        let session = SessionHandle::new(Session::new(100, Box::new(source)));
        let machine = Arc::new(SpinCoordinator::new(PayoutEngine::classic(), Quiet, ReelTiming::flicker()));
        let mut slot = SpinSlot::default();

        assert!(slot.start(&machine, &session));
        assert!(!slot.start(&machine, &session));
        slot.skip();
        let first = slot.finish().await.unwrap();
        assert!(matches!(first, Some(SpinAttempt::Completed(_))));
        assert_eq!(session.credits(), 590);
        assert_eq!(session.stats().spins, 1);

        assert!(slot.start(&machine, &session));
        let second = slot.finish().await.unwrap();
        assert!(matches!(second, Some(SpinAttempt::Completed(_))));
        assert_eq!(session.credits(), 1080);
        assert_eq!(slot.finish().await.unwrap(), None);
    }
}

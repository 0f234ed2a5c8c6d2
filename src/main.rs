use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use rtp_core::{
    Actor, Admission, AdmissionGate, CompletingExecutor, Economy, InMemoryLedger, InMemoryServer,
    InMemoryStateStore, Permission, Region, RtpConfig, RtpContext, SYSTEM_ACTOR_ID, SelectionApi,
    ServerAccessor, SetupQueue, ShapeRegistry, TeleportStateStore,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "rtp-sim")]
#[command(about = "Drive the random teleport command against in-memory collaborators")]
struct Cli {
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// World created at startup, with a `default` circle region
    #[arg(long, default_value = "world")]
    world: String,
}

struct Simulator {
    config_path: Option<PathBuf>,
    server: Arc<InMemoryServer>,
    ledger: Arc<InMemoryLedger>,
    selection: Arc<SelectionApi>,
    shapes: Arc<ShapeRegistry>,
    state: Arc<InMemoryStateStore>,
    executor: Arc<CompletingExecutor>,
    ctx: Arc<RtpContext>,
    gate: AdmissionGate,
    names: HashMap<Uuid, String>,
    reported: usize,
}

impl Simulator {
    fn new(config: RtpConfig, config_path: Option<PathBuf>, world: &str) -> Result<Self> {
        let server = Arc::new(InMemoryServer::new());
        let ledger = Arc::new(InMemoryLedger::new());
        let selection = Arc::new(SelectionApi::new());
        let shapes = Arc::new(ShapeRegistry::with_default_shapes());
        let state = Arc::new(InMemoryStateStore::new());
        let executor = Arc::new(CompletingExecutor::new(state.clone()));
        let (queue, receiver) = SetupQueue::channel();

        let circle = shapes
            .instantiate("CIRCLE")
            .ok_or_else(|| anyhow!("circle shape is not registered"))?;
        selection.add_region(Region::new("default", world, circle))?;

        let ctx = Arc::new(
            RtpContext::new(config, server.clone(), state.clone(), queue, executor.clone())
                .with_economy(ledger.clone())
                .with_selection(selection.clone())
                .with_shapes(shapes.clone()),
        );
        receiver.spawn_worker(&ctx.runtime()?);

        let mut names = HashMap::new();
        names.insert(SYSTEM_ACTOR_ID, "console".to_string());

        Ok(Self {
            config_path,
            server,
            ledger,
            selection,
            shapes,
            state,
            executor,
            gate: AdmissionGate::new(ctx.clone()),
            ctx,
            names,
            reported: 0,
        })
    }

    fn actor(&self, name: &str) -> Result<Actor> {
        if name.eq_ignore_ascii_case("console") {
            return Ok(Actor::system());
        }
        self.server
            .player(name)
            .ok_or_else(|| anyhow!("unknown player '{}'", name))
    }

    async fn handle(&mut self, line: &str) -> Result<bool> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((command, rest)) = words.split_first() else {
            return Ok(true);
        };

        match *command {
            "player" => {
                let name = rest.first().ok_or_else(|| anyhow!("usage: player <name> [world] [balance]"))?;
                let world = rest.get(1).copied().unwrap_or("world");
                let balance: f64 = match rest.get(2) {
                    Some(raw) => raw.parse().context("balance must be a number")?,
                    None => 0.0,
                };
                let actor = Actor::player(Uuid::new_v4(), *name, world);
                self.names.insert(actor.id(), actor.name().to_string());
                self.server.grant(actor.id(), Permission::Use);
                self.ledger.set_balance(actor.id(), balance).await;
                self.server.add_player(actor);
                println!("added {} in {} with balance {}", name, world, balance);
            }
            "grant" => {
                let (Some(name), Some(node)) = (rest.first(), rest.get(1)) else {
                    bail!("usage: grant <name> <permission>");
                };
                let permission = Permission::from_node(node)
                    .ok_or_else(|| anyhow!("unknown permission '{}'", node))?;
                let actor = self.actor(name)?;
                self.server.grant(actor.id(), permission);
                println!("granted {} to {}", permission.node(), name);
            }
            "region" => {
                let (Some(name), Some(world), Some(shape)) = (rest.first(), rest.get(1), rest.get(2)) else {
                    bail!("usage: region <name> <world> <shape> [price]");
                };
                let shape = self
                    .shapes
                    .instantiate(shape)
                    .ok_or_else(|| anyhow!("unknown shape '{}'", shape))?;
                let price: f64 = match rest.get(3) {
                    Some(raw) => raw.parse().context("price must be a number")?,
                    None => 0.0,
                };
                self.selection.add_region(Region::new(name, world, shape).price(price))?;
                println!("region {} ready", name);
            }
            "as" => {
                let name = rest.first().ok_or_else(|| anyhow!("usage: as <name|console> <args...>"))?;
                let sender = self.actor(name)?;
                match self.gate.submit(&sender, &rest[1..]) {
                    Admission::Rejected(rejection) => println!("rejected: {:?}", rejection),
                    Admission::Failed => println!("failed to start"),
                    Admission::Dispatched(handle) => {
                        let done = handle.await.context("pipeline task panicked")?;
                        println!("resolved: {}", done);
                    }
                }
                tokio::task::yield_now().await;
                self.report_placements();
            }
            "complete" => {
                let name = rest.first().ok_or_else(|| anyhow!("usage: complete <name>"))?;
                let actor = self.actor(name)?;
                let done = self.state.complete(actor.id())?;
                println!("{} {}", name, if done { "completed" } else { "has no record" });
            }
            "balance" => {
                let name = rest.first().ok_or_else(|| anyhow!("usage: balance <name>"))?;
                let actor = self.actor(name)?;
                println!("{}: {}", name, self.ledger.balance(actor.id()).await?);
            }
            "reload" => {
                let config = match &self.config_path {
                    Some(path) => RtpConfig::from_path(path)?,
                    None => (*self.ctx.config()).clone(),
                };
                self.ctx.reload(config)?;
                println!("reloaded");
            }
            "quit" | "exit" => return Ok(false),
            other => println!("unknown command '{}'", other),
        }

        self.print_messages();
        Ok(true)
    }

    fn print_messages(&self) {
        for message in self.server.take_messages() {
            let to = self.name_of(message.recipient);
            match message.about {
                Some(about) => println!("  -> {} (about {}): {}", to, self.name_of(about), message.text),
                None => println!("  -> {}: {}", to, message.text),
            }
        }
    }

    fn report_placements(&mut self) {
        let placed = self.executor.placed();
        for job in &placed[self.reported.min(placed.len())..] {
            println!(
                "  placed {} in region {} ({})",
                job.target().name(),
                job.region().name(),
                job.region().shape().name()
            );
        }
        self.reported = placed.len();
    }

    fn name_of(&self, id: Uuid) -> &str {
        self.names.get(&id).map(String::as_str).unwrap_or("?")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => RtpConfig::from_path(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => RtpConfig::new().world(&cli.world, "default"),
    };

    let mut sim = Simulator::new(config, cli.config.clone(), &cli.world)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        match sim.handle(line.trim()).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => println!("error: {:#}", err),
        }
    }

    Ok(())
}

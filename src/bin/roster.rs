use std::io;
use std::sync::Arc;
use clap::{Parser, Subcommand};
use roster_store::console::Menu;
use roster_store::engine::Allocator;
use roster_store::roster::{resolve_data_file, Roster, DEFAULT_DATA_FILE};
use roster_store::IdAllocator;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Counter file holding the next id for every entity kind.
    #[arg(short, long)]
    data_file: Option<String>,

    /// Keep counters in memory only; ids restart at 1 on every run.
    #[arg(long)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Start the interactive menu (default).
    Menu,
    /// Print the persisted counters.
    Counters,
    /// Allocate and print the next id for a counter.
    NextId { counter: String },
    /// Delete the counter file so every counter restarts at 1.
    ResetCounters,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let allocator = if cli.ephemeral {
        Allocator::in_memory()
    } else {
        Allocator::open(resolve_data_file(cli.data_file, DEFAULT_DATA_FILE))?
    };
    let allocator = Arc::new(allocator);

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => {
            let mut roster = Roster::new(allocator);
            let stdin = io::stdin();
            Menu::new(&mut roster, stdin.lock(), io::stdout()).run()?;
        }
        Commands::Counters => {
            let counters = allocator.counters();
            println!("{}", serde_json::to_string_pretty(&counters)?);
        }
        Commands::NextId { counter } => {
            println!("{}", allocator.next_id(&counter)?);
        }
        Commands::ResetCounters => {
            allocator.reset()?;
            println!("OK");
        }
    }

    Ok(())
}

use std::{
    error::Error,
    io::{self, ErrorKind},
    process,
    time::Duration,
};

use clap::Parser;
use log::debug;
use qshell::{
    CommandStatus, Console, Interrupt, Session, SessionConfig, Shell, ShellOptions, TcpConnector,
    cli::WELCOME, config::DEFAULT_FETCH_BATCH_SIZE, prompt,
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// <host:port> of the query service to connect to
    #[arg(short = 'i', long)]
    connect: Option<String>,
    /// Execute a query without the shell
    #[arg(short, long)]
    query: Option<String>,
    /// Disable verbose output
    #[arg(long)]
    quiet: bool,
    /// Continue on query failure
    #[arg(short = 'c', long)]
    ignore_query_failure: bool,
    /// Refresh the service catalog after connecting
    #[arg(short, long)]
    refresh_after_connect: bool,
    /// Issue a `use` for this database after connecting
    #[arg(short, long)]
    database: Option<String>,
    /// Rows requested per fetch
    #[arg(long, default_value_t = DEFAULT_FETCH_BATCH_SIZE)]
    fetch_batch_size: usize,
    /// Seconds to wait for a connection
    #[arg(long, default_value_t = 10)]
    connect_timeout: u64,
}

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize env_logger; For logging to STDOUT/STDERR
    env_logger::init();

    let cli = Cli::parse();
    let config = SessionConfig {
        verbose: !cli.quiet,
        fetch_batch_size: cli.fetch_batch_size,
        connect_timeout: Duration::from_secs(cli.connect_timeout),
        ..Default::default()
    };

    // Ctrl-C only raises the flag; the running query notices it at its next poll.
    let interrupt = Interrupt::new();
    let handler = interrupt.clone();
    ctrlc::set_handler(move || handler.set())?;

    let connector = TcpConnector::new(config.connect_timeout);
    let session = Session::new(connector, Console::stdio(), config, interrupt);
    let mut shell = Shell::new(
        session,
        ShellOptions {
            refresh_after_connect: cli.refresh_after_connect,
            default_db: cli.database.clone(),
        },
    );

    let connected = match &cli.connect {
        Some(address) => shell.execute(&format!("connect {address}")) == CommandStatus::Success,
        None => true,
    };

    if let Some(query) = cli.query {
        if !connected {
            process::exit(1);
        }

        let mut commands = Vec::new();
        while let Some(cmd) = shell.next_queued() {
            commands.push(cmd);
        }
        commands.push(query);

        for cmd in commands {
            if shell.execute(&cmd) == CommandStatus::Failure {
                eprintln!("Could not execute command: {cmd}");
                if !cli.ignore_query_failure {
                    process::exit(1);
                }
            }
        }
        return Ok(());
    }

    println!("{WELCOME}");
    let stdin = io::stdin();
    let stdout = io::stdout();

    loop {
        while let Some(cmd) = shell.next_queued() {
            shell.execute(&cmd);
        }

        let line = match prompt(stdin.lock(), stdout.lock(), &shell.prompt()) {
            Ok(Some(line)) => line,
            Ok(None) => {
                println!();
                "quit".to_string()
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => {
                debug!("read interrupted");
                println!();
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if shell.execute(&line) == CommandStatus::Quit {
            break;
        }
    }

    Ok(())
}

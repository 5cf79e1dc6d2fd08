use clap::Parser;
use color_eyre::Result;
use insight_dash::app::App;
use insight_dash::cli::CliArgs;
use insight_dash::{event, terminal};

#[tokio::main]
async fn main() -> Result<()> {
    // Setup error handling
    color_eyre::install()?;

    let args = CliArgs::parse();
    args.apply_env_overrides();

    // Tracing goes to stderr; only enabled where it cannot fight the UI
    // for the screen, or when explicitly requested.
    if args.headless || args.debug {
        init_tracing(args.debug);
    }

    // Initialize application state
    let mut app = App::new();
    app.filters = args.initial_filters()?;

    // Run headless when asked to, or when stdout is not a terminal
    if args.headless || !is_terminal() {
        return event::run_headless(&mut app, args.json).await;
    }

    // Resolve the backend endpoint before entering the alternate screen,
    // so configuration errors stay readable.
    app.actions.initialize()?;

    // Setup terminal
    let mut terminal = terminal::setup()?;

    // Run the application
    let result = event::run(&mut terminal, &mut app).await;

    // Restore terminal
    terminal::cleanup(true, true);

    // Return the result
    result
}

fn init_tracing(debug: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(if debug { "debug" } else { "info" })
            }),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

// Check if we're running in a terminal
fn is_terminal() -> bool {
    atty::is(atty::Stream::Stdout)
}

use clap::Parser;
use log::info;
use skyboard::board::{run_single_cycle, DisplayTask};
use skyboard::cli::Cli;
use skyboard::config::ApplicationConfig;
use skyboard::display::TerminalBackend;
use skyboard::fetcher::{FetchOutcome, FetchTask};
use skyboard::logging::setup_logging;
use skyboard::opensky::OpenSkyClient;
use skyboard::renderer::Layout;
use skyboard::thread_manager::ThreadManager;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.logging_level);

    let application_config = match ApplicationConfig::construct_from_path(&cli.config_file) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            return std::process::ExitCode::FAILURE;
        }
    };
    info!("Main: Application started.");

    let mut client = match OpenSkyClient::new(&application_config.opensky) {
        Ok(client) => client,
        Err(e) => {
            log::error!("Error constructing OpenSky client: {e}");
            return std::process::ExitCode::FAILURE;
        }
    };
    let mut backend = TerminalBackend::stdout(application_config.display.terminal_style);
    let layout = Layout::from_config(&application_config.display);

    if cli.once {
        return match run_single_cycle(
            &mut client,
            &application_config.bounding_box,
            &layout,
            &mut backend,
        ) {
            Ok(_) => std::process::ExitCode::SUCCESS,
            Err(e) => {
                log::error!("{e}");
                std::process::ExitCode::FAILURE
            }
        };
    }

    let (outcome_sender, outcome_receiver): (
        crossbeam_channel::Sender<FetchOutcome>,
        crossbeam_channel::Receiver<FetchOutcome>,
    ) = crossbeam_channel::unbounded();

    let fetch_task = FetchTask::new(
        client,
        application_config.bounding_box,
        application_config.poll.interval(),
        application_config.poll.max_backoff_ticks,
        outcome_sender,
    );
    let display_task = DisplayTask::new(
        outcome_receiver,
        backend,
        layout,
        application_config.display.ticks_per_page(),
    );

    let (shutdown_sender, shutdown_receiver) = crossbeam_channel::bounded::<()>(1);
    let interrupt_sender = shutdown_sender.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = interrupt_sender.try_send(());
    }) {
        log::warn!("Failed to install interrupt handler, the display will not be cleared on Ctrl-C: {e}");
    }

    let mut thread_manager = ThreadManager::new();
    let started = thread_manager
        .add_task("fetch", fetch_task, application_config.poll.interval())
        .and_then(|_| {
            thread_manager.add_task(
                "display",
                display_task,
                application_config.display.refresh_period(),
            )
        });
    if let Err(e) = started {
        log::error!("Failed to start tasks: {e}");
        thread_manager.stop_all_tasks();
        thread_manager.wait_on_all_tasks();
        return std::process::ExitCode::FAILURE;
    }

    let reason = thread_manager.run_until_shutdown(
        &shutdown_receiver,
        cli.duration.map(std::time::Duration::from_secs),
    );
    drop(shutdown_sender);

    info!("Main: Program finished ({reason:?}).");
    std::process::ExitCode::SUCCESS
}

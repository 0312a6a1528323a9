use std::process::ExitCode;

mod logging;
mod replay;

fn main() -> ExitCode {
    let log_guard = logging::init();
    let args: Vec<String> = std::env::args().skip(1).collect();

    match replay::run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(replay::ReplayError::Usage) => {
            eprintln!("{}", replay::USAGE);
            ExitCode::from(2)
        }
        Err(e) => {
            tracing::error!(error = %e, "replay failed");
            eprintln!("whisperline: {e}");
            if let Some(guard) = &log_guard {
                eprintln!("see logs in {}", guard.log_dir().display());
            }
            ExitCode::FAILURE
        }
    }
}

//! NEXUS ifaddr - interface address CLI
//!
//! Prints the answer on stdout; diagnostics go to stderr.

/// Logs a message to stderr
macro_rules! log_stderr {
    ($($arg:tt)*) => {
        nexus_ifaddr::log_stderr!($($arg)*)
    };
}

/// Logs an error message to stderr
macro_rules! log_error {
    ($($arg:tt)*) => {
        nexus_ifaddr::log_error!($($arg)*)
    };
}

fn main() {
    match nexus_ifaddr::logging::init_logging() {
        Ok(Some(log_dir)) => log_stderr!("Writing JSON logs to {}", log_dir.display()),
        Ok(None) => {}
        Err(e) => eprintln!("[WARN] Failed to initialize structured logging: {}", e),
    }

    match nexus_ifaddr::run(std::env::args()) {
        Ok(()) => {}
        Err(e) => {
            log_error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

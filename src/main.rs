use std::io;

use batch_pool::{Coordinator, PoolConfig, logging};

fn main() {
    logging::init();

    let coordinator = match Coordinator::new(PoolConfig::default()) {
        Ok(coordinator) => coordinator,
        Err(err) => {
            eprintln!("invalid pool configuration: {err}");
            std::process::exit(2);
        }
    };

    let report = coordinator.run();
    report.log_summary();

    let stdout = io::stdout();
    if let Err(err) = report.write_results(&mut stdout.lock()) {
        eprintln!("failed to write results: {err}");
    }
}

use crate::settings::AppConfig;
use std::time::Duration;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    let registry = config.strategy_registry()?;

    println!(
        "{:<18} {:<9} {:>8} {:>8} {:>6} {:>8} {:>6} {:>9} {:>9}",
        "STRATEGY", "CLASS", "ATTEMPTS", "BASE", "FACTOR", "CAP", "JITTER", "ATTEMPT", "DEADLINE"
    );
    for s in registry.strategies() {
        println!(
            "{:<18} {:<9} {:>8} {:>8} {:>6.1} {:>8} {:>6.2} {:>9} {:>9}",
            s.name,
            s.class,
            s.max_attempts,
            millis(Some(s.base_delay)),
            s.backoff_factor,
            millis(Some(s.max_delay)),
            s.jitter,
            millis(s.attempt_timeout),
            millis(s.deadline),
        );
    }
    Ok(())
}

fn millis(duration: Option<Duration>) -> String {
    match duration {
        Some(d) => format!("{}ms", d.as_millis()),
        None => "-".to_string(),
    }
}

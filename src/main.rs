use anyhow::{Context, Result};
use okey_round::round::{Round, RoundConfig};
use std::io::IsTerminal;

fn main() -> Result<()> {
    let mut config = RoundConfig::default();
    if let Some(arg) = std::env::args().nth(1) {
        let seed = arg
            .parse::<u64>()
            .with_context(|| format!("invalid seed {:?}, expected an unsigned integer", arg))?;
        config.seed = Some(seed);
    }

    println!("Okey Round ({})", env!("BUILD_COMMIT"));
    println!("Dealing hands...");
    let round = Round::deal(&config).context("failed to deal round")?;

    println!("Scoring hands...");
    let report = round.score();

    if std::io::stdout().is_terminal() {
        println!("{}", report);
    } else {
        println!("{}", report.to_plain_string());
    }
    Ok(())
}

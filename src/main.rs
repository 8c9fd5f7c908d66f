use clap::Parser;
use log::info;
use riba::config::{Cli, Config, Mode};
use riba::queue::QueueModel;
use riba::repl::Repl;
use simple_logger::SimpleLogger;
use std::error::Error;
use std::io;

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = Config::from(&cli);

    SimpleLogger::new()
        .with_level(config.log_level)
        .init()?;

    match cli.mode {
        Some(Mode::Queue {
            arrival,
            departure,
            n,
        }) => show_queue(QueueModel::new(arrival, departure), n)?,
        None => {
            info!("starting session, month 0 is {}", config.start_date);
            let stdin = io::stdin();
            let mut repl = Repl::new(stdin.lock(), io::stdout(), config);
            repl.run()?;
        }
    }
    Ok(())
}

fn show_queue(model: QueueModel, n: u32) -> riba::Result<()> {
    println!("{}", model);
    println!("rho = {:.4}", model.rho()?);
    println!("p({}) = {:.4}", n, model.probability_of_n(n)?);
    println!("p(0..{}) = {:.4}", n, model.probability_at_most(n)?);
    println!("p({}..) = {:.4}", n + 1, model.probability_more_than(n)?);
    Ok(())
}

// verifies that types can implement the gated traits below
#[cfg(test)]
fn is_normal<T: Sized + Send + Sync + Unpin>() {}

#[test]
fn normal_types() {
    is_normal::<riba::Ledger>();
    is_normal::<riba::LoanPayment>();
    is_normal::<riba::Balance>();
}

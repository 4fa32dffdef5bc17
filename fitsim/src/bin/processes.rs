use fitsim::*;

/// A random workload generator for `fitsim`
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of processes to generate
    #[arg(short = 'n', long, default_value_t = 50)]
    #[arg(value_parser = clap::value_parser!(usize))]
    count:          usize,

    /// Seed for the generator. Picked at random if absent.
    #[arg(short, long)]
    #[arg(value_parser = clap::value_parser!(u64))]
    seed:           Option<u64>,

    /// Arrival times are drawn from [0, max-arrival)
    #[arg(short = 'a', long, default_value_t = RandomWorkload::MAX_ARRIVAL)]
    max_arrival:    Units,

    /// Sizes are drawn from [1, max-size]
    #[arg(short = 'z', long, default_value_t = RandomWorkload::MAX_SIZE)]
    max_size:       Units,

    /// Service times are drawn from [1, max-service]
    #[arg(short = 't', long, default_value_t = RandomWorkload::MAX_SERVICE)]
    max_service:    Units,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Args::parse();
    let seed = cli.seed.unwrap_or_else(rand::random);
    let specs = RandomWorkload::new(seed)
        .with_limits(cli.max_arrival, cli.max_size, cli.max_service)
        .read_specs(cli.count)?;
    write_specs(&mut std::io::stdout().lock(), &specs)?;

    Ok(())
}

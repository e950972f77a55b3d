use clap::{arg, command, value_parser, Command};
use rayon::ThreadPoolBuilder;
use sdm_sedimentation as sdm;

fn main() {
    let matches = command!()
        .arg(
            arg!(
                -n --number_of_threads <NUMBER_OF_THREADS> "Sets the number of threads"
            )
            .required(false)
            .value_parser(value_parser!(usize)),
        )
        .arg(
            arg!(
                -v --verbose "Prints debug messages"
            )
            .required(false),
        )
        .subcommand(
            Command::new("run")
                .about("Runs the sedimentation simulation")
                .arg(
                    arg!(
                        -b --benchmark "Runs the benchmark"
                    )
                    .required(false),
                ),
        )
        .subcommand(
            Command::new("post")
                .about("Summarizes the super-droplet snapshot of a time step")
                .arg(
                    arg!(
                        -s --step <STEP> "Time step of the snapshot"
                    )
                    .required(true)
                    .value_parser(value_parser!(usize)),
                ),
        )
        .get_matches();

    sdm::logging::init(matches.get_flag("verbose"));

    if let Some(&num_threads) = matches.get_one::<usize>("number_of_threads") {
        if let Err(e) = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
        {
            eprintln!("Error while building the thread pool: {e}.");
            std::process::exit(1);
        }
    }

    let result = match matches.subcommand() {
        Some(("run", sub_matches)) => match sub_matches.get_flag("benchmark") {
            false => sdm::displacement::run(),
            true => sdm::displacement::run_benchmark(),
        },
        Some(("post", sub_matches)) => match sub_matches.get_one::<usize>("step") {
            Some(&step) => sdm::displacement::io::run_post_processing(step),
            None => Ok(()),
        },
        _ => Ok(()),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}.");
        std::process::exit(1);
    }
}

use clap::{App, Arg, SubCommand};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use rayon::prelude::*;
use squiggle_hmm::gen_seq;
use squiggle_hmm::{
    AlignmentMode, HmmInput, PoreModel, SquiggleRead, Strand, TransitionParameters,
};
use std::error::Error;
#[macro_use]
extern crate log;

fn common_args(app: App<'static, 'static>) -> App<'static, 'static> {
    app.arg(
        Arg::with_name("verbose")
            .short("v")
            .multiple(true)
            .help("Debug mode"),
    )
    .arg(
        Arg::with_name("seed")
            .long("seed")
            .takes_value(true)
            .default_value("32389")
            .help("Seed"),
    )
    .arg(
        Arg::with_name("params")
            .long("params")
            .value_name("JSON")
            .takes_value(true)
            .help("Transition parameters. JSON format. Default values are used if not given."),
    )
    .arg(
        Arg::with_name("model")
            .long("model")
            .value_name("JSON")
            .takes_value(true)
            .help("Pore model. JSON format. A random model of k-mers of length --k is used if not given."),
    )
    .arg(
        Arg::with_name("global")
            .long("global")
            .help("Align all the events to the whole sequence, instead of a local alignment."),
    )
    .arg(
        Arg::with_name("length")
            .long("length")
            .takes_value(true)
            .default_value("500")
            .help("Length of the reference."),
    )
    .arg(
        Arg::with_name("k")
            .long("k")
            .short("k")
            .takes_value(true)
            .default_value("5")
            .help("Length of the k-mers of the pore model."),
    )
}

fn subcommand_score() -> App<'static, 'static> {
    let app = SubCommand::with_name("score")
        .version("0.1")
        .author("Bansho Masutani")
        .about("Scoring simulated reads against the true reference and a mutated one.")
        .arg(
            Arg::with_name("reads")
                .long("reads")
                .short("r")
                .takes_value(true)
                .default_value("20")
                .help("Number of reads to simulate."),
        )
        .arg(
            Arg::with_name("mutations")
                .long("mutations")
                .takes_value(true)
                .default_value("1")
                .help("Number of substitutions introduced in the mutated reference."),
        )
        .arg(
            Arg::with_name("threads")
                .long("threads")
                .short("t")
                .takes_value(true)
                .default_value("1")
                .help("Number of threads"),
        );
    common_args(app)
}

fn subcommand_align() -> App<'static, 'static> {
    let app = SubCommand::with_name("align")
        .version("0.1")
        .author("Bansho Masutani")
        .about("Aligning the events of a simulated read to the reference.");
    common_args(app)
}

fn parse<T: std::str::FromStr>(matches: &clap::ArgMatches, name: &str) -> Result<T, Box<dyn Error>> {
    matches
        .value_of(name)
        .and_then(|e| e.parse().ok())
        .ok_or_else(|| format!("invalid value for --{}", name).into())
}

fn load_parameters(matches: &clap::ArgMatches) -> Result<TransitionParameters, Box<dyn Error>> {
    match matches.value_of("params") {
        Some(path) => {
            let rdr = std::fs::File::open(path).map(std::io::BufReader::new)?;
            let params: TransitionParameters = serde_json::de::from_reader(rdr)?;
            params.validate()?;
            debug!("Loaded parameters from {}\n{}", path, params);
            Ok(params)
        }
        None => Ok(TransitionParameters::default()),
    }
}

fn load_pore_model<R: Rng>(
    matches: &clap::ArgMatches,
    rng: &mut R,
) -> Result<PoreModel, Box<dyn Error>> {
    match matches.value_of("model") {
        Some(path) => {
            let rdr = std::fs::File::open(path).map(std::io::BufReader::new)?;
            let model: PoreModel = serde_json::de::from_reader(rdr)?;
            debug!("Loaded {}-mer pore model from {}", model.k(), path);
            Ok(model)
        }
        None => {
            let k: usize = parse(matches, "k")?;
            Ok(gen_seq::random_pore_model(rng, k)?)
        }
    }
}

fn mode(matches: &clap::ArgMatches) -> AlignmentMode {
    match matches.is_present("global") {
        true => AlignmentMode::Global,
        false => AlignmentMode::Local,
    }
}

/// A random reference, a pore model, and `num` reads simulated from them.
fn simulate(
    matches: &clap::ArgMatches,
    num: usize,
) -> Result<(Vec<u8>, Vec<SquiggleRead>), Box<dyn Error>> {
    let seed: u64 = parse(matches, "seed")?;
    let len: usize = parse(matches, "length")?;
    let params = load_parameters(matches)?;
    let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(seed);
    let model = load_pore_model(matches, &mut rng)?;
    let template = gen_seq::generate_seq(&mut rng, len);
    let reads = (0..num)
        .map(|i| {
            let id = format!("read{}", i);
            gen_seq::simulate_read(&mut rng, &id, &template, &model, &params)
        })
        .collect::<squiggle_hmm::Result<Vec<_>>>()?;
    Ok((template, reads))
}

fn score(matches: &clap::ArgMatches) -> Result<(), Box<dyn Error>> {
    let num_reads: usize = parse(matches, "reads")?;
    let mutations: usize = parse(matches, "mutations")?;
    let seed: u64 = parse(matches, "seed")?;
    let mode = mode(matches);
    let (template, reads) = simulate(matches, num_reads)?;
    let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(seed + 1);
    let seeds: Vec<u64> = (0..reads.len()).map(|_| rng.gen()).collect();
    let results = reads
        .par_iter()
        .zip(seeds.par_iter())
        .map(|(read, &seed)| -> squiggle_hmm::Result<(&str, f64, f64)> {
            let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(seed);
            let mutated = gen_seq::introduce_substitutions(&template, &mut rng, mutations);
            let input = HmmInput::whole_strand(read, Strand::Template)?;
            let lp_true = squiggle_hmm::score(&template, &input, mode)?;
            let lp_mutated = squiggle_hmm::score(&mutated, &input, mode)?;
            Ok((read.id.as_str(), lp_true, lp_mutated))
        })
        .collect::<squiggle_hmm::Result<Vec<_>>>()?;
    let better = results.iter().filter(|&&(_, t, m)| m < t).count();
    info!("True reference is better in {}/{} reads", better, results.len());
    use std::io::Write;
    let stdout = std::io::stdout();
    let mut wtr = std::io::BufWriter::new(stdout.lock());
    for (id, lp_true, lp_mutated) in results {
        writeln!(wtr, "{}\t{:.3}\t{:.3}\t{:.3}", id, lp_true, lp_mutated, lp_true - lp_mutated)?;
    }
    Ok(())
}

fn align(matches: &clap::ArgMatches) -> Result<(), Box<dyn Error>> {
    let mode = mode(matches);
    let (template, reads) = simulate(matches, 1)?;
    let read = &reads[0];
    let input = HmmInput::whole_strand(read, Strand::Template)?;
    let (lp, path) = squiggle_hmm::align(&template, &input, mode)?;
    info!("{}\t{:.3}\t{} steps", read.id, lp, path.len());
    use std::io::Write;
    let stdout = std::io::stdout();
    let mut wtr = std::io::BufWriter::new(stdout.lock());
    for step in path {
        writeln!(
            wtr,
            "{}\t{}\t{}\t{:.3}",
            step.event_idx, step.kmer_idx, step.state, step.lp_cell
        )?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let matches = App::new("squiggle_hmm")
        .version("0.1")
        .author("Bansho Masutani")
        .about("Score:[SIMULATED READS]->TSV or Align:[SIMULATED READ]->TSV")
        .setting(clap::AppSettings::ArgRequiredElseHelp)
        .subcommand(subcommand_score())
        .subcommand(subcommand_align())
        .get_matches();
    if let Some(sub_m) = matches.subcommand().1 {
        let level = match sub_m.occurrences_of("verbose") {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
        if let Some(threads) = sub_m.value_of("threads").and_then(|x| x.parse().ok()) {
            if let Err(why) = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build_global()
            {
                debug!("{:?}", why);
            }
        }
    }
    debug!("Start");
    match matches.subcommand() {
        ("score", Some(sub_m)) => score(sub_m),
        ("align", Some(sub_m)) => align(sub_m),
        _ => unreachable!(),
    }
}

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use colored::Colorize;
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

use strobprobe::config::load_parameters;
use strobprobe::design::DesignPipeline;
use strobprobe::energy::CachedOracle;
use strobprobe::energy::Conditions;
use strobprobe::energy::Duplex;
use strobprobe::energy::StemFolder;
use strobprobe::report;
use strobprobe::structure::DotBracketVec;
use strobprobe::structure::canonicalize;

#[derive(Parser)]
#[command(name = "strobprobe", version)]
#[command(about = "Design three-strand toehold-exchange DNA sensors", long_about = None)]
struct Cli {
    /// Increase logging (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Design placeholder, fuel and probe for the target in a parameter sheet.
    Design(DesignArgs),

    /// Duplex thermodynamics of a sequence with its reverse complement.
    Thermo(ConditionArgs),

    /// Folded free energy and structure of a single strand.
    Fold(ConditionArgs),
}

#[derive(Args)]
struct DesignArgs {
    /// Parameter sheet (two-column CSV, or JSON).
    config: PathBuf,

    /// Seed for toehold 2 generation. Drawn at random if omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Write the design as JSON instead of the text report.
    #[arg(long)]
    json: bool,

    /// Output file ("-" for stdout). Defaults to ProbeDesign_<id>.txt.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct ConditionArgs {
    sequence: String,

    /// Monovalent salt concentration (M).
    #[arg(long, default_value_t = 1.0, value_parser = positive_salt)]
    salt: f64,

    /// Temperature (C).
    #[arg(long, default_value_t = 25.0)]
    temperature: f64,
}

fn positive_salt(s: &str) -> Result<f64, String> {
    let salt: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if salt.is_finite() && salt > 0. {
        Ok(salt)
    } else {
        Err(format!("{salt} M must be positive"))
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn write_output(path: Option<PathBuf>, default: String, content: &str) -> Result<()> {
    let path = path.unwrap_or_else(|| PathBuf::from(default));
    if path.as_os_str() == "-" {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(content.as_bytes())?;
        return Ok(());
    }
    fs::write(&path, content).with_context(|| format!("cannot write {}", path.display()))?;
    eprintln!("{} {}", "Report written to".green(), path.display());
    Ok(())
}

fn run_design(args: DesignArgs) -> Result<()> {
    let params = load_parameters(&args.config)?;
    let seed = args.seed.unwrap_or_else(rand::random);
    info!("design {} with seed {seed}", params.design_id);

    let oracle = CachedOracle::new(StemFolder::default());
    let outcome = DesignPipeline::new(params.clone(), &oracle, StdRng::seed_from_u64(seed)).run();
    info!("{} folding evaluations, {} cache hits", oracle.len(), oracle.hits());

    let file_name = report::report_file_name(&params);
    match outcome {
        Ok(design) => {
            let content = if args.json {
                report::design_json(&design, seed)?
            } else {
                report::render_design(&design, seed)?
            };
            for w in &design.warnings {
                eprintln!("{} {w}", "warning:".yellow().bold());
            }
            write_output(args.output, file_name, &content)?;
            let strands = design.strands();
            eprintln!("{} placeholder {}, fuel {}, probe {} (seed {seed})", "Designed".green().bold(),
                strands.placeholder, strands.fuel, strands.probe);
            Ok(())
        }
        Err(failure) => {
            let content = if args.json {
                report::failure_json(&failure, seed)?
            } else {
                report::render_failure(&params, &failure, seed)?
            };
            write_output(args.output, file_name, &content)?;
            Err(failure.into())
        }
    }
}

fn run_thermo(args: ConditionArgs) -> Result<()> {
    let seq = canonicalize(&args.sequence)?;
    let conditions = Conditions::new(args.temperature, args.salt);
    let duplex = Duplex::perfect(seq)?;
    let energy = conditions.duplex(duplex.thermo(), duplex.len());
    println!("{}", duplex.strand_a());
    println!("{}", duplex.strand_b());
    println!("DH (kcal/mol):          {:>10.4}", energy.thermo.enthalpy);
    println!("DS (kcal/Kmol):         {:>10.4}", energy.thermo.entropy);
    println!("DG (kcal/mol):          {:>10.4}", energy.thermo.gibbs);
    println!("DG at {} C (kcal/mol): {:>10.4}", args.temperature, energy.gibbs_at_temperature);
    println!("Corrected DG (kcal/mol):{:>10.4}", energy.corrected);
    println!("Tm (C):                 {:>10.4}", energy.melting_temperature);
    Ok(())
}

fn run_fold(args: ConditionArgs) -> Result<()> {
    let seq = canonicalize(&args.sequence)?;
    let conditions = Conditions::new(args.temperature, args.salt);
    let (dg, pairs) = StemFolder::default().mfe_structure(&seq, args.temperature);
    println!("{seq}");
    println!("{} {:>8.3} (salt corrected {:.3})",
        DotBracketVec::from(&pairs), dg, conditions.corrected_fold(dg));
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Design(args) => run_design(args),
        Commands::Thermo(args) => run_thermo(args),
        Commands::Fold(args) => run_fold(args),
    }
}

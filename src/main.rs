use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::info;

mod config;
mod equations;
mod search;
mod tensor;

use config::Config;
use equations::TensorRatios;
use search::Targets;
use tensor::{EigenOrder, Intensities, TensorComponents};

#[derive(Parser, Debug)]
#[command(name = "tensorient")]
#[command(author, version, about = "Raman tensor orientation finder")]
struct Args {
    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search orientation angles that reproduce two measured intensity ratios
    Search {
        /// First eigenvalue ratio of the mode's tensor
        #[arg(long, allow_negative_numbers = true)]
        r1: f64,

        /// Second eigenvalue ratio of the mode's tensor
        #[arg(long, allow_negative_numbers = true)]
        r2: f64,

        /// Measured I_cc/I_aa
        #[arg(long, allow_negative_numbers = true)]
        target1: f64,

        /// Measured I_ac/I_aa
        #[arg(long, allow_negative_numbers = true)]
        target2: f64,

        /// Maximum absolute residual for a grid point to match
        #[arg(long)]
        tolerance: Option<f64>,
    },

    /// Compute eigenvalue and intensity ratios for one vibrational mode
    Ratios {
        #[arg(long, allow_negative_numbers = true)]
        axx: f64,

        #[arg(long, allow_negative_numbers = true)]
        axy: f64,

        #[arg(long, allow_negative_numbers = true)]
        ayy: f64,

        #[arg(long, allow_negative_numbers = true)]
        axz: f64,

        #[arg(long, allow_negative_numbers = true)]
        ayz: f64,

        #[arg(long, allow_negative_numbers = true)]
        azz: f64,

        /// Measured intensity in the aa geometry
        #[arg(long)]
        i_aa: Option<f64>,

        /// Measured intensity in the ac geometry
        #[arg(long)]
        i_ac: Option<f64>,

        /// Measured intensity in the cc geometry
        #[arg(long)]
        i_cc: Option<f64>,

        /// Eigenvalue ordering before forming r_1 and r_2
        #[arg(long, value_enum)]
        order: Option<EigenOrder>,
    },
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tensorient=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_from_default_path().unwrap_or_default(),
    };

    match args.command {
        Command::Search {
            r1,
            r2,
            target1,
            target2,
            tolerance,
        } => run_search(
            TensorRatios::new(r1, r2),
            Targets {
                cc_aa: target1,
                ac_aa: target2,
            },
            tolerance.unwrap_or(config.search.tolerance),
        ),
        Command::Ratios {
            axx,
            axy,
            ayy,
            axz,
            ayz,
            azz,
            i_aa,
            i_ac,
            i_cc,
            order,
        } => run_ratios(
            TensorComponents {
                axx,
                axy,
                ayy,
                axz,
                ayz,
                azz,
            },
            (i_aa, i_ac, i_cc),
            order.unwrap_or(config.tensor.eigen_order),
        ),
    }
}

fn run_search(ratios: TensorRatios, targets: Targets, tolerance: f64) -> Result<ExitCode> {
    info!(
        "Searching with r1={}, r2={}, targets=({}, {}), tolerance={}",
        ratios.r1, ratios.r2, targets.cc_aa, targets.ac_aa, tolerance
    );

    match search::find_orientation(ratios, targets, tolerance)? {
        Some(solution) => {
            println!("Found solution:");
            println!("theta = {:.2}°", solution.theta_deg);
            println!("chi = {:.2}°", solution.chi_deg);
            println!("Model ratios at solution:");
            println!("I_cc/I_aa = {:.4}", solution.ratios.cc_aa);
            println!("I_ac/I_aa = {:.4}", solution.ratios.ac_aa);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            println!("No solution within tolerance {}.", tolerance);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_ratios(
    components: TensorComponents,
    intensities: (Option<f64>, Option<f64>, Option<f64>),
    order: EigenOrder,
) -> Result<ExitCode> {
    let values = components.eigenvalues(order)?;
    let ratios = tensor::eigenvalue_ratios(values)?;

    println!("Eigenvalues:");
    println!("a_xx = {:.6}", values[0]);
    println!("a_yy = {:.6}", values[1]);
    println!("a_zz = {:.6}", values[2]);
    println!("r_1 = {:.4}", ratios.r1);
    println!("r_2 = {:.4}", ratios.r2);

    match intensities {
        (Some(aa), Some(ac), Some(cc)) => {
            let targets = Intensities { aa, ac, cc }.targets()?;
            println!("I_1 = I_cc/I_aa = {:.4}", targets.cc_aa);
            println!("I_2 = I_ac/I_aa = {:.4}", targets.ac_aa);
        }
        (None, None, None) => {}
        _ => bail!("intensity ratios require all of --i-aa, --i-ac and --i-cc"),
    }

    Ok(ExitCode::SUCCESS)
}

/*! MSL2ELL: Orthometric heights in, ellipsoidal heights out !*/
use clap::Parser;
use geoheight::prelude::*;
use log::{debug, trace, warn};
use std::io::BufRead;
use std::path::PathBuf;

/// MSL2ELL: Convert `latitude longitude height` records, with heights above
/// mean sea level, to WGS84 ellipsoidal heights.
///
/// Reads whitespace separated records from the files given, or from stdin
/// if none are. Everything after a '#' is a comment.
#[derive(Parser, Debug)]
#[clap(name = "msl2ell")]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// The system of the input coordinates
    #[clap(short, long, default_value = "EPSG:9705")]
    source: String,

    /// Use this geoid grid instead of the defaults of the source system
    #[clap(short, long)]
    geoid: Option<String>,

    /// Additional directory to look for grids in (may be repeated)
    #[clap(long = "grid-dir")]
    grid_dirs: Vec<PathBuf>,

    /// Specify a fixed height for all coordinates
    #[clap(short = 'z', long)]
    height: Option<f64>,

    /// Number of decimals in the output
    #[clap(short = 'd', long)]
    decimals: Option<usize>,

    /// Output earth centered cartesian coordinates
    #[clap(long)]
    cartesian: bool,

    /// Echo input to output
    #[clap(short, long)]
    echo: bool,

    #[clap(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// The files to operate on
    args: Vec<String>,
}

fn main() -> Result<(), anyhow::Error> {
    let options = Cli::parse();
    env_logger::Builder::new()
        .filter_level(options.verbose.log_level_filter())
        .init();
    trace!("This is MSL2ELL");
    debug!("{:#?}", options);

    let mut paths = options.grid_dirs.clone();
    paths.extend(Plain::default_paths());
    let mut globals = Vec::new();
    if let Some(geoid) = &options.geoid {
        globals.push(("geoid", geoid.as_str()));
    }
    let ctx = Plain::acquire_with(&paths, &globals)?;
    let txn = VerticalTransformation::resolve_crs(&ctx, &options.source, "EPSG:4979")?;
    debug!("Using grid(s) {:?}", txn.grid_names());

    // Input from stdin, or from the files given
    let mut sources = Vec::new();
    if options.args.is_empty() {
        sources.push("-".to_string());
    }
    sources.extend(options.args.iter().cloned());

    for source in sources {
        let reader: Box<dyn BufRead> = if source == "-" {
            Box::new(std::io::BufReader::new(std::io::stdin().lock()))
        } else {
            Box::new(std::io::BufReader::new(std::fs::File::open(&source)?))
        };
        convert(&txn, &options, reader)?;
    }

    drop(txn);
    ctx.release();
    Ok(())
}

fn convert(
    txn: &VerticalTransformation<Plain>,
    options: &Cli,
    reader: impl BufRead,
) -> Result<(), anyhow::Error> {
    for line in reader.lines() {
        let line = line?;
        let record = line.split('#').next().unwrap_or_default().trim();
        if record.is_empty() {
            continue;
        }
        if options.echo {
            println!("# {record}");
        }

        let result = parse(record, options.height).and_then(|pos| txn.apply(pos));
        match result {
            Ok(pos) if options.cartesian => {
                let d = options.decimals.unwrap_or(4);
                let xyz = pos.cartesian();
                println!("{:.d$} {:.d$} {:.d$}", xyz[0], xyz[1], xyz[2]);
            }
            Ok(pos) => {
                let a = options.decimals.unwrap_or(9);
                let h = options.decimals.unwrap_or(4);
                println!(
                    "{:.a$} {:.a$} {:.h$}",
                    pos.latitude, pos.longitude, pos.height
                );
            }
            Err(e) => {
                warn!("{record}: {e}");
                println!("NaN NaN NaN");
            }
        }
    }
    Ok(())
}

// `lat lon [height]`, where a fixed height overrides the one given
fn parse(record: &str, height: Option<f64>) -> Result<OrthometricPosition, Error> {
    let mut args = Vec::new();
    for item in record.split_whitespace() {
        let value = item
            .parse::<f64>()
            .map_err(|_| Error::BadParam("coordinate".to_string(), item.to_string()))?;
        args.push(value);
    }
    if args.len() < 2 || args.len() > 3 {
        return Err(Error::BadParam(
            "record".to_string(),
            format!("expected 'lat lon [height]', got '{record}'"),
        ));
    }
    let h = height.unwrap_or(args.get(2).copied().unwrap_or(0.));
    Ok(OrthometricPosition::new(args[0], args[1], h))
}

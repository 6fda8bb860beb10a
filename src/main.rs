use anyhow::{bail, Context, Result};
use swesarr::core::radiometer::flight_line_utm;
use swesarr::core::snowpit::aggregate_pits;
use swesarr::io::tables::{read_pit_layers_file, read_radiometer_file, write_radiometer_matches};
use swesarr::{filter_radiometer_points, Footprints, OutputConfig};

const USAGE: &str = "usage: swesarr match-pits <radiometer.csv> <pit_layers.csv> <output_dir> [epsg]";

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None => {
            println!("swesarr helpers: nothing to run");
            println!("{}", USAGE);
            Ok(())
        }
        Some("match-pits") => match_pits(&args[1..]),
        Some(other) => bail!("unknown command '{}'\n{}", other, USAGE),
    }
}

fn match_pits(args: &[String]) -> Result<()> {
    if args.len() < 3 {
        bail!("{}", USAGE);
    }
    let radiometer = read_radiometer_file(&args[0])
        .with_context(|| format!("reading radiometer table {}", args[0]))?;

    // pits default to the UTM zone under the flight line
    let epsg = match args.get(3) {
        Some(s) => s.parse::<u32>().with_context(|| format!("invalid EPSG code '{}'", s))?,
        None => flight_line_utm(&radiometer)
            .context("no located radiometer sample to pick a UTM zone from")?
            .epsg(),
    };
    log::info!("Snow pit coordinates in EPSG:{}", epsg);
    let layers = read_pit_layers_file(&args[1], epsg)
        .with_context(|| format!("reading snow pit layers {}", args[1]))?;

    let pits = aggregate_pits(&layers);
    let matches = filter_radiometer_points(&Footprints::default(), &radiometer, &pits)?;

    let output = OutputConfig::new(&args[2]);
    output.prepare()?;
    let path = output.path_for("radiometer_pits.csv");
    let file = std::fs::File::create(&path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_radiometer_matches(file, &matches)?;

    log::info!("Wrote {} matched pits to {}", matches.len(), path.display());
    Ok(())
}

use std::path::PathBuf;

use spaxel_mstar::{
    CubeConfig, FixedDimension, LocalCube, MstarExtractor, PlateIfu, ReferenceDimension,
};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "spaxel-mstar",
    about = "Write resolved Mstar from Firefly stellar population catalog for a single galaxy"
)]
struct Opt {
    /// Galaxy plate-ifu, e.g. 8485-1901
    plateifu: PlateIfu,
    /// Directory with the Firefly catalog, where the CSV file is written [default: ../data]
    #[structopt(long, parse(from_os_str))]
    data_dir: Option<PathBuf>,
    /// Firefly catalog file name
    #[structopt(long)]
    catalog: Option<String>,
    /// Local DRP reduction directory
    #[structopt(long, env = "MANGA_SPECTRO_REDUX", parse(from_os_str))]
    redux_dir: Option<PathBuf>,
    /// DRP version of the data cubes
    #[structopt(long, env = "MANGA_DRPVER", default_value = "v2_3_1")]
    drpver: String,
    /// Size of the output map, skips the data cube lookup
    #[structopt(long)]
    dimension: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();
    log::debug!("{:?}", opt);

    let mut extractor = MstarExtractor::default();
    if let Some(arg) = opt.data_dir {
        extractor = extractor.data_path(arg);
    }
    if let Some(arg) = opt.catalog {
        extractor = extractor.catalog_file(arg);
    }

    let cube: Box<dyn ReferenceDimension> = match opt.dimension {
        Some(n) => Box::new(FixedDimension(n)),
        None => {
            let mut config = CubeConfig::default().drpver(opt.drpver);
            if let Some(arg) = opt.redux_dir {
                config = config.redux_dir(arg);
            }
            Box::new(LocalCube::new(config))
        }
    };

    let path = extractor.extract(&opt.plateifu, cube.as_ref())?;
    println!("\nWrote: {}", path.display());

    Ok(())
}

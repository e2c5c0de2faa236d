use clap::Parser;
use std::path::PathBuf;

use crate::entities::Region;

// Build version with backend info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "Images: image 0.25 (PNG, JPEG)\n",
    "UI:     eframe 0.33\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Apparel mockup designer
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Image to place on startup (PNG, JPEG) - optional, can also drag-and-drop
    #[arg(value_name = "IMAGE")]
    pub image: Option<PathBuf>,

    /// Region the startup image is placed on (front, back, sleeve_left, sleeve_right)
    #[arg(short = 'r', long = "region", value_name = "REGION", default_value = "front")]
    pub region: Region,

    /// Print the derived material descriptors as JSON and exit
    #[arg(long = "dump-materials")]
    pub dump_materials: bool,

    /// Enable debug logging to file (default: drape.log)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["drape"]).unwrap();
        assert!(args.image.is_none());
        assert_eq!(args.region, Region::Front);
        assert!(!args.dump_materials);
        assert!(args.log_file.is_none());
        assert_eq!(args.verbosity, 0);
    }

    #[test]
    fn test_region_and_flags() {
        let args = Args::try_parse_from(["drape", "logo.png", "--region", "sleeve_left", "-vv", "--log", "--dump-materials"])
            .unwrap();
        assert_eq!(args.image, Some(PathBuf::from("logo.png")));
        assert_eq!(args.region, Region::LeftSleeve);
        assert_eq!(args.verbosity, 2);
        assert_eq!(args.log_file, Some(None));
        assert!(args.dump_materials);
    }

    #[test]
    fn test_unknown_region_rejected() {
        assert!(Args::try_parse_from(["drape", "--region", "front_panel"]).is_err());
    }
}

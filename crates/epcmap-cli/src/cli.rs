use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// epcmap - EPC building colouring engine
#[derive(Parser, Debug)]
#[command(name = "epcmap")]
#[command(about = "Compile EPC paint expressions for building maps", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile paint expressions for a building dataset
    Paint(PaintArgs),

    /// Mean rating and pattern for a set of EPC ratings
    Rating(RatingArgs),

    /// Show resolved configuration and where each value came from
    Config,
}

#[derive(Parser, Debug)]
pub struct PaintArgs {
    /// Building records (JSON array)
    #[arg(long, value_name = "FILE")]
    pub buildings: PathBuf,

    /// Building footprints (GeoJSON FeatureCollection with TOID properties)
    #[arg(long, value_name = "FILE")]
    pub footprints: PathBuf,

    /// Search area (GeoJSON Polygon, Feature or FeatureCollection)
    #[arg(long, value_name = "FILE")]
    pub polygon: Option<PathBuf>,

    /// Attribute filter as key=value; repeat to accept more values
    #[arg(long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    /// Use the colour-blind palette
    #[arg(long)]
    pub colour_blind: bool,

    /// Map style URI
    #[arg(long)]
    pub style: Option<String>,

    /// Camera center as lng,lat (defaults to fitting the footprints)
    #[arg(long, value_name = "LNG,LAT")]
    pub center: Option<String>,

    /// Camera zoom
    #[arg(long)]
    pub zoom: Option<f64>,
}

#[derive(Parser, Debug)]
pub struct RatingArgs {
    /// EPC ratings (A-G); "none" entries are skipped
    #[arg(required = true)]
    pub ratings: Vec<String>,

    /// Use the colour-blind palette
    #[arg(long)]
    pub colour_blind: bool,
}

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[clap(about = "Headless wave lifecycle simulator")]
pub struct Opt {
    /// Directory holding one sub-directory per map
    #[clap(long, default_value = "assets/waves")]
    pub assets: PathBuf,
    #[clap(short, long, default_value = "desert")]
    pub map: String,
    /// Maximum number of simulated frames
    #[clap(short, long, default_value_t = 7200)]
    pub frames: u32,
    #[clap(long, default_value_t = 60)]
    pub fps: u32,
    #[clap(short, long)]
    pub batch_size: Option<usize>,
    #[clap(short, long)]
    pub capacity: Option<usize>,
    /// Seconds a spawned unit survives before the demo attrition kills it
    #[clap(long, default_value_t = 4.0)]
    pub unit_lifetime: f32,
    #[clap(long)]
    pub log_suffix: Option<String>,
}

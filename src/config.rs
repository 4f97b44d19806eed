use std::sync::OnceLock;

pub static CONFIG: OnceLock<Config> = OnceLock::new();

#[derive(Debug)]
#[derive(clap::Parser)]
pub struct Config {
    #[clap(long, default_value = "0")]
    pub seed: u64,

    /// Frames an identity may stay unmatched before it is dropped.
    #[clap(long, default_value = "30")]
    pub max_disappeared: u32,

    /// Observations kept per identity, oldest evicted first.
    #[clap(long, default_value = "150")]
    pub window_capacity: usize,

    /// Suffix length used for the live attribute estimate.
    #[clap(long, default_value = "5")]
    pub recent_window: usize,

    /// Dwell seconds at or above which a visit counts as "stay".
    #[clap(long, default_value = "2.0")]
    pub dwell_threshold: f64,

    /// Classify one out of every k visible identities per frame.
    #[clap(long, default_value = "5")]
    pub classify_stride: u64,

    /// Exported rows between forced flushes of the CSV writer.
    #[clap(long, default_value = "10")]
    pub flush_interval: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            seed: 0,
            max_disappeared: 30,
            window_capacity: 150,
            recent_window: 5,
            dwell_threshold: 2.0,
            classify_stride: 5,
            flush_interval: 10,
        }
    }
}

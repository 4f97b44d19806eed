use anyhow::Result;
use clap::Parser;
use std::path::Path;

use indicatif::ProgressStyle;
use tracing::{info, info_span, Span};
use tracing_indicatif::span_ext::IndicatifSpanExt;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use facemetrics_rust::classifier::SyntheticClassifier;
use facemetrics_rust::config::*;
use facemetrics_rust::dataset;
use facemetrics_rust::detector::ReplayDetector;
use facemetrics_rust::export::CsvExporter;
use facemetrics_rust::image::Image;
use facemetrics_rust::pipeline::Pipeline;

#[derive(Parser)]
pub struct Args {
    /// JSONL replay file with one frame of detections per line.
    #[clap(short, default_value = "./data/frames.jsonl")]
    pub input: String,

    /// Directory the visit CSV is written into.
    #[clap(long, default_value = "./logs")]
    pub out_dir: String,

    #[clap(long, default_value = "640")]
    pub frame_width: usize,

    #[clap(long, default_value = "480")]
    pub frame_height: usize,

    /// Share of synthetic classifier calls that fail.
    #[clap(long, default_value = "0.05")]
    pub classifier_failure_rate: f64,

    #[clap(flatten)]
    pub config: Config,
}

fn main() -> Result<()> {
    // parse the config
    let args = Args::parse();
    let _ = CONFIG.set(args.config);
    let config = CONFIG.get().unwrap();

    // setup logging
    let indicatif_layer = IndicatifLayer::new();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(indicatif_layer.get_stdout_writer()))
        .with(indicatif_layer)
        .init();

    let frames = dataset::load(Path::new(&args.input))?;

    let header_span = info_span!("header");
    header_span.pb_set_style(&ProgressStyle::default_bar());
    header_span.pb_set_length(frames.len() as u64);
    let header_span_enter = header_span.enter();

    // create the pipeline with explicitly injected collaborators
    let detector = ReplayDetector::new(frames.iter().map(|f| f.rects.clone()).collect());
    let classifier = SyntheticClassifier::new(config.seed, args.classifier_failure_rate);
    let (exporter, csv_path) = CsvExporter::open(Path::new(&args.out_dir), config.flush_interval)?;
    let mut pipeline = Pipeline::new(detector, classifier, exporter, config);

    // Replay consumes detections from the records; the blank frame only
    // provides geometry for the classifier crops.
    let frame = Image::zeros(args.frame_width, args.frame_height);
    let mut exported = 0;
    for record in &frames {
        let report = pipeline.process_frame(&frame, record.time)?;
        exported += report.exported;
        Span::current().pb_inc(1);
    }

    std::mem::drop(header_span_enter);
    std::mem::drop(header_span);

    info!(
        "replayed {} frames, exported {} visits to {}",
        frames.len(),
        exported,
        csv_path.display()
    );

    Ok(())
}

use clap::Parser;
use voice_prosody::cli::{Cli, Command, OutputFormat};
use voice_prosody::{VoiceAnalysisEngine, VoiceResult};

fn main() {
    voice_prosody::logging::init();

    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run() -> VoiceResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Analyze(args) => {
            let analysis = voice_prosody::analyze_prosody(&args.file, &args.to_options())?;
            println!("{}", serde_json::to_string_pretty(&analysis)?);
            Ok(())
        }
        Command::Ingest(args) => {
            let engine = VoiceAnalysisEngine::open(&args.db)?;
            let pair = engine.analyze_and_save(
                &args.audio_id,
                &args.file,
                args.story_id.as_deref(),
                &args.to_options(),
            )?;
            println!("{}", serde_json::to_string_pretty(&pair)?);
            Ok(())
        }
        Command::Batch(args) => {
            let items = args.load_manifest()?;
            let engine = VoiceAnalysisEngine::open(&args.db)?;
            let outcomes = engine.batch_analyze(&items, &args.to_options());

            match args.format {
                OutputFormat::Plain => {
                    for outcome in &outcomes {
                        match &outcome.error {
                            Some(error) => {
                                println!("{} | failed | {error}", outcome.audio_id);
                            }
                            None => println!("{} | ok", outcome.audio_id),
                        }
                    }
                }
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&outcomes)?);
                }
                OutputFormat::Ndjson => {
                    for outcome in &outcomes {
                        println!("{}", serde_json::to_string(outcome)?);
                    }
                }
            }
            Ok(())
        }
        Command::Compare(args) => {
            let engine = VoiceAnalysisEngine::open(&args.db)?;
            let comparison = engine.compare_prosody(&args.audio_id_1, &args.audio_id_2)?;
            println!("{}", serde_json::to_string_pretty(&comparison)?);
            Ok(())
        }
        Command::Markers(args) => {
            let engine = VoiceAnalysisEngine::open(&args.db)?;
            let report = engine.detect_cultural_markers(&args.audio_id)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::Recent(args) => {
            let engine = VoiceAnalysisEngine::open(&args.db)?;
            let summaries = engine.recent(args.limit)?;

            match args.format {
                OutputFormat::Plain => {
                    for summary in &summaries {
                        println!(
                            "{} | {} | {:.1} Hz | {:.1} s | {}",
                            summary.created_at,
                            summary.audio_id,
                            summary.mean_pitch_hz,
                            summary.total_duration_s,
                            summary.id
                        );
                    }
                }
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&summaries)?);
                }
                OutputFormat::Ndjson => {
                    for summary in &summaries {
                        println!("{}", serde_json::to_string(summary)?);
                    }
                }
            }
            Ok(())
        }
    }
}

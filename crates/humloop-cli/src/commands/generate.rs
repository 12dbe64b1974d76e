use crate::app::AppContext;
use crate::{GenerateArgs, ModeArg};
use anyhow::{Result, bail};
use humloop_application::GenerationWizard;
use humloop_core::wizard::{GenerationMode, GenerationOptions, ProcessingProgress, Resolution, WizardStep};
use humloop_infrastructure::audio_file::load_audio_file;
use std::sync::Arc;
use std::time::{Duration, Instant};

impl From<ModeArg> for GenerationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Humming => GenerationMode::Humming,
            ModeArg::Genre => GenerationMode::GenreConversion,
        }
    }
}

fn options_from(args: &GenerateArgs) -> GenerationOptions {
    GenerationOptions {
        genre: args.genre.clone(),
        mood: args.mood.clone(),
        instrument: args.instrument.clone(),
        custom_prompt: args.prompt.clone(),
    }
}

pub async fn run(ctx: &AppContext, args: GenerateArgs) -> Result<()> {
    // Publishing needs a session; fail before spending a generation on it.
    if args.publish && !ctx.sessions.current().await.is_authenticated() {
        bail!("Log in before using --publish.");
    }

    let mode = GenerationMode::from(args.mode);
    let limits = ctx.config.upload_limits();
    let asset = load_audio_file(&args.file, &limits).await?;

    let wizard = GenerationWizard::new(mode, limits, Arc::new(ctx.generation.clone()));
    wizard.submit_upload(asset).await?;
    let options = options_from(&args);
    wizard.submit_details(options.clone()).await?;

    let started = Instant::now();
    let mut ticker = tokio::time::interval(Duration::from_millis(250));
    let wait = wizard.wait();
    tokio::pin!(wait);

    let resolution = loop {
        tokio::select! {
            resolution = &mut wait => break resolution,
            _ = tokio::signal::ctrl_c() => {
                wizard.abandon().await;
                eprintln!();
                bail!("Generation cancelled.");
            }
            _ = ticker.tick() => {
                let progress = ProcessingProgress::at(mode, started.elapsed());
                eprint!("\r{:>3}%  {:<40}", progress.percent, progress.label);
            }
        }
    };
    eprintln!();

    let state = wizard.snapshot().await;
    match (resolution, state.step()) {
        (Some(Resolution::Applied(WizardStep::Complete)), _) => {}
        (_, WizardStep::Failed) => bail!("{}", state.error().unwrap_or("Generation failed.")),
        _ => bail!("Generation did not complete."),
    }

    let Some(result) = state.result() else {
        bail!("Generation did not complete.");
    };
    println!("{} ({})", result.title, result.formatted_duration());
    println!("{}", result.media_url);

    if args.publish {
        let title = args.title.as_deref().unwrap_or(result.title.as_str());
        let post_id = ctx
            .publisher
            .publish(title, &args.description, result, None, &options)
            .await?;
        println!("Published as post {post_id}.");
    }
    Ok(())
}

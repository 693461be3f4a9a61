use anyhow::Result;
use clap::Parser;
use form_core::{FormEvent, SubmissionOutcome, SubmitAttempt, UploadFormController};
use shared::{
    error::{UploadError, UploadErrorKind},
    protocol::AuthorField,
};
use tracing::info;

mod config;

#[derive(Parser, Debug)]
#[command(about = "Submit one dataset to the configured server")]
struct Args {
    /// Overrides the configured server base URL.
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    title: String,
    #[arg(long)]
    desc: String,
    /// Repeatable; "Name", "Name,Affiliation" or "Name,Affiliation,ORCID".
    #[arg(long = "author")]
    authors: Vec<String>,
    /// Anti-forgery token to inject into the submission.
    #[arg(long)]
    csrf_token: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();
    let settings = config::load_settings();
    let server_url = args.server_url.unwrap_or(settings.server_url);

    let form = UploadFormController::new(server_url);
    form.set_title(args.title).await;
    form.set_description(args.desc).await;
    form.set_csrf_token(args.csrf_token).await;

    for author in &args.authors {
        let id = form.add_author().await;
        for (field, value) in AuthorField::ALL.into_iter().zip(author.splitn(3, ',')) {
            form.set_author_field(id, field, value.trim()).await;
        }
    }

    let mut events = form.subscribe_events();
    let narration = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                FormEvent::LoadingChanged { visible: true } => info!("submitting dataset"),
                FormEvent::NavigationRequested { target } => {
                    info!(redirect = %target, "upload accepted")
                }
                _ => {}
            }
        }
    });

    let attempt = form.submit().await;
    narration.abort();

    match attempt {
        SubmitAttempt::Completed(SubmissionOutcome::Success { redirect }) => {
            println!("Dataset sent successfully; continue at {redirect}");
            Ok(())
        }
        SubmitAttempt::Completed(outcome) => {
            for line in form.error_lines().await {
                eprintln!("{line}");
            }
            match outcome.failure() {
                Some(err) => Err(err.into()),
                None => Ok(()),
            }
        }
        SubmitAttempt::Invalid(report) => {
            for line in form.error_lines().await {
                eprintln!("{line}");
            }
            Err(UploadError::new(UploadErrorKind::Validation, report.messages().join("; ")).into())
        }
        SubmitAttempt::InFlight => {
            anyhow::bail!("another submission is already in flight")
        }
    }
}

//! kupid - terminal front-end for the Kupid gateway
//!
//! `kupid onboard` walks the onboarding wizard, `kupid browse` swipes through
//! matches, `kupid whereto` prints the post-sign-in redirect, and
//! `kupid status` reports whether onboarding is complete.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

use kupid_client::browser::{BrowserSession, Decision, DetailsView, InviteStatus, Phase};
use kupid_client::onboarding::{Advance, Field, Wizard, WizardState, REDIRECT_DELAY, TOTAL_STEPS};
use kupid_client::redirect::{self, RedirectTarget};
use kupid_client::{ClientConfig, HttpApi, KupidApi};
use kupid_common::matches::{or_not_specified, percent};

#[derive(Parser, Debug)]
#[command(name = "kupid")]
#[command(about = "Terminal client for Kupid onboarding and matches")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    config: ClientConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create your profile and match preferences
    Onboard,
    /// Swipe through your matches
    Browse,
    /// Print where a signed-in user should land
    Whereto {
        /// URL fragment from an implicit-flow sign-in (e.g. "#access_token=...")
        #[arg(long)]
        fragment: Option<String>,
    },
    /// Report whether onboarding is complete
    Status,
}

/// Line-oriented stdin reader
struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Print `label` and read one trimmed line; `None` on end of input
    async fn ask(&mut self, label: &str) -> Result<Option<String>> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(format!("{}: ", label).as_bytes()).await?;
        stdout.flush().await?;
        let line = self.lines.next_line().await.context("Failed to read input")?;
        Ok(line.map(|l| l.trim().to_string()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let api = HttpApi::new(&cli.config)?;

    match cli.command {
        Command::Onboard => onboard(&cli.config, &api).await,
        Command::Browse => browse(&cli.config, api).await,
        Command::Whereto { fragment } => whereto(&cli.config, &api, fragment.as_deref()).await,
        Command::Status => {
            let complete = api.check_onboarding().await?;
            println!("onboardingComplete: {}", complete);
            Ok(())
        }
    }
}

async fn onboard(config: &ClientConfig, api: &HttpApi) -> Result<()> {
    let uid = config.require_user_id()?;
    let mut wizard = Wizard::new(uid, config.email.as_deref());
    let mut prompt = Prompt::new();

    println!("Checking for an existing profile...");
    if wizard.check_existing(api).await == &WizardState::AlreadyOnboarded {
        println!("You're already onboarded. Next: {}", RedirectTarget::Matches);
        return Ok(());
    }

    println!("Enter '<' to go back. Leave a field blank to keep its current value.");
    loop {
        match wizard.state().clone() {
            WizardState::Editing(_) | WizardState::Failed(_) => {
                let Some(step) = wizard.current_step() else { break };
                println!();
                println!(
                    "Step {} of {} ({}%) - {}",
                    step.number(),
                    TOTAL_STEPS,
                    wizard.progress_percent(),
                    step.title()
                );

                let mut went_back = false;
                for field in step.fields() {
                    match read_field(&mut prompt, &mut wizard, *field).await? {
                        FieldInput::Done => {}
                        FieldInput::Back => {
                            went_back = true;
                            break;
                        }
                        FieldInput::Eof => bail!("Input closed before onboarding finished"),
                    }
                }
                if went_back {
                    wizard.back();
                    continue;
                }

                match wizard.next() {
                    Advance::Rejected(message) => println!("  ! {}", message),
                    Advance::Moved(_) | Advance::ReadyToSubmit | Advance::Ignored => {}
                }
            }
            WizardState::Submitting => {
                println!("Saving your profile...");
                if let WizardState::Failed(message) = wizard.submit(api).await {
                    println!("  ! {}", message);
                    println!("Press enter on the last step to try again.");
                }
            }
            WizardState::Complete => {
                println!("You're all set!");
                tokio::time::sleep(REDIRECT_DELAY).await;
                if let Some(target) = wizard.redirect() {
                    println!("Next: {}", target);
                }
                break;
            }
            WizardState::Checking | WizardState::AlreadyOnboarded => break,
        }
    }
    Ok(())
}

enum FieldInput {
    Done,
    Back,
    Eof,
}

async fn read_field(prompt: &mut Prompt, wizard: &mut Wizard, field: Field) -> Result<FieldInput> {
    let current = wizard.data().get(field);
    if let Some(options) = field.options() {
        for (i, option) in options.iter().enumerate() {
            println!("  {}) {}", i + 1, option);
        }
    }
    let label = if current.is_empty() {
        field.label().to_string()
    } else {
        format!("{} [{}]", field.label(), current)
    };

    let Some(input) = prompt.ask(&label).await? else {
        return Ok(FieldInput::Eof);
    };
    if input == "<" {
        return Ok(FieldInput::Back);
    }
    if input.is_empty() {
        return Ok(FieldInput::Done);
    }

    match (field, field.options()) {
        (Field::Interests, Some(options)) => {
            for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                wizard.toggle_interest(&resolve_option(token, options));
            }
        }
        (_, Some(options)) => wizard.set(field, resolve_option(&input, options)),
        (_, None) => wizard.set(field, input),
    }
    Ok(FieldInput::Done)
}

/// Accept an option by its 1-based number or by (case-insensitive) value
fn resolve_option(input: &str, options: &[&str]) -> String {
    if let Ok(n) = input.parse::<usize>() {
        if let Some(option) = n.checked_sub(1).and_then(|i| options.get(i)) {
            return option.to_string();
        }
    }
    options
        .iter()
        .find(|o| o.eq_ignore_ascii_case(input))
        .map(|o| o.to_string())
        .unwrap_or_else(|| input.to_string())
}

async fn browse(config: &ClientConfig, api: HttpApi) -> Result<()> {
    let uid = config.require_user_id()?;
    let mut session = BrowserSession::new(Arc::new(api), uid);
    let mut prompt = Prompt::new();

    println!("Finding your matches...");
    let mut phase = session.load().await;
    loop {
        session.collect_invites();
        match phase {
            Phase::Browsing => {
                render_candidate(&session);
                let Some(input) = prompt.ask("[y]es / [n]o / [q]uit").await? else { break };
                phase = match input.to_ascii_lowercase().as_str() {
                    "y" | "yes" => session.decide(Decision::Yes).await,
                    "n" | "no" => session.decide(Decision::No).await,
                    "q" | "quit" => break,
                    _ => Phase::Browsing,
                };
            }
            Phase::Exhausted | Phase::Failed(_) => {
                match &phase {
                    Phase::Failed(message) => println!("  ! {}", message),
                    _ if session.state().matches().is_empty() => {
                        println!("We're still searching for your perfect matches. Check back soon!")
                    }
                    _ => println!("No more matches."),
                }
                let Some(input) = prompt.ask("[r]efresh / [q]uit").await? else { break };
                match input.to_ascii_lowercase().as_str() {
                    "r" | "refresh" => phase = session.reprompt().await,
                    "q" | "quit" => break,
                    _ => {}
                }
            }
            Phase::Loading => phase = session.load().await,
        }
    }

    session.settle_invites().await;
    render_invites(&session);
    Ok(())
}

fn render_candidate(session: &BrowserSession) {
    let state = session.state();
    let Some(candidate) = state.current() else { return };

    println!();
    println!(
        "Match {} of {} - {}% match",
        state.index() + 1,
        state.matches().len(),
        percent(candidate.final_score)
    );

    match state.details() {
        DetailsView::Loaded(details) => {
            println!("  {}", details.name_or_unknown());
            let age = details.age.map(|a| a.to_string());
            let year = details.class_year.map(|y| y.to_string());
            println!("  Age: {}", or_not_specified(age.as_deref()));
            println!("  Class year: {}", or_not_specified(year.as_deref()));
            println!("  Gender: {}", or_not_specified(details.gender.as_deref()));
            println!("  Interests: {}", or_not_specified(details.interests.as_deref()));
            println!("  Dream date: {}", or_not_specified(details.dream_date.as_deref()));
            if let Some(handle) = details.instagram() {
                println!("  Instagram: https://instagram.com/{}", handle);
            }
        }
        DetailsView::Loading => println!("  Loading profile..."),
        DetailsView::Idle | DetailsView::Unavailable => {
            println!("  {}", kupid_common::matches::UNKNOWN);
            println!("  Profile details not specified");
        }
    }

    for (label, value) in candidate.score_breakdown.entries() {
        println!("    {:<20} {:>3}%", label, value);
    }
}

fn render_invites(session: &BrowserSession) {
    let invites = session.state().invites();
    if invites.is_empty() {
        return;
    }
    println!();
    println!("Invites:");
    let mut entries: Vec<_> = invites.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    for (uid, status) in entries {
        match status {
            InviteStatus::Pending => println!("  {} - pending", uid),
            InviteStatus::Sent => println!("  {} - sent", uid),
            InviteStatus::Failed(message) => println!("  {} - failed: {}", uid, message),
        }
    }
}

async fn whereto(config: &ClientConfig, api: &HttpApi, fragment: Option<&str>) -> Result<()> {
    if let Some(fragment) = fragment {
        match redirect::from_fragment(fragment, config.has_session()) {
            Some(target) => println!("{}", target),
            None => println!("{}", RedirectTarget::Home),
        }
        return Ok(());
    }

    let uid = config.has_session().then(|| config.user_id.as_deref()).flatten();
    let target = redirect::resolve(api, uid).await;
    println!("{}", target);
    Ok(())
}

//! # reflectra
//!
//! Command-line front end for the Reflectra client. Each subcommand mounts
//! the matching screen, runs one action against the backend and prints the
//! projected view.

mod output;

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use reflectra_client::screens::wellness::CheckIn;
use reflectra_client::screens::{
    AccountScreen, AuthScreen, FeedScreen, FindScreen, MessagesScreen, WellnessScreen,
};
use reflectra_client::{ApiClient, ClientConfig, Session, SessionConfig, SocialBackend};
use reflectra_shared::protocol::ProfileUpdate;
use reflectra_shared::types::{MoodTag, PostId, SleepQuality, UserId};
use reflectra_shared::validation::{RegistrationForm, ResetConfirmForm};
use reflectra_shared::ReflectraError;
use reflectra_store::{CredentialStore, Database};
use serde_json::json;
use tracing::{debug, info};

use crate::output::Output;

#[derive(Parser)]
#[command(name = "reflectra", version, about = "Reflectra social and wellness client")]
struct Cli {
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with a username or email
    Login {
        identifier: String,
        #[arg(long, env = "REFLECTRA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    Register {
        username: String,
        email: String,
        #[arg(long, env = "REFLECTRA_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        confirm: String,
    },
    /// Email a password reset code
    ResetRequest { email: String },
    /// Set a new password with the emailed code
    ResetConfirm {
        email: String,
        code: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm: String,
    },
    /// Show the signed-in profile, own posts and followees
    Account,
    EditProfile {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        bio: String,
        #[arg(long)]
        mood: Option<MoodTag>,
    },
    DeletePost { id: u64 },
    /// Delete the account and everything in it
    DeleteAccount {
        #[arg(long)]
        yes: bool,
    },
    /// Posts by you and the people you follow
    Feed,
    Post { text: String },
    /// List users, optionally filtered
    Find { query: Option<String> },
    /// Follow a user, or unfollow if already followed
    Follow { id: u64 },
    /// Who follows a user
    Followers { id: u64 },
    Inbox,
    /// Show a conversation
    Chat { username: String },
    Send { username: String, text: String },
    /// Mood history summary and calendar
    Moods,
    CheckIn {
        #[arg(long)]
        mood: i64,
        #[arg(long)]
        stress: i64,
        #[arg(long)]
        sleep: SleepQuality,
        #[arg(long)]
        note: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    reflectra_client::init_tracing();
    let cli = Cli::parse();
    let out = Output::new(cli.json);

    let config = ClientConfig::from_env();
    debug!(?config, "Loaded configuration");

    let database = match &config.data_dir {
        Some(dir) => Database::open_in(dir),
        None => Database::new(),
    }
    .context("failed to open the session database")?;
    let store: Arc<dyn CredentialStore> = Arc::new(database);

    let session_config = SessionConfig::new(config.base_origin()).with_auth_failure_hook(|_| {
        eprintln!("Your session has expired. Run `reflectra login` to sign in again.");
    });
    let session = Arc::new(Session::new(session_config, store));
    info!(origin = %session.current_origin(), "Reflectra client ready");
    let api = ApiClient::new(session, config.timeout)?;

    run(cli.command, api, out).await
}

/// Turn a screen failure into the inline text the user would have seen.
fn fail(err: ReflectraError) -> anyhow::Error {
    anyhow!(err.user_message())
}

async fn run(command: Commands, api: ApiClient, out: Output) -> Result<()> {
    match command {
        Commands::Login {
            identifier,
            password,
        } => {
            let screen = AuthScreen::new(api);
            screen.login(&identifier, &password).await.map_err(fail)?;
            out.note(&screen.notice().unwrap_or_default());
        }
        Commands::Logout => {
            AuthScreen::new(api).logout().map_err(fail)?;
            out.note("Signed out.");
        }
        Commands::Register {
            username,
            email,
            password,
            confirm,
        } => {
            let screen = AuthScreen::new(api);
            let form = RegistrationForm {
                username,
                email,
                password,
                confirm_password: confirm,
            };
            screen.register(&form).await.map_err(fail)?;
            out.note(&screen.notice().unwrap_or_default());
        }
        Commands::ResetRequest { email } => {
            let screen = AuthScreen::new(api);
            screen.request_password_reset(&email).await.map_err(fail)?;
            out.note(&screen.notice().unwrap_or_default());
        }
        Commands::ResetConfirm {
            email,
            code,
            password,
            confirm,
        } => {
            let screen = AuthScreen::new(api);
            let form = ResetConfirmForm {
                email,
                code,
                new_password: password,
                confirm_password: confirm,
            };
            screen.confirm_password_reset(&form).await.map_err(fail)?;
            out.note(&screen.notice().unwrap_or_default());
        }
        Commands::Account => {
            let screen = AccountScreen::new(api);
            screen.mount().await;
            let profile = screen.profile().ok_or_else(|| notice_or(screen.notice()))?;
            let posts = screen.own_posts();
            let following = screen.following();
            out.emit(
                &json!({ "profile": profile, "posts": posts, "following": following }),
                |_| {
                    println!("{} <{}>", profile.username, profile.email);
                    if !profile.bio.is_empty() {
                        println!("  {}", profile.bio);
                    }
                    if let Some(mood) = profile.mood_preference {
                        println!("  mood: {mood}");
                    }
                    println!("\nPosts ({})", posts.len());
                    for post in &posts {
                        println!("  [{}] {}  {}", post.id, post.timestamp.format("%Y-%m-%d %H:%M"), post.content_text);
                    }
                    println!("\nFollowing ({})", following.len());
                    for user in &following {
                        println!("  {:>5}  {}", user.id, user.username);
                    }
                },
            )?;
        }
        Commands::EditProfile {
            name,
            email,
            bio,
            mood,
        } => {
            let screen = AccountScreen::new(api);
            let update = ProfileUpdate {
                name,
                email,
                bio,
                mood,
            };
            screen.save_profile(update).await.map_err(fail)?;
            out.note(&screen.notice().unwrap_or_default());
        }
        Commands::DeletePost { id } => {
            let screen = AccountScreen::new(api);
            screen.delete_post(PostId(id)).await.map_err(fail)?;
            out.note("Post deleted.");
        }
        Commands::DeleteAccount { yes } => {
            if !yes {
                return Err(anyhow!("Refusing to delete the account without --yes."));
            }
            let screen = AccountScreen::new(api);
            screen.delete_account().await.map_err(fail)?;
            out.note(&screen.notice().unwrap_or_default());
        }
        Commands::Feed => {
            let screen = FeedScreen::new(api);
            screen.mount().await;
            if let Some(notice) = screen.notice() {
                eprintln!("{notice}");
            }
            let posts = screen.visible_posts();
            out.emit(&posts, |posts| {
                if posts.is_empty() {
                    println!("No posts yet. Follow someone or write the first one.");
                }
                for post in posts {
                    println!(
                        "{}  @{}\n  {}\n",
                        post.timestamp.format("%Y-%m-%d %H:%M"),
                        post.username,
                        post.content_text
                    );
                }
            })?;
        }
        Commands::Post { text } => {
            let screen = FeedScreen::new(api);
            let post = screen.publish(&text).await.map_err(fail)?;
            out.emit(&post, |post| println!("Posted [{}].", post.id))?;
        }
        Commands::Find { query } => {
            let screen = FindScreen::new(api);
            screen.mount().await;
            if let Some(query) = query.filter(|q| !q.trim().is_empty()) {
                screen.search(&query).await.map_err(fail)?;
            }
            let results = screen.results();
            out.emit(&results, |results| {
                for entry in results {
                    let marker = if entry.is_following { "following" } else { "" };
                    println!("{:>5}  {:<20} {}", entry.user.id, entry.user.username, marker);
                }
            })?;
        }
        Commands::Follow { id } => {
            let screen = FindScreen::new(api);
            screen.mount().await;
            let change = screen.toggle_follow(UserId(id)).await.map_err(fail)?;
            out.emit(&json!({ "id": id, "following": change.is_following() }), |_| {
                if change.is_following() {
                    println!("Now following {id}.");
                } else {
                    println!("Unfollowed {id}.");
                }
            })?;
        }
        Commands::Followers { id } => {
            let followers = api.followers(UserId(id)).await.map_err(fail)?;
            out.emit(&followers, |followers| {
                if followers.is_empty() {
                    println!("Nobody follows {id} yet.");
                }
                for follower in followers {
                    println!("{:>5}  {}", follower.id, follower.username);
                }
            })?;
        }
        Commands::Inbox => {
            let screen = MessagesScreen::new(api);
            screen.mount().await;
            let rows = screen.inbox();
            let suggested = screen.suggested_contacts();
            let value = json!({
                "conversations": rows.iter().map(|r| json!({"partner": r.partner, "last": r.last})).collect::<Vec<_>>(),
                "suggested": suggested,
            });
            out.emit(&value, |_| {
                for row in &rows {
                    println!(
                        "{:<20} {}  {}",
                        row.partner,
                        row.last.timestamp.format("%Y-%m-%d %H:%M"),
                        row.last.content
                    );
                }
                if !suggested.is_empty() {
                    println!("No conversations yet. Start one with:");
                    for user in &suggested {
                        println!("  {}", user.username);
                    }
                }
            })?;
        }
        Commands::Chat { username } => {
            let screen = MessagesScreen::new(api);
            let history = screen.open_conversation(&username).await.map_err(fail)?;
            out.emit(&history, |history| {
                for message in history {
                    println!(
                        "{} {:>12}: {}",
                        message.timestamp.format("%H:%M"),
                        message.sender,
                        message.content
                    );
                }
            })?;
        }
        Commands::Send { username, text } => {
            let screen = MessagesScreen::new(api);
            screen.open_conversation(&username).await.map_err(fail)?;
            let sent = screen.send(&text).await.map_err(fail)?;
            out.emit(&sent, |sent| println!("Sent to {}.", sent.receiver))?;
        }
        Commands::Moods => {
            let screen = WellnessScreen::new(api);
            screen.mount().await;
            if !screen.is_loaded() {
                return Err(notice_or(screen.notice()));
            }
            let summary = screen.summary();
            let days = screen.calendar();
            let value = json!({
                "count": summary.as_ref().map_or(0, |s| s.count),
                "average_mood": summary.as_ref().map(|s| s.average_mood),
                "average_stress": summary.as_ref().map(|s| s.average_stress),
                "days": days.values().map(|d| json!({
                    "date": d.date,
                    "average_mood": d.average_mood,
                    "average_stress": d.average_stress,
                    "worst_sleep": d.worst_sleep,
                    "count": d.count,
                })).collect::<Vec<_>>(),
            });
            out.emit(&value, |_| match &summary {
                None => println!(
                    "No check-ins yet. Complete a check-in to start tracking your mood."
                ),
                Some(s) => {
                    println!(
                        "{} check-ins, mood {:.1}, stress {:.1}",
                        s.count, s.average_mood, s.average_stress
                    );
                    for day in days.values() {
                        println!(
                            "  {}  mood {:>4.1}  stress {:>4.1}  sleep {:<5}  ({})",
                            day.date,
                            day.average_mood,
                            day.average_stress,
                            day.worst_sleep.as_str(),
                            day.count
                        );
                    }
                }
            })?;
        }
        Commands::CheckIn {
            mood,
            stress,
            sleep,
            note,
        } => {
            let screen = WellnessScreen::new(api);
            let log = screen
                .check_in(CheckIn {
                    mood,
                    stress,
                    sleep,
                    notes: note,
                })
                .await
                .map_err(fail)?;
            out.emit(&log, |log| {
                println!("Checked in: mood {}, stress {}, sleep {}.", log.mood, log.stress, log.sleep.as_str())
            })?;
        }
    }
    Ok(())
}

fn notice_or(notice: Option<String>) -> anyhow::Error {
    anyhow!(notice.unwrap_or_else(|| "Nothing to show.".to_string()))
}

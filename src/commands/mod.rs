pub mod backfill;
pub mod error;
pub mod intro;
pub mod settings;

pub use error::CommandError;

use crate::{Context, Data, Error};
use tracing::{debug, error};

pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        settings::introset(),
        settings::logset(),
        settings::channels(),
        backfill::fetchall(),
        intro::delete(),
        intro::info(),
    ]
}

/// Prefix commands are not run from inside the introduction channel, where
/// every message counts as a post.
pub async fn command_check(ctx: Context<'_>) -> Result<bool, Error> {
    let poise::Context::Prefix(_) = ctx else {
        return Ok(true);
    };
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(true);
    };

    let intro_channel = ctx
        .data()
        .guild_config
        .get_intro_channel(guild_id.get())
        .await?;
    Ok(intro_channel != Some(ctx.channel_id().get()))
}

fn argument_hint(command: &str) -> &'static str {
    match command {
        "info" => "That's not a valid member!",
        "delete" => "Please give a message ID to delete!",
        "introset" | "logset" => "Please give a channel!",
        "fetchall" => "Please give a valid message limit!",
        _ => "Invalid arguments!",
    }
}

async fn reply(ctx: Context<'_>, content: impl Into<String>) {
    if let Err(e) = ctx.say(content).await {
        error!("Failed to send error reply: {}", e);
    }
}

pub async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            match error.downcast_ref::<CommandError>() {
                Some(e) => reply(ctx, e.to_string()).await,
                None => {
                    error!("Command '{}' failed: {}", ctx.command().name, error);
                    reply(ctx, "Something went wrong running that command.").await;
                }
            }
        }
        poise::FrameworkError::ArgumentParse {
            error, input, ctx, ..
        } => {
            debug!(
                "Bad arguments for '{}' ({:?}): {}",
                ctx.command().name,
                input,
                error
            );
            reply(ctx, argument_hint(&ctx.command().name)).await;
        }
        poise::FrameworkError::NotAnOwner { ctx, .. } => {
            reply(ctx, "Hey, you can't use this!").await;
        }
        poise::FrameworkError::UnknownCommand { .. } => {}
        poise::FrameworkError::CommandCheckFailed { error: None, .. } => {}
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

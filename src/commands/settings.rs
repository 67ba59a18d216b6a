use super::CommandError;
use crate::report::INFO_COLOUR;
use crate::{Context, Error};
use poise::serenity_prelude as serenity;
use tracing::info;

/// Set the introduction channel
#[poise::command(slash_command, prefix_command, owners_only, guild_only)]
pub async fn introset(
    ctx: Context<'_>,
    #[description = "Channel to watch for introductions"]
    #[channel_types("Text")]
    channel: serenity::GuildChannel,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(CommandError::GuildOnly)?;

    ctx.data()
        .guild_config
        .set_intro_channel(guild_id.get(), channel.id.get())
        .await?;

    info!("Intro channel for guild {} set to {}", guild_id, channel.id);
    ctx.say(format!("Set the introduction channel to <#{}>", channel.id))
        .await?;
    Ok(())
}

/// Set the log channel
#[poise::command(slash_command, prefix_command, owners_only, guild_only)]
pub async fn logset(
    ctx: Context<'_>,
    #[description = "Channel that receives reports"]
    #[channel_types("Text")]
    channel: serenity::GuildChannel,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(CommandError::GuildOnly)?;

    ctx.data()
        .guild_config
        .set_log_channel(guild_id.get(), channel.id.get())
        .await?;

    info!("Log channel for guild {} set to {}", guild_id, channel.id);
    ctx.say(format!("Set the log channel to <#{}>", channel.id))
        .await?;
    Ok(())
}

/// Show the configured channels
#[poise::command(slash_command, prefix_command, owners_only, guild_only)]
pub async fn channels(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(CommandError::GuildOnly)?;
    let config = ctx.data().guild_config.get(guild_id.get()).await?;

    let embed = serenity::CreateEmbed::new()
        .title("Channel Settings")
        .field("Introductions", channel_mention(config.intro_channel_id), true)
        .field("Log", channel_mention(config.log_channel_id), true)
        .color(INFO_COLOUR);

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

fn channel_mention(channel_id: Option<u64>) -> String {
    channel_id
        .map(|id| format!("<#{id}>"))
        .unwrap_or_else(|| "Not set".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_mention() {
        assert_eq!(channel_mention(Some(42)), "<#42>");
        assert_eq!(channel_mention(None), "Not set");
    }
}

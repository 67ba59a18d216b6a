use super::CommandError;
use crate::report::{self, MessageLinks, INFO_COLOUR};
use crate::{Context, Error};
use poise::serenity_prelude as serenity;
use tracing::{debug, info};

/// Get a user's intro information
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn info(
    ctx: Context<'_>,
    #[description = "User to look up (defaults to you)"] user: Option<serenity::User>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(CommandError::GuildOnly)?;
    let guild = guild_id.get();
    let user = user.unwrap_or_else(|| ctx.author().clone());
    let data = ctx.data();

    let total = data.ledger.count(guild, user.id.get()).await?;

    let mut embed = serenity::CreateEmbed::new()
        .title(format!("`{}`'s intro information", user.tag()))
        .thumbnail(user.face())
        .color(INFO_COLOUR);
    let mut attachment = None;

    if total == 0 {
        embed = embed.field(
            "Intro information",
            "This person hasn't posted an introduction!",
            false,
        );
    } else {
        embed = embed.field(
            "Intro information",
            format!("Times posted in intro: `{}`", total),
            false,
        );

        let ids = data.ledger.list_message_ids(guild, user.id.get()).await?;
        let intro_channel = data.guild_config.get_intro_channel(guild).await?;
        let (text, links) = info_links(guild, intro_channel, &ids, data.config.report_inline_limit);
        embed = report::add_split_field(embed, "Links", &text);
        attachment = links.and_then(|links| links.attachment(user.id.get()));
        if let Some(first) = ids.first() {
            let posted = serenity::MessageId::new(*first).created_at().unix_timestamp();
            embed = embed.field("First posted", format!("<t:{posted}:R>"), true);
        }

        let in_guild = guild_id.member(ctx.serenity_context(), user.id).await.is_ok();
        if !in_guild {
            embed = embed.field(
                "Guild",
                "This user isn't in the guild, consider deleting all their posts!",
                false,
            );
        }
    }

    let mut reply = poise::CreateReply::default().embed(embed);
    if let Some(file) = attachment {
        reply = reply.attachment(file);
    }
    ctx.send(reply).await?;
    Ok(())
}

/// Remove one post from a user's intro count
#[poise::command(slash_command, prefix_command, owners_only, guild_only)]
pub async fn delete(
    ctx: Context<'_>,
    #[description = "ID of the intro message to remove"] message_id: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(CommandError::GuildOnly)?;
    let guild = guild_id.get();
    let message_id = parse_message_id(&message_id)?;

    let data = ctx.data();
    let intro_channel = data
        .guild_config
        .get_intro_channel(guild)
        .await?
        .ok_or(CommandError::IntroChannelUnset)?;

    let _guard = data.guild_locks.lock(guild).await;
    let channel = serenity::ChannelId::new(intro_channel);
    match channel
        .message(ctx.http(), serenity::MessageId::new(message_id))
        .await
    {
        Ok(message) => {
            data.ledger
                .remove(guild, message.author.id.get(), message_id)
                .await?;
            message.delete(ctx.http()).await?;

            info!("Deleted intro {} by {} on request of {}", message_id, message.author.id, ctx.author().id);
            ctx.say("Removed the message from the database, and deleted the message!")
                .await?;
        }
        Err(e) if is_missing(http_status(&e)) => {
            debug!("Message {} is gone: {}", message_id, e);

            let Some(user_id) = data.ledger.user_for_message(guild, message_id).await? else {
                return Err(CommandError::UnknownMessage.into());
            };
            data.ledger.remove(guild, user_id, message_id).await?;

            info!("Removed already deleted intro {} by {}", message_id, user_id);
            ctx.say("Removed the message from the database, but the message was already deleted!")
                .await?;
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

/// Text for the `info` links field, plus the links themselves when the intro
/// channel is known. Without it there is no channel to link into.
fn info_links(
    guild: u64,
    intro_channel: Option<u64>,
    ids: &[u64],
    inline_limit: usize,
) -> (String, Option<MessageLinks>) {
    let Some(intro_channel) = intro_channel else {
        return ("Intro channel not set, no links to show.".to_string(), None);
    };
    let links = MessageLinks::build(guild, intro_channel, ids, inline_limit);
    let text = links.inline_or(|| "Check attached file".to_string());
    (text, Some(links))
}

/// Status code of a failed Discord request, if the request got a response.
fn http_status(err: &serenity::Error) -> Option<u16> {
    match err {
        serenity::Error::Http(http_err) => http_err.status_code().map(|status| status.as_u16()),
        _ => None,
    }
}

/// Only a 404 means the message is gone. Permission, rate limit and network
/// failures say nothing about it.
fn is_missing(status: Option<u16>) -> bool {
    status == Some(404)
}

/// Snowflakes overflow slash command integers, so ids arrive as text.
fn parse_message_id(raw: &str) -> Result<u64, CommandError> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .ok_or(CommandError::InvalidMessageId)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_message_id() {
        assert_eq!(parse_message_id(" 1234567890123456789 "), Ok(1234567890123456789));
        assert_eq!(parse_message_id("0"), Err(CommandError::InvalidMessageId));
        assert_eq!(parse_message_id("abc"), Err(CommandError::InvalidMessageId));
        assert_eq!(parse_message_id("-5"), Err(CommandError::InvalidMessageId));
    }

    #[test]
    fn test_info_links_without_intro_channel() {
        let (text, links) = info_links(1, None, &[500, 501], 5000);
        assert_eq!(text, "Intro channel not set, no links to show.");
        assert!(links.is_none());
        assert!(!text.contains("/channels/1/0/"));
    }

    #[test]
    fn test_info_links_with_intro_channel() {
        let (text, links) = info_links(1, Some(2), &[500, 501], 5000);
        assert!(text.contains("https://discord.com/channels/1/2/500"));
        assert!(text.contains("https://discord.com/channels/1/2/501"));
        assert!(links.is_some());
    }

    #[test]
    fn test_only_not_found_counts_as_missing() {
        assert!(is_missing(Some(404)));
        assert!(!is_missing(Some(403)));
        assert!(!is_missing(Some(429)));
        assert!(!is_missing(Some(500)));
        assert!(!is_missing(None));
    }

    #[test]
    fn test_non_http_errors_have_no_status() {
        let err = serenity::Error::Other("gateway closed");
        assert_eq!(http_status(&err), None);
        assert!(!is_missing(http_status(&err)));
    }
}

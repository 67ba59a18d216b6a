use crate::db::GuildConfig;
use crate::intake::{is_staff, member_roles};
use crate::report;
use crate::{Data, Error};
use poise::serenity_prelude as serenity;
use tracing::{debug, error, info};

async fn intro_config(
    data: &Data,
    guild_id: serenity::GuildId,
    channel_id: serenity::ChannelId,
) -> Result<Option<GuildConfig>, Error> {
    let config = data.guild_config.get(guild_id.get()).await?;
    Ok((config.intro_channel_id == Some(channel_id.get())).then_some(config))
}

pub async fn handle_delete(
    ctx: &serenity::Context,
    channel_id: serenity::ChannelId,
    message_id: serenity::MessageId,
    guild_id: Option<serenity::GuildId>,
    data: &Data,
) -> Result<(), Error> {
    let Some(guild_id) = guild_id else {
        return Ok(());
    };
    let _guard = data.guild_locks.lock(guild_id.get()).await;
    let Some(config) = intro_config(data, guild_id, channel_id).await? else {
        return Ok(());
    };
    process_deletion(ctx, data, &config, channel_id, message_id).await
}

/// Every message in the batch is handled on its own; one failure or unknown
/// id does not stop the rest.
pub async fn handle_bulk_delete(
    ctx: &serenity::Context,
    channel_id: serenity::ChannelId,
    message_ids: &[serenity::MessageId],
    guild_id: Option<serenity::GuildId>,
    data: &Data,
) -> Result<(), Error> {
    let Some(guild_id) = guild_id else {
        return Ok(());
    };
    let _guard = data.guild_locks.lock(guild_id.get()).await;
    let Some(config) = intro_config(data, guild_id, channel_id).await? else {
        return Ok(());
    };

    info!(
        "Bulk delete of {} messages in intro channel {}",
        message_ids.len(),
        channel_id
    );
    for message_id in message_ids {
        if let Err(e) = process_deletion(ctx, data, &config, channel_id, *message_id).await {
            error!("Failed to process deletion of {}: {}", message_id, e);
        }
    }
    Ok(())
}

/// What the ledger held for a deleted intro post.
#[derive(Debug)]
pub(crate) enum Removal {
    /// Cached post, removed from the ledger.
    Cached(Box<serenity::Message>),
    /// Cached bot post; bots are never recorded.
    Bot,
    /// Post resolved through the reverse index and removed.
    Uncached { user_id: u64 },
    /// Nothing recorded yet. The id is marked so a late create is dropped.
    Unknown,
}

/// Remove a deleted intro post from the ledger. The caller holds the guild
/// lock.
pub(crate) async fn remove_post(data: &Data, guild: u64, message_id: u64) -> Result<Removal, Error> {
    if let Some(message) = data.cache.take(message_id) {
        if message.author.bot {
            return Ok(Removal::Bot);
        }
        data.ledger
            .remove(guild, message.author.id.get(), message_id)
            .await?;
        return Ok(Removal::Cached(Box::new(message)));
    }

    let Some(user_id) = data.ledger.user_for_message(guild, message_id).await? else {
        data.cache.mark_deleted(message_id);
        return Ok(Removal::Unknown);
    };
    data.ledger.remove(guild, user_id, message_id).await?;
    Ok(Removal::Uncached { user_id })
}

async fn process_deletion(
    ctx: &serenity::Context,
    data: &Data,
    config: &GuildConfig,
    channel_id: serenity::ChannelId,
    message_id: serenity::MessageId,
) -> Result<(), Error> {
    let guild = config.guild_id;

    let embed = match remove_post(data, guild, message_id.get()).await? {
        Removal::Bot => return Ok(()),
        Removal::Unknown => {
            debug!("Deleted message {} was never recorded, ignoring", message_id);
            return Ok(());
        }
        Removal::Cached(message) => {
            let guild_id = serenity::GuildId::new(guild);
            if is_staff(ctx, guild_id, member_roles(&message), &data.config.staff_role_name) {
                return Ok(());
            }
            report::deleted_embed(&message, guild, &data.report_footer)
        }
        Removal::Uncached { user_id } => {
            let user = serenity::UserId::new(user_id).to_user(ctx).await?;
            report::deleted_uncached_embed(
                &user,
                guild,
                channel_id.get(),
                message_id.get(),
                &data.report_footer,
            )
        }
    };

    report::send_report(ctx, config.log_channel_id, embed, None).await?;
    Ok(())
}

use crate::db::AddOutcome;
use crate::policy::Verdict;
use crate::report::{self, MessageLinks};
use crate::{Data, Error};
use poise::serenity_prelude as serenity;
use tracing::{debug, info};

/// Whether any of `roles` is the guild's role named `staff_role_name`.
pub(crate) fn is_staff(
    ctx: &serenity::Context,
    guild_id: serenity::GuildId,
    roles: &[serenity::RoleId],
    staff_role_name: &str,
) -> bool {
    let Some(guild) = ctx.cache.guild(guild_id) else {
        debug!("Guild {} not in cache, treating author as non-staff", guild_id);
        return false;
    };
    guild
        .role_by_name(staff_role_name)
        .is_some_and(|role| roles.contains(&role.id))
}

pub(crate) fn member_roles(message: &serenity::Message) -> &[serenity::RoleId] {
    message
        .member
        .as_ref()
        .map(|m| m.roles.as_slice())
        .unwrap_or_default()
}

/// What recording a post did to the ledger.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Recorded {
    /// Posted outside the guild's intro channel.
    NotIntro,
    /// The delete for this post was handled first.
    AlreadyDeleted,
    /// Redelivered event for a post that is already counted.
    Duplicate,
    Counted {
        intro_channel: u64,
        log_channel: Option<u64>,
        total: usize,
    },
}

/// Add an intro-channel post to the ledger. The caller holds the guild lock.
pub(crate) async fn record_post(
    data: &Data,
    guild: u64,
    channel: u64,
    user: u64,
    message_id: u64,
) -> Result<Recorded, Error> {
    let guild_config = data.guild_config.get(guild).await?;
    let Some(intro_channel) = guild_config.intro_channel_id else {
        return Ok(Recorded::NotIntro);
    };
    if intro_channel != channel {
        return Ok(Recorded::NotIntro);
    }

    if data.cache.take_deleted(message_id) {
        debug!("Intro {} was deleted before it was recorded, skipping", message_id);
        return Ok(Recorded::AlreadyDeleted);
    }

    if let AddOutcome::Duplicate { .. } = data.ledger.add(guild, user, message_id).await? {
        return Ok(Recorded::Duplicate);
    }

    let total = data.ledger.count(guild, user).await?;
    Ok(Recorded::Counted {
        intro_channel,
        log_channel: guild_config.log_channel_id,
        total,
    })
}

/// Record posts in the introduction channel and report members who post
/// more than the policy allows.
pub async fn handle_message(
    ctx: &serenity::Context,
    message: &serenity::Message,
    data: &Data,
) -> Result<(), Error> {
    if message.mentions_user_id(serenity::UserId::new(data.bot_id)) {
        message
            .channel_id
            .say(
                &ctx.http,
                format!("Hey, my prefix is `{}`!", data.config.command_prefix),
            )
            .await?;
        return Ok(());
    }

    if message.author.bot {
        return Ok(());
    }

    let Some(guild_id) = message.guild_id else {
        return Ok(());
    };
    let (guild, user, message_id) = (guild_id.get(), message.author.id.get(), message.id.get());

    let _guard = data.guild_locks.lock(guild).await;
    let recorded = record_post(data, guild, message.channel_id.get(), user, message_id).await?;
    let Recorded::Counted {
        intro_channel,
        log_channel,
        total,
    } = recorded
    else {
        return Ok(());
    };
    data.cache.insert(message.clone());

    if is_staff(ctx, guild_id, member_roles(message), &data.config.staff_role_name) {
        return Ok(());
    }

    let Verdict::Exceeded { total } = data.policy.evaluate(total) else {
        return Ok(());
    };

    info!(
        "User {} has {} intro posts in guild {}, reporting",
        user, total, guild
    );

    let ids = data.ledger.list_message_ids(guild, user).await?;
    let links = MessageLinks::build(guild, intro_channel, &ids, data.config.report_inline_limit);
    let inline = links.inline_or(|| report::latest_link_note(total, guild, intro_channel, message_id));

    let embed = report::exceeded_embed(
        &message.author,
        total,
        intro_channel,
        &inline,
        message.timestamp,
        &data.report_footer,
    );
    report::send_report(ctx, log_channel, embed, links.attachment(user)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_data;

    #[tokio::test]
    async fn test_record_outside_intro_channel() {
        let data = test_data();
        assert_eq!(record_post(&data, 1, 2, 7, 500).await.unwrap(), Recorded::NotIntro);

        data.guild_config.set_intro_channel(1, 2).await.unwrap();
        assert_eq!(record_post(&data, 1, 3, 7, 500).await.unwrap(), Recorded::NotIntro);
        assert_eq!(data.ledger.count(1, 7).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_record_counts_posts() {
        let data = test_data();
        data.guild_config.set_intro_channel(1, 2).await.unwrap();
        data.guild_config.set_log_channel(1, 9).await.unwrap();

        assert_eq!(
            record_post(&data, 1, 2, 7, 500).await.unwrap(),
            Recorded::Counted { intro_channel: 2, log_channel: Some(9), total: 1 }
        );
        assert_eq!(
            record_post(&data, 1, 2, 7, 501).await.unwrap(),
            Recorded::Counted { intro_channel: 2, log_channel: Some(9), total: 2 }
        );
    }

    #[tokio::test]
    async fn test_redelivered_post_is_not_counted_again() {
        let data = test_data();
        data.guild_config.set_intro_channel(1, 2).await.unwrap();

        assert!(matches!(
            record_post(&data, 1, 2, 7, 500).await.unwrap(),
            Recorded::Counted { total: 1, .. }
        ));
        assert_eq!(record_post(&data, 1, 2, 7, 500).await.unwrap(), Recorded::Duplicate);
        assert_eq!(data.ledger.count(1, 7).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_post_deleted_first_is_skipped() {
        let data = test_data();
        data.guild_config.set_intro_channel(1, 2).await.unwrap();
        data.cache.mark_deleted(500);

        assert_eq!(record_post(&data, 1, 2, 7, 500).await.unwrap(), Recorded::AlreadyDeleted);
        assert_eq!(data.ledger.count(1, 7).await.unwrap(), 0);
        assert_eq!(data.ledger.user_for_message(1, 500).await.unwrap(), None);
    }
}

use introwatch::report::ReportFooter;
use introwatch::{commands, config::Config, db::Database, events, Data};
use poise::serenity_prelude as serenity;
use tracing::{info, error, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    let discord_token = config.discord_token.clone();

    let db = Database::new(&config)?;
    db.execute_init()?;

    let owners = config
        .owner_ids
        .iter()
        .map(|id| serenity::UserId::new(*id))
        .collect();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(config.command_prefix.clone()),
                ..Default::default()
            },
            owners,
            initialize_owners: true,
            command_check: Some(|ctx| Box::pin(commands::command_check(ctx))),
            on_error: |error| Box::pin(commands::on_error(error)),
            event_handler: |ctx, event, framework, data| {
                Box::pin(events::event_handler(ctx, event, framework, data))
            },
            allowed_mentions: Some(
                serenity::CreateAllowedMentions::new()
                    .all_users(true)
                    .all_roles(false)
                    .everyone(false),
            ),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                ctx.set_activity(Some(serenity::ActivityData::watching(&config.status_message)));

                // The first configured owner's avatar decorates every report.
                let icon_url = match config.owner_ids.first() {
                    Some(owner) => match serenity::UserId::new(*owner).to_user(ctx).await {
                        Ok(user) => Some(user.face()),
                        Err(e) => {
                            warn!("Could not fetch owner {} for report footer: {}", owner, e);
                            None
                        }
                    },
                    None => None,
                };
                let footer = ReportFooter {
                    text: config.footer_text.clone(),
                    icon_url,
                };

                Ok(Data::new(config, db, footer, ready.user.id.get()))
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MESSAGES;

    let mut client = serenity::ClientBuilder::new(&discord_token, intents)
        .framework(framework)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?;

    info!("Starting bot...");
    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    Ok(())
}

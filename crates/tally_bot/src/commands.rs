//! Slash command registration and handling.
//!
//! Three commands surface the counting game:
//! - `create-channel` makes a slowmoded counting channel and registers it
//! - `leaderboard` shows the guild's top counters
//! - `current-number` reports a channel's expected number, with the channel
//!   option autocompleted from the guild's registered counting channels

use crate::DiscordResult;
use serenity::all::{
    ChannelType, Colour, CommandInteraction, CommandOptionType, Context, CreateAutocompleteResponse,
    CreateChannel, CreateCommand, CreateCommandOption, CreateEmbed, CreateInteractionResponse,
    CreateInteractionResponseFollowup, CreateInteractionResponseMessage, UserId,
};
use serenity::model::mention::Mentionable;
use tally_core::{CountStore, CountingGame};
use tally_error::{DiscordError, DiscordErrorKind};
use tracing::{error, info, instrument, warn};

/// Slowmode applied to newly created counting channels, in seconds.
pub const SLOWMODE_SECS: u16 = 300;

/// Default name for a new counting channel.
pub const DEFAULT_CHANNEL_NAME: &str = "counting";

/// The global slash commands this bot registers on startup.
pub fn registrations() -> Vec<CreateCommand> {
    vec![
        CreateCommand::new("create-channel")
            .description("Create a new moderated counting channel")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "name",
                    "Gives the new counting channel a name. Defaults to \"counting\"",
                )
                .required(false),
            ),
        CreateCommand::new("leaderboard")
            .description("Show the leaderboard for the most active counters"),
        CreateCommand::new("current-number")
            .description("Get the current number of a counting channel")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "channel",
                    "The counting channel to inspect",
                )
                .required(true)
                .set_autocomplete(true),
            ),
    ]
}

/// Fetch a string option from a command invocation.
fn option_str<'a>(command: &'a CommandInteraction, name: &str) -> Option<&'a str> {
    command
        .data
        .options
        .iter()
        .find(|o| o.name == name)
        .and_then(|o| o.value.as_str())
}

/// Embed field label for one leaderboard row. Ranks 1-3 get medals.
fn rank_label(index: usize, name: &str, count: i64) -> String {
    const MEDALS: [&str; 3] = [":first_place:", ":second_place:", ":third_place:"];
    match MEDALS.get(index) {
        Some(medal) => format!("{medal}`{name}` `{count}`"),
        None => format!("`#{}` `{name}` `{count}`", index + 1),
    }
}

// Discord rejects truly empty field values; a zero-width space renders as
// nothing.
const BLANK: &str = "\u{200b}";

fn blue_field_embed(text: impl Into<String>) -> CreateEmbed {
    CreateEmbed::new()
        .colour(Colour::BLUE)
        .field(text, BLANK, false)
}

fn red_field_embed(text: impl Into<String>) -> CreateEmbed {
    CreateEmbed::new()
        .colour(Colour::RED)
        .field(text, BLANK, false)
}

async fn respond_embed(
    ctx: &Context,
    command: &CommandInteraction,
    embed: CreateEmbed,
) -> DiscordResult<()> {
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new().embed(embed),
            ),
        )
        .await
        .map_err(|e| DiscordError::new(DiscordErrorKind::InteractionFailed(e.to_string())))
}

async fn followup_text(
    ctx: &Context,
    command: &CommandInteraction,
    text: impl Into<String>,
) -> DiscordResult<()> {
    command
        .create_followup(
            &ctx.http,
            CreateInteractionResponseFollowup::new().content(text),
        )
        .await
        .map(|_| ())
        .map_err(|e| DiscordError::new(DiscordErrorKind::InteractionFailed(e.to_string())))
}

/// Handle `/create-channel`.
///
/// The channel lands in the invoking channel's category, slowmoded and
/// pinned to the top of the list. Registration happens only after Discord
/// confirms the creation, so a denied creation leaves no orphaned record.
#[instrument(skip(ctx, command, game), fields(guild_id))]
pub async fn create_channel<S: CountStore>(
    ctx: &Context,
    command: &CommandInteraction,
    game: &CountingGame<S>,
) -> DiscordResult<()> {
    command
        .defer(&ctx.http)
        .await
        .map_err(|e| DiscordError::new(DiscordErrorKind::InteractionFailed(e.to_string())))?;

    let Some(guild_id) = command.guild_id else {
        return followup_text(ctx, command, "This command only works in a server.").await;
    };
    tracing::Span::current().record("guild_id", guild_id.get());

    let name = option_str(command, "name").unwrap_or(DEFAULT_CHANNEL_NAME);

    // Put the new channel in the same category the command came from.
    let category = command
        .channel_id
        .to_channel(&ctx)
        .await
        .ok()
        .and_then(|c| c.guild())
        .and_then(|gc| gc.parent_id);

    let mut builder = CreateChannel::new(name)
        .kind(ChannelType::Text)
        .rate_limit_per_user(SLOWMODE_SECS)
        .position(0);
    if let Some(category) = category {
        builder = builder.category(category);
    }

    let channel = match guild_id.create_channel(&ctx.http, builder).await {
        Ok(channel) => channel,
        Err(e) => {
            warn!(error = %e, "channel creation denied");
            return followup_text(ctx, command, format!("Failed to create channel: `{e}`")).await;
        }
    };

    if let Err(e) = game
        .register_channel(crate::to_db_id(channel.id.get()), crate::to_db_id(guild_id.get()))
        .await
    {
        error!(error = %e, channel_id = %channel.id, "failed to register created channel");
        return followup_text(
            ctx,
            command,
            format!(
                "Created {} but could not register it for counting. Delete it and try again.",
                channel.mention()
            ),
        )
        .await;
    }

    info!(channel_id = %channel.id, "created counting channel");
    followup_text(ctx, command, format!("Created channel {}.", channel.mention())).await
}

/// Handle `/leaderboard`: top 10 counters in the guild.
#[instrument(skip(ctx, command, game), fields(guild_id))]
pub async fn leaderboard<S: CountStore>(
    ctx: &Context,
    command: &CommandInteraction,
    game: &CountingGame<S>,
) -> DiscordResult<()> {
    let Some(guild_id) = command.guild_id else {
        return respond_embed(
            ctx,
            command,
            red_field_embed("This command only works in a server."),
        )
        .await;
    };
    tracing::Span::current().record("guild_id", guild_id.get());

    let rows = match game.leaderboard(crate::to_db_id(guild_id.get())).await {
        Ok(rows) => rows,
        Err(e) => {
            error!(error = %e, "leaderboard query failed");
            return respond_embed(
                ctx,
                command,
                red_field_embed("The leaderboard is unavailable right now."),
            )
            .await;
        }
    };

    if rows.is_empty() {
        return respond_embed(ctx, command, red_field_embed("No users have counted yet."))
            .await;
    }

    let cached_name = ctx.cache.guild(guild_id).map(|g| g.name.clone());
    let guild_name = match cached_name {
        Some(name) => name,
        None => guild_id
            .to_partial_guild(&ctx.http)
            .await
            .map(|g| g.name)
            .unwrap_or_else(|_| "this server".to_string()),
    };

    let mut embed = CreateEmbed::new()
        .colour(Colour::BLUE)
        .title(format!("Top 10 Counters in {guild_name}"));

    for (index, row) in rows.iter().enumerate() {
        let name = match guild_id
            .member(&ctx.http, UserId::new(*row.user_id() as u64))
            .await
        {
            Ok(member) => member.display_name().to_string(),
            Err(_) => format!("user {}", row.user_id()),
        };
        embed = embed.field(rank_label(index, &name, *row.count()), BLANK, false);
    }

    respond_embed(ctx, command, embed).await
}

/// Handle `/current-number` for one channel.
#[instrument(skip(ctx, command, game))]
pub async fn current_number<S: CountStore>(
    ctx: &Context,
    command: &CommandInteraction,
    game: &CountingGame<S>,
) -> DiscordResult<()> {
    let channel_id: Option<i64> = option_str(command, "channel").and_then(|v| v.parse().ok());
    let Some(channel_id) = channel_id else {
        return respond_embed(
            ctx,
            command,
            red_field_embed("That is not a counting channel."),
        )
        .await;
    };

    match game.current_number(channel_id).await {
        Ok(Some(number)) => {
            respond_embed(
                ctx,
                command,
                blue_field_embed(format!(
                    "The current number in <#{channel_id}> is {number}"
                )),
            )
            .await
        }
        Ok(None) => {
            respond_embed(
                ctx,
                command,
                red_field_embed(format!("<#{channel_id}> is not a counting channel.")),
            )
            .await
        }
        Err(e) => {
            error!(error = %e, channel_id, "current-number query failed");
            respond_embed(
                ctx,
                command,
                red_field_embed("That channel is unavailable right now."),
            )
            .await
        }
    }
}

/// Autocomplete the `channel` option of `/current-number` from the guild's
/// registered counting channels.
#[instrument(skip(ctx, interaction, game), fields(guild_id))]
pub async fn autocomplete_channels<S: CountStore>(
    ctx: &Context,
    interaction: &CommandInteraction,
    game: &CountingGame<S>,
) -> DiscordResult<()> {
    let mut response = CreateAutocompleteResponse::new();

    if let Some(guild_id) = interaction.guild_id {
        tracing::Span::current().record("guild_id", guild_id.get());

        let typed = interaction
            .data
            .autocomplete()
            .map(|o| o.value.to_lowercase())
            .unwrap_or_default();

        let registered = game
            .guild_channels(crate::to_db_id(guild_id.get()))
            .await
            .unwrap_or_default();
        let live = guild_id.channels(&ctx.http).await.unwrap_or_default();

        let choices = registered
            .iter()
            .filter_map(|c| {
                let id = serenity::all::ChannelId::new(*c.channel_id() as u64);
                live.get(&id).map(|gc| (gc.name.clone(), id))
            })
            .filter(|(name, _)| name.to_lowercase().contains(&typed))
            .take(25); // Discord's autocomplete choice limit

        for (name, id) in choices {
            response = response.add_string_choice(name, id.to_string());
        }
    }

    interaction
        .create_response(&ctx.http, CreateInteractionResponse::Autocomplete(response))
        .await
        .map_err(|e| DiscordError::new(DiscordErrorKind::InteractionFailed(e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registrations_cover_all_commands() {
        let commands = registrations();
        let names: Vec<String> = commands
            .iter()
            .map(|c| {
                serde_json::to_value(c)
                    .expect("command serializes")["name"]
                    .as_str()
                    .expect("name is a string")
                    .to_string()
            })
            .collect();
        assert_eq!(names, vec!["create-channel", "leaderboard", "current-number"]);
    }

    #[test]
    fn test_current_number_channel_option_autocompletes() {
        let commands = registrations();
        let value = serde_json::to_value(&commands[2]).expect("command serializes");
        let option = &value["options"][0];
        assert_eq!(option["name"], "channel");
        assert_eq!(option["autocomplete"], true);
        assert_eq!(option["required"], true);
    }

    #[test]
    fn test_rank_labels() {
        assert_eq!(rank_label(0, "ada", 12), ":first_place:`ada` `12`");
        assert_eq!(rank_label(2, "bob", 3), ":third_place:`bob` `3`");
        assert_eq!(rank_label(3, "cal", 1), "`#4` `cal` `1`");
        assert_eq!(rank_label(9, "dee", 1), "`#10` `dee` `1`");
    }
}

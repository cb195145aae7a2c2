pub mod nominate;
pub mod rankings;

use serenity::builder::CreateApplicationCommands;

// Every slash command the bot exposes
pub fn register_all(commands: &mut CreateApplicationCommands) -> &mut CreateApplicationCommands {
    commands
        .create_application_command(|command| nominate::create_nominate_command(command))
        .create_application_command(|command| rankings::create_rankings_command(command))
}
